//! # dukaan-core: Pure Business Logic for Dukaan POS
//!
//! This crate is the **heart** of Dukaan POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dukaan POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Callers (UI out of scope)                    │   │
//! │  │    Sale Screen ──► Add Item Screen ──► Claims ──► Dashboards   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    dukaan-app (Services)                        │   │
//! │  │    SaleService, ItemService, ClaimService, LoyaltyService       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ dukaan-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  amounts  │  │ reconcile │  │  loyalty  │  │   │
//! │  │   │   Item    │  │ SaleTotals│  │StockDelta │  │  points   │  │   │
//! │  │   │   Sale    │  │  line tax │  │ StockKey  │  │  accrual  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    dukaan-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, Sale, SaleLine, Prize, Claim, User)
//! - [`amounts`] - Line amount and sale total calculation
//! - [`reconcile`] - Stock delta computation between sale versions
//! - [`loyalty`] - Loyalty point accrual and netting
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Explicit Errors**: All errors are typed, never strings or panics
//! 4. **Full-precision floats**: Internal amounts stay f64; display rounding
//!    is the caller's job

// =============================================================================
// Module Declarations
// =============================================================================

pub mod amounts;
pub mod error;
pub mod loyalty;
pub mod reconcile;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use dukaan_core::Sale` instead of
// `use dukaan_core::types::Sale`

pub use amounts::SaleTotals;
pub use error::{CoreError, ValidationError};
pub use reconcile::{StockDelta, StockKey};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Sales tax rate applied to "With Tax" lines.
///
/// ## Why a constant?
/// The tax rate is a fixed 18% business rule, not configurable per item.
/// Items carry a `tax_rate` field for reporting, but the amount calculator
/// never reads it.
pub const TAX_RATE: f64 = 0.18;

/// Loyalty points earned per count-based (non-litre) sale line.
///
/// ## Business Reason
/// Volume (Ltr) lines earn their quantity in points; everything else earns
/// a flat 20 points per line regardless of quantity or price.
pub const COUNT_UNIT_POINTS: f64 = 20.0;

/// Invoice number assigned to the first sale in an empty store.
pub const FIRST_INVOICE_NUMBER: i64 = 1;
