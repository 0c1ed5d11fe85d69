//! # dukaan-db: Database Layer for Dukaan POS
//!
//! This crate provides database access for the Dukaan POS system.
//! It uses SQLite for local storage with sqlx for async operations, and
//! implements the document-store contract the services layer depends on:
//! per-collection repositories, atomic field increments, write-time
//! timestamps, and change-event subscriptions.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dukaan POS Data Flow                             │
//! │                                                                         │
//! │  Service call (SaleService::create_sale)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     dukaan-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (item, sale, │    │  (embedded)  │  │   │
//! │  │   │               │    │  prize, claim,│    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  user)        │    │ 001_init.sql │  │   │
//! │  │   │ ChangeBus     │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │          ~/.local/share/dukaan-pos/dukaan.db (Linux)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`events`] - Collection change broadcast for live views
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (item, sale, prize, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dukaan_db::{Database, DbConfig};
//!
//! // Create database with default config
//! let config = DbConfig::new("path/to/dukaan.db");
//! let db = Database::new(config).await?;
//!
//! // Use repositories
//! let items = db.items().list().await?;
//!
//! // Subscribe to change events
//! let mut changes = db.subscribe();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod events;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use events::{ChangeEvent, ChangeKind, Collection};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::claim::ClaimRepository;
pub use repository::item::ItemRepository;
pub use repository::prize::PrizeRepository;
pub use repository::sale::SaleRepository;
pub use repository::user::UserRepository;
