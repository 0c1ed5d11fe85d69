//! # Repository Implementations
//!
//! One repository per collection. Each repository owns its SQL, converts
//! rows to `dukaan-core` domain types, and publishes a change event after
//! every successful mutation.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Service layer (dukaan-app)                                            │
//! │       │ domain types in / domain types out                             │
//! │       ▼                                                                 │
//! │  Repository (this module)                                              │
//! │       │ runtime SQL, row structs, ChangeBus publish                    │
//! │       ▼                                                                 │
//! │  SqlitePool                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes assign their own `updated_at` (and `created_at` on insert); the
//! caller never supplies storage timestamps.

pub mod claim;
pub mod item;
pub mod prize;
pub mod sale;
pub mod user;
