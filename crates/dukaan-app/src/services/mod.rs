//! # Services
//!
//! Workflow orchestration over the repositories. Each service validates
//! input with `dukaan-core`, gates the call on the session role, performs
//! the storage operations in the documented order, and reports partial
//! failure honestly instead of pretending atomicity SQLite-per-statement
//! writes cannot give across documents.

pub mod claim_service;
pub mod item_service;
pub mod loyalty_service;
pub mod sale_service;

pub use claim_service::{ClaimInput, ClaimService, PrizeInput};
pub use item_service::{ItemInput, ItemService};
pub use loyalty_service::LoyaltyService;
pub use sale_service::{
    AdjustmentReport, DeleteOutcome, LineInput, PendingDelete, PendingSave, SaleInput,
    SaleService, SaveOutcome,
};
