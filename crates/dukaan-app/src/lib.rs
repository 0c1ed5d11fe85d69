//! # dukaan-app: Service Layer for Dukaan POS
//!
//! Orchestrates the business workflows of the POS on top of the pure
//! calculators in `dukaan-core` and the repositories in `dukaan-db`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Caller (UI shell, out of scope)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    dukaan-app (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │  services::SaleService    create / edit / delete + stock       │   │
//! │  │  services::ItemService    inventory CRUD                       │   │
//! │  │  services::ClaimService   prize claims + inventory gate        │   │
//! │  │  services::LoyaltyService points balances                      │   │
//! │  │                                                                 │   │
//! │  │  session::AuthService     sign-up / login / role gating        │   │
//! │  │  draft::DraftStore        in-memory sale edit drafts           │   │
//! │  │  config::AppConfig        env + platform dirs                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  dukaan-core (pure) + dukaan-db (SQLite)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod draft;
pub mod error;
pub mod services;
pub mod session;

pub use config::AppConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use session::{AuthService, Session, SessionState};

/// Initializes the tracing subscriber for the application.
///
/// Honors `RUST_LOG` when set; otherwise defaults to info with debug for
/// the dukaan crates and quiet sqlx statement logging.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dukaan_app=debug,dukaan_db=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
