//! # Claim Service
//!
//! Prize catalog management and prize claims with the inventory gate.
//!
//! ## The Inventory Gate
//! Claiming a catalog prize must never oversell it. The gate is a single
//! conditional UPDATE on the prize row (`quantity > 0` in the WHERE
//! clause), so two concurrent claims on a one-unit prize cannot both
//! pass: exactly one UPDATE matches, the other claim is refused.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create claim (catalog prize)                                           │
//! │    find prize by name ──► try_acquire_unit ──► insert claim            │
//! │                              │ refused              │ insert failed    │
//! │                              ▼                      ▼                  │
//! │                        PRIZE_UNAVAILABLE      release unit, rethrow    │
//! │                                                                         │
//! │  delete claim (catalog prize)   release unit ──► delete claim          │
//! │  custom prize                   no inventory involved                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Editing a claim never touches prize inventory; the unit was consumed
//! when the claim was created and is only returned on deletion.

use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::session::SessionState;
use dukaan_core::validation::{validate_customer_name, validate_name, validate_phone};
use dukaan_core::{Claim, ClaimStatus, CoreError, Prize, Role};
use dukaan_db::repository::claim::NewClaim;
use dukaan_db::repository::prize::NewPrize;
use dukaan_db::Database;

// =============================================================================
// Inputs
// =============================================================================

/// Caller-supplied claim fields. Status is not accepted: new claims start
/// pending, and edits keep the stored status (see [`ClaimService::set_claim_status`]).
#[derive(Debug, Clone)]
pub struct ClaimInput {
    pub customer_name: String,
    pub vehicle_no: String,
    pub phone_no: String,
    pub prize_name: String,
    pub claimed_points: i64,
    pub is_custom_prize: bool,
}

impl ClaimInput {
    fn validate(&self) -> ApiResult<()> {
        validate_customer_name(&self.customer_name)?;
        validate_phone(&self.phone_no)?;
        if self.prize_name.trim().is_empty() {
            return Err(ApiError::validation("prize name is required"));
        }
        if self.claimed_points < 0 {
            return Err(ApiError::validation("claimed points cannot be negative"));
        }
        Ok(())
    }

    fn into_new_claim(self, status: ClaimStatus) -> NewClaim {
        NewClaim {
            customer_name: self.customer_name.trim().to_string(),
            vehicle_no: self.vehicle_no.trim().to_string(),
            phone_no: self.phone_no.trim().to_string(),
            prize_name: self.prize_name.trim().to_string(),
            claimed_points: self.claimed_points,
            status,
            is_custom_prize: self.is_custom_prize,
        }
    }
}

/// Caller-supplied prize fields.
#[derive(Debug, Clone)]
pub struct PrizeInput {
    pub name: String,
    pub points: i64,
    pub quantity: i64,
    pub category: String,
    pub is_active: bool,
}

impl PrizeInput {
    fn validate(&self) -> ApiResult<()> {
        validate_name(&self.name)?;
        if self.points <= 0 {
            return Err(ApiError::validation("prize points must be positive"));
        }
        if self.quantity < 0 {
            return Err(ApiError::validation("prize quantity cannot be negative"));
        }
        Ok(())
    }

    fn into_new_prize(self) -> NewPrize {
        NewPrize {
            name: self.name.trim().to_string(),
            points: self.points,
            quantity: self.quantity,
            category: self.category.trim().to_string(),
            is_active: self.is_active,
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Prize and claim operations.
#[derive(Debug, Clone)]
pub struct ClaimService {
    db: Database,
    session: SessionState,
}

impl ClaimService {
    pub fn new(db: Database, session: SessionState) -> Self {
        ClaimService { db, session }
    }

    // =========================================================================
    // Claims
    // =========================================================================

    /// Records a claim. Catalog prizes pass the inventory gate first; a
    /// custom prize (hand-entered reward) involves no inventory at all.
    pub async fn create_claim(&self, input: ClaimInput) -> ApiResult<Claim> {
        self.session
            .require_at_least(Role::Biller, "record claims")?;
        input.validate()?;

        if input.is_custom_prize {
            let claim = self
                .db
                .claims()
                .insert(input.into_new_claim(ClaimStatus::Pending))
                .await?;
            info!(claim_id = %claim.id, prize = %claim.prize_name, "Custom prize claim recorded");
            return Ok(claim);
        }

        let prize_name = input.prize_name.trim().to_string();
        let prize = self
            .db
            .prizes()
            .find_by_name(&prize_name)
            .await?
            .ok_or_else(|| CoreError::PrizeNotFound(prize_name.clone()))?;

        if !self.db.prizes().try_acquire_unit(&prize.id).await? {
            return Err(CoreError::PrizeOutOfStock { name: prize.name }.into());
        }

        // Unit is held; if the claim write fails, give it back.
        let claim = match self
            .db
            .claims()
            .insert(input.into_new_claim(ClaimStatus::Pending))
            .await
        {
            Ok(claim) => claim,
            Err(e) => {
                if let Err(release) = self.db.prizes().release_unit(&prize.id).await {
                    warn!(prize_id = %prize.id, error = %release, "Unit release after failed claim write also failed");
                }
                return Err(e.into());
            }
        };

        info!(claim_id = %claim.id, prize = %claim.prize_name, "Claim recorded");
        Ok(claim)
    }

    /// Updates a claim's customer and prize fields.
    ///
    /// Inventory is untouched: the unit was consumed at creation. Renaming
    /// the prize on an existing claim does not move units between prizes.
    pub async fn update_claim(&self, id: &str, input: ClaimInput) -> ApiResult<Claim> {
        self.session.require_at_least(Role::Biller, "edit claims")?;
        input.validate()?;

        let existing = self.db.claims().get_required(id).await?;
        let claim = self
            .db
            .claims()
            .update(id, input.into_new_claim(existing.status))
            .await?;
        info!(claim_id = %claim.id, "Claim updated");
        Ok(claim)
    }

    /// Moves a claim through its status lifecycle.
    pub async fn set_claim_status(&self, id: &str, status: ClaimStatus) -> ApiResult<Claim> {
        self.session.require_at_least(Role::Biller, "edit claims")?;

        let claim = self.db.claims().set_status(id, status).await?;
        info!(claim_id = %claim.id, status = ?claim.status, "Claim status changed");
        Ok(claim)
    }

    /// Deletes a claim, returning the unit to a catalog prize.
    ///
    /// If the prize no longer exists (renamed or removed since the claim),
    /// the deletion proceeds without a restock.
    pub async fn delete_claim(&self, id: &str) -> ApiResult<()> {
        self.session
            .require_at_least(Role::Biller, "delete claims")?;

        let claim = self.db.claims().get_required(id).await?;

        if !claim.is_custom_prize {
            match self.db.prizes().find_by_name(&claim.prize_name).await? {
                Some(prize) => self.db.prizes().release_unit(&prize.id).await?,
                None => {
                    warn!(claim_id = %id, prize = %claim.prize_name, "Prize gone, deleting claim without restock")
                }
            }
        }

        self.db.claims().delete(id).await?;
        info!(claim_id = %id, "Claim deleted");
        Ok(())
    }

    /// Gets a claim by id.
    pub async fn get_claim(&self, id: &str) -> ApiResult<Option<Claim>> {
        self.session.require()?;
        Ok(self.db.claims().get(id).await?)
    }

    /// Lists all claims, newest first.
    pub async fn list_claims(&self) -> ApiResult<Vec<Claim>> {
        self.session.require()?;
        Ok(self.db.claims().list().await?)
    }

    // =========================================================================
    // Prize Catalog
    // =========================================================================

    /// Adds a prize to the catalog.
    pub async fn create_prize(&self, input: PrizeInput) -> ApiResult<Prize> {
        self.session
            .require_at_least(Role::Biller, "manage prizes")?;
        input.validate()?;

        let prize = self.db.prizes().insert(input.into_new_prize()).await?;
        info!(prize_id = %prize.id, name = %prize.name, "Prize created");
        Ok(prize)
    }

    /// Updates a prize.
    pub async fn update_prize(&self, id: &str, input: PrizeInput) -> ApiResult<Prize> {
        self.session
            .require_at_least(Role::Biller, "manage prizes")?;
        input.validate()?;

        let prize = self.db.prizes().update(id, input.into_new_prize()).await?;
        info!(prize_id = %prize.id, "Prize updated");
        Ok(prize)
    }

    /// Removes a prize from the catalog. Existing claims keep their prize
    /// name snapshot.
    pub async fn delete_prize(&self, id: &str) -> ApiResult<()> {
        self.session
            .require_at_least(Role::Biller, "manage prizes")?;

        self.db.prizes().delete(id).await?;
        info!(prize_id = %id, "Prize deleted");
        Ok(())
    }

    /// Lists the full catalog.
    pub async fn list_prizes(&self) -> ApiResult<Vec<Prize>> {
        self.session.require()?;
        Ok(self.db.prizes().list().await?)
    }

    /// Lists prizes currently offered (active).
    pub async fn list_active_prizes(&self) -> ApiResult<Vec<Prize>> {
        self.session.require()?;
        Ok(self.db.prizes().list_active().await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
