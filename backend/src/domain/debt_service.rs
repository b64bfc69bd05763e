use chrono::Utc;
use log::info;
use std::sync::atomic::{AtomicU64, Ordering};

use shared::{CreateDebtRequest, Debt, DebtListResponse, DebtResponse};

use crate::domain::error::{ServiceError, ServiceResult};
use crate::domain::vehicle_service::normalize_plate;
use crate::storage::csv::{DebtRepository, VehicleRepository};
use crate::storage::traits::{DebtStorage, VehicleStorage};

static DEBT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Service for tracking per-vehicle debts, independent of the daily ledger.
#[derive(Clone)]
pub struct DebtService {
    debt_repository: DebtRepository,
    vehicle_repository: VehicleRepository,
}

impl DebtService {
    pub fn new(debt_repository: DebtRepository, vehicle_repository: VehicleRepository) -> Self {
        Self {
            debt_repository,
            vehicle_repository,
        }
    }

    fn require_vehicle(&self, owner_uid: &str, plate: &str) -> ServiceResult<String> {
        let plate = normalize_plate(plate)?;
        if self.vehicle_repository.get_vehicle(owner_uid, &plate)?.is_none() {
            return Err(ServiceError::VehicleNotFound(plate));
        }
        Ok(plate)
    }

    /// Timestamp-based id with a process-local sequence suffix so ids minted
    /// within the same millisecond stay distinct.
    fn generate_debt_id() -> String {
        let sequence = DEBT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        format!("deuda-{}-{:x}", Utc::now().timestamp_millis(), sequence)
    }

    /// Register a new debt for a vehicle.
    pub fn add_debt(
        &self,
        owner_uid: &str,
        plate: &str,
        request: CreateDebtRequest,
    ) -> ServiceResult<DebtResponse> {
        let plate = self.require_vehicle(owner_uid, plate)?;

        let name = request.name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("debtor name is required".to_string()));
        }
        if !request.amount.is_finite() || request.amount <= 0.0 {
            return Err(ServiceError::Validation(
                "debt amount must be positive".to_string(),
            ));
        }

        let debt = Debt {
            id: Self::generate_debt_id(),
            name: name.to_string(),
            amount: request.amount,
            start_date: request
                .start_date
                .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string()),
            due_date: request.due_date,
            paid: false,
            registered_at: Utc::now().to_rfc3339(),
        };

        self.debt_repository.store_debt(owner_uid, &plate, &debt)?;
        info!("Added debt {} ({}) for {}/{}", debt.id, debt.name, owner_uid, plate);

        Ok(DebtResponse {
            debt,
            success_message: "Deuda registrada exitosamente.".to_string(),
        })
    }

    /// List a vehicle's debts ordered by registration time.
    pub fn list_debts(&self, owner_uid: &str, plate: &str) -> ServiceResult<DebtListResponse> {
        let plate = self.require_vehicle(owner_uid, plate)?;
        let debts = self.debt_repository.list_debts(owner_uid, &plate)?;
        Ok(DebtListResponse { debts })
    }

    /// Mark a debt as paid.
    pub fn mark_paid(
        &self,
        owner_uid: &str,
        plate: &str,
        debt_id: &str,
    ) -> ServiceResult<DebtResponse> {
        let plate = self.require_vehicle(owner_uid, plate)?;

        let mut debt = self
            .debt_repository
            .list_debts(owner_uid, &plate)?
            .into_iter()
            .find(|d| d.id == debt_id)
            .ok_or_else(|| ServiceError::DebtNotFound(debt_id.to_string()))?;
        debt.paid = true;

        if !self.debt_repository.update_debt(owner_uid, &plate, &debt)? {
            return Err(ServiceError::DebtNotFound(debt_id.to_string()));
        }
        info!("Marked debt {} paid for {}/{}", debt_id, owner_uid, plate);

        Ok(DebtResponse {
            debt,
            success_message: "Deuda marcada como pagada.".to_string(),
        })
    }
}
