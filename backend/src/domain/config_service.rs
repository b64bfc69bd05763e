use chrono::Utc;
use log::info;

use shared::{ConfigResponse, SetConfigRequest, VehicleConfig};

use crate::domain::error::{ServiceError, ServiceResult};
use crate::domain::vehicle_service::normalize_plate;
use crate::storage::csv::{ConfigRepository, VehicleRepository};
use crate::storage::traits::{ConfigStorage, VehicleStorage};

/// Service for the per-vehicle opening balance configuration.
#[derive(Clone)]
pub struct ConfigService {
    config_repository: ConfigRepository,
    vehicle_repository: VehicleRepository,
}

impl ConfigService {
    pub fn new(
        config_repository: ConfigRepository,
        vehicle_repository: VehicleRepository,
    ) -> Self {
        Self {
            config_repository,
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

    /// Set the opening balance for a vehicle, overwriting any previous config.
    pub fn set_config(
        &self,
        owner_uid: &str,
        plate: &str,
        request: SetConfigRequest,
    ) -> ServiceResult<ConfigResponse> {
        let plate = self.require_vehicle(owner_uid, plate)?;

        if !request.opening_balance.is_finite() {
            return Err(ServiceError::Validation(
                "opening balance must be a number".to_string(),
            ));
        }

        let config = VehicleConfig {
            opening_balance: request.opening_balance,
            start_date: request
                .start_date
                .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string()),
        };

        self.config_repository.set_config(owner_uid, &plate, &config)?;
        info!(
            "Set opening balance {} for {}/{}",
            config.opening_balance, owner_uid, plate
        );

        Ok(ConfigResponse {
            config,
            success_message: "Caja inicial guardada exitosamente.".to_string(),
        })
    }

    /// Get the effective config for a vehicle. A vehicle that has never been
    /// configured reads as an opening balance of 0 starting today.
    pub fn get_config(&self, owner_uid: &str, plate: &str) -> ServiceResult<VehicleConfig> {
        let plate = self.require_vehicle(owner_uid, plate)?;

        Ok(self
            .config_repository
            .get_config(owner_uid, &plate)?
            .unwrap_or_else(|| VehicleConfig {
                opening_balance: 0.0,
                start_date: Utc::now().format("%Y-%m-%d").to_string(),
            }))
    }

    /// The stored opening balance, if any. Used by the monthly report.
    pub fn opening_balance(&self, owner_uid: &str, plate: &str) -> ServiceResult<Option<f64>> {
        let plate = normalize_plate(plate)?;
        Ok(self
            .config_repository
            .get_config(owner_uid, &plate)?
            .map(|c| c.opening_balance))
    }
}
