use chrono::Utc;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use shared::{RegisterVehicleRequest, Vehicle, VehicleListResponse, VehicleResponse};

use crate::domain::error::{ServiceError, ServiceResult};
use crate::storage::csv::VehicleRepository;
use crate::storage::traits::VehicleStorage;

/// Plate format: exactly 3 letters followed by 3 digits, after uppercasing.
static PLATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]{3}[0-9]{3}$").expect("plate pattern is a valid regex")
});

/// Normalize a raw plate to its canonical uppercase form, rejecting anything
/// that does not match the 3-letters + 3-digits format.
pub fn normalize_plate(raw: &str) -> ServiceResult<String> {
    let plate = raw.trim().to_uppercase();
    if !PLATE_PATTERN.is_match(&plate) {
        return Err(ServiceError::InvalidPlate(raw.to_string()));
    }
    Ok(plate)
}

/// Service for registering and listing an owner's vehicles.
#[derive(Clone)]
pub struct VehicleService {
    vehicle_repository: VehicleRepository,
}

impl VehicleService {
    pub fn new(vehicle_repository: VehicleRepository) -> Self {
        Self { vehicle_repository }
    }

    /// Register a new vehicle for the owner.
    ///
    /// The plate is uppercased before validation, and a pre-write existence
    /// check enforces plate uniqueness within the owner's collection.
    pub fn register_vehicle(
        &self,
        owner_uid: &str,
        request: RegisterVehicleRequest,
    ) -> ServiceResult<VehicleResponse> {
        info!("Registering vehicle {} for owner {}", request.plate, owner_uid);

        let plate = normalize_plate(&request.plate)?;

        if request.make.trim().is_empty() || request.model.trim().is_empty() {
            return Err(ServiceError::Validation(
                "make and model are required".to_string(),
            ));
        }

        if self.vehicle_repository.get_vehicle(owner_uid, &plate)?.is_some() {
            warn!("Vehicle {} already registered for owner {}", plate, owner_uid);
            return Err(ServiceError::DuplicateVehicle(plate));
        }

        let vehicle = Vehicle {
            plate: plate.clone(),
            category: request.category,
            make: request.make.trim().to_string(),
            model: request.model.trim().to_string(),
            registered_at: Utc::now().to_rfc3339(),
        };

        self.vehicle_repository.store_vehicle(owner_uid, &vehicle)?;
        info!("Registered vehicle {} for owner {}", plate, owner_uid);

        Ok(VehicleResponse {
            vehicle,
            success_message: "Vehículo registrado exitosamente.".to_string(),
        })
    }

    /// List the owner's vehicles ordered by plate.
    pub fn list_vehicles(&self, owner_uid: &str) -> ServiceResult<VehicleListResponse> {
        let vehicles = self.vehicle_repository.list_vehicles(owner_uid)?;
        info!("Found {} vehicles for owner {}", vehicles.len(), owner_uid);
        Ok(VehicleListResponse { vehicles })
    }

    /// Get one vehicle by plate.
    pub fn get_vehicle(&self, owner_uid: &str, plate: &str) -> ServiceResult<Vehicle> {
        let plate = normalize_plate(plate)?;
        self.vehicle_repository
            .get_vehicle(owner_uid, &plate)?
            .ok_or(ServiceError::VehicleNotFound(plate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::CsvConnection;
    use shared::VehicleCategory;
    use tempfile::TempDir;

    fn setup_test_service() -> (VehicleService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        (VehicleService::new(VehicleRepository::new(connection)), temp_dir)
    }

    fn request(plate: &str) -> RegisterVehicleRequest {
        RegisterVehicleRequest {
            plate: plate.to_string(),
            category: VehicleCategory::Particular,
            make: "Renault".to_string(),
            model: "Logan".to_string(),
        }
    }

    #[test]
    fn normalize_plate_uppercases_valid_input() {
        assert_eq!(normalize_plate("abc123").unwrap(), "ABC123");
        assert_eq!(normalize_plate("  xyz789 ").unwrap(), "XYZ789");
    }

    #[test]
    fn normalize_plate_rejects_malformed_input() {
        for plate in ["AB123", "ABCD123", "123ABC", "ABC12X", "", "ABC-123"] {
            assert!(matches!(
                normalize_plate(plate),
                Err(ServiceError::InvalidPlate(_))
            ));
        }
    }

    #[test]
    fn register_stores_normalized_vehicle() {
        let (service, _temp_dir) = setup_test_service();

        let response = service.register_vehicle("uid-1", request("abc123")).unwrap();
        assert_eq!(response.vehicle.plate, "ABC123");

        let vehicle = service.get_vehicle("uid-1", "abc123").unwrap();
        assert_eq!(vehicle.make, "Renault");
    }

    #[test]
    fn duplicate_plate_is_a_conflict() {
        let (service, _temp_dir) = setup_test_service();

        service.register_vehicle("uid-1", request("ABC123")).unwrap();
        let err = service.register_vehicle("uid-1", request("abc123")).unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateVehicle(_)));

        // The same plate is fine for a different owner.
        assert!(service.register_vehicle("uid-2", request("ABC123")).is_ok());
    }

    #[test]
    fn register_requires_make_and_model() {
        let (service, _temp_dir) = setup_test_service();

        let mut blank = request("ABC123");
        blank.model = "  ".to_string();
        assert!(matches!(
            service.register_vehicle("uid-1", blank),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn unknown_plate_is_not_found() {
        let (service, _temp_dir) = setup_test_service();
        assert!(matches!(
            service.get_vehicle("uid-1", "ZZZ999"),
            Err(ServiceError::VehicleNotFound(_))
        ));
    }
}
