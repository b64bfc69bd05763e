use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs;

use shared::Vehicle;

use super::connection::CsvConnection;
use crate::storage::traits::VehicleStorage;

/// Vehicle repository using filesystem discovery: each registered vehicle is a
/// `{owner}/{PLATE}/vehicle.yaml` file, so the plate directory doubles as the
/// existence check.
#[derive(Clone)]
pub struct VehicleRepository {
    connection: CsvConnection,
}

impl VehicleRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn load_vehicle_from_directory(&self, owner_uid: &str, plate: &str) -> Result<Option<Vehicle>> {
        let yaml_path = self.connection.vehicle_file_path(owner_uid, plate);

        if !yaml_path.exists() {
            return Ok(None);
        }

        let yaml_content = fs::read_to_string(&yaml_path)
            .with_context(|| format!("Failed to read {}", yaml_path.display()))?;
        let vehicle: Vehicle = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Malformed vehicle file {}", yaml_path.display()))?;

        Ok(Some(vehicle))
    }
}

impl VehicleStorage for VehicleRepository {
    fn store_vehicle(&self, owner_uid: &str, vehicle: &Vehicle) -> Result<()> {
        self.connection
            .ensure_vehicle_directory(owner_uid, &vehicle.plate)?;

        let yaml_path = self.connection.vehicle_file_path(owner_uid, &vehicle.plate);
        let yaml_content = serde_yaml::to_string(vehicle)?;
        self.connection.write_atomic(&yaml_path, &yaml_content)?;

        info!("Stored vehicle {} for owner {}", vehicle.plate, owner_uid);
        Ok(())
    }

    fn get_vehicle(&self, owner_uid: &str, plate: &str) -> Result<Option<Vehicle>> {
        self.load_vehicle_from_directory(owner_uid, plate)
    }

    fn list_vehicles(&self, owner_uid: &str) -> Result<Vec<Vehicle>> {
        let owner_dir = self.connection.owner_directory(owner_uid);

        if !owner_dir.exists() {
            debug!("Owner directory doesn't exist, returning empty vehicle list");
            return Ok(Vec::new());
        }

        let mut vehicles = Vec::new();

        for entry in fs::read_dir(owner_dir)? {
            let entry = entry?;
            let path = entry.path();

            if !path.is_dir() {
                continue;
            }

            let plate = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => {
                    warn!("Skipping directory with invalid name: {:?}", path);
                    continue;
                }
            };

            match self.load_vehicle_from_directory(owner_uid, &plate) {
                Ok(Some(vehicle)) => vehicles.push(vehicle),
                Ok(None) => debug!("Directory {} has no vehicle file", plate),
                Err(e) => warn!("Error loading vehicle from directory {}: {}", plate, e),
            }
        }

        vehicles.sort_by(|a, b| a.plate.cmp(&b.plate));
        Ok(vehicles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::VehicleCategory;
    use tempfile::TempDir;

    fn setup_test_repo() -> (VehicleRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        (VehicleRepository::new(connection), temp_dir)
    }

    fn sample_vehicle(plate: &str) -> Vehicle {
        Vehicle {
            plate: plate.to_string(),
            category: VehicleCategory::Buseta,
            make: "Chevrolet".to_string(),
            model: "NPR".to_string(),
            registered_at: "2026-08-01T08:00:00Z".to_string(),
        }
    }

    #[test]
    fn store_and_get_vehicle() {
        let (repo, _temp_dir) = setup_test_repo();

        repo.store_vehicle("uid-1", &sample_vehicle("ABC123")).unwrap();

        let loaded = repo.get_vehicle("uid-1", "ABC123").unwrap();
        assert_eq!(loaded, Some(sample_vehicle("ABC123")));

        assert!(repo.get_vehicle("uid-1", "ZZZ999").unwrap().is_none());
    }

    #[test]
    fn list_vehicles_ordered_by_plate() {
        let (repo, _temp_dir) = setup_test_repo();

        repo.store_vehicle("uid-1", &sample_vehicle("XYZ789")).unwrap();
        repo.store_vehicle("uid-1", &sample_vehicle("ABC123")).unwrap();

        let vehicles = repo.list_vehicles("uid-1").unwrap();
        let plates: Vec<_> = vehicles.iter().map(|v| v.plate.as_str()).collect();
        assert_eq!(plates, vec!["ABC123", "XYZ789"]);
    }

    #[test]
    fn owners_are_isolated() {
        let (repo, _temp_dir) = setup_test_repo();

        repo.store_vehicle("uid-1", &sample_vehicle("ABC123")).unwrap();

        assert!(repo.list_vehicles("uid-2").unwrap().is_empty());
        assert!(repo.get_vehicle("uid-2", "ABC123").unwrap().is_none());
    }
}
