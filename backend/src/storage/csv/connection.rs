use anyhow::Result;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::storage::traits::Connection;

/// CsvConnection manages the on-disk layout: one directory per owner, one
/// subdirectory per vehicle plate, with CSV/YAML files per collection.
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: Arc<PathBuf>,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory.
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self {
            base_directory: Arc::new(base_path),
        })
    }

    /// Create a connection in the default data directory.
    ///
    /// Honors `FLOTA_DATA_DIR` when set, otherwise uses
    /// `~/.flota-cuentas/data`.
    pub fn new_default() -> Result<Self> {
        let data_dir = match std::env::var("FLOTA_DATA_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir.trim()),
            _ => {
                let home_dir = std::env::var("HOME")
                    .or_else(|_| std::env::var("USERPROFILE"))
                    .map_err(|_| anyhow::anyhow!("Could not determine home directory"))?;
                PathBuf::from(home_dir).join(".flota-cuentas").join("data")
            }
        };

        info!("Using data directory: {}", data_dir.display());
        Self::new(data_dir)
    }

    /// Get the base directory path.
    pub fn base_directory(&self) -> PathBuf {
        self.base_directory.as_ref().clone()
    }

    /// Get the directory holding one owner's vehicles.
    pub fn owner_directory(&self, owner_uid: &str) -> PathBuf {
        self.base_directory.join(owner_uid)
    }

    /// Get the directory for one vehicle's data, creating nothing.
    pub fn vehicle_directory(&self, owner_uid: &str, plate: &str) -> PathBuf {
        self.owner_directory(owner_uid).join(plate)
    }

    /// Create the vehicle directory if it does not exist yet.
    pub fn ensure_vehicle_directory(&self, owner_uid: &str, plate: &str) -> Result<PathBuf> {
        let dir = self.vehicle_directory(owner_uid, plate);
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            info!("Created vehicle directory: {}", dir.display());
        }
        Ok(dir)
    }

    pub fn vehicle_file_path(&self, owner_uid: &str, plate: &str) -> PathBuf {
        self.vehicle_directory(owner_uid, plate).join("vehicle.yaml")
    }

    pub fn records_file_path(&self, owner_uid: &str, plate: &str) -> PathBuf {
        self.vehicle_directory(owner_uid, plate).join("registros.csv")
    }

    pub fn expenses_file_path(&self, owner_uid: &str, plate: &str) -> PathBuf {
        self.vehicle_directory(owner_uid, plate).join("gastos.csv")
    }

    pub fn debts_file_path(&self, owner_uid: &str, plate: &str) -> PathBuf {
        self.vehicle_directory(owner_uid, plate).join("deudores.csv")
    }

    pub fn config_file_path(&self, owner_uid: &str, plate: &str) -> PathBuf {
        self.vehicle_directory(owner_uid, plate)
            .join("configuracion.yaml")
    }

    /// Write a file atomically via a temp file in the same directory.
    pub fn write_atomic(&self, path: &Path, contents: &str) -> Result<()> {
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, contents)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

impl Connection for CsvConnection {
    type VehicleRepository = super::vehicle_repository::VehicleRepository;
    type DailyRecordRepository = super::record_repository::DailyRecordRepository;
    type DebtRepository = super::debt_repository::DebtRepository;
    type ConfigRepository = super::config_repository::ConfigRepository;

    fn create_vehicle_repository(&self) -> Self::VehicleRepository {
        super::vehicle_repository::VehicleRepository::new(self.clone())
    }

    fn create_daily_record_repository(&self) -> Self::DailyRecordRepository {
        super::record_repository::DailyRecordRepository::new(self.clone())
    }

    fn create_debt_repository(&self) -> Self::DebtRepository {
        super::debt_repository::DebtRepository::new(self.clone())
    }

    fn create_config_repository(&self) -> Self::ConfigRepository {
        super::config_repository::ConfigRepository::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_base_directory() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("data");
        assert!(!base.exists());

        let connection = CsvConnection::new(&base).unwrap();
        assert!(base.exists());
        assert_eq!(connection.base_directory(), base);
    }

    #[test]
    fn vehicle_paths_are_scoped_by_owner_and_plate() {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();

        let records = connection.records_file_path("uid-1", "ABC123");
        assert!(records.ends_with("uid-1/ABC123/registros.csv"));

        let config = connection.config_file_path("uid-1", "ABC123");
        assert!(config.ends_with("uid-1/ABC123/configuracion.yaml"));
    }

    #[test]
    fn ensure_vehicle_directory_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();

        let dir = connection.ensure_vehicle_directory("uid-1", "XYZ789").unwrap();
        assert!(dir.exists());
        let again = connection.ensure_vehicle_directory("uid-1", "XYZ789").unwrap();
        assert_eq!(dir, again);
    }
}
