use anyhow::{Context, Result};
use log::info;
use std::fs;

use shared::VehicleConfig;

use super::connection::CsvConnection;
use crate::storage::traits::ConfigStorage;

/// Per-vehicle configuration stored as a single YAML document.
#[derive(Clone)]
pub struct ConfigRepository {
    connection: CsvConnection,
}

impl ConfigRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }
}

impl ConfigStorage for ConfigRepository {
    fn set_config(&self, owner_uid: &str, plate: &str, config: &VehicleConfig) -> Result<()> {
        self.connection.ensure_vehicle_directory(owner_uid, plate)?;

        let path = self.connection.config_file_path(owner_uid, plate);
        let yaml_content = serde_yaml::to_string(config)?;
        self.connection.write_atomic(&path, &yaml_content)?;

        info!(
            "Stored config for {}/{} (opening balance {})",
            owner_uid, plate, config.opening_balance
        );
        Ok(())
    }

    fn get_config(&self, owner_uid: &str, plate: &str) -> Result<Option<VehicleConfig>> {
        let path = self.connection.config_file_path(owner_uid, plate);

        if !path.exists() {
            return Ok(None);
        }

        let yaml_content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: VehicleConfig = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Malformed config file {}", path.display()))?;

        Ok(Some(config))
    }
}
