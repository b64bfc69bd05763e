use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use shared::Debt;

use super::connection::CsvConnection;
use crate::storage::traits::DebtStorage;

/// One row of `deudores.csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DebtRow {
    id: String,
    name: String,
    amount: f64,
    start_date: String,
    due_date: Option<String>,
    paid: bool,
    registered_at: String,
}

impl From<&Debt> for DebtRow {
    fn from(debt: &Debt) -> Self {
        Self {
            id: debt.id.clone(),
            name: debt.name.clone(),
            amount: debt.amount,
            start_date: debt.start_date.clone(),
            due_date: debt.due_date.clone(),
            paid: debt.paid,
            registered_at: debt.registered_at.clone(),
        }
    }
}

impl From<DebtRow> for Debt {
    fn from(row: DebtRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            amount: row.amount,
            start_date: row.start_date,
            due_date: row.due_date,
            paid: row.paid,
            registered_at: row.registered_at,
        }
    }
}

/// Debt repository over one CSV file per vehicle.
#[derive(Clone)]
pub struct DebtRepository {
    connection: CsvConnection,
}

impl DebtRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_rows(&self, path: &Path) -> Result<Vec<DebtRow>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let mut rows = Vec::new();
        for result in reader.deserialize() {
            let row: DebtRow =
                result.with_context(|| format!("Malformed row in {}", path.display()))?;
            rows.push(row);
        }
        Ok(rows)
    }

    fn write_rows(&self, path: &Path, rows: &[DebtRow]) -> Result<()> {
        let temp_path = path.with_extension("tmp");
        {
            let mut writer = csv::Writer::from_path(&temp_path)
                .with_context(|| format!("Failed to write {}", temp_path.display()))?;
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

impl DebtStorage for DebtRepository {
    fn store_debt(&self, owner_uid: &str, plate: &str, debt: &Debt) -> Result<()> {
        self.connection.ensure_vehicle_directory(owner_uid, plate)?;

        let path = self.connection.debts_file_path(owner_uid, plate);
        let mut rows = self.read_rows(&path)?;
        rows.push(DebtRow::from(debt));
        self.write_rows(&path, &rows)?;

        info!("Stored debt {} for {}/{}", debt.id, owner_uid, plate);
        Ok(())
    }

    fn list_debts(&self, owner_uid: &str, plate: &str) -> Result<Vec<Debt>> {
        let path = self.connection.debts_file_path(owner_uid, plate);
        let mut rows = self.read_rows(&path)?;
        rows.sort_by(|a, b| a.registered_at.cmp(&b.registered_at));
        Ok(rows.into_iter().map(Debt::from).collect())
    }

    fn update_debt(&self, owner_uid: &str, plate: &str, debt: &Debt) -> Result<bool> {
        let path = self.connection.debts_file_path(owner_uid, plate);
        let mut rows = self.read_rows(&path)?;

        let found = match rows.iter_mut().find(|row| row.id == debt.id) {
            Some(row) => {
                *row = DebtRow::from(debt);
                true
            }
            None => false,
        };

        if found {
            self.write_rows(&path, &rows)?;
            info!("Updated debt {} for {}/{}", debt.id, owner_uid, plate);
        }
        Ok(found)
    }
}
