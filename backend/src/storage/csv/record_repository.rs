use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use shared::{DailyRecord, Expense};

use super::connection::CsvConnection;
use crate::storage::traits::DailyRecordStorage;

/// One row of `registros.csv`: the per-date scalar fields of a daily record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordRow {
    date: String,
    gross_income: f64,
    fuel_expense: f64,
    total_extra_expenses: f64,
    net_income: f64,
    recorded_at: String,
}

/// One row of `gastos.csv`: an itemized expense keyed by its record date.
/// Rows keep file order, which is the append order of the submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExpenseRow {
    date: String,
    name: String,
    amount: f64,
    recorded_at: Option<String>,
}

/// Daily ledger repository over a pair of CSV files per vehicle. Writes
/// rewrite the whole file, which keeps the row set and the derived fields
/// consistent without partial-update bookkeeping.
#[derive(Clone)]
pub struct DailyRecordRepository {
    connection: CsvConnection,
}

impl DailyRecordRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_record_rows(&self, path: &Path) -> Result<Vec<RecordRow>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let mut rows = Vec::new();
        for result in reader.deserialize() {
            let row: RecordRow =
                result.with_context(|| format!("Malformed row in {}", path.display()))?;
            rows.push(row);
        }
        Ok(rows)
    }

    fn read_expense_rows(&self, path: &Path) -> Result<Vec<ExpenseRow>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let mut rows = Vec::new();
        for result in reader.deserialize() {
            let row: ExpenseRow =
                result.with_context(|| format!("Malformed row in {}", path.display()))?;
            rows.push(row);
        }
        Ok(rows)
    }

    fn write_rows<T: Serialize>(&self, path: &Path, rows: &[T]) -> Result<()> {
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

    fn expenses_for_date(rows: &[ExpenseRow], date: &str) -> Vec<Expense> {
        rows.iter()
            .filter(|row| row.date == date)
            .map(|row| Expense {
                name: row.name.clone(),
                amount: row.amount,
                recorded_at: row.recorded_at.clone(),
            })
            .collect()
    }

    fn assemble(row: &RecordRow, expenses: Vec<Expense>) -> DailyRecord {
        DailyRecord {
            date: row.date.clone(),
            gross_income: row.gross_income,
            fuel_expense: row.fuel_expense,
            extra_expenses: expenses,
            total_extra_expenses: row.total_extra_expenses,
            net_income: row.net_income,
            recorded_at: row.recorded_at.clone(),
        }
    }
}

impl DailyRecordStorage for DailyRecordRepository {
    fn get_record(
        &self,
        owner_uid: &str,
        plate: &str,
        date: &str,
    ) -> Result<Option<DailyRecord>> {
        let records_path = self.connection.records_file_path(owner_uid, plate);
        let rows = self.read_record_rows(&records_path)?;

        let row = match rows.iter().find(|r| r.date == date) {
            Some(row) => row,
            None => return Ok(None),
        };

        let expenses_path = self.connection.expenses_file_path(owner_uid, plate);
        let expense_rows = self.read_expense_rows(&expenses_path)?;

        Ok(Some(Self::assemble(
            row,
            Self::expenses_for_date(&expense_rows, date),
        )))
    }

    fn put_record(&self, owner_uid: &str, plate: &str, record: &DailyRecord) -> Result<()> {
        self.connection.ensure_vehicle_directory(owner_uid, plate)?;

        // Replace this date's expense rows, keep every other date untouched.
        // The expense file commits first: the scalar rows carry totals derived
        // from the expenses, so they must never land without them.
        let expenses_path = self.connection.expenses_file_path(owner_uid, plate);
        let mut expense_rows: Vec<ExpenseRow> = self
            .read_expense_rows(&expenses_path)?
            .into_iter()
            .filter(|row| row.date != record.date)
            .collect();
        for expense in &record.extra_expenses {
            expense_rows.push(ExpenseRow {
                date: record.date.clone(),
                name: expense.name.clone(),
                amount: expense.amount,
                recorded_at: expense.recorded_at.clone(),
            });
        }
        expense_rows.sort_by(|a, b| a.date.cmp(&b.date));
        self.write_rows(&expenses_path, &expense_rows)?;

        let records_path = self.connection.records_file_path(owner_uid, plate);
        let mut rows = self.read_record_rows(&records_path)?;

        let new_row = RecordRow {
            date: record.date.clone(),
            gross_income: record.gross_income,
            fuel_expense: record.fuel_expense,
            total_extra_expenses: record.total_extra_expenses,
            net_income: record.net_income,
            recorded_at: record.recorded_at.clone(),
        };

        match rows.iter_mut().find(|r| r.date == record.date) {
            Some(existing) => *existing = new_row,
            None => rows.push(new_row),
        }
        rows.sort_by(|a, b| a.date.cmp(&b.date));
        self.write_rows(&records_path, &rows)?;

        info!(
            "Stored record {} for {}/{} ({} expenses)",
            record.date,
            owner_uid,
            plate,
            record.extra_expenses.len()
        );
        Ok(())
    }

    fn records_in_range(
        &self,
        owner_uid: &str,
        plate: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<DailyRecord>> {
        let records_path = self.connection.records_file_path(owner_uid, plate);
        let mut rows: Vec<RecordRow> = self
            .read_record_rows(&records_path)?
            .into_iter()
            .filter(|r| r.date.as_str() >= start_date && r.date.as_str() <= end_date)
            .collect();
        rows.sort_by(|a, b| a.date.cmp(&b.date));

        if rows.is_empty() {
            debug!(
                "No records for {}/{} in {}..={}",
                owner_uid, plate, start_date, end_date
            );
            return Ok(Vec::new());
        }

        let expenses_path = self.connection.expenses_file_path(owner_uid, plate);
        let expense_rows = self.read_expense_rows(&expenses_path)?;

        Ok(rows
            .iter()
            .map(|row| Self::assemble(row, Self::expenses_for_date(&expense_rows, &row.date)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_repo() -> (DailyRecordRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        (DailyRecordRepository::new(connection), temp_dir)
    }

    fn sample_record(date: &str, gross: f64, expenses: Vec<Expense>) -> DailyRecord {
        let total: f64 = expenses.iter().map(|e| e.amount).sum();
        DailyRecord {
            date: date.to_string(),
            gross_income: gross,
            fuel_expense: 20_000.0,
            total_extra_expenses: total,
            net_income: gross - 20_000.0 - total,
            extra_expenses: expenses,
            recorded_at: "2026-08-15T18:00:00Z".to_string(),
        }
    }

    fn sample_expense(name: &str, amount: f64) -> Expense {
        Expense {
            name: name.to_string(),
            amount,
            recorded_at: Some("08:30".to_string()),
        }
    }

    #[test]
    fn put_then_get_round_trips_record_with_expenses() {
        let (repo, _temp_dir) = setup_test_repo();
        let record = sample_record(
            "2026-08-15",
            100_000.0,
            vec![sample_expense("Peaje", 10_000.0)],
        );

        repo.put_record("uid-1", "ABC123", &record).unwrap();

        let loaded = repo.get_record("uid-1", "ABC123", "2026-08-15").unwrap();
        assert_eq!(loaded, Some(record));
        assert!(repo.get_record("uid-1", "ABC123", "2026-08-16").unwrap().is_none());
    }

    #[test]
    fn put_record_overwrites_existing_date() {
        let (repo, _temp_dir) = setup_test_repo();
        repo.put_record(
            "uid-1",
            "ABC123",
            &sample_record("2026-08-15", 100_000.0, vec![sample_expense("Peaje", 10_000.0)]),
        )
        .unwrap();

        let updated = sample_record(
            "2026-08-15",
            150_000.0,
            vec![
                sample_expense("Peaje", 10_000.0),
                sample_expense("Lavado", 15_000.0),
            ],
        );
        repo.put_record("uid-1", "ABC123", &updated).unwrap();

        let loaded = repo
            .get_record("uid-1", "ABC123", "2026-08-15")
            .unwrap()
            .unwrap();
        assert_eq!(loaded.gross_income, 150_000.0);
        assert_eq!(loaded.extra_expenses.len(), 2);
    }

    #[test]
    fn expenses_of_other_dates_survive_a_rewrite() {
        let (repo, _temp_dir) = setup_test_repo();
        repo.put_record(
            "uid-1",
            "ABC123",
            &sample_record("2026-08-14", 90_000.0, vec![sample_expense("Llanta", 40_000.0)]),
        )
        .unwrap();
        repo.put_record(
            "uid-1",
            "ABC123",
            &sample_record("2026-08-15", 100_000.0, vec![sample_expense("Peaje", 10_000.0)]),
        )
        .unwrap();

        let day_before = repo
            .get_record("uid-1", "ABC123", "2026-08-14")
            .unwrap()
            .unwrap();
        assert_eq!(day_before.extra_expenses[0].name, "Llanta");
    }

    #[test]
    fn range_query_is_inclusive_and_ascending() {
        let (repo, _temp_dir) = setup_test_repo();
        for date in ["2026-08-31", "2026-08-01", "2026-09-01", "2026-07-31"] {
            repo.put_record("uid-1", "ABC123", &sample_record(date, 50_000.0, vec![]))
                .unwrap();
        }

        let records = repo
            .records_in_range("uid-1", "ABC123", "2026-08-01", "2026-08-31")
            .unwrap();
        let dates: Vec<_> = records.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-08-01", "2026-08-31"]);
    }

    #[test]
    fn failed_scalar_write_leaves_no_record_row_behind() {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        let repo = DailyRecordRepository::new(connection.clone());

        connection.ensure_vehicle_directory("uid-1", "ABC123").unwrap();
        // A directory squatting on the scalar temp path makes that write fail
        // after the expense file has already been renamed into place.
        let blocked = connection
            .records_file_path("uid-1", "ABC123")
            .with_extension("tmp");
        fs::create_dir(&blocked).unwrap();

        let record = sample_record(
            "2026-08-15",
            100_000.0,
            vec![sample_expense("Peaje", 10_000.0)],
        );
        assert!(repo.put_record("uid-1", "ABC123", &record).is_err());

        // Expenses are on disk, but no scalar row claims totals for them.
        let expenses = fs::read_to_string(connection.expenses_file_path("uid-1", "ABC123")).unwrap();
        assert!(expenses.contains("Peaje"));
        assert!(!connection.records_file_path("uid-1", "ABC123").exists());
        assert!(repo.get_record("uid-1", "ABC123", "2026-08-15").unwrap().is_none());
    }

    #[test]
    fn missing_files_read_as_empty() {
        let (repo, _temp_dir) = setup_test_repo();
        assert!(repo.get_record("uid-1", "ABC123", "2026-08-15").unwrap().is_none());
        assert!(repo
            .records_in_range("uid-1", "ABC123", "2026-08-01", "2026-08-31")
            .unwrap()
            .is_empty());
    }
}
