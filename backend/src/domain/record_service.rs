use chrono::{NaiveDate, Utc};
use log::{info, warn};

use shared::{DailyRecord, DailyRecordResponse, SubmitDailyEntryRequest, UpdateExpenseRequest};

use crate::domain::entry_flow::EntryFlow;
use crate::domain::error::{ServiceError, ServiceResult};
use crate::domain::ledger;
use crate::domain::vehicle_service::normalize_plate;
use crate::storage::csv::{DailyRecordRepository, VehicleRepository};
use crate::storage::traits::{DailyRecordStorage, VehicleStorage};

/// Service for the daily entry and edit flow.
///
/// Submission is read-merge-write: the existing record for the date is loaded,
/// the incoming values are accumulated into it, and the full recomputed record
/// is written back. Concurrent writers race on the whole document; last writer
/// wins.
#[derive(Clone)]
pub struct RecordService {
    record_repository: DailyRecordRepository,
    vehicle_repository: VehicleRepository,
}

impl RecordService {
    pub fn new(
        record_repository: DailyRecordRepository,
        vehicle_repository: VehicleRepository,
    ) -> Self {
        Self {
            record_repository,
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

    fn validate_date(date: &str) -> ServiceResult<()> {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| ServiceError::Validation(format!("invalid date: {date}")))?;
        Ok(())
    }

    /// Enter the date-selected step for a vehicle: validates the selection and
    /// loads the stored record for the date, so whatever is submitted next
    /// merges into it.
    pub fn begin_entry(
        &self,
        owner_uid: &str,
        plate: &str,
        date: &str,
    ) -> ServiceResult<EntryFlow> {
        let plate = self.require_vehicle(owner_uid, plate)?;
        Self::validate_date(date)?;

        let existing = self.record_repository.get_record(owner_uid, &plate, date)?;
        Ok(EntryFlow::new()
            .select_vehicle(&plate)
            .select_date(date, existing))
    }

    /// Merge a submission into the record for (vehicle, date) and persist the
    /// recomputed result.
    pub fn submit_daily_entry(
        &self,
        owner_uid: &str,
        plate: &str,
        date: &str,
        request: SubmitDailyEntryRequest,
    ) -> ServiceResult<DailyRecordResponse> {
        let plate = self.require_vehicle(owner_uid, plate)?;
        Self::validate_submission(&request)?;

        info!("Submitting daily entry for {}/{} on {}", owner_uid, plate, date);

        let flow = self.begin_entry(owner_uid, &plate, date)?;
        let now = Utc::now().to_rfc3339();
        let record = ledger::merge_daily_submission(date, flow.loaded_record(), &request, &now);

        self.record_repository.put_record(owner_uid, &plate, &record)?;
        info!(
            "Stored daily entry for {} on {}: net {}",
            plate, date, record.net_income
        );

        Ok(DailyRecordResponse {
            record,
            success_message: "Registro guardado exitosamente.".to_string(),
        })
    }

    /// Get the record for (vehicle, date).
    pub fn get_record(
        &self,
        owner_uid: &str,
        plate: &str,
        date: &str,
    ) -> ServiceResult<DailyRecord> {
        let plate = self.require_vehicle(owner_uid, plate)?;
        Self::validate_date(date)?;

        self.record_repository
            .get_record(owner_uid, &plate, date)?
            .ok_or_else(|| ServiceError::RecordNotFound {
                plate,
                date: date.to_string(),
            })
    }

    /// Records whose date falls in the inclusive key range, ascending by date.
    pub fn records_in_range(
        &self,
        owner_uid: &str,
        plate: &str,
        start_date: &str,
        end_date: &str,
    ) -> ServiceResult<Vec<DailyRecord>> {
        let plate = self.require_vehicle(owner_uid, plate)?;
        Ok(self
            .record_repository
            .records_in_range(owner_uid, &plate, start_date, end_date)?)
    }

    /// Replace one itemized expense of an existing record, recomputing the
    /// derived totals.
    pub fn update_expense(
        &self,
        owner_uid: &str,
        plate: &str,
        date: &str,
        index: usize,
        request: UpdateExpenseRequest,
    ) -> ServiceResult<DailyRecordResponse> {
        let name = request.name.trim();
        if name.is_empty() || !request.amount.is_finite() || request.amount <= 0.0 {
            return Err(ServiceError::Validation(
                "expense needs a name and a positive amount".to_string(),
            ));
        }

        let (plate, mut record) = self.load_for_edit(owner_uid, plate, date)?;
        let expense = record.extra_expenses.get_mut(index).ok_or_else(|| {
            ServiceError::Validation(format!("no expense at index {index}"))
        })?;
        expense.name = name.to_string();
        expense.amount = request.amount;

        let record = ledger::finalize_record(record);
        self.record_repository.put_record(owner_uid, &plate, &record)?;
        info!("Updated expense {} of {}/{}", index, plate, date);

        Ok(DailyRecordResponse {
            record,
            success_message: "Gasto actualizado exitosamente.".to_string(),
        })
    }

    /// Remove one itemized expense of an existing record. The list may become
    /// empty; the record itself stays.
    pub fn remove_expense(
        &self,
        owner_uid: &str,
        plate: &str,
        date: &str,
        index: usize,
    ) -> ServiceResult<DailyRecordResponse> {
        let (plate, mut record) = self.load_for_edit(owner_uid, plate, date)?;

        if index >= record.extra_expenses.len() {
            return Err(ServiceError::Validation(format!(
                "no expense at index {index}"
            )));
        }
        record.extra_expenses.remove(index);

        let record = ledger::finalize_record(record);
        self.record_repository.put_record(owner_uid, &plate, &record)?;
        info!("Removed expense {} of {}/{}", index, plate, date);

        Ok(DailyRecordResponse {
            record,
            success_message: "Gasto eliminado exitosamente.".to_string(),
        })
    }

    fn load_for_edit(
        &self,
        owner_uid: &str,
        plate: &str,
        date: &str,
    ) -> ServiceResult<(String, DailyRecord)> {
        let plate = self.require_vehicle(owner_uid, plate)?;
        Self::validate_date(date)?;

        let record = self
            .record_repository
            .get_record(owner_uid, &plate, date)?
            .ok_or_else(|| ServiceError::RecordNotFound {
                plate: plate.clone(),
                date: date.to_string(),
            })?;
        Ok((plate, record))
    }

    /// A submission must carry at least one usable value; an entirely empty
    /// form is rejected before any read or write.
    fn validate_submission(request: &SubmitDailyEntryRequest) -> ServiceResult<()> {
        for value in [request.gross_income, request.fuel_expense].into_iter().flatten() {
            if value.is_finite() && value < 0.0 {
                return Err(ServiceError::Validation(
                    "amounts must not be negative".to_string(),
                ));
            }
        }

        let has_scalar = ledger::coerce_amount(request.gross_income) > 0.0
            || ledger::coerce_amount(request.fuel_expense) > 0.0;
        let has_expense = request
            .expenses
            .iter()
            .any(|input| ledger::validate_expense(input, "").is_some());

        if !has_scalar && !has_expense {
            warn!("Rejecting empty daily submission");
            return Err(ServiceError::Validation(
                "submission has no income or expense values".to_string(),
            ));
        }
        Ok(())
    }
}
