use log::info;

use shared::{ChartSeries, DailyReport, MonthlyReport};

use crate::domain::config_service::ConfigService;
use crate::domain::error::{ServiceError, ServiceResult};
use crate::domain::ledger;
use crate::domain::record_service::RecordService;

/// View-model layer for the dashboard charts. Reads come from the record and
/// config services; all arithmetic is delegated to the ledger module.
#[derive(Clone)]
pub struct ReportService {
    record_service: RecordService,
    config_service: ConfigService,
}

impl ReportService {
    pub fn new(record_service: RecordService, config_service: ConfigService) -> Self {
        Self {
            record_service,
            config_service,
        }
    }

    /// Chart data for a single day: one bar group with the day's gross, total
    /// expenses (fuel + itemized) and net.
    pub fn daily_report(
        &self,
        owner_uid: &str,
        plate: &str,
        date: &str,
    ) -> ServiceResult<DailyReport> {
        let record = self.record_service.get_record(owner_uid, plate, date)?;
        let expenses = ledger::record_expense_total(&record);

        Ok(DailyReport {
            date: record.date.clone(),
            chart: ChartSeries {
                labels: vec![record.date.clone()],
                gross: vec![record.gross_income],
                expenses: vec![expenses],
                net: vec![record.gross_income - expenses],
            },
            net_income: record.net_income,
        })
    }

    /// Chart data and totals for a `YYYY-MM` month: one bar group per recorded
    /// day, monthly totals, and the grand total offset by the opening balance.
    /// A month with no records yields an empty series and zero totals.
    pub fn monthly_report(
        &self,
        owner_uid: &str,
        plate: &str,
        month: &str,
    ) -> ServiceResult<MonthlyReport> {
        let (start, end) = ledger::month_key_range(month)
            .ok_or_else(|| ServiceError::Validation(format!("invalid month: {month}")))?;

        let records = self
            .record_service
            .records_in_range(owner_uid, plate, &start, &end)?;
        let totals = ledger::aggregate_month(&records);
        let opening_balance = self.config_service.opening_balance(owner_uid, plate)?;

        let mut chart = ChartSeries {
            labels: Vec::with_capacity(records.len()),
            gross: Vec::with_capacity(records.len()),
            expenses: Vec::with_capacity(records.len()),
            net: Vec::with_capacity(records.len()),
        };
        for record in &records {
            let expenses = ledger::record_expense_total(record);
            chart.labels.push(record.date.clone());
            chart.gross.push(record.gross_income);
            chart.expenses.push(expenses);
            chart.net.push(record.gross_income - expenses);
        }

        info!(
            "Monthly report {} for {}: {} records, net {}",
            month,
            plate,
            records.len(),
            totals.total_net
        );

        Ok(MonthlyReport {
            month: month.to_string(),
            chart,
            total_gross: totals.total_gross,
            total_expenses: totals.total_expenses,
            total_net: totals.total_net,
            opening_balance: opening_balance.unwrap_or(0.0),
            grand_total: ledger::total_with_opening_balance(totals.total_net, opening_balance),
        })
    }
}
