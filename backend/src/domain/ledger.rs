//! Ledger aggregation for daily records.
//!
//! Pure computation over daily record data; no I/O of its own. All arithmetic
//! is defensive: absent or malformed numeric fields degrade to 0 rather than
//! raising an error, so these functions never fail, they only ever return
//! computed numbers.
//!
//! The one deliberate invariant of the whole system lives here: repeated
//! submissions for the same (vehicle, date) **accumulate** into the existing
//! record (gross and fuel add up, expense entries append) instead of
//! overwriting it, and the derived fields are always recomputed from the
//! merged state, never trusted from the caller.

use shared::{DailyRecord, Expense, ExpenseInput, SubmitDailyEntryRequest};

/// Monthly aggregation result.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonthTotals {
    pub total_gross: f64,
    pub total_expenses: f64,
    pub total_net: f64,
}

/// Coerce an optional amount to a usable number. `None`, NaN and infinities
/// all collapse to 0.
pub fn coerce_amount(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Sum of itemized expense amounts, with the same permissive coercion.
pub fn expense_total(expenses: &[Expense]) -> f64 {
    expenses
        .iter()
        .map(|e| coerce_amount(Some(e.amount)))
        .sum()
}

/// `net = gross − Σ expense amounts`.
pub fn compute_net(gross: f64, expenses: &[Expense]) -> f64 {
    coerce_amount(Some(gross)) - expense_total(expenses)
}

/// Total expenses of a single record: fuel plus the itemized list.
///
/// This is the canonical formula; some historical entry screens subtracted
/// only the itemized list, which drifted from records that also carried a
/// fuel field.
pub fn record_expense_total(record: &DailyRecord) -> f64 {
    coerce_amount(Some(record.fuel_expense)) + expense_total(&record.extra_expenses)
}

/// Validate one incoming expense entry. An entry is accepted only when it has
/// a non-empty (trimmed) name and a positive finite amount; anything else is
/// dropped without failing the submission.
pub fn validate_expense(input: &ExpenseInput, recorded_at: &str) -> Option<Expense> {
    let name = input.name.as_deref().map(str::trim).unwrap_or("");
    if name.is_empty() {
        return None;
    }
    let amount = coerce_amount(input.amount);
    if amount <= 0.0 {
        return None;
    }
    Some(Expense {
        name: name.to_string(),
        amount,
        recorded_at: Some(recorded_at.to_string()),
    })
}

/// Recompute the derived fields of a record from its scalar and list state.
/// Used after any mutation of the expense list.
pub fn finalize_record(mut record: DailyRecord) -> DailyRecord {
    record.gross_income = coerce_amount(Some(record.gross_income));
    record.fuel_expense = coerce_amount(Some(record.fuel_expense));
    record.total_extra_expenses = expense_total(&record.extra_expenses);
    record.net_income =
        record.gross_income - record.fuel_expense - record.total_extra_expenses;
    record
}

/// Merge a submission into the record for `date`.
///
/// Gross and fuel are the sums of existing plus incoming values; the expense
/// list is the existing list with the newly valid incoming entries appended.
/// Derived totals come out of [`finalize_record`], so a stale
/// `total_extra_expenses` or `net_income` handed in by the caller is ignored.
pub fn merge_daily_submission(
    date: &str,
    existing: Option<&DailyRecord>,
    submission: &SubmitDailyEntryRequest,
    now: &str,
) -> DailyRecord {
    let (base_gross, base_fuel, base_expenses) = match existing {
        Some(record) => (
            coerce_amount(Some(record.gross_income)),
            coerce_amount(Some(record.fuel_expense)),
            record.extra_expenses.clone(),
        ),
        None => (0.0, 0.0, Vec::new()),
    };

    let mut expenses = base_expenses;
    expenses.extend(
        submission
            .expenses
            .iter()
            .filter_map(|input| validate_expense(input, now)),
    );

    finalize_record(DailyRecord {
        date: date.to_string(),
        gross_income: base_gross + coerce_amount(submission.gross_income),
        fuel_expense: base_fuel + coerce_amount(submission.fuel_expense),
        extra_expenses: expenses,
        total_extra_expenses: 0.0,
        net_income: 0.0,
        recorded_at: now.to_string(),
    })
}

/// Fold a month's records into totals. Each record contributes its gross, its
/// own expense total (fuel + itemized) and the net of those two; a record with
/// missing fields contributes 0 for them.
pub fn aggregate_month(records: &[DailyRecord]) -> MonthTotals {
    let mut totals = MonthTotals::default();
    for record in records {
        let gross = coerce_amount(Some(record.gross_income));
        let expenses = record_expense_total(record);
        totals.total_gross += gross;
        totals.total_expenses += expenses;
        totals.total_net += gross - expenses;
    }
    totals
}

/// Monthly net plus the configured opening balance (`cajaInicial`). A missing
/// configuration counts as 0.
pub fn total_with_opening_balance(monthly_net: f64, opening_balance: Option<f64>) -> f64 {
    monthly_net + coerce_amount(opening_balance)
}

/// The inclusive document-key range covering a `YYYY-MM` month. The upper
/// bound uses day 31 for every month; ISO date keys sort lexicographically so
/// the range never over-matches into the next month.
pub fn month_key_range(month: &str) -> Option<(String, String)> {
    let mut parts = month.splitn(2, '-');
    let year = parts.next()?;
    let month_part = parts.next()?;
    if year.len() != 4 || month_part.len() != 2 {
        return None;
    }
    if !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let month_num: u32 = month_part.parse().ok()?;
    if !(1..=12).contains(&month_num) {
        return None;
    }
    Some((format!("{month}-01"), format!("{month}-31")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(name: &str, amount: f64) -> Expense {
        Expense {
            name: name.to_string(),
            amount,
            recorded_at: None,
        }
    }

    fn input(name: &str, amount: f64) -> ExpenseInput {
        ExpenseInput {
            name: Some(name.to_string()),
            amount: Some(amount),
        }
    }

    fn record(date: &str, gross: f64, fuel: f64, expenses: Vec<Expense>) -> DailyRecord {
        finalize_record(DailyRecord {
            date: date.to_string(),
            gross_income: gross,
            fuel_expense: fuel,
            extra_expenses: expenses,
            total_extra_expenses: 0.0,
            net_income: 0.0,
            recorded_at: "2024-06-01T08:00:00+00:00".to_string(),
        })
    }

    #[test]
    fn compute_net_subtracts_expense_sum() {
        let expenses = vec![expense("Lavado", 10_000.0), expense("Peaje", 5_000.0)];
        assert_eq!(compute_net(100_000.0, &expenses), 85_000.0);
    }

    #[test]
    fn compute_net_of_empty_list_is_gross() {
        assert_eq!(compute_net(42_000.0, &[]), 42_000.0);
    }

    #[test]
    fn malformed_amounts_degrade_to_zero() {
        assert_eq!(coerce_amount(None), 0.0);
        assert_eq!(coerce_amount(Some(f64::NAN)), 0.0);
        assert_eq!(coerce_amount(Some(f64::INFINITY)), 0.0);
        let expenses = vec![expense("Raro", f64::NAN)];
        assert_eq!(compute_net(10_000.0, &expenses), 10_000.0);
    }

    #[test]
    fn first_submission_creates_record_with_derived_fields() {
        let submission = SubmitDailyEntryRequest {
            gross_income: Some(100_000.0),
            fuel_expense: Some(20_000.0),
            expenses: vec![input("Lavado", 10_000.0)],
        };

        let merged = merge_daily_submission(
            "2024-06-01",
            None,
            &submission,
            "2024-06-01T18:00:00+00:00",
        );

        assert_eq!(merged.gross_income, 100_000.0);
        assert_eq!(merged.fuel_expense, 20_000.0);
        assert_eq!(merged.total_extra_expenses, 10_000.0);
        assert_eq!(merged.net_income, 70_000.0);
        assert_eq!(merged.extra_expenses.len(), 1);
    }

    #[test]
    fn second_submission_accumulates_into_existing_record() {
        let first = SubmitDailyEntryRequest {
            gross_income: Some(100_000.0),
            fuel_expense: Some(20_000.0),
            expenses: vec![input("Lavado", 10_000.0)],
        };
        let existing =
            merge_daily_submission("2024-06-01", None, &first, "2024-06-01T12:00:00+00:00");

        let second = SubmitDailyEntryRequest {
            gross_income: Some(50_000.0),
            fuel_expense: None,
            expenses: vec![],
        };
        let merged = merge_daily_submission(
            "2024-06-01",
            Some(&existing),
            &second,
            "2024-06-01T20:00:00+00:00",
        );

        assert_eq!(merged.gross_income, 150_000.0);
        assert_eq!(merged.fuel_expense, 20_000.0);
        assert_eq!(merged.total_extra_expenses, 10_000.0);
        assert_eq!(merged.net_income, 120_000.0);
    }

    #[test]
    fn merge_is_cumulative_over_submission_order() {
        let a = SubmitDailyEntryRequest {
            gross_income: Some(80_000.0),
            fuel_expense: Some(15_000.0),
            expenses: vec![input("Llanta", 30_000.0)],
        };
        let b = SubmitDailyEntryRequest {
            gross_income: Some(20_000.0),
            fuel_expense: Some(5_000.0),
            expenses: vec![input("Aceite", 12_000.0)],
        };
        let combined = SubmitDailyEntryRequest {
            gross_income: Some(100_000.0),
            fuel_expense: Some(20_000.0),
            expenses: vec![input("Llanta", 30_000.0), input("Aceite", 12_000.0)],
        };

        let now = "2024-06-02T10:00:00+00:00";
        let step = merge_daily_submission("2024-06-02", None, &a, now);
        let stepped = merge_daily_submission("2024-06-02", Some(&step), &b, now);
        let at_once = merge_daily_submission("2024-06-02", None, &combined, now);

        assert_eq!(stepped.gross_income, at_once.gross_income);
        assert_eq!(stepped.fuel_expense, at_once.fuel_expense);
        assert_eq!(stepped.total_extra_expenses, at_once.total_extra_expenses);
        assert_eq!(stepped.net_income, at_once.net_income);
        assert_eq!(stepped.extra_expenses.len(), at_once.extra_expenses.len());
    }

    #[test]
    fn invalid_incoming_expenses_are_silently_dropped() {
        let submission = SubmitDailyEntryRequest {
            gross_income: Some(10_000.0),
            fuel_expense: None,
            expenses: vec![
                ExpenseInput {
                    name: Some("".to_string()),
                    amount: Some(5_000.0),
                },
                ExpenseInput {
                    name: Some("Sin monto".to_string()),
                    amount: None,
                },
                ExpenseInput {
                    name: Some("Negativo".to_string()),
                    amount: Some(-100.0),
                },
                ExpenseInput {
                    name: Some("   ".to_string()),
                    amount: Some(1_000.0),
                },
                input("Válido", 2_000.0),
            ],
        };

        let merged =
            merge_daily_submission("2024-06-03", None, &submission, "2024-06-03T09:00:00+00:00");

        assert_eq!(merged.extra_expenses.len(), 1);
        assert_eq!(merged.extra_expenses[0].name, "Válido");
        assert_eq!(merged.total_extra_expenses, 2_000.0);
        assert_eq!(merged.net_income, 8_000.0);
    }

    #[test]
    fn merge_ignores_stale_derived_fields() {
        let mut existing = record("2024-06-04", 50_000.0, 0.0, vec![expense("Peaje", 5_000.0)]);
        // Simulate a caller handing in drifted derived values.
        existing.total_extra_expenses = 999.0;
        existing.net_income = -1.0;

        let merged = merge_daily_submission(
            "2024-06-04",
            Some(&existing),
            &SubmitDailyEntryRequest::default(),
            "2024-06-04T21:00:00+00:00",
        );

        assert_eq!(merged.total_extra_expenses, 5_000.0);
        assert_eq!(merged.net_income, 45_000.0);
    }

    #[test]
    fn aggregate_month_of_no_records_is_zero() {
        let totals = aggregate_month(&[]);
        assert_eq!(totals, MonthTotals::default());
    }

    #[test]
    fn aggregate_month_single_record() {
        let records = vec![record(
            "2024-06-05",
            100_000.0,
            0.0,
            vec![expense("Lavado", 20_000.0)],
        )];
        let totals = aggregate_month(&records);
        assert_eq!(totals.total_gross, 100_000.0);
        assert_eq!(totals.total_expenses, 20_000.0);
        assert_eq!(totals.total_net, 80_000.0);
    }

    #[test]
    fn aggregate_month_includes_fuel_in_expense_totals() {
        let records = vec![
            record("2024-06-05", 100_000.0, 20_000.0, vec![expense("Lavado", 10_000.0)]),
            record("2024-06-06", 50_000.0, 0.0, vec![]),
        ];
        let totals = aggregate_month(&records);
        assert_eq!(totals.total_gross, 150_000.0);
        assert_eq!(totals.total_expenses, 30_000.0);
        assert_eq!(totals.total_net, 120_000.0);
    }

    #[test]
    fn opening_balance_defaults_to_zero() {
        assert_eq!(total_with_opening_balance(120_000.0, Some(30_000.0)), 150_000.0);
        assert_eq!(total_with_opening_balance(120_000.0, None), 120_000.0);
    }

    #[test]
    fn month_key_range_covers_whole_month() {
        assert_eq!(
            month_key_range("2025-08"),
            Some(("2025-08-01".to_string(), "2025-08-31".to_string()))
        );
        assert_eq!(month_key_range("2025-13"), None);
        assert_eq!(month_key_range("2025-8"), None);
        assert_eq!(month_key_range("garbage"), None);
    }

    #[test]
    fn finalize_recomputes_after_expense_mutation() {
        let mut rec = record(
            "2024-06-07",
            90_000.0,
            10_000.0,
            vec![expense("Llanta", 30_000.0), expense("Peaje", 5_000.0)],
        );
        rec.extra_expenses.remove(0);
        let rec = finalize_record(rec);
        assert_eq!(rec.total_extra_expenses, 5_000.0);
        assert_eq!(rec.net_income, 75_000.0);
    }
}
