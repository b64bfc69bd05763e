//! Shared DTO types for the flota-cuentas API.
//!
//! These are the wire shapes exchanged between the REST layer and any client.
//! Field names are the canonical English ones; the legacy Spanish names used by
//! the hosted document store (`nombre`, `monto`, `cantidad`, `hora`) are
//! accepted as serde aliases on input so old payloads keep deserializing.

use serde::{Deserialize, Serialize};

/// Vehicle category as registered by the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleCategory {
    Particular,
    Buseta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Plate in normalized uppercase form (3 letters + 3 digits), e.g. "ABC123".
    pub plate: String,
    pub category: VehicleCategory,
    pub make: String,
    pub model: String,
    /// Registration timestamp (RFC 3339).
    pub registered_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterVehicleRequest {
    /// Plate in any case; normalized to uppercase before validation.
    pub plate: String,
    pub category: VehicleCategory,
    pub make: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleResponse {
    pub vehicle: Vehicle,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleListResponse {
    pub vehicles: Vec<Vehicle>,
}

/// A single itemized expense attached to a daily record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "monto", alias = "cantidad")]
    pub amount: f64,
    /// Time-of-entry, when the submitting client recorded it.
    #[serde(alias = "hora", default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<String>,
}

/// An incoming expense entry from a form submission. Both fields are optional
/// because half-filled rows are expected and silently dropped during the merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseInput {
    #[serde(alias = "nombre", default)]
    pub name: Option<String>,
    #[serde(alias = "monto", alias = "cantidad", default)]
    pub amount: Option<f64>,
}

/// The per-vehicle, per-date ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// ISO date key (`YYYY-MM-DD`).
    pub date: String,
    /// Accumulated gross income for the day.
    pub gross_income: f64,
    /// Accumulated fuel expense for the day.
    pub fuel_expense: f64,
    pub extra_expenses: Vec<Expense>,
    /// Derived: sum of `extra_expenses` amounts.
    pub total_extra_expenses: f64,
    /// Derived: gross − fuel − itemized expenses.
    pub net_income: f64,
    pub recorded_at: String,
}

/// A daily entry submission. Repeated submissions for the same date accumulate
/// into the existing record rather than overwriting it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmitDailyEntryRequest {
    #[serde(default)]
    pub gross_income: Option<f64>,
    #[serde(default)]
    pub fuel_expense: Option<f64>,
    #[serde(default)]
    pub expenses: Vec<ExpenseInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecordResponse {
    pub record: DailyRecord,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateExpenseRequest {
    pub name: String,
    pub amount: f64,
}

/// Bar-chart series for the dashboard: one label per bar group, with parallel
/// gross/expense/net value vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub gross: Vec<f64>,
    pub expenses: Vec<f64>,
    pub net: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: String,
    pub chart: ChartSeries,
    pub net_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    /// Month key (`YYYY-MM`).
    pub month: String,
    pub chart: ChartSeries,
    pub total_gross: f64,
    pub total_expenses: f64,
    pub total_net: f64,
    pub opening_balance: f64,
    /// `total_net + opening_balance`.
    pub grand_total: f64,
}

/// A tracked receivable associated with a vehicle, independent of the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: String,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "monto")]
    pub amount: f64,
    /// ISO date the debt started.
    pub start_date: String,
    /// Optional ISO due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub paid: bool,
    pub registered_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDebtRequest {
    pub name: String,
    pub amount: f64,
    /// Defaults to today when omitted.
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtResponse {
    pub debt: Debt,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtListResponse {
    pub debts: Vec<Debt>,
}

/// Per-vehicle configuration: the opening balance added to monthly net totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleConfig {
    #[serde(alias = "cajaInicial")]
    pub opening_balance: f64,
    #[serde(alias = "fechaInicio")]
    pub start_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetConfigRequest {
    pub opening_balance: f64,
    /// Defaults to today when omitted.
    #[serde(default)]
    pub start_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub config: VehicleConfig,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub uid: String,
    pub email: String,
}

/// Uniform error body returned by the REST layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}
