//! CSV/YAML file-backed storage.
//!
//! Layout under the base directory:
//!
//! ```text
//! {owner_uid}/
//!   {PLATE}/
//!     vehicle.yaml        vehicle registration
//!     registros.csv       daily ledger scalars, one row per date
//!     gastos.csv          itemized expenses, keyed by date
//!     deudores.csv        tracked debts
//!     configuracion.yaml  opening balance config
//! ```

pub mod config_repository;
pub mod connection;
pub mod debt_repository;
pub mod record_repository;
pub mod vehicle_repository;

pub use config_repository::ConfigRepository;
pub use connection::CsvConnection;
pub use debt_repository::DebtRepository;
pub use record_repository::DailyRecordRepository;
pub use vehicle_repository::VehicleRepository;
