//! Domain layer: services and the pure ledger core.
//!
//! Services own a repository each, validate input, and return the typed
//! [`error::ServiceError`] so the REST layer can map failures to status codes
//! and localized messages. All money arithmetic lives in [`ledger`].

pub mod config_service;
pub mod debt_service;
pub mod entry_flow;
pub mod error;
pub mod ledger;
pub mod record_service;
pub mod report_service;
pub mod session;
pub mod vehicle_service;

pub use config_service::ConfigService;
pub use debt_service::DebtService;
pub use entry_flow::EntryFlow;
pub use error::{ServiceError, ServiceResult};
pub use record_service::RecordService;
pub use report_service::ReportService;
pub use session::{AuthError, Principal, SessionProvider, StaticSessionProvider};
pub use vehicle_service::VehicleService;
