pub mod csv;
pub mod traits;

pub use csv::CsvConnection;
pub use traits::{ConfigStorage, Connection, DailyRecordStorage, DebtStorage, VehicleStorage};
