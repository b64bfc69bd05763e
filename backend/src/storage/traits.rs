//! Storage abstraction traits.
//!
//! The hosted document store is an external collaborator; the domain layer
//! only ever talks to these capability traits, scoped by the owner hierarchy
//! (`{owner_uid}/{plate}/{subcollection}`), so it can be tested against any
//! backend.

use anyhow::Result;
use shared::{DailyRecord, Debt, Vehicle, VehicleConfig};

/// Vehicle collection operations for one owner.
pub trait VehicleStorage: Send + Sync {
    /// Store a newly registered vehicle. The caller is responsible for the
    /// pre-write duplicate check.
    fn store_vehicle(&self, owner_uid: &str, vehicle: &Vehicle) -> Result<()>;

    fn get_vehicle(&self, owner_uid: &str, plate: &str) -> Result<Option<Vehicle>>;

    /// List the owner's vehicles ordered by plate.
    fn list_vehicles(&self, owner_uid: &str) -> Result<Vec<Vehicle>>;
}

/// Daily ledger record operations for one vehicle.
pub trait DailyRecordStorage: Send + Sync {
    fn get_record(&self, owner_uid: &str, plate: &str, date: &str)
        -> Result<Option<DailyRecord>>;

    /// Write the full recomputed record (overwrite-with-merged-values, not a
    /// partial patch), keeping the scalar fields and the expense list from
    /// diverging.
    fn put_record(&self, owner_uid: &str, plate: &str, record: &DailyRecord) -> Result<()>;

    /// Records whose date key falls in the inclusive range, ascending by date.
    /// Mirrors the hosted store's documentId range query.
    fn records_in_range(
        &self,
        owner_uid: &str,
        plate: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<DailyRecord>>;
}

/// Debtor/debt list operations for one vehicle.
pub trait DebtStorage: Send + Sync {
    fn store_debt(&self, owner_uid: &str, plate: &str, debt: &Debt) -> Result<()>;

    /// List debts ordered by registration time.
    fn list_debts(&self, owner_uid: &str, plate: &str) -> Result<Vec<Debt>>;

    /// Replace a stored debt by id. Returns false when no debt has that id.
    fn update_debt(&self, owner_uid: &str, plate: &str, debt: &Debt) -> Result<bool>;
}

/// Per-vehicle configuration singleton.
pub trait ConfigStorage: Send + Sync {
    fn set_config(&self, owner_uid: &str, plate: &str, config: &VehicleConfig) -> Result<()>;

    fn get_config(&self, owner_uid: &str, plate: &str) -> Result<Option<VehicleConfig>>;
}

/// Storage connection with repository factory methods, so the domain layer can
/// work with any backend without knowing the implementation.
pub trait Connection: Send + Sync + Clone + 'static {
    type VehicleRepository: VehicleStorage;
    type DailyRecordRepository: DailyRecordStorage;
    type DebtRepository: DebtStorage;
    type ConfigRepository: ConfigStorage;

    fn create_vehicle_repository(&self) -> Self::VehicleRepository;
    fn create_daily_record_repository(&self) -> Self::DailyRecordRepository;
    fn create_debt_repository(&self) -> Self::DebtRepository;
    fn create_config_repository(&self) -> Self::ConfigRepository;
}
