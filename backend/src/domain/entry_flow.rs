//! Selection flow for the entry/edit screens. `RecordService::begin_entry`
//! builds one in the date-selected step; a submission then merges through it.
//!
//! Pure state machine, no I/O: a vehicle must be selected before a date, and
//! selecting a date carries the already-stored record for it so that the
//! subsequent submission always merges instead of overwriting. Changing the
//! vehicle drops any date and record state.

use shared::DailyRecord;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EntryFlow {
    #[default]
    NoVehicle,
    VehicleSelected {
        plate: String,
    },
    DateSelected {
        plate: String,
        date: String,
        existing: Option<DailyRecord>,
    },
}

impl EntryFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select (or switch to) a vehicle. Switching discards date/record state.
    pub fn select_vehicle(self, plate: &str) -> Self {
        match self {
            EntryFlow::DateSelected { plate: current, date, existing }
                if current == plate =>
            {
                EntryFlow::DateSelected { plate: current, date, existing }
            }
            _ => EntryFlow::VehicleSelected {
                plate: plate.to_string(),
            },
        }
    }

    /// Select a date for the current vehicle, carrying the stored record for
    /// that date. Without a vehicle this is a no-op.
    pub fn select_date(self, date: &str, existing: Option<DailyRecord>) -> Self {
        match self {
            EntryFlow::NoVehicle => EntryFlow::NoVehicle,
            EntryFlow::VehicleSelected { plate }
            | EntryFlow::DateSelected { plate, .. } => EntryFlow::DateSelected {
                plate,
                date: date.to_string(),
                existing,
            },
        }
    }

    /// Drop all selection state.
    pub fn clear(self) -> Self {
        EntryFlow::NoVehicle
    }

    pub fn current_plate(&self) -> Option<&str> {
        match self {
            EntryFlow::NoVehicle => None,
            EntryFlow::VehicleSelected { plate }
            | EntryFlow::DateSelected { plate, .. } => Some(plate),
        }
    }

    /// The record loaded for the selected date, when one exists.
    pub fn loaded_record(&self) -> Option<&DailyRecord> {
        match self {
            EntryFlow::DateSelected { existing, .. } => existing.as_ref(),
            _ => None,
        }
    }

    /// Whether a submission can be made from this state.
    pub fn ready_to_submit(&self) -> bool {
        matches!(self, EntryFlow::DateSelected { .. })
    }
}
