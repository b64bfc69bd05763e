//! Typed errors for the domain services.
//!
//! The REST layer matches on these variants to pick a status code and the
//! localized message shown to the user; nothing here is fatal to the process.

use thiserror::Error;

use crate::domain::session::AuthError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed validation; the operation was aborted with no write.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Plate does not match the 3-letters + 3-digits pattern.
    #[error("invalid plate format: {0}")]
    InvalidPlate(String),

    /// A vehicle document already exists for this plate.
    #[error("vehicle already registered: {0}")]
    DuplicateVehicle(String),

    #[error("vehicle not found: {0}")]
    VehicleNotFound(String),

    #[error("no daily record for {plate} on {date}")]
    RecordNotFound { plate: String, date: String },

    #[error("debt not found: {0}")]
    DebtNotFound(String),

    /// The identity service reports no current principal.
    #[error("session expired")]
    SessionExpired,

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Remote/store failure; logged and surfaced as a generic alert.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl ServiceError {
    /// The localized message the UI shows for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Validation(_) => {
                "Por favor completa todos los campos correctamente.".to_string()
            }
            ServiceError::InvalidPlate(_) => {
                "La placa debe tener 3 letras seguidas de 3 números (ej: ABC123).".to_string()
            }
            ServiceError::DuplicateVehicle(_) => "El vehículo ya está registrado.".to_string(),
            ServiceError::VehicleNotFound(_) => "No hay vehículos registrados.".to_string(),
            ServiceError::RecordNotFound { .. } => {
                "No se encontraron registros para esa fecha.".to_string()
            }
            ServiceError::DebtNotFound(_) => "No se encontró la deuda.".to_string(),
            ServiceError::SessionExpired => {
                "Tu sesión ha caducado. Por favor, inicia sesión nuevamente.".to_string()
            }
            ServiceError::Auth(err) => err.user_message().to_string(),
            ServiceError::Storage(_) => {
                "Ocurrió un error al procesar la solicitud. Intenta de nuevo.".to_string()
            }
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
