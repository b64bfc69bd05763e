//! Identity session provider.
//!
//! Authentication itself is handled by an external identity service; the
//! domain only consumes "who is the current principal" and "sign in with a
//! credential pair". The trait keeps the rest of the system testable without
//! that service, and the fixed set of failure codes maps 1:1 to the localized
//! messages the UI shows.

use log::{info, warn};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// The authenticated principal as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub uid: String,
    pub email: String,
}

/// Failure codes of the external identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid credential")]
    InvalidCredential,
    #[error("unknown user")]
    UnknownUser,
    #[error("account disabled")]
    Disabled,
    #[error("rate limited")]
    RateLimited,
    #[error("network failure")]
    Network,
}

impl AuthError {
    /// Localized message for the login form.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredential => "La contraseña es incorrecta.",
            AuthError::UnknownUser => "El correo no está registrado.",
            AuthError::Disabled => "La cuenta está deshabilitada.",
            AuthError::RateLimited => "Demasiados intentos. Intenta nuevamente más tarde.",
            AuthError::Network => "Ocurrió un error. Intenta nuevamente.",
        }
    }
}

/// Access to the current session and the sign-in primitive.
pub trait SessionProvider: Send + Sync {
    /// The current authenticated principal, if any.
    fn current_principal(&self) -> Option<Principal>;

    /// Sign in with an email/password pair, establishing the session.
    fn sign_in(&self, email: &str, password: &str) -> Result<Principal, AuthError>;

    /// Drop the current session.
    fn sign_out(&self);
}

/// In-memory session provider for development and tests.
///
/// Accepts any non-empty credential pair and derives a stable uid from the
/// email, mimicking the happy path of the hosted identity service.
#[derive(Clone, Default)]
pub struct StaticSessionProvider {
    current: Arc<Mutex<Option<Principal>>>,
}

impl StaticSessionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already-signed-in principal.
    pub fn with_principal(uid: &str, email: &str) -> Self {
        Self {
            current: Arc::new(Mutex::new(Some(Principal {
                uid: uid.to_string(),
                email: email.to_string(),
            }))),
        }
    }

    fn derive_uid(email: &str) -> String {
        let sanitized: String = email
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        format!("uid-{sanitized}")
    }
}

impl SessionProvider for StaticSessionProvider {
    fn current_principal(&self) -> Option<Principal> {
        self.current.lock().unwrap().clone()
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        if email.trim().is_empty() {
            warn!("Sign-in attempt with empty email");
            return Err(AuthError::UnknownUser);
        }
        if password.is_empty() {
            warn!("Sign-in attempt with empty password for {}", email);
            return Err(AuthError::InvalidCredential);
        }

        let principal = Principal {
            uid: Self::derive_uid(email),
            email: email.trim().to_string(),
        };
        info!("Signed in principal {}", principal.uid);
        *self.current.lock().unwrap() = Some(principal.clone());
        Ok(principal)
    }

    fn sign_out(&self) {
        info!("Signing out current principal");
        *self.current.lock().unwrap() = None;
    }
}
