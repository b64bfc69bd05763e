pub mod rest;

pub use rest::{api_router, AppState};
