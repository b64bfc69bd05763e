//! flota-cuentas backend: income/expense tracking for vehicle-based
//! businesses.
//!
//! Layered as domain services over repository traits over a CSV/YAML file
//! store, with an axum REST surface on top. The binary in `main.rs` wires the
//! default file store and serves `/api`.

pub mod domain;
pub mod io;
pub mod storage;
