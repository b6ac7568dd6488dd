//! Persistence layer: document backends plus the resilient fallback store.

pub mod libsql_backend;
mod migrations;
pub mod resilient;
pub mod traits;
pub mod unavailable;

pub use libsql_backend::LibSqlBackend;
pub use resilient::{DEFAULT_BACKEND_TIMEOUT, ResilientStore};
pub use traits::{DocumentBackend, Record};
pub use unavailable::UnavailableBackend;
