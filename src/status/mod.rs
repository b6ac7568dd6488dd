//! Health, status, and connectivity probes.

pub mod probes;
pub mod routes;

pub use probes::{GraphProbe, IntegrationStatus, ProbeStatus};
