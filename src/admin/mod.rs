//! Admin info, data export, analytics, and demo seeding.

pub mod demo;
mod routes;

pub use routes::routes;
