//! User profile: the `default` singleton with partial updates.

pub mod model;
pub mod routes;

pub use model::{PrivacyMode, Profile, ProfilePatch, ProfileStore};
