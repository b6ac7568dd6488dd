//! Profile model and store.

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use crate::error::{ApiError, ApiResult, require_len};
use crate::store::{Record, ResilientStore};

/// Id of the one profile record.
pub const DEFAULT_PROFILE_ID: &str = "default";

/// Allowed range for `data_retention_days`.
pub const RETENTION_DAYS_RANGE: std::ops::RangeInclusive<u32> = 1..=3650;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyMode {
    #[default]
    Strict,
    Balanced,
    Open,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub display_name: String,
    pub timezone: String,
    pub privacy_mode: PrivacyMode,
    pub data_retention_days: u32,
    pub local_only: bool,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            id: DEFAULT_PROFILE_ID.to_string(),
            display_name: "User".to_string(),
            timezone: "UTC".to_string(),
            privacy_mode: PrivacyMode::Strict,
            data_retention_days: 365,
            local_only: true,
        }
    }
}

impl Record for Profile {
    const COLLECTION: &'static str = "profiles";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Partial profile update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub timezone: Option<String>,
    pub privacy_mode: Option<PrivacyMode>,
    pub data_retention_days: Option<u32>,
    pub local_only: Option<bool>,
}

impl ProfilePatch {
    pub fn validate(&self) -> ApiResult<()> {
        if let Some(name) = &self.display_name {
            require_len("display_name", name, 1)?;
        }
        if let Some(tz) = &self.timezone {
            require_len("timezone", tz, 1)?;
        }
        if let Some(days) = self.data_retention_days {
            if !RETENTION_DAYS_RANGE.contains(&days) {
                return Err(ApiError::Validation(format!(
                    "data_retention_days must be between {} and {}",
                    RETENTION_DAYS_RANGE.start(),
                    RETENTION_DAYS_RANGE.end()
                )));
            }
        }
        Ok(())
    }

    fn apply_to(self, profile: &mut Profile) {
        if let Some(v) = self.display_name {
            profile.display_name = v;
        }
        if let Some(v) = self.timezone {
            profile.timezone = v;
        }
        if let Some(v) = self.privacy_mode {
            profile.privacy_mode = v;
        }
        if let Some(v) = self.data_retention_days {
            profile.data_retention_days = v;
        }
        if let Some(v) = self.local_only {
            profile.local_only = v;
        }
    }
}

/// Singleton profile store. The fallback is seeded with the defaults.
pub struct ProfileStore {
    store: ResilientStore<Profile>,
    /// Serializes read-then-put so concurrent patches do not drop fields.
    write_lock: Mutex<()>,
}

impl ProfileStore {
    pub fn new(store: ResilientStore<Profile>) -> Self {
        Self {
            store: store.with_fallback_records(vec![Profile::default()]),
            write_lock: Mutex::new(()),
        }
    }

    /// The current profile, or the defaults when none is stored.
    pub async fn get(&self) -> Profile {
        self.store.get(DEFAULT_PROFILE_ID).await.unwrap_or_default()
    }

    /// Apply a validated partial update and persist the whole profile.
    pub async fn update(&self, patch: ProfilePatch) -> ApiResult<Profile> {
        patch.validate()?;
        let _guard = self.write_lock.lock().await;
        let mut profile = self.get().await;
        patch.apply_to(&mut profile);
        profile.id = DEFAULT_PROFILE_ID.to_string();
        let saved = self.store.put(profile).await;
        info!(
            privacy_mode = ?saved.privacy_mode,
            retention_days = saved.data_retention_days,
            "Profile updated"
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::resilient::test_support::SwitchableBackend;
    use crate::store::{DEFAULT_BACKEND_TIMEOUT, UnavailableBackend};

    #[tokio::test]
    async fn defaults_without_stored_profile() {
        let store = ProfileStore::new(ResilientStore::in_memory());
        assert_eq!(store.get().await, Profile::default());
    }

    #[tokio::test]
    async fn timezone_only_update_keeps_other_fields() {
        let backend = SwitchableBackend::new().await;
        let store = ProfileStore::new(ResilientStore::new(Some(backend), DEFAULT_BACKEND_TIMEOUT));
        let before = store.get().await;

        let updated = store
            .update(ProfilePatch {
                timezone: Some("Europe/Berlin".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.timezone, "Europe/Berlin");
        assert_eq!(updated.display_name, before.display_name);
        assert_eq!(updated.privacy_mode, before.privacy_mode);
        assert_eq!(updated.data_retention_days, before.data_retention_days);
        assert_eq!(updated.local_only, before.local_only);
        assert_eq!(store.get().await, updated);
    }

    #[tokio::test]
    async fn update_persists_during_outage() {
        let store = ProfileStore::new(ResilientStore::new(
            Some(Arc::new(UnavailableBackend::new("down"))),
            DEFAULT_BACKEND_TIMEOUT,
        ));
        store
            .update(ProfilePatch {
                privacy_mode: Some(PrivacyMode::Open),
                ..Default::default()
            })
            .await
            .unwrap();
        let profile = store.get().await;
        assert_eq!(profile.privacy_mode, PrivacyMode::Open);
        assert_eq!(profile.timezone, "UTC");
    }

    #[tokio::test]
    async fn invalid_patch_is_rejected() {
        let store = ProfileStore::new(ResilientStore::in_memory());
        for patch in [
            ProfilePatch {
                data_retention_days: Some(0),
                ..Default::default()
            },
            ProfilePatch {
                data_retention_days: Some(3651),
                ..Default::default()
            },
            ProfilePatch {
                display_name: Some(String::new()),
                ..Default::default()
            },
        ] {
            assert!(matches!(store.update(patch).await, Err(ApiError::Validation(_))));
        }
        assert_eq!(store.get().await, Profile::default());
    }

    #[test]
    fn patch_rejects_unknown_privacy_mode() {
        let parsed: Result<ProfilePatch, _> = serde_json::from_str(r#"{"privacy_mode":"public"}"#);
        assert!(parsed.is_err());
    }
}
