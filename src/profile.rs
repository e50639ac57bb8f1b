//! Per-user profile fields, stored under `profile-<uid>`.
//!
//! The email always mirrors the identity provider; the display name falls
//! back to the provider's when the user never set one.

use serde::{Deserialize, Serialize};

use crate::identity::{ActiveUser, Identity};
use crate::storage::{self, namespaced_key, KeyValueStore};

pub const PROFILE_STORE: &str = "profile";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub display_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub bio: String,
}

/// Fields to change; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.phone.is_none()
            && self.location.is_none()
            && self.bio.is_none()
    }
}

impl Profile {
    /// Profile seeded from the identity provider
    pub fn for_identity(identity: &Identity) -> Self {
        Self {
            display_name: identity.display_name.clone().unwrap_or_default(),
            email: identity.email.clone().unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn apply(&mut self, update: ProfileUpdate) {
        let trimmed = |value: String| value.trim().to_string();
        if let Some(name) = update.display_name {
            self.display_name = trimmed(name);
        }
        if let Some(phone) = update.phone {
            self.phone = trimmed(phone);
        }
        if let Some(location) = update.location {
            self.location = trimmed(location);
        }
        if let Some(bio) = update.bio {
            self.bio = trimmed(bio);
        }
    }

    fn sync_with(mut self, identity: &Identity) -> Self {
        if let Some(email) = identity.email.as_ref() {
            self.email = email.clone();
        }
        if self.display_name.trim().is_empty() {
            if let Some(name) = identity.display_name.as_ref() {
                self.display_name = name.clone();
            }
        }
        self
    }
}

/// Stored profile of `identity`, synced with the provider's fields.
pub fn load_profile(backend: &dyn KeyValueStore, identity: &Identity) -> Profile {
    let key = namespaced_key(PROFILE_STORE, &identity.uid);
    let stored: Option<Profile> = storage::load_or_default(backend, &key);
    stored
        .unwrap_or_else(|| Profile::for_identity(identity))
        .sync_with(identity)
}

/// Merge `update` into the stored profile and write it back.
pub fn update_profile(
    backend: &dyn KeyValueStore,
    identity: &Identity,
    update: ProfileUpdate,
) -> Profile {
    let mut profile = load_profile(backend, identity);
    profile.apply(update);
    save_profile(backend, identity, &profile);
    profile
}

/// Throw away user edits, keeping only what the provider knows.
pub fn reset_profile(backend: &dyn KeyValueStore, identity: &Identity) -> Profile {
    let profile = Profile::for_identity(identity);
    save_profile(backend, identity, &profile);
    profile
}

/// Returns whether the profile was written.
pub fn save_profile(backend: &dyn KeyValueStore, identity: &Identity, profile: &Profile) -> bool {
    let active = ActiveUser::signed_in(identity.uid.clone());
    storage::persist(backend, &active, PROFILE_STORE, profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn ada() -> Identity {
        Identity {
            uid: "u1".to_string(),
            display_name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
        }
    }

    #[test]
    fn missing_profile_is_seeded_from_identity() {
        let backend = MemoryStore::new();
        let profile = load_profile(&backend, &ada());

        assert_eq!(profile.display_name, "Ada");
        assert_eq!(profile.email, "ada@example.com");
        assert!(profile.phone.is_empty());
        assert!(backend.is_empty());
    }

    #[test]
    fn update_merges_and_persists() {
        let backend = MemoryStore::new();
        let profile = update_profile(
            &backend,
            &ada(),
            ProfileUpdate {
                location: Some("  London ".to_string()),
                bio: Some("Engines".to_string()),
                ..ProfileUpdate::default()
            },
        );
        assert_eq!(profile.location, "London");

        let reloaded = load_profile(&backend, &ada());
        assert_eq!(reloaded, profile);
        assert!(backend.get("profile-u1").unwrap().is_some());
    }

    #[test]
    fn email_follows_identity_provider() {
        let backend = MemoryStore::new();
        update_profile(
            &backend,
            &ada(),
            ProfileUpdate {
                display_name: Some("Countess".to_string()),
                ..ProfileUpdate::default()
            },
        );

        let moved = Identity {
            email: Some("ada@lovelace.org".to_string()),
            ..ada()
        };
        let profile = load_profile(&backend, &moved);
        assert_eq!(profile.email, "ada@lovelace.org");
        assert_eq!(profile.display_name, "Countess");
    }

    #[test]
    fn reset_discards_edits() {
        let backend = MemoryStore::new();
        update_profile(
            &backend,
            &ada(),
            ProfileUpdate {
                display_name: Some("Countess".to_string()),
                phone: Some("555".to_string()),
                ..ProfileUpdate::default()
            },
        );

        let profile = reset_profile(&backend, &ada());
        assert_eq!(profile, Profile::for_identity(&ada()));
        assert_eq!(load_profile(&backend, &ada()).phone, "");
    }

    #[test]
    fn profiles_are_namespaced_per_user() {
        let backend = MemoryStore::new();
        update_profile(
            &backend,
            &ada(),
            ProfileUpdate {
                phone: Some("555".to_string()),
                ..ProfileUpdate::default()
            },
        );

        let other = load_profile(&backend, &Identity::new("u2"));
        assert!(other.phone.is_empty());
    }
}
