//! Signed-in identity.
//!
//! The identity provider is opaque: all the core needs from it is a stable
//! uid (plus a display name and email for the profile) and a notification on
//! every sign-in/sign-out. The CLI plays the provider with `session.json`.

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::Storage;

/// A signed-in user as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            email: None,
        }
    }
}

/// Shared handle on the uid whose namespace is active.
///
/// Every store holds a clone and reads it at the moment it persists, so a
/// write after a sign-in/sign-out always lands in the new namespace.
#[derive(Debug, Clone, Default)]
pub struct ActiveUser {
    uid: Rc<RefCell<Option<String>>>,
}

impl ActiveUser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(uid: impl Into<String>) -> Self {
        let active = Self::new();
        active.set(Some(uid.into()));
        active
    }

    pub fn get(&self) -> Option<String> {
        self.uid.borrow().clone()
    }

    pub fn set(&self, uid: Option<String>) {
        *self.uid.borrow_mut() = uid;
    }
}

/// Record `identity` as the signed-in user.
pub fn sign_in(storage: &Storage, identity: &Identity) -> Result<Identity> {
    let uid = non_empty(Some(identity.uid.as_str()))
        .ok_or_else(|| Error::InvalidArgument("user id cannot be empty".to_string()))?;

    let identity = Identity {
        uid: uid.to_string(),
        display_name: non_empty(identity.display_name.as_deref()).map(str::to_string),
        email: non_empty(identity.email.as_deref()).map(str::to_string),
    };

    fs::create_dir_all(storage.home())?;
    storage.write_json(&storage.session_file(), &identity)?;
    tracing::debug!(uid = %identity.uid, "signed in");
    Ok(identity)
}

/// Forget the signed-in user. Returns the identity that was signed in.
pub fn sign_out(storage: &Storage) -> Result<Option<Identity>> {
    let previous = current_identity(storage)?;
    let path = storage.session_file();
    if path.exists() {
        fs::remove_file(&path)?;
    }
    if let Some(identity) = previous.as_ref() {
        tracing::debug!(uid = %identity.uid, "signed out");
    }
    Ok(previous)
}

/// The identity recorded in `session.json`, if any.
///
/// A corrupt or blank session counts as signed out.
pub fn current_identity(storage: &Storage) -> Result<Option<Identity>> {
    let identity = match storage.read_json::<Identity>(&storage.session_file()) {
        Ok(identity) => identity,
        Err(Error::Json(err)) => {
            tracing::warn!(error = %err, "ignoring unreadable session file");
            None
        }
        Err(err) => return Err(err),
    };

    Ok(identity.filter(|identity| non_empty(Some(identity.uid.as_str())).is_some()))
}

fn non_empty(input: Option<&str>) -> Option<&str> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn active_user_clones_share_state() {
        let active = ActiveUser::new();
        let seen_by_store = active.clone();
        assert_eq!(seen_by_store.get(), None);

        active.set(Some("alice".to_string()));
        assert_eq!(seen_by_store.get().as_deref(), Some("alice"));

        active.set(None);
        assert_eq!(seen_by_store.get(), None);
    }

    #[test]
    fn sign_in_trims_and_persists() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path());

        let identity = Identity {
            uid: "  u1 ".to_string(),
            display_name: Some("Ada".to_string()),
            email: Some("  ".to_string()),
        };
        let stored = sign_in(&storage, &identity).unwrap();
        assert_eq!(stored.uid, "u1");
        assert_eq!(stored.email, None);

        assert_eq!(current_identity(&storage).unwrap(), Some(stored));
    }

    #[test]
    fn sign_in_rejects_blank_uid() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path());

        let err = sign_in(&storage, &Identity::new("   ")).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn sign_out_clears_session() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path());

        assert_eq!(sign_out(&storage).unwrap(), None);
        sign_in(&storage, &Identity::new("u2")).unwrap();
        assert_eq!(sign_out(&storage).unwrap(), Some(Identity::new("u2")));
        assert_eq!(current_identity(&storage).unwrap(), None);
    }

    #[test]
    fn corrupt_session_counts_as_signed_out() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path());
        fs::write(storage.session_file(), "{not json").unwrap();

        assert_eq!(current_identity(&storage).unwrap(), None);
    }
}
