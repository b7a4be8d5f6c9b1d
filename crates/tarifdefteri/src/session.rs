//! The signed-in user.
//!
//! The active identity is persisted in the device store so it survives
//! between runs. Local accounts are created on the spot; remote identities
//! are recorded after the caller has authenticated elsewhere.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::storage::DeviceStore;

/// Device store key holding the active session.
pub const SESSION_KEY: &str = "tarif_defteri_demo_user";

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// User id; owns the user's recipes.
    pub uid: String,
    /// Email address.
    pub email: String,
    /// Name shown in greetings.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Session {
    /// Display name, falling back to the email address.
    #[must_use]
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }

    /// Whether this is a locally created account.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.uid.starts_with("demo-")
    }
}

/// Sign-in state for the process.
#[derive(Debug, Clone)]
pub struct SessionContext {
    device: Arc<DeviceStore>,
}

impl SessionContext {
    /// Create a context over the device store.
    #[must_use]
    pub fn new(device: Arc<DeviceStore>) -> Self {
        Self { device }
    }

    /// The persisted session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the device store cannot be read.
    pub fn current(&self) -> Result<Option<Session>> {
        self.device.get_json(SESSION_KEY)
    }

    /// The persisted session, or [`Error::NoSession`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSession`] when nobody is signed in.
    pub fn require(&self) -> Result<Session> {
        self.current()?.ok_or(Error::NoSession)
    }

    /// Create a new local account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank email, or an error if the
    /// session cannot be stored.
    pub fn sign_up(&self, email: &str, display_name: &str) -> Result<Session> {
        let email = normalize_email(email)?;
        let display_name = display_name.trim();
        let session = Session {
            uid: new_local_uid(),
            email,
            display_name: (!display_name.is_empty()).then(|| display_name.to_string()),
        };
        self.store(&session)?;
        info!(uid = %session.uid, "Signed up local account");
        Ok(session)
    }

    /// Sign in a local account by email.
    ///
    /// Reuses the persisted account when the email matches. Otherwise a new
    /// account is created, named after the part of the email before `@`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank email, or an error if the
    /// session cannot be stored.
    pub fn sign_in(&self, email: &str) -> Result<Session> {
        let email = normalize_email(email)?;
        if let Some(existing) = self.current()? {
            if existing.email.eq_ignore_ascii_case(&email) {
                info!(uid = %existing.uid, "Resumed local account");
                return Ok(existing);
            }
        }

        let local_part = email.split('@').next().unwrap_or_default().to_string();
        let session = Session {
            uid: new_local_uid(),
            email,
            display_name: Some(local_part),
        };
        self.store(&session)?;
        info!(uid = %session.uid, "Signed in new local account");
        Ok(session)
    }

    /// Record an identity authenticated by the remote account service.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank uid or email.
    pub fn sign_in_remote(&self, uid: &str, email: &str) -> Result<Session> {
        let uid = uid.trim();
        if uid.is_empty() {
            return Err(Error::validation("user id is required"));
        }
        let session = Session {
            uid: uid.to_string(),
            email: normalize_email(email)?,
            display_name: None,
        };
        self.store(&session)?;
        info!(uid = %session.uid, "Signed in remote account");
        Ok(session)
    }

    /// Forget the persisted session.
    ///
    /// # Errors
    ///
    /// Returns an error if the device store cannot be written.
    pub fn sign_out(&self) -> Result<()> {
        if self.device.remove(SESSION_KEY)? {
            info!("Signed out");
        }
        Ok(())
    }

    fn store(&self, session: &Session) -> Result<()> {
        self.device.set_json(SESSION_KEY, session)
    }
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim();
    if email.is_empty() {
        return Err(Error::validation("email is required"));
    }
    Ok(email.to_string())
}

fn new_local_uid() -> String {
    format!("demo-{}", Utc::now().timestamp_millis())
}
