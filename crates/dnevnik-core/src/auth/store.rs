use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::credentials::{is_past, Credentials};

/// Errors emitted by credential stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Could not find config directory")]
    NoConfigDir,
}

/// Persistence capability for the session's credentials.
///
/// Reads reflect in-memory state loaded when the store was opened; every
/// mutation is written through to the backing medium before returning.
pub trait CredentialStore {
    fn access_token(&self) -> Option<String>;

    fn refresh_token(&self) -> Option<String>;

    fn expires_at(&self) -> Option<DateTime<FixedOffset>>;

    /// Replace all three fields and persist them.
    fn update_credentials(&mut self, credentials: Credentials) -> Result<(), StoreError>;

    /// Forget the access token, keeping the refresh token and expiration.
    fn clear_access_token(&mut self) -> Result<(), StoreError>;

    /// True when the stored expiration is at or before now.
    ///
    /// Without a stored expiration there is nothing valid to reuse, so this
    /// reports expired.
    fn is_expired(&self) -> bool {
        self.expires_at().as_ref().map_or(true, is_past)
    }

    /// Release held resources. Safe to call more than once.
    fn close(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// The persisted form shared by the file and keyring stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    #[serde(rename = "accessToken", default)]
    pub access_token: Option<String>,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
    #[serde(rename = "accessTokenExpirationDate", default)]
    pub expires_at: Option<DateTime<FixedOffset>>,
}

impl StoredCredentials {
    /// Parse a stored document; blank input means nothing is stored.
    pub fn from_json(contents: &str) -> Result<Self, StoreError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(contents)?)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn replace(&mut self, credentials: Credentials) {
        *self = Self::from(credentials);
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.expires_at.is_none()
    }
}

impl From<Credentials> for StoredCredentials {
    fn from(credentials: Credentials) -> Self {
        Self {
            access_token: Some(credentials.access_token),
            refresh_token: Some(credentials.refresh_token),
            expires_at: Some(credentials.expires_at),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    data: StoredCredentials,
    writes: usize,
    closed: bool,
}

/// In-memory store suitable for short-lived sessions and tests.
///
/// Clones share state, so a caller can keep a handle to inspect what a
/// session wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore(Arc<Mutex<MemoryState>>);

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        let store = Self::default();
        store.state().data = credentials.into();
        store
    }

    pub fn snapshot(&self) -> StoredCredentials {
        self.state().data.clone()
    }

    /// Number of writes performed since creation
    pub fn writes(&self) -> usize {
        self.state().writes
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    /// Drop everything stored
    pub fn clear(&self) {
        let mut state = self.state();
        state.data = StoredCredentials::default();
        state.writes += 1;
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn access_token(&self) -> Option<String> {
        self.state().data.access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.state().data.refresh_token.clone()
    }

    fn expires_at(&self) -> Option<DateTime<FixedOffset>> {
        self.state().data.expires_at
    }

    fn update_credentials(&mut self, credentials: Credentials) -> Result<(), StoreError> {
        let mut state = self.state();
        state.data.replace(credentials);
        state.writes += 1;
        Ok(())
    }

    fn clear_access_token(&mut self) -> Result<(), StoreError> {
        let mut state = self.state();
        state.data.access_token = None;
        state.writes += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.state().closed = true;
        Ok(())
    }
}
