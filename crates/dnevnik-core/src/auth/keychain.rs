use chrono::{DateTime, FixedOffset};
use keyring::Entry;
use tracing::debug;

use super::credentials::Credentials;
use super::store::{CredentialStore, StoreError, StoredCredentials};

const SERVICE_NAME: &str = "dnevnik";

/// Credential store kept in the OS keychain.
///
/// The stored secret is the same JSON document the file store writes.
pub struct KeyringCredentialStore {
    entry: Entry,
    data: StoredCredentials,
}

impl KeyringCredentialStore {
    /// Open the keychain entry for `login`, treating a missing entry as empty
    pub fn open(login: &str) -> Result<Self, StoreError> {
        let store = Self::from_entry(Entry::new(SERVICE_NAME, login)?)?;
        debug!(login, stored = !store.data.is_empty(), "Opened keychain entry");
        Ok(store)
    }

    fn from_entry(entry: Entry) -> Result<Self, StoreError> {
        let data = match entry.get_password() {
            Ok(secret) => StoredCredentials::from_json(&secret)?,
            Err(keyring::Error::NoEntry) => StoredCredentials::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { entry, data })
    }

    /// Delete the keychain entry entirely
    pub fn delete(self) -> Result<(), StoreError> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self) -> Result<(), StoreError> {
        self.entry.set_password(&self.data.to_json()?)?;
        Ok(())
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn access_token(&self) -> Option<String> {
        self.data.access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.data.refresh_token.clone()
    }

    fn expires_at(&self) -> Option<DateTime<FixedOffset>> {
        self.data.expires_at
    }

    fn update_credentials(&mut self, credentials: Credentials) -> Result<(), StoreError> {
        self.data.replace(credentials);
        self.save()
    }

    fn clear_access_token(&mut self) -> Result<(), StoreError> {
        self.data.access_token = None;
        self.save()
    }
}
