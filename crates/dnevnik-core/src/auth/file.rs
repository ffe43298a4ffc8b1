use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use super::credentials::Credentials;
use super::store::{CredentialStore, StoreError, StoredCredentials};

/// Application name used for the config directory path
const APP_NAME: &str = "dnevnik";

/// File name used when no login is known
const DEFAULT_STORE_NAME: &str = "session";

/// Credential store backed by a JSON file.
///
/// The file is created empty when missing. Writes go to a sibling temporary
/// file that is then renamed over the original.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    data: StoredCredentials,
    closed: bool,
}

impl FileCredentialStore {
    /// Open the store at `path`, creating an empty file if none exists
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            StoredCredentials::from_json(&contents)?
        } else {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, "")?;
            StoredCredentials::default()
        };

        debug!(path = %path.display(), stored = !data.is_empty(), "Opened credential file");
        Ok(Self {
            path,
            data,
            closed: false,
        })
    }

    /// `<config dir>/dnevnik/<login>.json`
    pub fn default_path(login: Option<&str>) -> Result<PathBuf, StoreError> {
        let config_dir = dirs::config_dir().ok_or(StoreError::NoConfigDir)?;
        let name = login.unwrap_or(DEFAULT_STORE_NAME);
        Ok(config_dir.join(APP_NAME).join(format!("{}.json", name)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the backing file; a file that is already gone is fine
    pub fn delete(self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        debug!(path = %self.path.display(), "Deleted credential file");
        Ok(())
    }

    fn save(&self) -> Result<(), StoreError> {
        let contents = self.data.to_json()?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
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

    fn close(&mut self) -> Result<(), StoreError> {
        if !self.closed {
            self.closed = true;
            debug!(path = %self.path.display(), "Closed credential file");
        }
        Ok(())
    }
}
