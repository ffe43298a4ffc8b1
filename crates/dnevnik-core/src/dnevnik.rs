//! Session lifecycle for a portal account.
//!
//! [`Dnevnik`] logs in (or reuses/refreshes stored credentials), keeps the
//! transport's bearer token in sync with the [`CredentialStore`], loads the
//! student roster and selects the first student. The store is closed when
//! the client is closed or dropped, on every path.

use tracing::{debug, info, warn};

use crate::api::{ApiClient, HttpClient};
use crate::auth::{CredentialStore, FileCredentialStore};
use crate::decode::decode;
use crate::error::{Error, Result};
use crate::models::{Student, StudentRoster};

const STUDENTS_PATH: &str = "/students";

/// How a [`Dnevnik`] should authenticate and shut down.
#[derive(Debug, Clone, Default)]
pub struct DnevnikOptions {
    pub login: Option<String>,
    pub password: Option<String>,
    /// Revoke the session when the client is closed
    pub auto_logout: bool,
}

impl DnevnikOptions {
    /// Always log in with these credentials, ignoring anything stored
    pub fn with_password(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: Some(login.into()),
            password: Some(password.into()),
            auto_logout: false,
        }
    }

    /// Resume from stored credentials only
    pub fn stored(login: impl Into<String>) -> Self {
        Self {
            login: Some(login.into()),
            password: None,
            auto_logout: false,
        }
    }

    pub fn auto_logout(mut self, auto_logout: bool) -> Self {
        self.auto_logout = auto_logout;
        self
    }
}

/// Authenticated client for one portal account.
pub struct Dnevnik<S: CredentialStore = FileCredentialStore, H: HttpClient = reqwest::Client> {
    pub(crate) api: ApiClient<H>,
    store: S,
    auto_logout: bool,
    roster: StudentRoster,
    selected: usize,
    closed: bool,
}

impl Dnevnik {
    /// Connect using the file store at the default location for the login
    pub async fn new(options: DnevnikOptions) -> Result<Self> {
        let path = FileCredentialStore::default_path(options.login.as_deref())?;
        let store = FileCredentialStore::open(path)?;
        Self::with_store(options, store).await
    }
}

impl<S: CredentialStore> Dnevnik<S, reqwest::Client> {
    /// Connect using `store` and the default reqwest transport
    pub async fn with_store(options: DnevnikOptions, store: S) -> Result<Self> {
        Self::connect(options, store, ApiClient::new()?).await
    }
}

impl<S: CredentialStore, H: HttpClient> Dnevnik<S, H> {
    /// Authenticate and load the student roster.
    ///
    /// Explicit login and password always go through the login endpoint.
    /// Otherwise the stored refresh token is required; the stored access
    /// token is reused unless it is missing or expired, in which case the
    /// credentials are refreshed first.
    pub async fn connect(options: DnevnikOptions, store: S, api: ApiClient<H>) -> Result<Self> {
        let mut client = Self {
            api,
            store,
            auto_logout: options.auto_logout,
            roster: StudentRoster::default(),
            selected: 0,
            closed: false,
        };

        // On failure `client` is dropped here, which closes the store.
        client.authenticate(&options).await?;
        client.load_students().await?;
        Ok(client)
    }

    async fn authenticate(&mut self, options: &DnevnikOptions) -> Result<()> {
        match (options.login.as_deref(), options.password.as_deref()) {
            (Some(login), Some(password)) => {
                debug!(login, "Logging in with password");
                let credentials = self.api.login(login, password).await?;
                self.store.update_credentials(credentials)?;
                info!(login, "Login successful");
            }
            _ => {
                if self.store.refresh_token().is_none() {
                    return Err(Error::Configuration(
                        "login and password must be specified when no credentials are stored"
                            .to_string(),
                    ));
                }
                if self.store.access_token().is_none() || self.store.is_expired() {
                    debug!("Stored access token missing or expired");
                    self.refresh(None).await?;
                } else {
                    debug!("Reusing stored access token");
                }
            }
        }

        let token = self.store.access_token().ok_or_else(|| {
            Error::Configuration("no access token available after authentication".to_string())
        })?;
        self.api.set_token(token);
        Ok(())
    }

    async fn load_students(&mut self) -> Result<()> {
        let roster: StudentRoster = decode(self.api.get(STUDENTS_PATH, &[]).await?)?;
        if roster.students.is_empty() {
            return Err(Error::EmptyRoster);
        }

        debug!(
            count = roster.students.len(),
            is_parent = roster.is_parent,
            "Loaded students"
        );
        self.roster = roster;
        self.selected = 0;
        Ok(())
    }

    /// Get new credentials using a refresh token.
    ///
    /// The stored refresh token is used when present; `refresh_token` is
    /// the fallback for an empty store.
    pub async fn refresh(&mut self, refresh_token: Option<&str>) -> Result<()> {
        let token = self
            .store
            .refresh_token()
            .or_else(|| refresh_token.map(str::to_string))
            .ok_or_else(|| Error::Configuration("no refresh token".to_string()))?;

        let credentials = self.api.refresh(&token).await?;
        self.store.update_credentials(credentials)?;

        let access_token = self.store.access_token().ok_or_else(|| {
            Error::Configuration("no access token available after refresh".to_string())
        })?;
        self.api.set_token(access_token);
        info!("Credentials refreshed");
        Ok(())
    }

    /// Revoke the server-side session.
    ///
    /// The stored access token is dropped, and so is the transport's bearer
    /// token once the portal has answered. The refresh token is kept, the
    /// portal decides whether it is still valid. Without a refresh token
    /// this does nothing.
    pub async fn revoke(&mut self) -> Result<()> {
        let Some(refresh_token) = self.store.refresh_token() else {
            debug!("No refresh token, nothing to revoke");
            return Ok(());
        };

        self.store.clear_access_token()?;
        self.api.revoke(&refresh_token).await?;
        self.api.clear_token();
        info!("Session revoked");
        Ok(())
    }

    /// Finish the session: revoke if `auto_logout` was requested, then close
    /// the store. The store is closed even when revoking fails.
    pub async fn close(mut self) -> Result<()> {
        let revoked = if self.auto_logout {
            self.revoke().await
        } else {
            Ok(())
        };

        let closed = self.close_store();
        revoked?;
        closed
    }

    fn close_store(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.store.close()?;
        Ok(())
    }

    // ===== Students =====

    /// The currently selected student
    pub fn student(&self) -> &Student {
        &self.roster.students[self.selected]
    }

    pub fn students(&self) -> &[Student] {
        &self.roster.students
    }

    pub fn is_parent(&self) -> bool {
        self.roster.is_parent
    }

    /// Make the student with `id` the target of resource queries
    pub fn select_student(&mut self, id: &str) -> Result<&Student> {
        let index = self
            .roster
            .position(id)
            .ok_or_else(|| Error::Configuration(format!("unknown student id {}", id)))?;
        self.selected = index;
        Ok(&self.roster.students[index])
    }

    pub fn api(&self) -> &ApiClient<H> {
        &self.api
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: CredentialStore, H: HttpClient> Drop for Dnevnik<S, H> {
    fn drop(&mut self) {
        if let Err(e) = self.close_store() {
            warn!(error = %e, "Failed to close credential store");
        }
    }
}
