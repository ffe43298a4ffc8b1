//! Authentication module for managing portal credentials.
//!
//! This module provides:
//! - `Credentials`: the token pair returned by login and refresh
//! - `CredentialStore`: the persistence capability the session relies on
//! - `FileCredentialStore`: JSON file storage, one file per login
//! - `KeyringCredentialStore`: OS-level storage via keyring
//! - `MemoryCredentialStore`: process-local storage for tests
//!
//! None of the stores lock against other processes. Two clients sharing one
//! store location at the same time overwrite each other.

pub mod credentials;
pub mod file;
pub mod keychain;
pub mod store;

pub use credentials::{parse_timestamp, Credentials};
pub use file::FileCredentialStore;
pub use keychain::KeyringCredentialStore;
pub use store::{CredentialStore, MemoryCredentialStore, StoreError, StoredCredentials};
