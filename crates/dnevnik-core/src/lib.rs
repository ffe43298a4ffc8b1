//! Client library for the dnevnik school portal API.
//!
//! The entry point is [`Dnevnik`], which authenticates (login or token
//! refresh), keeps credentials in a [`CredentialStore`], and exposes typed
//! accessors for periods, grades, homework and announcements.
//!
//! ```no_run
//! # async fn run() -> dnevnik_core::Result<()> {
//! use dnevnik_core::{Dnevnik, DnevnikOptions};
//!
//! let client = Dnevnik::new(DnevnikOptions::with_password("login", "secret")).await?;
//! for period in client.get_periods().await? {
//!     println!("{} {}", period.id, period.name);
//! }
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod decode;
pub mod dnevnik;
pub mod error;
pub mod models;
mod resources;
pub mod utils;

pub use api::{ApiClient, HttpClient};
pub use auth::{
    CredentialStore, Credentials, FileCredentialStore, KeyringCredentialStore,
    MemoryCredentialStore, StoreError,
};
pub use dnevnik::{Dnevnik, DnevnikOptions};
pub use error::{Error, Result};
pub use resources::{EstimateQuery, HomeworkDate};
