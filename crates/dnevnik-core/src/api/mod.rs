//! REST transport for the dnevnik portal.
//!
//! This module provides the `ApiClient` that owns the bearer token and
//! dispatches JSON requests against the portal base URL, and the
//! `HttpClient` seam it sends them through.
//!
//! Authenticated requests carry `Authorization: Bearer <accessToken>`.

pub mod client;
pub mod backend;

pub use client::{ApiClient, BASE_URL, REQUEST_TIMEOUT};
pub use backend::HttpClient;
