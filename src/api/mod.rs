//! REST API client module for the WatchB backend.
//!
//! This module provides the `ApiClient` for communicating with the
//! backend's account, auth, and movie endpoints.
//!
//! The API uses short-lived JWT bearer tokens for authentication with an
//! HTTP-only refresh cookie, plus a cookie/header CSRF double-submit pair
//! on state-changing requests.

pub mod client;
pub mod error;

pub use client::{ApiClient, ImageKind};
pub use error::{ApiError, FieldErrors};
