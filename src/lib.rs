//! Core client library for WatchB, a movie cataloguing and social service.
//!
//! This crate is the typed Rust client for the WatchB REST backend:
//!
//! - [`api::ApiClient`]: configured HTTP transport (refresh-token cookie
//!   store, CSRF double-submit header, mutable default bearer credential)
//!   with typed endpoint calls
//! - [`store::CredentialStore`]: observable in-memory session state
//! - [`auth::SessionManager`]: access-token lifecycle — obtain, proactive
//!   refresh on a timer, revocation, and silent login at startup
//! - [`account::AccountService`]: profile mutations that merge results
//!   back into the store field-by-field
//! - [`models`]: user and movie data shapes
//! - [`validate`]: client-side field checks mirroring server rules
//!
//! # Example
//!
//! ```no_run
//! use watchb_client::{AccountService, ApiClient, Config, CredentialStore, SessionManager};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let store = CredentialStore::new();
//! let api = ApiClient::new(&config)?;
//! let session = SessionManager::new(api.clone(), store.clone(), &config);
//!
//! // Silent login from a previous visit's refresh cookie, if any.
//! if !session.bootstrap().await {
//!     session.login("user@example.com", "secret123!").await?;
//! }
//!
//! let account = AccountService::new(api, store);
//! account.delete_background().await?;
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod store;
pub mod validate;

pub use account::AccountService;
pub use api::{ApiClient, ApiError, ImageKind};
pub use auth::SessionManager;
pub use config::{Config, ConfigError};
pub use store::{Credentials, CredentialStore};
