//! Authentication module: token lifecycle and session bootstrap.
//!
//! This module provides:
//! - `SessionManager`: obtain/refresh/expire orchestration with a single
//!   proactive refresh timer, plus the silent-login bootstrap path
//! - `token`: local, unverified decoding of the access token payload
//!
//! The access token lives in memory only; the refresh token is an HTTP-only
//! cookie owned by the HTTP layer.

pub mod session;
pub mod token;

pub use session::SessionManager;
pub use token::{decode_claims, decode_user_id, AccessClaims, TokenError};
