//! Local inspection of the access token payload.
//!
//! The client never verifies signatures — that is the server's job. The
//! payload is decoded only to learn which user id the token was issued
//! for, so the profile can be fetched after a silent refresh.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token is not a three-part compact JWS")]
    Malformed,

    #[error("Token payload is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Token payload is not the expected claim set: {0}")]
    Claims(#[from] serde_json::Error),
}

/// Claims the client cares about. Unknown claims are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessClaims {
    pub user_id: i64,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decode the payload segment of a compact JWS without verifying it.
pub fn decode_claims(token: &str) -> Result<AccessClaims, TokenError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_header), Some(payload), Some(_signature)) => payload,
        _ => return Err(TokenError::Malformed),
    };
    if segments.next().is_some() {
        return Err(TokenError::Malformed);
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// The `user_id` claim of an access token.
pub fn decode_user_id(token: &str) -> Result<i64, TokenError> {
    decode_claims(token).map(|claims| claims.user_id)
}
