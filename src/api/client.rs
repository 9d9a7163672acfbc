//! API client for communicating with the WatchB REST backend.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests: account creation, token pair obtain/refresh/expire, user
//! retrieval and updates, image uploads, and movie details.
//!
//! The refresh token is an HTTP-only cookie. It lives entirely in the
//! client's cookie store and is never read by application code; the
//! backend sets it on obtain/refresh and clears it on expire.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client, Method, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::models::{Movie, SignUpResponse, User, UserPatch, UserSummary};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Account collection endpoint (sign-up, search, per-user resources)
const USERS_URI: &str = "/api/users/";

/// Token pair endpoints. Obtain and refresh return the access token in the
/// body and (re)set the refresh cookie; expire revokes the cookie.
const TOKEN_OBTAIN_URI: &str = "/api/auth/token-pair/obtain/";
const TOKEN_REFRESH_URI: &str = "/api/auth/token-pair/refresh/";
const TOKEN_EXPIRE_URI: &str = "/api/auth/refresh-token/expire/";

/// Movie detail endpoint
const MOVIES_URI: &str = "/api/movies/";

/// Cookie/header pair for the double-submit CSRF contract with the server.
const CSRF_COOKIE_NAME: &str = "csrftoken";
const CSRF_HEADER_NAME: &str = "X-CSRFToken";

#[derive(Debug, Deserialize)]
struct TokenPairResponse {
    access: String,
}

#[derive(Debug, Deserialize)]
struct AvatarUploadResponse {
    avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BackgroundUploadResponse {
    background: Option<String>,
}

/// Which of the two user image slots an upload/delete targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Avatar,
    Background,
}

impl ImageKind {
    fn field_name(self) -> &'static str {
        match self {
            ImageKind::Avatar => "avatar",
            ImageKind::Background => "background",
        }
    }
}

/// API client for the WatchB backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    jar: Arc<Jar>,
    base_url: String,
    /// Default bearer credential attached to every request while set.
    /// Shared across clones so the session manager's updates are seen
    /// by every handle.
    bearer: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Create a new API client for the configured backend host.
    pub fn new(config: &Config) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .cookie_provider(jar.clone())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            jar,
            base_url: config.backend_host.trim_end_matches('/').to_string(),
            bearer: Arc::new(RwLock::new(None)),
        })
    }

    /// Set the default bearer token for authenticated requests.
    pub fn set_bearer(&self, token: &str) {
        *self.bearer.write().expect("bearer slot poisoned") = Some(token.to_string());
    }

    /// Drop the default bearer token.
    pub fn clear_bearer(&self) {
        *self.bearer.write().expect("bearer slot poisoned") = None;
    }

    fn url(&self, path: &str) -> Result<Url> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .with_context(|| format!("Invalid request URL for path {path}"))
    }

    /// Read the CSRF token cookie back out of the cookie store, if the
    /// server has issued one for this origin.
    fn csrf_token(&self, url: &Url) -> Option<String> {
        let cookies = self.jar.cookies(url)?;
        let cookies = cookies.to_str().ok()?;
        cookies.split("; ").find_map(|pair| {
            pair.strip_prefix(CSRF_COOKIE_NAME)
                .and_then(|rest| rest.strip_prefix('='))
                .map(|value| value.to_string())
        })
    }

    /// Headers for a request: the bearer credential if one is set, plus the
    /// echoed CSRF cookie on state-changing methods (double-submit contract).
    fn request_headers(&self, url: &Url, method: &Method) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = *self.bearer.read().expect("bearer slot poisoned") {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))
                    .context("Access token is not a valid header value")?,
            );
        }
        let mutating = !matches!(method.as_str(), "GET" | "HEAD" | "OPTIONS");
        if mutating {
            if let Some(csrf) = self.csrf_token(url) {
                headers.insert(
                    CSRF_HEADER_NAME,
                    header::HeaderValue::from_str(&csrf)
                        .context("CSRF cookie is not a valid header value")?,
                );
            }
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .client
            .get(url.clone())
            .headers(self.request_headers(&url, &Method::GET)?)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {url}"))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {url}"))
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, url: Url, body: &B) -> Result<T> {
        let response = self
            .client
            .post(url.clone())
            .headers(self.request_headers(&url, &Method::POST)?)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send POST request to {url}"))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {url}"))
    }

    /// POST with an empty body; used by the cookie-borne token endpoints.
    async fn post_empty(&self, url: Url) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(url.clone())
            .headers(self.request_headers(&url, &Method::POST)?)
            .send()
            .await
            .with_context(|| format!("Failed to send POST request to {url}"))?;

        Self::check_response(response).await
    }

    // ===== Account & Auth =====

    /// Create a new account.
    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<SignUpResponse> {
        let url = self.url(USERS_URI)?;
        let body = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        });
        self.post(url, &body).await
    }

    /// Exchange credentials for a token pair. Returns the access token;
    /// the refresh token arrives as an HTTP-only response cookie.
    pub async fn obtain_token_pair(&self, email: &str, password: &str) -> Result<String> {
        let url = self.url(TOKEN_OBTAIN_URI)?;
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });
        let response: TokenPairResponse = self.post(url, &body).await?;
        Ok(response.access)
    }

    /// Mint a fresh access token using the ambient refresh cookie.
    pub async fn refresh_token_pair(&self) -> Result<String> {
        let url = self.url(TOKEN_REFRESH_URI)?;
        let response = self.post_empty(url.clone()).await?;
        let response: TokenPairResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {url}"))?;
        Ok(response.access)
    }

    /// Ask the server to revoke the refresh cookie.
    pub async fn expire_refresh_token(&self) -> Result<()> {
        let url = self.url(TOKEN_EXPIRE_URI)?;
        self.post_empty(url).await?;
        Ok(())
    }

    // ===== Users =====

    /// Search registered accounts by exact email.
    pub async fn search_users_by_email(&self, email: &str) -> Result<Vec<UserSummary>> {
        let mut url = self.url(USERS_URI)?;
        url.query_pairs_mut().append_pair("email", email);
        self.get(url).await
    }

    /// Whether an account already exists for the given email.
    pub async fn email_already_registered(&self, email: &str) -> Result<bool> {
        let matches = self.search_users_by_email(email).await?;
        Ok(!matches.is_empty())
    }

    /// Fetch a single user's full profile.
    pub async fn fetch_user(&self, user_id: i64) -> Result<User> {
        let url = self.url(&format!("{USERS_URI}{user_id}/"))?;
        self.get(url).await
    }

    /// Partially update user fields. Returns the updated fields as reported
    /// by the server; callers merging into local state should prefer the
    /// fields they sent over this body.
    pub async fn patch_user(&self, user_id: i64, patch: &UserPatch) -> Result<serde_json::Value> {
        let url = self.url(&format!("{USERS_URI}{user_id}/"))?;
        let response = self
            .client
            .patch(url.clone())
            .headers(self.request_headers(&url, &Method::PATCH)?)
            .json(patch)
            .send()
            .await
            .with_context(|| format!("Failed to send PATCH request to {url}"))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {url}"))
    }

    // ===== User images =====

    /// Upload a user image (multipart form). Returns the stored image URL.
    pub async fn upload_image(
        &self,
        user_id: i64,
        kind: ImageKind,
        bytes: Vec<u8>,
        filename: &str,
        mime: &str,
    ) -> Result<Option<String>> {
        let field = kind.field_name();
        let url = self.url(&format!("{USERS_URI}{user_id}/{field}/"))?;

        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime)
            .with_context(|| format!("Invalid MIME type {mime}"))?;
        let form = Form::new().part(field, part);

        let response = self
            .client
            .post(url.clone())
            .headers(self.request_headers(&url, &Method::POST)?)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("Failed to upload {field} image"))?;

        let response = Self::check_response(response).await?;
        debug!(user_id, field, "Image upload accepted");

        match kind {
            ImageKind::Avatar => {
                let parsed: AvatarUploadResponse = response
                    .json()
                    .await
                    .context("Failed to parse avatar upload response")?;
                Ok(parsed.avatar)
            }
            ImageKind::Background => {
                let parsed: BackgroundUploadResponse = response
                    .json()
                    .await
                    .context("Failed to parse background upload response")?;
                Ok(parsed.background)
            }
        }
    }

    /// Delete a user image slot on the server.
    pub async fn delete_image(&self, user_id: i64, kind: ImageKind) -> Result<()> {
        let field = kind.field_name();
        let url = self.url(&format!("{USERS_URI}{user_id}/{field}/"))?;

        let response = self
            .client
            .delete(url.clone())
            .headers(self.request_headers(&url, &Method::DELETE)?)
            .send()
            .await
            .with_context(|| format!("Failed to delete {field} image"))?;

        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Movies =====

    /// Fetch full movie detail by id.
    pub async fn fetch_movie(&self, movie_id: i64) -> Result<Movie> {
        let url = self.url(&format!("{MOVIES_URI}{movie_id}/"))?;
        self.get(url).await
    }
}
