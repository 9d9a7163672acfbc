//! Token lifecycle management.
//!
//! `SessionManager` owns the access-token lifecycle: obtaining a token pair
//! with credentials, proactively refreshing before expiry, revoking the
//! refresh cookie on logout, and the silent re-authentication attempt at
//! application start. Successful grants are committed to the credential
//! store and the API client's bearer slot together; failures commit nothing.

use std::sync::{Arc, Mutex, Weak};

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::auth::token;
use crate::config::Config;
use crate::store::CredentialStore;

struct SessionInner {
    api: ApiClient,
    store: CredentialStore,
    refresh_delay: std::time::Duration,
    /// Handle of the pending proactive-refresh timer. At most one timer is
    /// live at any moment: every schedule call aborts the previous handle.
    timer: Mutex<Option<JoinHandle<()>>>,
    /// Serializes refresh attempts so concurrent callers collapse into one
    /// in-flight request instead of racing writes to the store.
    refresh_gate: tokio::sync::Mutex<()>,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.timer.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}

/// Orchestrates obtain/refresh/expire against the API client and writes
/// results into the credential store. Clone is cheap and clones share the
/// same timer and refresh gate.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

impl SessionManager {
    pub fn new(api: ApiClient, store: CredentialStore, config: &Config) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                api,
                store,
                refresh_delay: config.refresh_delay(),
                timer: Mutex::new(None),
                refresh_gate: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.inner.store
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    // ===== Lifecycle operations =====

    /// Exchange credentials for a token pair and commit the access token.
    /// On failure nothing is committed: no token, no header, no timer.
    pub async fn obtain(&self, email: &str, password: &str) -> Result<()> {
        let access = self
            .inner
            .api
            .obtain_token_pair(email, password)
            .await
            .context("Failed to obtain token pair")?;
        self.commit_token(access);
        Ok(())
    }

    /// Mint a fresh access token using the ambient refresh cookie.
    ///
    /// Errors propagate to the caller, who decides whether the UI should
    /// transition to logged-out; local state is untouched on failure.
    pub async fn refresh(&self) -> Result<()> {
        let _in_flight = self.inner.refresh_gate.lock().await;
        let access = self
            .inner
            .api
            .refresh_token_pair()
            .await
            .context("Failed to refresh token pair")?;
        self.commit_token(access);
        Ok(())
    }

    /// Revoke the refresh cookie server-side, then tear down local session
    /// state. Local state survives if the server rejects the revocation.
    pub async fn expire(&self) -> Result<()> {
        self.inner
            .api
            .expire_refresh_token()
            .await
            .context("Failed to expire refresh token")?;
        self.teardown();
        Ok(())
    }

    /// Full interactive login: obtain a token pair, hydrate the user's
    /// profile, and mark the session authenticated.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        self.obtain(email, password).await?;
        self.hydrate_user().await?;
        self.inner.store.mark_logged_in();
        info!("Login completed");
        Ok(())
    }

    /// Silent re-authentication at application start: one unconditional
    /// refresh attempt. Returns whether a session was established; a first
    /// visit with no refresh cookie is expected to fail and is not an error.
    pub async fn bootstrap(&self) -> bool {
        if let Err(err) = self.refresh().await {
            debug!(error = %err, "Silent login skipped");
            return false;
        }
        // Mirrors the interactive chain: the session only becomes
        // authenticated once the profile fetch lands.
        match self.hydrate_user().await {
            Ok(()) => {
                self.inner.store.mark_logged_in();
                info!("Silent login completed");
                true
            }
            Err(err) => {
                warn!(error = %err, "Silent login: profile hydration failed");
                false
            }
        }
    }

    // ===== Internals =====

    /// Decode the subject id from the current access token and merge the
    /// fetched profile into the store.
    async fn hydrate_user(&self) -> Result<()> {
        let access = self
            .inner
            .store
            .access_token()
            .context("No access token to hydrate user from")?;
        let user_id = token::decode_user_id(&access)?;
        let user = self
            .inner
            .api
            .fetch_user(user_id)
            .await
            .context("Failed to fetch authenticated user profile")?;
        self.inner.store.set_user(user.into());
        Ok(())
    }

    /// Commit a granted access token: store it, expose it as the default
    /// bearer header, and (re)schedule the proactive refresh.
    fn commit_token(&self, access: String) {
        self.inner.api.set_bearer(&access);
        self.inner.store.set_token(access);
        self.schedule_refresh();
    }

    /// Arm the refresh timer, cancelling any previously pending one.
    ///
    /// When called from a timer-fired refresh, the replaced handle is the
    /// running task itself; that is safe because every commit step after
    /// this point is synchronous, so the abort only lands once the task is
    /// done. A superseded timer still parked on the refresh gate is
    /// cancelled right there.
    fn schedule_refresh(&self) {
        let delay = self.inner.refresh_delay;
        let weak = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(manager) = Weak::upgrade(&weak).map(|inner| SessionManager { inner }) else {
                return;
            };
            debug!("Proactive token refresh firing");
            if let Err(err) = manager.refresh().await {
                // No retry/backoff: a failed refresh leaves the app
                // unauthenticated until the next explicit user action.
                warn!(error = %err, "Scheduled token refresh failed; logging out");
                manager.inner.api.clear_bearer();
                manager.inner.store.mark_logged_out();
            }
        });

        let previous = self
            .inner
            .timer
            .lock()
            .expect("timer slot poisoned")
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    fn cancel_refresh_timer(&self) {
        if let Some(handle) = self.inner.timer.lock().expect("timer slot poisoned").take() {
            handle.abort();
        }
    }

    /// Clear all local session state: timer, bearer header, store.
    fn teardown(&self) {
        self.cancel_refresh_timer();
        self.inner.api.clear_bearer();
        self.inner.store.mark_logged_out();
    }
}
