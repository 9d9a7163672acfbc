//! Observable in-memory session state.
//!
//! `CredentialStore` holds the current access token and authenticated-user
//! identity for the whole process. It performs no I/O: the session manager
//! and account gateway write into it, and interested parties subscribe to
//! be notified after every change (typically to re-render).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::models::{UserProfile, UserUpdate};

/// Callback invoked with a snapshot of the state after every action.
pub type Subscriber = Box<dyn Fn(&Credentials) + Send + Sync>;

/// Current session state.
///
/// Invariant (caller discipline, not enforced here): `is_authenticated`
/// implies `access_token` is present. `user` may lag behind the token,
/// since the profile is hydrated by a separate fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub user: UserProfile,
    pub is_authenticated: bool,
}

#[derive(Default)]
struct Inner {
    state: RwLock<Credentials>,
    subscribers: RwLock<Vec<(u64, Subscriber)>>,
    next_subscriber_id: AtomicU64,
}

/// Process-wide credential store. Clone is cheap and all clones share state.
#[derive(Clone, Default)]
pub struct CredentialStore {
    inner: Arc<Inner>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Reads =====

    /// Copy of the current state.
    pub fn snapshot(&self) -> Credentials {
        self.inner.state.read().expect("credential store poisoned").clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner
            .state
            .read()
            .expect("credential store poisoned")
            .access_token
            .clone()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.inner
            .state
            .read()
            .expect("credential store poisoned")
            .user
            .id
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner
            .state
            .read()
            .expect("credential store poisoned")
            .is_authenticated
    }

    // ===== Actions =====

    /// Replace the access token. Does not alter `is_authenticated`.
    pub fn set_token(&self, token: impl Into<String>) {
        let snapshot = {
            let mut state = self.inner.state.write().expect("credential store poisoned");
            state.access_token = Some(token.into());
            state.clone()
        };
        self.notify(&snapshot);
    }

    /// Mark the session authenticated. A token should already be set.
    pub fn mark_logged_in(&self) {
        let snapshot = {
            let mut state = self.inner.state.write().expect("credential store poisoned");
            state.is_authenticated = true;
            state.clone()
        };
        self.notify(&snapshot);
    }

    /// Shallow-merge user fields; unset fields keep their prior value.
    pub fn set_user(&self, update: UserUpdate) {
        let snapshot = {
            let mut state = self.inner.state.write().expect("credential store poisoned");
            state.user.merge(update);
            state.clone()
        };
        self.notify(&snapshot);
    }

    /// Reset to the initial unauthenticated state.
    pub fn mark_logged_out(&self) {
        debug!("Clearing session state");
        let snapshot = {
            let mut state = self.inner.state.write().expect("credential store poisoned");
            *state = Credentials::default();
            state.clone()
        };
        self.notify(&snapshot);
    }

    // ===== Subscriptions =====

    /// Register a callback invoked after every state change.
    /// Returns an id usable with [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe<F>(&self, callback: F) -> u64
    where
        F: Fn(&Credentials) + Send + Sync + 'static,
    {
        let id = self.inner.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .write()
            .expect("subscriber list poisoned")
            .push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: u64) {
        self.inner
            .subscribers
            .write()
            .expect("subscriber list poisoned")
            .retain(|(sub_id, _)| *sub_id != id);
    }

    fn notify(&self, snapshot: &Credentials) {
        for (_, subscriber) in self
            .inner
            .subscribers
            .read()
            .expect("subscriber list poisoned")
            .iter()
        {
            subscriber(snapshot);
        }
    }
}
