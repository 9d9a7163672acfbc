//! Profile mutation gateway.
//!
//! Each operation reads the authenticated user's id from the credential
//! store, issues one request, and on success merges only the fields that
//! were part of the request back into the store. Response bodies are never
//! merged wholesale, so unrelated fields cannot be clobbered by stale
//! server data. Password changes leave the store untouched.

use anyhow::{Context, Result};

use crate::api::{ApiClient, ImageKind};
use crate::models::{UserPatch, UserUpdate};
use crate::store::CredentialStore;

/// Gateway for authenticated account updates.
#[derive(Clone)]
pub struct AccountService {
    api: ApiClient,
    store: CredentialStore,
}

impl AccountService {
    pub fn new(api: ApiClient, store: CredentialStore) -> Self {
        Self { api, store }
    }

    fn current_user_id(&self) -> Result<i64> {
        self.store
            .user_id()
            .context("No authenticated user in the credential store")
    }

    /// Update plain profile fields (username, profile text, visibility).
    pub async fn update_user(&self, patch: UserPatch) -> Result<()> {
        let user_id = self.current_user_id()?;
        self.api.patch_user(user_id, &patch).await?;
        self.store.set_user(patch.into_store_update());
        Ok(())
    }

    /// Change the account email. Requires the current password; a rejected
    /// password surfaces as `ApiError::IncorrectPassword`.
    pub async fn change_email(&self, new_email: &str, curr_password: &str) -> Result<()> {
        let patch = UserPatch {
            email: Some(new_email.to_string()),
            curr_password: Some(curr_password.to_string()),
            ..UserPatch::default()
        };
        self.update_user(patch).await
    }

    /// Change the account password. No password material ever reaches the
    /// credential store.
    pub async fn change_password(&self, new_password: &str, curr_password: &str) -> Result<()> {
        let user_id = self.current_user_id()?;
        let patch = UserPatch {
            new_password: Some(new_password.to_string()),
            curr_password: Some(curr_password.to_string()),
            ..UserPatch::default()
        };
        self.api.patch_user(user_id, &patch).await?;
        Ok(())
    }

    /// Upload a new avatar image and merge the resulting URL.
    pub async fn update_avatar(&self, bytes: Vec<u8>, filename: &str, mime: &str) -> Result<()> {
        let user_id = self.current_user_id()?;
        let url = self
            .api
            .upload_image(user_id, ImageKind::Avatar, bytes, filename, mime)
            .await?;
        self.store.set_user(UserUpdate::avatar(url));
        Ok(())
    }

    /// Upload a new background image and merge the resulting URL.
    pub async fn update_background(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime: &str,
    ) -> Result<()> {
        let user_id = self.current_user_id()?;
        let url = self
            .api
            .upload_image(user_id, ImageKind::Background, bytes, filename, mime)
            .await?;
        self.store.set_user(UserUpdate::background(url));
        Ok(())
    }

    /// Delete the current avatar.
    pub async fn delete_avatar(&self) -> Result<()> {
        let user_id = self.current_user_id()?;
        self.api.delete_image(user_id, ImageKind::Avatar).await?;
        self.store.set_user(UserUpdate::avatar(None));
        Ok(())
    }

    /// Delete the current background image.
    pub async fn delete_background(&self) -> Result<()> {
        let user_id = self.current_user_id()?;
        self.api.delete_image(user_id, ImageKind::Background).await?;
        self.store.set_user(UserUpdate::background(None));
        Ok(())
    }
}
