//! Account data models mirroring the WatchB user API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile visibility choices supported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Visible to every user
    Public,
    /// Visible to followed users only
    Private,
    /// Visible to nobody
    Closed,
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Public
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
            Visibility::Closed => write!(f, "closed"),
        }
    }
}

/// Full user object returned by `GET /api/users/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub visibility: Visibility,
    /// URL of the uploaded avatar image, if any
    #[serde(default)]
    pub avatar: Option<String>,
    /// URL of the uploaded background image, if any
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

/// Reduced user shape returned by the list/search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
}

/// Response from account creation.
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpResponse {
    pub id: i64,
    pub username: String,
}

/// Partial update body for `PATCH /api/users/{id}/`.
///
/// Only set fields are serialized. Email and password changes require the
/// current password alongside the new value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curr_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

impl UserPatch {
    /// Name the fields this patch carries that belong in the credential
    /// store after a successful update. Password material is never one
    /// of them.
    pub fn into_store_update(self) -> UserUpdate {
        UserUpdate {
            username: self.username,
            profile: self.profile,
            visibility: self.visibility,
            email: self.email,
            ..UserUpdate::default()
        }
    }
}

/// Shallow-merge payload applied to the credential store's user state.
///
/// `None` means "leave unchanged". The image fields use a nested `Option`
/// so a deletion (`Some(None)`) is distinguishable from "unchanged".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpdate {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub profile: Option<String>,
    pub visibility: Option<Visibility>,
    pub avatar: Option<Option<String>>,
    pub background: Option<Option<String>>,
}

impl UserUpdate {
    pub fn avatar(url: Option<String>) -> Self {
        Self {
            avatar: Some(url),
            ..Self::default()
        }
    }

    pub fn background(url: Option<String>) -> Self {
        Self {
            background: Some(url),
            ..Self::default()
        }
    }
}

impl From<User> for UserUpdate {
    fn from(user: User) -> Self {
        Self {
            id: Some(user.id),
            username: Some(user.username),
            email: Some(user.email),
            profile: Some(user.profile),
            visibility: Some(user.visibility),
            avatar: Some(user.avatar),
            background: Some(user.background),
        }
    }
}

/// User state held by the credential store. All fields optional: the store
/// starts empty and is hydrated incrementally (token decode gives the id,
/// the profile fetch fills the rest).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub profile: Option<String>,
    pub visibility: Option<Visibility>,
    pub avatar: Option<String>,
    pub background: Option<String>,
}

impl UserProfile {
    /// Apply a shallow merge: set fields overwrite, unset fields are kept.
    pub fn merge(&mut self, update: UserUpdate) {
        if let Some(id) = update.id {
            self.id = Some(id);
        }
        if let Some(username) = update.username {
            self.username = Some(username);
        }
        if let Some(email) = update.email {
            self.email = Some(email);
        }
        if let Some(profile) = update.profile {
            self.profile = Some(profile);
        }
        if let Some(visibility) = update.visibility {
            self.visibility = Some(visibility);
        }
        if let Some(avatar) = update.avatar {
            self.avatar = avatar;
        }
        if let Some(background) = update.background {
            self.background = background;
        }
    }
}
