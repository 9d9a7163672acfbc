//! Data models for WatchB entities.
//!
//! This module contains the data structures exchanged with the backend:
//!
//! - `User`, `UserSummary`, `UserPatch`: account shapes and partial updates
//! - `UserProfile`, `UserUpdate`: credential-store state and merge payloads
//! - `Movie` and its nested credit/image/video types

pub mod movie;
pub mod user;

pub use movie::{Country, Credit, CreditPerson, Genre, Movie, Poster, Still, Video};
pub use user::{
    SignUpResponse, User, UserPatch, UserProfile, UserSummary, UserUpdate, Visibility,
};
