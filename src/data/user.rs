//! See [`Profile`]

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Code uniquely identifying a user
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct UserId(pub u64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "u.{:x}", self.0)
    }
}

/// A set of user IDs.
pub type UserSet = FxHashSet<UserId>;

/// A dictionary associating user IDs with their profiles.
pub type ProfileMap = FxHashMap<UserId, Profile>;

/// A read snapshot of one user's profile attributes.
///
/// The external store owns the authoritative row; suggestion code treats
/// a [`Profile`] as immutable for the lifetime of one ranking call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Duplicate of the user's ID.
    pub id: UserId,

    /// Display name for representing the user on the friend-facing UI.
    /// Can be changed without changing the user's ID.
    pub name: String,

    /// Free-text "about me" blurb.
    pub bio: Option<String>,

    /// Employer or organization, exactly as the user typed it.
    pub company: Option<String>,

    /// Home campus or city, exactly as the user typed it.
    pub location: Option<String>,

    /// Object-storage key of the user's avatar image.
    pub avatar: Option<String>,
}

/// The subset of [`Profile`] needed to render a person chip, such as a
/// row in a "mutual friends" list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// Duplicate of the user's ID.
    pub id: UserId,

    /// Display name.
    pub name: String,

    /// Object-storage key of the user's avatar image.
    pub avatar: Option<String>,
}

impl From<Profile> for ProfileSummary {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            avatar: profile.avatar,
        }
    }
}
