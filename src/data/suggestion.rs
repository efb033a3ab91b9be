//! Ranked "people you may know" entries

use super::user::Profile;
use serde::{Deserialize, Serialize};

/// Why a candidate scored what they scored.
///
/// Returned alongside the total so the UI can render "3 mutual friends" /
/// "Same company" chips without re-deriving anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Users in both the viewer's and the candidate's accepted-friend
    /// sets.
    pub mutual_friends: u32,

    /// Skill names listed by both, matched exactly.
    pub shared_skills: u32,

    /// Both list the same non-empty company, ignoring case.
    pub same_company: bool,

    /// Both list the same non-empty location, ignoring case.
    pub same_location: bool,
}

/// One ranked suggestion.
///
/// Ephemeral: lives for one ranking call or one cache entry's TTL, and is
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionCandidate {
    /// Snapshot of the candidate's profile.
    pub profile: Profile,

    /// Per-signal contributions behind `score`.
    pub breakdown: ScoreBreakdown,

    /// Total weighted score. Strictly positive in ranked output; a zero
    /// score excludes the candidate entirely.
    pub score: u32,
}
