//! The pure scoring function behind suggestion ranking.

use crate::data::{Profile, ScoreBreakdown};
use crate::graph::UserRelations;

/// Points per mutual friend.
pub const MUTUAL_FRIEND_WEIGHT: u32 = 3;

/// Points per shared skill name (exact, case-sensitive match).
pub const SHARED_SKILL_WEIGHT: u32 = 2;

/// Flat points for listing the same employer.
pub const SAME_COMPANY_BONUS: u32 = 5;

/// Flat points for listing the same location.
pub const SAME_LOCATION_BONUS: u32 = 2;

impl ScoreBreakdown {
    /// Weighted total across every signal. No cap, never negative.
    pub fn score(&self) -> u32 {
        self.mutual_friends * MUTUAL_FRIEND_WEIGHT
            + self.shared_skills * SHARED_SKILL_WEIGHT
            + if self.same_company { SAME_COMPANY_BONUS } else { 0 }
            + if self.same_location {
                SAME_LOCATION_BONUS
            } else {
                0
            }
    }
}

/// Compare a viewer's snapshot against one candidate's.
///
/// Free of side effects and I/O; identical inputs always produce the
/// identical breakdown, which is what makes ranking repeatable.
pub fn score(
    viewer: &Profile,
    viewer_rel: &UserRelations,
    candidate: &Profile,
    candidate_rel: &UserRelations,
) -> ScoreBreakdown {
    ScoreBreakdown {
        mutual_friends: viewer_rel
            .friends
            .intersection(&candidate_rel.friends)
            .count() as u32,
        shared_skills: viewer_rel
            .skills
            .intersection(&candidate_rel.skills)
            .count() as u32,
        same_company: same_field(viewer.company.as_deref(), candidate.company.as_deref()),
        same_location: same_field(viewer.location.as_deref(), candidate.location.as_deref()),
    }
}

/// Both present, both non-empty, equal ignoring ASCII case.
fn same_field(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => !a.is_empty() && !b.is_empty() && a.eq_ignore_ascii_case(b),
        _ => false,
    }
}
