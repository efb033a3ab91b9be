//! Skill tags users attach to their profiles

use super::user::UserId;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// One skill a user lists on their profile.
///
/// Names are matched case-sensitively: "go" and "Go" are different tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillTag {
    /// Who lists the skill.
    pub user: UserId,

    /// Exact display name of the skill.
    pub name: String,
}

/// A user's skills as a set, deduplicated by exact name.
///
/// Multiplicity is irrelevant for overlap counting, so duplicate tag rows
/// collapse here.
pub type SkillSet = FxHashSet<String>;

/// Collapse a user's tag rows into a [`SkillSet`].
pub fn skill_set<'a, I>(tags: I) -> SkillSet
where
    I: IntoIterator<Item = &'a SkillTag>,
{
    tags.into_iter().map(|tag| tag.name.clone()).collect()
}
