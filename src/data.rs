//! Data consumed and produced by the suggestion and presence cores

pub mod friendship;
pub mod skill;
pub mod suggestion;
pub mod user;

pub use friendship::*;
pub use skill::*;
pub use suggestion::*;
pub use user::*;

#[cfg(test)]
pub use crate::{edges, profile, skills};

/// Create a [`Profile`](user::Profile) literal for testing.
///
/// Bio and avatar are left empty; company and location are optional.
#[macro_export]
macro_rules! profile {
    ($id:literal: $name:literal $(, company: $company:literal)? $(, location: $location:literal)?) => {
        $crate::data::user::Profile {
            id: $crate::data::user::UserId($id),
            name: $name.to_string(),
            bio: None,
            company: None$(.or(Some($company.to_string())))?,
            location: None$(.or(Some($location.to_string())))?,
            avatar: None,
        }
    };
}

/// Create a [`Vec`] of [`FriendshipEdge`s](friendship::FriendshipEdge)
/// for testing.
///
/// Expects `requester status recipient` triples, where `status` is one of
/// `pending`, `accepted`, or `rejected`.
#[macro_export]
macro_rules! edges {
    ($( $a:literal $status:ident $b:literal ),* $(,)?) => {
        vec![$(
            $crate::data::friendship::FriendshipEdge {
                requester: $crate::data::user::UserId($a),
                recipient: $crate::data::user::UserId($b),
                status: $crate::edges!(@status $status),
                created_at: chrono::DateTime::UNIX_EPOCH,
            }
        ),*]
    };

    (@status pending) => { $crate::data::friendship::EdgeStatus::Pending };
    (@status accepted) => { $crate::data::friendship::EdgeStatus::Accepted };
    (@status rejected) => { $crate::data::friendship::EdgeStatus::Rejected };

    () => {
        Vec::<$crate::data::friendship::FriendshipEdge>::new()
    };
}

/// Create a [`Vec`] of [`SkillTag`s](skill::SkillTag) for testing.
///
/// Expects `user: "name" "name" ...` groups.
#[macro_export]
macro_rules! skills {
    ($( $user:literal : $($name:literal)+ ),* $(,)?) => {
        vec![$($(
            $crate::data::skill::SkillTag {
                user: $crate::data::user::UserId($user),
                name: $name.to_string(),
            }
        ),+),*]
    };

    () => {
        Vec::<$crate::data::skill::SkillTag>::new()
    };
}
