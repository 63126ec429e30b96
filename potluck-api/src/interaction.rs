use crate::Target;

/// The boolean, per-user interactions. Reactions are handled separately as they are
/// not a simple on/off membership.
#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub enum InteractionKind {
    Like,
    Bookmark,
}

impl InteractionKind {
    pub fn applies_to(&self, target: &Target) -> bool {
        match (self, target) {
            (InteractionKind::Like, _) => true,
            (InteractionKind::Bookmark, Target::Comment(_)) => false,
            (InteractionKind::Bookmark, _) => true,
        }
    }

    pub fn path_segment(&self) -> &'static str {
        match self {
            InteractionKind::Like => "like",
            InteractionKind::Bookmark => "bookmark",
        }
    }
}

/// Aggregate state of an interaction, as seen by the requesting user
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Toggled {
    /// Whether the requesting user has acted on the target
    pub active: bool,

    /// Number of users who acted on the target
    pub count: u64,
}
