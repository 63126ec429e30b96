use crate::UserId;

#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Reaction {
    pub user_id: UserId,
    pub emoji: String,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ReactionToggle {
    pub emoji: String,
}

impl ReactionToggle {
    pub fn validate(&self) -> Result<(), crate::Error> {
        crate::validate_emoji(&self.emoji)
    }
}
