use std::collections::HashSet;

use uuid::Uuid;

use crate::{Error, Time, UserId};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub Uuid);

/// A comment on a blog post or a review on a recipe, as stored by the server.
///
/// Replies are comments too: they only differ by having a `parent_id`. The server
/// never sends them nested, see `potluck_client::thread` for rebuilding the tree.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub author_id: UserId,
    pub content: String,

    /// URL of an attached picture or video
    pub media: Option<String>,

    /// `None` for top-level comments
    pub parent_id: Option<CommentId>,
    pub created_at: Time,
    pub liker_ids: HashSet<UserId>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_content(&self.content)?;
        if let Some(media) = &self.media {
            crate::validate_string(media)?;
        }
        Ok(())
    }
}
