use chrono::Utc;

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<Utc>;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

/// Longest accepted emoji, in bytes. Covers ZWJ sequences such as family emoji.
pub const MAX_EMOJI_LEN: usize = 32;

mod auth;
pub use auth::{AuthToken, NewSession, Session};

mod comment;
pub use comment::{Comment, CommentId, NewComment};

mod error;
pub use error::Error;

mod interaction;
pub use interaction::{InteractionKind, Toggled};

mod reaction;
pub use reaction::{Reaction, ReactionToggle};

mod target;
pub use target::{BlogId, RecipeId, Target, TargetSummary};

mod user;
pub use user::UserId;

// All user-provided strings go through here before being sent to or accepted by the server,
// as the backing database refuses null bytes.
pub fn validate_string(s: &str) -> Result<(), Error> {
    match s.contains('\0') {
        true => Err(Error::NullByteInString(String::from(s))),
        false => Ok(()),
    }
}

/// Validates the text of a comment or reply
pub fn validate_content(s: &str) -> Result<(), Error> {
    validate_string(s)?;
    if s.trim().is_empty() {
        return Err(Error::EmptyContent);
    }
    Ok(())
}

/// Validates a reaction pick: a short, non-empty, whitespace-free string
pub fn validate_emoji(s: &str) -> Result<(), Error> {
    validate_string(s)?;
    if s.is_empty() || s.len() > MAX_EMOJI_LEN || s.chars().any(|c| c.is_whitespace()) {
        return Err(Error::InvalidEmoji(String::from(s)));
    }
    Ok(())
}
