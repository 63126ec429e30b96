use crate::api::{self, CommentId};

/// Reasons a user action is refused before anything is sent to the server
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("you need to log in first")]
    LoginRequired,

    #[error("this action is not available here")]
    Unsupported,

    #[error("state for this target was not loaded yet")]
    NotSeeded,

    #[error("replying to comment {0:?} which is not in this discussion")]
    UnknownParent(CommentId),

    #[error(transparent)]
    Invalid(#[from] api::Error),
}

/// Failure of a call to the server
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The request did not go through, or its answer could not be understood
    #[error(transparent)]
    Transport(#[from] anyhow::Error),

    /// The server refused the request
    #[error(transparent)]
    Api(#[from] api::Error),
}

impl RemoteError {
    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            RemoteError::Transport(_) => String::from("Could not reach the server, please retry"),
            RemoteError::Api(api::Error::LoginRequired) => {
                String::from("Your session expired, please log in again")
            }
            RemoteError::Api(api::Error::Unknown(_)) => {
                String::from("The server ran into an error, please retry later")
            }
            RemoteError::Api(e) => format!("{e}"),
        }
    }
}
