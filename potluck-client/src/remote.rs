use async_trait::async_trait;

use crate::{
    api::{
        Comment, InteractionKind, NewComment, Reaction, ReactionToggle, Target, TargetSummary,
        Toggled,
    },
    RemoteError,
};

/// The REST api of the backend, as seen by the client.
///
/// Futures are not `Send`, as the browser implementation runs on the single-threaded wasm
/// event loop.
#[async_trait(?Send)]
pub trait Remote {
    async fn fetch_summary(&self, target: Target) -> Result<TargetSummary, RemoteError>;

    /// Flat list of comments (on a blog) or reviews (on a recipe), replies included
    async fn fetch_comments(&self, target: Target) -> Result<Vec<Comment>, RemoteError>;

    async fn post_comment(&self, target: Target, c: NewComment) -> Result<Comment, RemoteError>;

    /// Returns the new aggregate if the server sends one back
    async fn toggle_interaction(
        &self,
        kind: InteractionKind,
        target: Target,
    ) -> Result<Option<Toggled>, RemoteError>;

    /// Returns the full list of reactions on `target` after the toggle
    async fn toggle_reaction(
        &self,
        target: Target,
        r: ReactionToggle,
    ) -> Result<Vec<Reaction>, RemoteError>;
}
