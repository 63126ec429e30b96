use crate::{
    api::{Comment, CommentId, InteractionKind, Target, TargetSummary, UserId},
    discussion::{Discussion, FetchToken},
    interaction::{Interactions, Settlement, ToggleState},
    notification::Level,
    reaction::{ReactionOutcome, Reactions},
    store::{AppStore, KeyValueStore},
    Error, Remote, RemoteError,
};

/// Everything shown on the page of one blog post or recipe: its likes, bookmarks and
/// reactions, and its discussion along with the likes of each comment.
#[derive(Clone, Debug)]
pub struct TargetView {
    target: Target,
    discussion: Discussion,
    interactions: Interactions,
    reactions: Reactions,
}

impl TargetView {
    pub fn new(target: Target) -> TargetView {
        TargetView {
            target,
            discussion: Discussion::new(target),
            interactions: Interactions::new(),
            reactions: Reactions::new(),
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn discussion(&self) -> &Discussion {
        &self.discussion
    }

    pub fn discussion_mut(&mut self) -> &mut Discussion {
        &mut self.discussion
    }

    pub fn interactions(&self) -> &Interactions {
        &self.interactions
    }

    pub fn interactions_mut(&mut self) -> &mut Interactions {
        &mut self.interactions
    }

    pub fn reactions(&self) -> &Reactions {
        &self.reactions
    }

    pub fn reactions_mut(&mut self) -> &mut Reactions {
        &mut self.reactions
    }

    pub fn apply_summary(&mut self, summary: TargetSummary) {
        self.interactions
            .seed(InteractionKind::Like, self.target, summary.likes.into());
        if InteractionKind::Bookmark.applies_to(&self.target) {
            self.interactions
                .seed(InteractionKind::Bookmark, self.target, summary.bookmarks.into());
        }
        if self.target.accepts_reactions() {
            self.reactions.seed(self.target, summary.reactions);
        }
    }

    /// Installs freshly fetched comments, along with their like state for `viewer`
    pub fn apply_comments(
        &mut self,
        token: FetchToken,
        records: Vec<Comment>,
        viewer: Option<UserId>,
    ) -> bool {
        if !self.discussion.receive(token, records) {
            return false;
        }
        for c in self.discussion.records() {
            self.interactions.seed(
                InteractionKind::Like,
                Target::Comment(c.id),
                ToggleState::from_likers(&c.liker_ids, viewer),
            );
        }
        true
    }

    pub fn apply_posted(&mut self, c: Comment, viewer: Option<UserId>) {
        self.interactions.seed(
            InteractionKind::Like,
            Target::Comment(c.id),
            ToggleState::from_likers(&c.liker_ids, viewer),
        );
        self.discussion.posted(c);
    }

    /// Forgets everything that depends on who is logged in
    pub fn clear(&mut self) {
        *self = TargetView::new(self.target);
    }

    pub async fn refresh<R, S>(
        &mut self,
        remote: &R,
        store: &mut AppStore<S>,
    ) -> Result<(), RemoteError>
    where
        R: Remote + ?Sized,
        S: KeyValueStore,
    {
        let token = self.discussion.begin_fetch();
        let res = async {
            let summary = remote.fetch_summary(self.target).await?;
            let comments = remote.fetch_comments(self.target).await?;
            Ok::<_, RemoteError>((summary, comments))
        }
        .await;
        match res {
            Ok((summary, comments)) => {
                self.apply_summary(summary);
                self.apply_comments(token, comments, store.viewer());
                Ok(())
            }
            Err(err) => {
                tracing::error!(?err, target = %self.target, "failed loading page");
                store.notify(Level::Error, err.user_message());
                Err(err)
            }
        }
    }

    /// Likes or bookmarks `target`, which is either this page's target or one of its
    /// comments
    pub async fn toggle<R, S>(
        &mut self,
        remote: &R,
        store: &mut AppStore<S>,
        kind: InteractionKind,
        target: Target,
    ) -> Result<Settlement, Error>
    where
        R: Remote + ?Sized,
        S: KeyValueStore,
    {
        let pending = self
            .interactions
            .toggle(kind, target, store.viewer())
            .map_err(|e| refuse(store, e))?;
        let res = remote.toggle_interaction(kind, target).await;
        if let Err(err) = &res {
            store.notify(Level::Error, err.user_message());
        }
        Ok(self.interactions.settle(&pending, &res))
    }

    pub async fn react<R, S>(
        &mut self,
        remote: &R,
        store: &mut AppStore<S>,
        emoji: &str,
    ) -> Result<ReactionOutcome, Error>
    where
        R: Remote + ?Sized,
        S: KeyValueStore,
    {
        let pending = self
            .reactions
            .request(self.target, emoji, store.viewer())
            .map_err(|e| refuse(store, e))?;
        let res = remote
            .toggle_reaction(self.target, pending.request.clone())
            .await;
        if let Err(err) = &res {
            store.notify(Level::Error, err.user_message());
        }
        Ok(self.reactions.apply(&pending, res))
    }

    /// Posts a comment, or a reply if `parent_id` is set. Returns the id of the new
    /// comment, or `None` if the server could not be reached or refused it.
    pub async fn reply<R, S>(
        &mut self,
        remote: &R,
        store: &mut AppStore<S>,
        content: &str,
        parent_id: Option<CommentId>,
    ) -> Result<Option<CommentId>, Error>
    where
        R: Remote + ?Sized,
        S: KeyValueStore,
    {
        let new = self
            .discussion
            .compose(content, parent_id, store.viewer())
            .map_err(|e| refuse(store, e))?;
        match remote.post_comment(self.target, new).await {
            Ok(c) => {
                let id = c.id;
                self.apply_posted(c, store.viewer());
                Ok(Some(id))
            }
            Err(err) => {
                tracing::error!(?err, target = %self.target, "failed posting comment");
                store.notify(Level::Error, err.user_message());
                Ok(None)
            }
        }
    }
}

fn refuse<S: KeyValueStore>(store: &mut AppStore<S>, e: Error) -> Error {
    store.notify(Level::Warning, e.to_string());
    e
}
