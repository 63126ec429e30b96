use crate::{
    api::{Comment, CommentId, NewComment, Target, UserId},
    thread::{self, ThreadNode, ThreadOrder},
    Error,
};

/// Identifies one fetch of a discussion, so that late answers to older fetches can be
/// told apart from the latest one
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FetchToken(u64);

/// Acknowledges the latest comment the server accepted, so that the box it was typed in
/// knows it can be emptied. `seq` changes on every acknowledgement.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PostReceipt {
    pub seq: u64,
    pub parent_id: Option<CommentId>,
}

/// The comments or reviews of one blog post or recipe
#[derive(Clone, Debug)]
pub struct Discussion {
    target: Target,
    order: ThreadOrder,
    records: Vec<Comment>,
    forest: Vec<ThreadNode<Comment>>,
    next_fetch: u64,
    latest_fetch: Option<u64>,
    loaded: bool,
    last_post: Option<PostReceipt>,
}

impl Discussion {
    /// Picks the thread ordering matching the kind of target
    pub fn new(target: Target) -> Discussion {
        let order = match target {
            Target::Blog(_) => ThreadOrder::blog_comments(),
            _ => ThreadOrder::recipe_reviews(),
        };
        Discussion::with_order(target, order)
    }

    pub fn with_order(target: Target, order: ThreadOrder) -> Discussion {
        Discussion {
            target,
            order,
            records: Vec::new(),
            forest: Vec::new(),
            next_fetch: 0,
            latest_fetch: None,
            loaded: false,
            last_post: None,
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn records(&self) -> &[Comment] {
        &self.records
    }

    pub fn forest(&self) -> &[ThreadNode<Comment>] {
        &self.forest
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Latest post the server accepted, if any. Failed posts never change it, so the
    /// text they were typed from stays around for another try.
    pub fn last_post(&self) -> Option<PostReceipt> {
        self.last_post
    }

    pub fn begin_fetch(&mut self) -> FetchToken {
        let tok = self.next_fetch;
        self.next_fetch += 1;
        self.latest_fetch = Some(tok);
        FetchToken(tok)
    }

    /// Replaces the discussion with the fetched records, unless a more recent fetch was
    /// started since. Returns whether the records were used.
    pub fn receive(&mut self, token: FetchToken, records: Vec<Comment>) -> bool {
        if self.latest_fetch != Some(token.0) {
            tracing::debug!(target = %self.target, ?token, "dropping stale discussion fetch");
            return false;
        }
        self.latest_fetch = None;
        self.records = records;
        self.loaded = true;
        self.rebuild();
        true
    }

    /// Checks a comment or reply before it is sent. Posting is not optimistic: the
    /// comment only shows up once the server returns it, through `posted`.
    pub fn compose(
        &self,
        content: &str,
        parent_id: Option<CommentId>,
        viewer: Option<UserId>,
    ) -> Result<NewComment, Error> {
        if viewer.is_none() {
            return Err(Error::LoginRequired);
        }
        if !self.target.accepts_comments() {
            return Err(Error::Unsupported);
        }
        if let Some(parent_id) = parent_id {
            if !self.records.iter().any(|c| c.id == parent_id) {
                return Err(Error::UnknownParent(parent_id));
            }
        }
        let c = NewComment {
            content: String::from(content.trim()),
            media: None,
            parent_id,
        };
        c.validate()?;
        Ok(c)
    }

    pub fn posted(&mut self, c: Comment) {
        self.last_post = Some(PostReceipt {
            seq: self.last_post.map_or(0, |r| r.seq + 1),
            parent_id: c.parent_id,
        });
        if self.records.iter().any(|r| r.id == c.id) {
            tracing::debug!(id = ?c.id, "posted comment already known");
            return;
        }
        self.records.push(c);
        self.rebuild();
    }

    pub fn find(&self, id: &CommentId) -> Option<&ThreadNode<Comment>> {
        thread::find_in(&self.forest, id)
    }

    fn rebuild(&mut self) {
        self.forest = thread::build_forest(&self.records, &self.order);
    }
}
