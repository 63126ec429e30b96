use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use parking_lot::Mutex;
use potluck_client::{
    api::{
        AuthToken, BlogId, Comment, CommentId, Error, InteractionKind, NewComment, NewSession,
        Reaction, ReactionToggle, RecipeId, Session, Target, TargetSummary, Time, Toggled, UserId,
        Uuid,
    },
    Remote, RemoteError,
};

/// In-memory rendition of the backend, with the same observable behavior
pub struct MockServer {
    users: BTreeMap<UserId, DbUser>,
    targets: HashSet<Target>,
    comments: HashMap<Target, Vec<Comment>>,
    interactions: HashMap<(InteractionKind, Target), HashSet<UserId>>,
    reactions: HashMap<Target, Vec<Reaction>>,
    clock: Time,
}

#[derive(Debug)]
struct DbUser {
    name: String,
    pass: String,
    sessions: HashSet<AuthToken>,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            users: BTreeMap::new(),
            targets: HashSet::new(),
            comments: HashMap::new(),
            interactions: HashMap::new(),
            reactions: HashMap::new(),
            clock: Utc
                .timestamp_opt(1_672_531_200, 0)
                .single()
                .unwrap_or_else(Utc::now),
        }
    }

    pub fn admin_create_user(&mut self, name: &str, pass: &str) -> UserId {
        let id = UserId(Uuid::new_v4());
        self.users.insert(
            id,
            DbUser {
                name: String::from(name),
                pass: String::from(pass),
                sessions: HashSet::new(),
            },
        );
        id
    }

    pub fn admin_create_blog(&mut self) -> Target {
        let t = Target::Blog(BlogId(Uuid::new_v4()));
        self.targets.insert(t);
        t
    }

    pub fn admin_create_recipe(&mut self) -> Target {
        let t = Target::Recipe(RecipeId(Uuid::new_v4()));
        self.targets.insert(t);
        t
    }

    /// Stores `c` as-is, without any validation, to simulate inconsistent data
    pub fn admin_insert_comment(&mut self, target: Target, c: Comment) {
        self.targets.insert(Target::Comment(c.id));
        self.comments.entry(target).or_default().push(c);
    }

    /// Number of users currently having `kind` on `target`
    pub fn test_count(&self, kind: InteractionKind, target: Target) -> usize {
        self.interactions
            .get(&(kind, target))
            .map(|u| u.len())
            .unwrap_or(0)
    }

    pub fn auth(&mut self, s: NewSession) -> Result<Session, Error> {
        s.validate()?;
        for (id, u) in self.users.iter_mut() {
            if u.name == s.user {
                if u.pass != s.password {
                    return Err(Error::PermissionDenied);
                }
                let token = AuthToken(Uuid::new_v4());
                u.sessions.insert(token);
                return Ok(Session {
                    token,
                    user_id: *id,
                    name: u.name.clone(),
                });
            }
        }
        Err(Error::PermissionDenied)
    }

    fn resolve(&self, tok: Option<AuthToken>) -> Result<UserId, Error> {
        let tok = tok.ok_or(Error::LoginRequired)?;
        self.users
            .iter()
            .find(|(_, u)| u.sessions.contains(&tok))
            .map(|(id, _)| *id)
            .ok_or(Error::LoginRequired)
    }

    fn check_exists(&self, target: Target) -> Result<(), Error> {
        match self.targets.contains(&target) {
            true => Ok(()),
            false => Err(Error::NotFound(target.uuid())),
        }
    }

    fn toggled(&self, kind: InteractionKind, target: Target, user: Option<UserId>) -> Toggled {
        let users = self.interactions.get(&(kind, target));
        Toggled {
            active: match (users, user) {
                (Some(users), Some(user)) => users.contains(&user),
                _ => false,
            },
            count: users.map(|u| u.len() as u64).unwrap_or(0),
        }
    }

    pub fn summary(&self, tok: Option<AuthToken>, target: Target) -> Result<TargetSummary, Error> {
        self.check_exists(target)?;
        // anonymous visitors may look, they just are not counted as having acted
        let user = self.resolve(tok).ok();
        Ok(TargetSummary {
            likes: self.toggled(InteractionKind::Like, target, user),
            bookmarks: self.toggled(InteractionKind::Bookmark, target, user),
            reactions: self.reactions.get(&target).cloned().unwrap_or_default(),
        })
    }

    pub fn comments(&self, target: Target) -> Result<Vec<Comment>, Error> {
        self.check_exists(target)?;
        Ok(self.comments.get(&target).cloned().unwrap_or_default())
    }

    pub fn post_comment(
        &mut self,
        tok: Option<AuthToken>,
        target: Target,
        c: NewComment,
    ) -> Result<Comment, Error> {
        let author_id = self.resolve(tok)?;
        self.check_exists(target)?;
        if !target.accepts_comments() {
            return Err(Error::Unsupported);
        }
        c.validate()?;
        let siblings = self.comments.entry(target).or_default();
        if let Some(parent_id) = c.parent_id {
            if !siblings.iter().any(|s| s.id == parent_id) {
                return Err(Error::NotFound(parent_id.0));
            }
        }
        self.clock = self.clock + Duration::minutes(1);
        let comment = Comment {
            id: CommentId(Uuid::new_v4()),
            author_id,
            content: c.content,
            media: c.media,
            parent_id: c.parent_id,
            created_at: self.clock,
            liker_ids: HashSet::new(),
        };
        siblings.push(comment.clone());
        self.targets.insert(Target::Comment(comment.id));
        Ok(comment)
    }

    pub fn toggle(
        &mut self,
        tok: Option<AuthToken>,
        kind: InteractionKind,
        target: Target,
    ) -> Result<Toggled, Error> {
        let user = self.resolve(tok)?;
        self.check_exists(target)?;
        if !kind.applies_to(&target) {
            return Err(Error::Unsupported);
        }
        let users = self.interactions.entry((kind, target)).or_default();
        if !users.remove(&user) {
            users.insert(user);
        }
        if let (InteractionKind::Like, Target::Comment(id)) = (kind, target) {
            let users = users.clone();
            for c in self.comments.values_mut().flat_map(|c| c.iter_mut()) {
                if c.id == id {
                    c.liker_ids = users.clone();
                }
            }
        }
        Ok(self.toggled(kind, target, Some(user)))
    }

    /// One reaction per user: picking a new emoji replaces the previous one, picking the
    /// same emoji again removes it
    pub fn toggle_reaction(
        &mut self,
        tok: Option<AuthToken>,
        target: Target,
        r: ReactionToggle,
    ) -> Result<Vec<Reaction>, Error> {
        let user_id = self.resolve(tok)?;
        self.check_exists(target)?;
        if !target.accepts_reactions() {
            return Err(Error::Unsupported);
        }
        r.validate()?;
        let reactions = self.reactions.entry(target).or_default();
        match reactions.iter().position(|x| x.user_id == user_id) {
            Some(i) if reactions[i].emoji == r.emoji => {
                reactions.remove(i);
            }
            Some(i) => reactions[i].emoji = r.emoji,
            None => reactions.push(Reaction {
                user_id,
                emoji: r.emoji,
            }),
        }
        Ok(reactions.clone())
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

/// A `Remote` backed by a shared `MockServer`, able to simulate network failures
#[derive(Clone)]
pub struct MockRemote {
    server: Arc<Mutex<MockServer>>,
    token: Option<AuthToken>,
    failures: Arc<Mutex<usize>>,
    authoritative: bool,
}

impl MockRemote {
    pub fn new(server: Arc<Mutex<MockServer>>, token: Option<AuthToken>) -> MockRemote {
        MockRemote {
            server,
            token,
            failures: Arc::new(Mutex::new(0)),
            authoritative: false,
        }
    }

    /// Whether toggles answer with the resulting aggregate, or with an empty body
    pub fn authoritative(mut self, authoritative: bool) -> MockRemote {
        self.authoritative = authoritative;
        self
    }

    /// The next `n` calls will fail before reaching the server
    pub fn fail_next(&self, n: usize) {
        *self.failures.lock() = n;
    }

    fn transport(&self) -> Result<(), RemoteError> {
        let mut failures = self.failures.lock();
        if *failures > 0 {
            *failures -= 1;
            tracing::debug!(remaining = *failures, "simulating transport failure");
            return Err(RemoteError::Transport(anyhow!("simulated connection failure")));
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl Remote for MockRemote {
    async fn fetch_summary(&self, target: Target) -> Result<TargetSummary, RemoteError> {
        self.transport()?;
        Ok(self.server.lock().summary(self.token, target)?)
    }

    async fn fetch_comments(&self, target: Target) -> Result<Vec<Comment>, RemoteError> {
        self.transport()?;
        Ok(self.server.lock().comments(target)?)
    }

    async fn post_comment(&self, target: Target, c: NewComment) -> Result<Comment, RemoteError> {
        self.transport()?;
        Ok(self.server.lock().post_comment(self.token, target, c)?)
    }

    async fn toggle_interaction(
        &self,
        kind: InteractionKind,
        target: Target,
    ) -> Result<Option<Toggled>, RemoteError> {
        self.transport()?;
        let res = self.server.lock().toggle(self.token, kind, target)?;
        Ok(self.authoritative.then_some(res))
    }

    async fn toggle_reaction(
        &self,
        target: Target,
        r: ReactionToggle,
    ) -> Result<Vec<Reaction>, RemoteError> {
        self.transport()?;
        Ok(self.server.lock().toggle_reaction(self.token, target, r)?)
    }
}
