//! Fixtures shared by the end-to-end tests and the test data generator

use std::{collections::HashSet, sync::Arc};

use chrono::{Duration, Utc};
use parking_lot::Mutex;
use potluck_client::{
    api::{Comment, CommentId, NewSession, Session, Target, UserId, Uuid},
    store::{AppStore, MemoryStore},
};
use potluck_mock_server::{MockRemote, MockServer};
use rand::Rng;

#[cfg(test)]
mod fuzz;
#[cfg(test)]
mod scenarios;

pub const TEST_HOST: &str = "http://potluck.test";

/// A mock server with one logged-in user, one blog post and one recipe
pub struct Fixture {
    pub server: Arc<Mutex<MockServer>>,
    pub session: Session,
    pub blog: Target,
    pub recipe: Target,
}

impl Fixture {
    pub fn new() -> Fixture {
        let mut server = MockServer::new();
        let blog = server.admin_create_blog();
        let recipe = server.admin_create_recipe();
        let server = Arc::new(Mutex::new(server));
        let session = login(&server, "colette");
        Fixture {
            server,
            session,
            blog,
            recipe,
        }
    }

    /// Remote acting as the fixture's user
    pub fn remote(&self) -> MockRemote {
        MockRemote::new(self.server.clone(), Some(self.session.token))
    }

    pub fn anonymous_remote(&self) -> MockRemote {
        MockRemote::new(self.server.clone(), None)
    }

    /// Store in which the fixture's user is logged in
    pub fn store(&self) -> AppStore<MemoryStore> {
        let mut store = AppStore::hydrate(MemoryStore::new());
        store.login(String::from(TEST_HOST), self.session.clone());
        store
    }

    pub fn anonymous_store(&self) -> AppStore<MemoryStore> {
        AppStore::hydrate(MemoryStore::new())
    }

    /// Logs in another user, eg. to act concurrently behind the fixture user's back
    pub fn other_user(&self, name: &str) -> (Session, MockRemote) {
        let session = login(&self.server, name);
        let remote = MockRemote::new(self.server.clone(), Some(session.token));
        (session, remote)
    }
}

impl Default for Fixture {
    fn default() -> Fixture {
        Fixture::new()
    }
}

fn login(server: &Mutex<MockServer>, name: &str) -> Session {
    let mut server = server.lock();
    server.admin_create_user(name, "password");
    match server.auth(NewSession {
        user: String::from(name),
        password: String::from("password"),
    }) {
        Ok(session) => session,
        Err(e) => panic!("failed logging in freshly created user {name}: {e}"),
    }
}

/// Generates a flat discussion of `n` records, as the server would send it.
///
/// Each record replies to an earlier one with probability `reply_ratio`. With probability
/// `dangling_ratio` a reply points to a comment that does not exist, as happens when a
/// comment gets moderated away.
pub fn random_discussion(
    rng: &mut impl Rng,
    n: usize,
    reply_ratio: f64,
    dangling_ratio: f64,
) -> Vec<Comment> {
    let authors = (0..5).map(|_| UserId(Uuid::new_v4())).collect::<Vec<_>>();
    let start = Utc::now() - Duration::days(1);
    let mut res: Vec<Comment> = Vec::with_capacity(n);
    for i in 0..n {
        let parent_id = match (i, rng.gen_bool(reply_ratio)) {
            (0, _) | (_, false) => None,
            (_, true) if rng.gen_bool(dangling_ratio) => Some(CommentId(Uuid::new_v4())),
            (_, true) => Some(res[rng.gen_range(0..i)].id),
        };
        let liker_ids = authors
            .iter()
            .filter(|_| rng.gen_bool(0.3))
            .copied()
            .collect::<HashSet<_>>();
        let words = rng.gen_range(3..30);
        res.push(Comment {
            id: CommentId(Uuid::new_v4()),
            author_id: authors[rng.gen_range(0..authors.len())],
            content: lipsum::lipsum_words(words),
            media: None,
            parent_id,
            created_at: start + Duration::minutes(rng.gen_range(0..24 * 60)),
            liker_ids,
        });
    }
    res
}
