//! Drives a page through random sequences of user actions and network failures, checking
//! after each step that what the user sees agrees with the server.

use std::cmp;
use std::ops::RangeTo;

use futures::executor::block_on;
use potluck_client::{
    api::{InteractionKind, Target},
    interaction::ToggleState,
    store::{AppStore, MemoryStore},
    thread, TargetView,
};
use potluck_mock_server::MockRemote;

use crate::Fixture;

const EMOJI: [&str; 4] = ["👍", "😋", "🔥", "😮"];

#[derive(Clone, Debug, bolero::generator::TypeGenerator)]
enum FuzzOp {
    Refresh,
    Toggle {
        bookmark: bool,
    },
    ToggleComment {
        comment: usize,
    },
    React {
        emoji: usize,
    },
    Reply {
        parent: Option<usize>,
        #[generator(bolero::generator::gen_with::<String>().len(0..20usize))]
        content: String,
    },
    FailNext {
        #[generator(1..4usize)]
        calls: usize,
    },
    OtherUserToggles,
}

#[derive(Clone, Debug, bolero::generator::TypeGenerator)]
struct FuzzCase {
    recipe: bool,
    authoritative: bool,
    #[generator(bolero::generator::gen_with::<Vec<FuzzOp>>().len(1..40usize))]
    ops: Vec<FuzzOp>,
}

fn resize_int(fuzz_id: usize, RangeTo { end }: RangeTo<usize>) -> Option<usize> {
    if end == 0 {
        return None;
    }
    let bucket_size = cmp::max(1, usize::MAX / end);
    let id = fuzz_id / bucket_size;
    Some(cmp::min(id, end - 1))
}

struct Fuzzer {
    f: Fixture,
    remote: MockRemote,
    other: MockRemote,
    store: AppStore<MemoryStore>,
    view: TargetView,
}

impl Fuzzer {
    fn new(case: &FuzzCase) -> Fuzzer {
        let f = Fixture::new();
        let remote = f.remote().authoritative(case.authoritative);
        let (_, other) = f.other_user("other");
        let store = f.store();
        let view = TargetView::new(if case.recipe { f.recipe } else { f.blog });
        Fuzzer {
            f,
            remote,
            other,
            store,
            view,
        }
    }

    fn kinds(&self) -> Vec<(InteractionKind, Target)> {
        let page = self.view.target();
        let mut res = vec![(InteractionKind::Like, page), (InteractionKind::Bookmark, page)];
        for c in self.view.discussion().records() {
            res.push((InteractionKind::Like, Target::Comment(c.id)));
        }
        res
    }

    fn execute(&mut self, op: FuzzOp) {
        let page = self.view.target();
        match op {
            FuzzOp::Refresh => {
                let _ = block_on(self.view.refresh(&self.remote, &mut self.store));
            }
            FuzzOp::Toggle { bookmark } => {
                let kind = match bookmark {
                    true => InteractionKind::Bookmark,
                    false => InteractionKind::Like,
                };
                let _ = block_on(self.view.toggle(&self.remote, &mut self.store, kind, page));
            }
            FuzzOp::ToggleComment { comment } => {
                let records = self.view.discussion().records();
                if let Some(i) = resize_int(comment, ..records.len()) {
                    let target = Target::Comment(records[i].id);
                    let _ = block_on(self.view.toggle(
                        &self.remote,
                        &mut self.store,
                        InteractionKind::Like,
                        target,
                    ));
                }
            }
            FuzzOp::React { emoji } => {
                let emoji = EMOJI[emoji % EMOJI.len()];
                let _ = block_on(self.view.react(&self.remote, &mut self.store, emoji));
            }
            FuzzOp::Reply { parent, content } => {
                let records = self.view.discussion().records();
                let parent = parent
                    .and_then(|p| resize_int(p, ..records.len()))
                    .map(|i| records[i].id);
                let _ = block_on(self.view.reply(
                    &self.remote,
                    &mut self.store,
                    &content,
                    parent,
                ));
            }
            FuzzOp::FailNext { calls } => self.remote.fail_next(calls),
            FuzzOp::OtherUserToggles => {
                // invisible to us until the next refresh
                let _ = block_on(potluck_client::Remote::toggle_interaction(
                    &self.other,
                    InteractionKind::Like,
                    page,
                ));
                self.refresh_expected();
            }
        }
    }

    /// Someone else acted, so only a reload can bring us back in sync
    fn refresh_expected(&mut self) {
        self.remote.fail_next(0);
        block_on(self.view.refresh(&self.remote, &mut self.store))
            .expect("refresh without failures");
    }

    fn check(&self) {
        let server = self.f.server.lock();
        let page = self.view.target();

        for (kind, target) in self.kinds() {
            assert!(!self.view.interactions().is_pending(kind, &target));
            let local = match self.view.interactions().get(kind, &target) {
                Some(local) => local,
                None => continue,
            };
            let expected: ToggleState = server
                .summary(Some(self.f.session.token), target)
                .map(|s| match kind {
                    InteractionKind::Like => s.likes,
                    InteractionKind::Bookmark => s.bookmarks,
                })
                .expect("fetching summary from mock server")
                .into();
            assert_eq!(local, expected, "{kind:?} on {target} diverged");
        }

        if let Some(local) = self.view.reactions().get(&page) {
            assert!(!self.view.reactions().is_pending(&page));
            let expected = server
                .summary(Some(self.f.session.token), page)
                .expect("fetching summary from mock server")
                .reactions;
            assert_eq!(local.reactions(), &expected[..]);
        }

        let records = self.view.discussion().records();
        let forest = self.view.discussion().forest();
        assert_eq!(thread::count_nodes(forest), records.len());
        for (depth, node) in thread::depth_first(forest) {
            assert!(depth <= thread::MAX_DEPTH);
            if depth + 1 < thread::MAX_DEPTH {
                for child in &node.children {
                    assert_eq!(child.record.parent_id, Some(node.record.id));
                }
            }
            if depth == 0 {
                assert!(node.record.parent_id.is_none());
            }
        }
        if self.view.discussion().is_loaded() {
            // likes on comments change on the server, the ids and their order do not
            let on_server = server.comments(page).expect("fetching comments from mock server");
            assert!(records.iter().map(|c| c.id).eq(on_server.iter().map(|c| c.id)));
        }
    }
}

#[test]
fn page_agrees_with_server() {
    bolero::check!()
        .with_type::<FuzzCase>()
        .cloned()
        .for_each(|case| {
            let mut fuzzer = Fuzzer::new(&case);
            fuzzer.refresh_expected();
            fuzzer.check();
            for op in case.ops {
                fuzzer.execute(op);
                fuzzer.check();
            }
        })
}
