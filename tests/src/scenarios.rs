use futures::executor::block_on;
use potluck_client::{
    api::{CommentId, InteractionKind, Reaction, Target, Uuid},
    interaction::{Settlement, ToggleState},
    notification::Level,
    reaction::ReactionOutcome,
    thread, Error, Remote, TargetView,
};
use potluck_mock_server::MockRemote;

use crate::Fixture;

fn loaded_view(f: &Fixture, target: Target) -> TargetView {
    let mut view = TargetView::new(target);
    block_on(view.refresh(&f.remote(), &mut f.store())).unwrap();
    view
}

fn page_likes(view: &TargetView) -> Option<ToggleState> {
    view.interactions()
        .get(InteractionKind::Like, &view.target())
}

#[test]
fn like_is_shown_and_kept() {
    let f = Fixture::new();
    let mut store = f.store();
    let mut view = loaded_view(&f, f.blog);
    assert_eq!(page_likes(&view), Some(ToggleState::default()));

    let res = block_on(view.toggle(&f.remote(), &mut store, InteractionKind::Like, f.blog));
    assert_eq!(res, Ok(Settlement::Confirmed));
    assert_eq!(
        page_likes(&view),
        Some(ToggleState {
            active: true,
            count: 1
        })
    );
    assert_eq!(f.server.lock().test_count(InteractionKind::Like, f.blog), 1);
    assert_eq!(store.notifications().count(), 0);

    let res = block_on(view.toggle(&f.remote(), &mut store, InteractionKind::Like, f.blog));
    assert_eq!(res, Ok(Settlement::Confirmed));
    assert_eq!(page_likes(&view), Some(ToggleState::default()));
    assert_eq!(f.server.lock().test_count(InteractionKind::Like, f.blog), 0);
}

#[test]
fn failed_like_rolls_back_and_notifies() {
    let f = Fixture::new();
    let (_, other) = f.other_user("gusteau");
    block_on(other.toggle_interaction(InteractionKind::Like, f.recipe)).unwrap();

    let mut store = f.store();
    let mut view = loaded_view(&f, f.recipe);
    let before = ToggleState {
        active: false,
        count: 1,
    };
    assert_eq!(page_likes(&view), Some(before));

    let remote = f.remote();
    remote.fail_next(1);
    let res = block_on(view.toggle(&remote, &mut store, InteractionKind::Like, f.recipe));
    assert_eq!(res, Ok(Settlement::RolledBack(before)));
    assert_eq!(page_likes(&view), Some(before));
    assert!(!view.interactions().is_pending(InteractionKind::Like, &f.recipe));

    let notifs = store.notifications().collect::<Vec<_>>();
    assert_eq!(notifs.len(), 1);
    assert_eq!(notifs[0].level, Level::Error);
    assert_eq!(f.server.lock().test_count(InteractionKind::Like, f.recipe), 1);
}

#[test]
fn authoritative_answer_wins() {
    let f = Fixture::new();
    let mut store = f.store();
    let mut view = loaded_view(&f, f.recipe);

    // someone else bookmarks after our page was loaded
    let (_, other) = f.other_user("linguini");
    block_on(other.toggle_interaction(InteractionKind::Bookmark, f.recipe)).unwrap();

    let remote = f.remote().authoritative(true);
    let res = block_on(view.toggle(&remote, &mut store, InteractionKind::Bookmark, f.recipe));
    let server = ToggleState {
        active: true,
        count: 2,
    };
    assert_eq!(res, Ok(Settlement::Reconciled(server)));
    assert_eq!(
        view.interactions()
            .get(InteractionKind::Bookmark, &f.recipe),
        Some(server)
    );
}

#[test]
fn anonymous_visitors_cannot_act() {
    let f = Fixture::new();
    let mut store = f.anonymous_store();
    let remote = f.anonymous_remote();
    let mut view = TargetView::new(f.blog);
    block_on(view.refresh(&remote, &mut store)).unwrap();

    let res = block_on(view.toggle(&remote, &mut store, InteractionKind::Like, f.blog));
    assert_eq!(res, Err(Error::LoginRequired));
    assert_eq!(page_likes(&view), Some(ToggleState::default()));
    let res = block_on(view.react(&remote, &mut store, "🔥"));
    assert_eq!(res, Err(Error::LoginRequired));
    let res = block_on(view.reply(&remote, &mut store, "First!", None));
    assert_eq!(res, Err(Error::LoginRequired));

    assert!(store.notifications().all(|n| n.level == Level::Warning));
    assert_eq!(store.notifications().count(), 3);
    assert_eq!(f.server.lock().test_count(InteractionKind::Like, f.blog), 0);
}

#[test]
fn bookmarking_comments_is_refused_locally() {
    let f = Fixture::new();
    let mut store = f.store();
    let mut view = loaded_view(&f, f.blog);
    let id = block_on(view.reply(&f.remote(), &mut store, "Great post", None))
        .unwrap()
        .unwrap();
    let res = block_on(view.toggle(
        &f.remote(),
        &mut store,
        InteractionKind::Bookmark,
        Target::Comment(id),
    ));
    assert_eq!(res, Err(Error::Unsupported));
}

#[test]
fn reactions_follow_the_server() {
    let f = Fixture::new();
    let (other_session, other) = f.other_user("anton");
    let mut store = f.store();
    let mut view = loaded_view(&f, f.blog);

    // not seen locally until the next answer from the server
    block_on(other.toggle_reaction(
        f.blog,
        potluck_client::api::ReactionToggle {
            emoji: String::from("😮"),
        },
    ))
    .unwrap();
    assert!(view.reactions().get(&f.blog).unwrap().is_empty());

    let res = block_on(view.react(&f.remote(), &mut store, "😋"));
    assert_eq!(res, Ok(ReactionOutcome::Replaced));
    let set = view.reactions().get(&f.blog).unwrap();
    assert_eq!(
        set.reactions(),
        &[
            Reaction {
                user_id: other_session.user_id,
                emoji: String::from("😮"),
            },
            Reaction {
                user_id: f.session.user_id,
                emoji: String::from("😋"),
            },
        ]
    );
    assert_eq!(set.reaction_of(&f.session.user_id), Some("😋"));

    // picking another emoji replaces ours
    block_on(view.react(&f.remote(), &mut store, "😮")).unwrap();
    let set = view.reactions().get(&f.blog).unwrap();
    assert_eq!(set.counts(), vec![("😮", 2)]);

    // and picking it again removes it
    block_on(view.react(&f.remote(), &mut store, "😮")).unwrap();
    let set = view.reactions().get(&f.blog).unwrap();
    assert_eq!(set.counts(), vec![("😮", 1)]);
    assert_eq!(set.reaction_of(&f.session.user_id), None);
}

#[test]
fn failed_reaction_changes_nothing() {
    let f = Fixture::new();
    let mut store = f.store();
    let mut view = loaded_view(&f, f.blog);
    block_on(view.react(&f.remote(), &mut store, "👍")).unwrap();
    let before = view.reactions().get(&f.blog).cloned();

    let remote = f.remote();
    remote.fail_next(1);
    let res = block_on(view.react(&remote, &mut store, "🔥"));
    assert_eq!(res, Ok(ReactionOutcome::Failed));
    assert_eq!(view.reactions().get(&f.blog).cloned(), before);
    assert!(!view.reactions().is_pending(&f.blog));
    assert_eq!(store.notifications().count(), 1);
}

#[test]
fn recipes_take_no_reactions() {
    let f = Fixture::new();
    let mut store = f.store();
    let mut view = loaded_view(&f, f.recipe);
    let res = block_on(view.react(&f.remote(), &mut store, "👍"));
    assert_eq!(res, Err(Error::Unsupported));
    assert!(view.reactions().get(&f.recipe).is_none());
}

#[test]
fn replies_nest_under_their_parent() {
    let f = Fixture::new();
    let mut store = f.store();
    let remote = f.remote();
    let mut view = loaded_view(&f, f.recipe);

    let root = block_on(view.reply(&remote, &mut store, "Made it twice, delicious", None))
        .unwrap()
        .unwrap();
    let reply = block_on(view.reply(&remote, &mut store, "  What flour did you use?  ", Some(root)))
        .unwrap()
        .unwrap();
    let nested = block_on(view.reply(&remote, &mut store, "Type 55", Some(reply)))
        .unwrap()
        .unwrap();

    let forest = view.discussion().forest();
    assert_eq!(forest.len(), 1);
    assert_eq!(thread::count_nodes(forest), 3);
    let depths = thread::depth_first(forest)
        .map(|(d, n)| (d, n.record.id))
        .collect::<Vec<_>>();
    assert_eq!(depths, vec![(0, root), (1, reply), (2, nested)]);
    assert_eq!(
        view.discussion().find(&reply).unwrap().record.content,
        "What flour did you use?"
    );

    // a fresh page load sees the same tree
    let reloaded = loaded_view(&f, f.recipe);
    assert_eq!(reloaded.discussion().forest(), forest);
}

#[test]
fn replying_to_unknown_comment_is_refused() {
    let f = Fixture::new();
    let mut store = f.store();
    let mut view = loaded_view(&f, f.blog);
    let ghost = CommentId(Uuid::new_v4());
    let res = block_on(view.reply(&f.remote(), &mut store, "Hello?", Some(ghost)));
    assert_eq!(res, Err(Error::UnknownParent(ghost)));
    let res = block_on(view.reply(&f.remote(), &mut store, " \n ", None));
    assert!(matches!(res, Err(Error::Invalid(_))));
    assert!(f.server.lock().comments(f.blog).unwrap().is_empty());
}

#[test]
fn failed_post_is_not_shown() {
    let f = Fixture::new();
    let mut store = f.store();
    let remote = f.remote();
    let mut view = loaded_view(&f, f.blog);
    remote.fail_next(1);
    let res = block_on(view.reply(&remote, &mut store, "Lost in the void", None));
    assert_eq!(res, Ok(None));
    assert!(view.discussion().records().is_empty());
    assert_eq!(store.notifications().count(), 1);
    // not acknowledged, so the comment box keeps the text for a retry
    assert_eq!(view.discussion().last_post(), None);

    let res = block_on(view.reply(&remote, &mut store, "Lost in the void", None));
    assert!(matches!(res, Ok(Some(_))));
    assert_eq!(view.discussion().last_post().map(|r| r.parent_id), Some(None));
}

#[test]
fn blog_comments_are_newest_first() {
    let f = Fixture::new();
    let mut store = f.store();
    let remote = f.remote();
    let mut view = loaded_view(&f, f.blog);
    let first = block_on(view.reply(&remote, &mut store, "first", None)).unwrap().unwrap();
    let second = block_on(view.reply(&remote, &mut store, "second", None)).unwrap().unwrap();
    let r1 = block_on(view.reply(&remote, &mut store, "reply 1", Some(first))).unwrap().unwrap();
    let r2 = block_on(view.reply(&remote, &mut store, "reply 2", Some(first))).unwrap().unwrap();

    let forest = view.discussion().forest();
    let roots = forest.iter().map(|n| n.record.id).collect::<Vec<_>>();
    assert_eq!(roots, vec![second, first]);
    let replies = forest[1]
        .children
        .iter()
        .map(|n| n.record.id)
        .collect::<Vec<_>>();
    assert_eq!(replies, vec![r1, r2]);

    // recipes keep the order the server sent
    let mut view = loaded_view(&f, f.recipe);
    let a = block_on(view.reply(&remote, &mut store, "a", None)).unwrap().unwrap();
    let b = block_on(view.reply(&remote, &mut store, "b", None)).unwrap().unwrap();
    let roots = view
        .discussion()
        .forest()
        .iter()
        .map(|n| n.record.id)
        .collect::<Vec<_>>();
    assert_eq!(roots, vec![a, b]);
}

#[test]
fn orphaned_replies_are_shown_top_level() {
    let f = Fixture::new();
    let comments = crate::random_discussion(&mut rand::thread_rng(), 30, 0.7, 0.2);
    for c in comments.iter().skip(1) {
        f.server.lock().admin_insert_comment(f.blog, c.clone());
    }
    // the first comment was moderated away: its replies now point nowhere
    let view = loaded_view(&f, f.blog);
    let forest = view.discussion().forest();
    assert_eq!(thread::count_nodes(forest), comments.len() - 1);
    for c in comments.iter().skip(1) {
        let shown = view.discussion().find(&c.id).unwrap();
        assert_eq!(shown.record, *c);
    }
}

#[test]
fn comment_likes_come_from_likers() {
    let f = Fixture::new();
    let (_, other) = f.other_user("skinner");
    let mut store = f.store();
    let mut view = loaded_view(&f, f.blog);
    let id = block_on(view.reply(&f.remote(), &mut store, "Bravo", None))
        .unwrap()
        .unwrap();
    block_on(other.toggle_interaction(InteractionKind::Like, Target::Comment(id))).unwrap();

    block_on(view.refresh(&f.remote(), &mut store)).unwrap();
    let target = Target::Comment(id);
    assert_eq!(
        view.interactions().get(InteractionKind::Like, &target),
        Some(ToggleState {
            active: false,
            count: 1
        })
    );
    let res = block_on(view.toggle(&f.remote(), &mut store, InteractionKind::Like, target));
    assert_eq!(res, Ok(Settlement::Confirmed));
    assert_eq!(
        view.interactions().get(InteractionKind::Like, &target),
        Some(ToggleState {
            active: true,
            count: 2
        })
    );
}

#[test]
fn superseded_answers_are_ignored() {
    let f = Fixture::new();
    let mut store = f.store();
    let remote = f.remote();
    let mut view = loaded_view(&f, f.blog);
    let viewer = store.viewer();

    // two toggles fired before either answer arrives
    let first = view
        .interactions_mut()
        .toggle(InteractionKind::Like, f.blog, viewer)
        .unwrap();
    let second = view
        .interactions_mut()
        .toggle(InteractionKind::Like, f.blog, viewer)
        .unwrap();
    assert_eq!(page_likes(&view), Some(ToggleState::default()));

    remote.fail_next(1);
    let first_res = block_on(remote.toggle_interaction(InteractionKind::Like, f.blog));
    let second_res = block_on(remote.toggle_interaction(InteractionKind::Like, f.blog));

    // the first one failing does not undo the second one
    let s = view.interactions_mut().settle(&first, &first_res);
    assert_eq!(s, Settlement::Superseded);
    assert_eq!(page_likes(&view), Some(ToggleState::default()));
    let s = view.interactions_mut().settle(&second, &second_res);
    assert_eq!(s, Settlement::Confirmed);
    assert_eq!(page_likes(&view), Some(ToggleState::default()));

    // in this case local and server state diverged, only a reload brings them back
    assert_eq!(f.server.lock().test_count(InteractionKind::Like, f.blog), 1);
    block_on(view.refresh(&remote, &mut store)).unwrap();
    assert_eq!(
        page_likes(&view),
        Some(ToggleState {
            active: true,
            count: 1
        })
    );
}

#[test]
fn stale_page_loads_are_dropped() {
    let f = Fixture::new();
    let remote = f.remote();
    let store = f.store();
    let mut view = TargetView::new(f.blog);
    let old = view.discussion_mut().begin_fetch();
    let old_comments = block_on(remote.fetch_comments(f.blog)).unwrap();

    let new = view.discussion_mut().begin_fetch();
    f.server
        .lock()
        .post_comment(
            Some(f.session.token),
            f.blog,
            potluck_client::api::NewComment {
                content: String::from("fresh"),
                media: None,
                parent_id: None,
            },
        )
        .unwrap();
    let new_comments = block_on(remote.fetch_comments(f.blog)).unwrap();

    assert!(view.apply_comments(new, new_comments, store.viewer()));
    assert!(!view.apply_comments(old, old_comments, store.viewer()));
    assert_eq!(view.discussion().records().len(), 1);
}

#[test]
fn logout_forgets_the_session() {
    let f = Fixture::new();
    let mut store = f.store();
    let mut view = loaded_view(&f, f.blog);
    block_on(view.toggle(&f.remote(), &mut store, InteractionKind::Like, f.blog)).unwrap();
    store.notify(Level::Info, String::from("welcome back"));

    store.logout();
    view.clear();
    assert_eq!(store.session(), None);
    assert_eq!(store.notifications().count(), 0);
    assert_eq!(page_likes(&view), None);

    let remote: MockRemote = f.anonymous_remote();
    block_on(view.refresh(&remote, &mut store)).unwrap();
    assert_eq!(
        page_likes(&view),
        Some(ToggleState {
            active: false,
            count: 1
        })
    );
}
