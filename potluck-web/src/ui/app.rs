use std::{collections::HashMap, rc::Rc};

use potluck_client::{
    api::{
        Comment, CommentId, InteractionKind, NewSession, Reaction, Session, Target, TargetSummary,
        Toggled,
    },
    discussion::FetchToken,
    interaction::PendingToggle,
    notification::Level,
    reaction::PendingReaction,
    store::{AppStore, Theme},
    HttpRemote, Remote, RemoteError, TargetView,
};
use wasm_bindgen::{closure::Closure, JsCast};
use yew::prelude::*;

use crate::{storage::BrowserStorage, ui, util};

pub enum AppMsg {
    Login(ui::LoginInfo),
    LoggedIn(String, Session),
    LoginFailed(RemoteError),
    Logout,
    ToggleTheme,
    HashChanged,
    Dismiss(u64),

    // Every answer carries the generation of the view it was sent for, so that answers
    // arriving after the user navigated away are dropped
    Fetched(u64, FetchToken, Result<(TargetSummary, Vec<Comment>), RemoteError>),
    Toggle(InteractionKind, Target),
    Toggled(u64, PendingToggle, Result<Option<Toggled>, RemoteError>),
    React(String),
    Reacted(u64, PendingReaction, Result<Vec<Reaction>, RemoteError>),
    Post(String, Option<CommentId>),
    Posted(u64, Result<Comment, RemoteError>),
}

pub struct App {
    store: AppStore<BrowserStorage>,
    remote: Option<HttpRemote>,
    view: Option<TargetView>,
    generation: u64,
    posting: bool,
    _on_hash_change: Option<Closure<dyn Fn()>>,
}

impl App {
    fn set_view(&mut self, target: Option<Target>) {
        self.generation += 1;
        self.posting = false;
        self.view = target.map(TargetView::new);
    }

    fn refresh(&mut self, ctx: &Context<Self>) {
        let (remote, view) = match (&self.remote, &mut self.view) {
            (Some(remote), Some(view)) => (remote.clone(), view),
            _ => return,
        };
        let token = view.discussion_mut().begin_fetch();
        let target = view.target();
        let generation = self.generation;
        ctx.link().send_future(async move {
            let res = async {
                let summary = remote.fetch_summary(target).await?;
                let comments = remote.fetch_comments(target).await?;
                Ok::<_, RemoteError>((summary, comments))
            }
            .await;
            AppMsg::Fetched(generation, token, res)
        });
    }

    fn view_target(&self, ctx: &Context<Self>, view: &TargetView) -> Html {
        let target = view.target();
        let viewer = self.store.viewer();
        let interactions = view.interactions();
        let like_state = |kind, target: &Target| ui::LikeState {
            state: interactions.get(kind, target),
            pending: interactions.is_pending(kind, target),
        };

        let bookmark = InteractionKind::Bookmark.applies_to(&target).then(|| html! {
            <ui::LikeButton
                kind={ InteractionKind::Bookmark }
                state={ like_state(InteractionKind::Bookmark, &target) }
                on_click={ ctx.link().callback(move |_| AppMsg::Toggle(InteractionKind::Bookmark, target)) }
            />
        });

        let reactions = target.accepts_reactions().then(|| {
            let set = view.reactions().get(&target);
            let counts = set
                .map(|s| {
                    s.counts()
                        .into_iter()
                        .map(|(e, n)| (String::from(e), n))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            let mine = match (set, viewer) {
                (Some(s), Some(v)) => s.reaction_of(&v).map(String::from),
                _ => None,
            };
            html! {
                <ui::ReactionBar
                    { counts }
                    { mine }
                    pending={ view.reactions().is_pending(&target) }
                    on_react={ ctx.link().callback(AppMsg::React) }
                />
            }
        });

        let discussion = view.discussion();
        let likes = Rc::new(
            discussion
                .records()
                .iter()
                .map(|c| (c.id, like_state(InteractionKind::Like, &Target::Comment(c.id))))
                .collect::<HashMap<_, _>>(),
        );
        let (title, placeholder) = match target {
            Target::Blog(_) => ("Comments", "Leave a comment"),
            _ => ("Reviews", "Write a review"),
        };
        let on_reply = ctx
            .link()
            .callback(|(content, parent)| AppMsg::Post(content, parent));

        html! {
            <article class="target-page">
                <div class="d-flex gap-2 align-items-center my-3">
                    <ui::LikeButton
                        kind={ InteractionKind::Like }
                        state={ like_state(InteractionKind::Like, &target) }
                        on_click={ ctx.link().callback(move |_| AppMsg::Toggle(InteractionKind::Like, target)) }
                    />
                    { for bookmark }
                    { for reactions }
                </div>
                <h2>{ title }</h2>
                { for viewer.map(|_| html! {
                    <ui::CommentBox
                        { placeholder }
                        disabled={ self.posting }
                        clear_on={ discussion.last_post().filter(|r| r.parent_id.is_none()).map(|r| r.seq) }
                        on_submit={ ctx.link().callback(|content| AppMsg::Post(content, None)) }
                    />
                }) }
                if !discussion.is_loaded() {
                    <p class="text-muted">{ "Loading..." }</p>
                } else if discussion.forest().is_empty() {
                    <p class="text-muted">{ "Nothing here yet." }</p>
                }
                <ul class="list-group">
                    { for discussion.forest().iter().map(|node| html! {
                        <ui::CommentThread
                            key={ node.record.id.0.to_string() }
                            node={ node.clone() }
                            likes={ likes.clone() }
                            can_reply={ viewer.is_some() }
                            posting={ self.posting }
                            last_post={ discussion.last_post() }
                            depth={ 0 }
                            on_like={ ctx.link().callback(|id| AppMsg::Toggle(InteractionKind::Like, Target::Comment(id))) }
                            on_reply={ on_reply.clone() }
                        />
                    }) }
                </ul>
            </article>
        }
    }
}

fn listen_hash_change(ctx: &Context<App>) -> Option<Closure<dyn Fn()>> {
    let window = web_sys::window()?;
    let link = ctx.link().clone();
    let closure = Closure::<dyn Fn()>::new(move || link.send_message(AppMsg::HashChanged));
    window.set_onhashchange(Some(closure.as_ref().unchecked_ref()));
    Some(closure)
}

impl Component for App {
    type Message = AppMsg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let store = AppStore::hydrate(BrowserStorage);
        let remote = store
            .host()
            .map(|h| HttpRemote::new(String::from(h), store.session().map(|s| s.token)));
        let mut this = App {
            store,
            remote,
            view: util::target_from_hash().map(TargetView::new),
            generation: 0,
            posting: false,
            _on_hash_change: listen_hash_change(ctx),
        };
        this.refresh(ctx);
        this
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let viewer = self.store.viewer();
        match msg {
            AppMsg::Login(info) => {
                let remote = HttpRemote::new(info.host.clone(), None);
                ctx.link().send_future(async move {
                    let session = NewSession {
                        user: info.user,
                        password: info.pass,
                    };
                    match remote.auth(&session).await {
                        Ok(session) => AppMsg::LoggedIn(info.host, session),
                        Err(err) => AppMsg::LoginFailed(err),
                    }
                });
                return false;
            }
            AppMsg::LoggedIn(host, session) => {
                tracing::info!(user = %session.name, "logged in");
                self.remote = Some(HttpRemote::new(host.clone(), Some(session.token)));
                self.store.login(host, session);
                // like states depend on who is looking
                self.set_view(self.view.as_ref().map(|v| v.target()));
                self.refresh(ctx);
            }
            AppMsg::LoginFailed(err) => {
                tracing::warn!(?err, "login failed");
                self.store.notify(Level::Error, err.user_message());
            }
            AppMsg::Logout => {
                self.store.logout();
                self.remote = self
                    .store
                    .host()
                    .map(|h| HttpRemote::new(String::from(h), None));
                self.set_view(self.view.as_ref().map(|v| v.target()));
                self.refresh(ctx);
            }
            AppMsg::ToggleTheme => self.store.set_theme(self.store.theme().toggled()),
            AppMsg::HashChanged => {
                let target = util::target_from_hash();
                if target == self.view.as_ref().map(|v| v.target()) {
                    return false;
                }
                self.set_view(target);
                self.refresh(ctx);
            }
            AppMsg::Dismiss(id) => self.store.dismiss(id),
            AppMsg::Fetched(generation, _, _) | AppMsg::Toggled(generation, _, _)
            | AppMsg::Reacted(generation, _, _) | AppMsg::Posted(generation, _)
                if generation != self.generation =>
            {
                tracing::debug!(generation, current = self.generation, "dropping answer for previous page");
                return false;
            }
            AppMsg::Fetched(_, token, res) => match (res, &mut self.view) {
                (Ok((summary, comments)), Some(view)) => {
                    if view.apply_comments(token, comments, viewer) {
                        view.apply_summary(summary);
                    }
                }
                (Ok(_), None) => (),
                (Err(err), _) => {
                    tracing::error!(?err, "failed loading page");
                    self.store.notify(Level::Error, err.user_message());
                }
            },
            AppMsg::Toggle(kind, target) => {
                let (remote, view) = match (&self.remote, &mut self.view) {
                    (Some(remote), Some(view)) => (remote.clone(), view),
                    _ => return false,
                };
                match view.interactions_mut().toggle(kind, target, viewer) {
                    Ok(pending) => {
                        let generation = self.generation;
                        ctx.link().send_future(async move {
                            let res = remote.toggle_interaction(kind, target).await;
                            AppMsg::Toggled(generation, pending, res)
                        });
                    }
                    Err(e) => {
                        self.store.notify(Level::Warning, e.to_string());
                    }
                }
            }
            AppMsg::Toggled(_, pending, res) => {
                if let Err(err) = &res {
                    self.store.notify(Level::Error, err.user_message());
                }
                if let Some(view) = &mut self.view {
                    view.interactions_mut().settle(&pending, &res);
                }
            }
            AppMsg::React(emoji) => {
                let (remote, view) = match (&self.remote, &mut self.view) {
                    (Some(remote), Some(view)) => (remote.clone(), view),
                    _ => return false,
                };
                let target = view.target();
                match view.reactions_mut().request(target, &emoji, viewer) {
                    Ok(pending) => {
                        let generation = self.generation;
                        ctx.link().send_future(async move {
                            let res = remote
                                .toggle_reaction(pending.target, pending.request.clone())
                                .await;
                            AppMsg::Reacted(generation, pending, res)
                        });
                    }
                    Err(e) => {
                        self.store.notify(Level::Warning, e.to_string());
                    }
                }
            }
            AppMsg::Reacted(_, pending, res) => {
                if let Err(err) = &res {
                    self.store.notify(Level::Error, err.user_message());
                }
                if let Some(view) = &mut self.view {
                    view.reactions_mut().apply(&pending, res);
                }
            }
            AppMsg::Post(content, parent_id) => {
                let (remote, view) = match (&self.remote, &self.view) {
                    (Some(remote), Some(view)) => (remote.clone(), view),
                    _ => return false,
                };
                let target = view.target();
                match view.discussion().compose(&content, parent_id, viewer) {
                    Ok(new) => {
                        self.posting = true;
                        let generation = self.generation;
                        ctx.link().send_future(async move {
                            let res = remote.post_comment(target, new).await;
                            AppMsg::Posted(generation, res)
                        });
                    }
                    Err(e) => {
                        self.store.notify(Level::Warning, e.to_string());
                    }
                }
            }
            AppMsg::Posted(_, res) => {
                self.posting = false;
                match (res, &mut self.view) {
                    (Ok(c), Some(view)) => view.apply_posted(c, viewer),
                    (Ok(_), None) => (),
                    (Err(err), _) => {
                        tracing::error!(?err, "failed posting comment");
                        self.store.notify(Level::Error, err.user_message());
                    }
                }
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let theme = match self.store.theme() {
            Theme::Light => "theme-light",
            Theme::Dark => "theme-dark",
        };
        let header = match self.store.session() {
            Some(session) => html! {
                <ui::SettingsMenu
                    user={ session.name.clone() }
                    theme={ self.store.theme() }
                    on_toggle_theme={ ctx.link().callback(|_| AppMsg::ToggleTheme) }
                    on_logout={ ctx.link().callback(|_| AppMsg::Logout) }
                />
            },
            None => html! {
                <ui::Login
                    host={ self.store.host().map(String::from) }
                    on_submit={ ctx.link().callback(AppMsg::Login) }
                />
            },
        };
        let page = match (&self.remote, &self.view) {
            (_, None) => html! {
                <p class="text-muted my-4">{ "Open a link to a blog post or recipe to see its discussion." }</p>
            },
            (None, Some(_)) => html! {
                <p class="text-muted my-4">{ "Log in to a server to load this page." }</p>
            },
            (Some(_), Some(view)) => self.view_target(ctx, view),
        };
        html! {
            <div class={ classes!("container", theme) }>
                <ui::NotificationBanner
                    notifications={ self.store.notifications().cloned().collect::<Vec<_>>() }
                    on_dismiss={ ctx.link().callback(AppMsg::Dismiss) }
                />
                { header }
                { page }
            </div>
        }
    }
}
