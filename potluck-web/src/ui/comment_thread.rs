use std::{collections::HashMap, rc::Rc};

use potluck_client::{
    api::{Comment, CommentId, InteractionKind},
    discussion::PostReceipt,
    thread::{ThreadNode, MAX_DEPTH},
};
use yew::prelude::*;

use crate::ui;

#[derive(Clone, PartialEq, Properties)]
pub struct CommentThreadProps {
    pub node: ThreadNode<Comment>,
    pub likes: Rc<HashMap<CommentId, ui::LikeState>>,
    pub can_reply: bool,
    pub posting: bool,
    pub last_post: Option<PostReceipt>,
    pub depth: usize,
    pub on_like: Callback<CommentId>,
    pub on_reply: Callback<(String, Option<CommentId>)>,
}

/// A comment along with all of its replies, recursively. Forests never nest deeper than
/// `MAX_DEPTH`, which bounds the recursion.
#[function_component(CommentThread)]
pub fn comment_thread(p: &CommentThreadProps) -> Html {
    let replying = use_state(|| false);
    let c = &p.node.record;
    let id = c.id;
    let likes = p.likes.get(&id).copied().unwrap_or_default();

    {
        let replying = replying.clone();
        use_effect_with_deps(
            move |last_post| {
                if last_post.map(|r| r.parent_id) == Some(Some(id)) {
                    replying.set(false);
                }
                || ()
            },
            p.last_post,
        );
    }
    let on_reply = p.on_reply.reform(move |content| (content, Some(id)));
    let toggle_reply = {
        let replying = replying.clone();
        Callback::from(move |_: MouseEvent| replying.set(!*replying))
    };

    html! {
        <li class="comment list-group-item">
            <div class="comment-meta text-muted small">
                { c.created_at.format("%Y-%m-%d %H:%M").to_string() }
            </div>
            <div class="comment-content">{ &c.content }</div>
            { for c.media.as_ref().map(|m| html! {
                <img class="comment-media img-fluid" src={ m.clone() } alt="" />
            }) }
            <div class="d-flex gap-2">
                <ui::LikeButton
                    kind={ InteractionKind::Like }
                    state={ likes }
                    on_click={ p.on_like.reform(move |_| id) }
                />
                { for p.can_reply.then(|| html! {
                    <button type="button" class="btn btn-sm btn-link" onclick={ toggle_reply }>
                        { if *replying { "Cancel" } else { "Reply" } }
                    </button>
                }) }
            </div>
            { for (*replying).then(|| html! {
                <ui::CommentBox placeholder="Your reply" disabled={ p.posting } on_submit={ on_reply } />
            }) }
            { for (!p.node.children.is_empty() && p.depth < MAX_DEPTH).then(|| html! {
                <ul class="replies list-group ms-4">
                    { for p.node.children.iter().map(|child| html! {
                        <CommentThread
                            key={ child.record.id.0.to_string() }
                            node={ child.clone() }
                            likes={ p.likes.clone() }
                            can_reply={ p.can_reply }
                            posting={ p.posting }
                            last_post={ p.last_post }
                            depth={ p.depth + 1 }
                            on_like={ p.on_like.clone() }
                            on_reply={ p.on_reply.clone() }
                        />
                    }) }
                </ul>
            }) }
        </li>
    }
}
