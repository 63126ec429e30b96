use potluck_client::{api::InteractionKind, interaction::ToggleState};
use yew::prelude::*;

use crate::util;

/// What a like or bookmark button needs to know to render itself
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LikeState {
    /// `None` until the server told us the current count
    pub state: Option<ToggleState>,
    pub pending: bool,
}

#[derive(Clone, PartialEq, Properties)]
pub struct LikeButtonProps {
    pub kind: InteractionKind,
    pub state: LikeState,
    pub on_click: Callback<()>,
}

#[function_component(LikeButton)]
pub fn like_button(p: &LikeButtonProps) -> Html {
    let state = p.state.state.unwrap_or_default();
    let (icon, label) = match (p.kind, state.active) {
        (InteractionKind::Like, true) => ("bi-heart-fill", "Unlike"),
        (InteractionKind::Like, false) => ("bi-heart", "Like"),
        (InteractionKind::Bookmark, true) => ("bi-bookmark-fill", "Remove bookmark"),
        (InteractionKind::Bookmark, false) => ("bi-bookmark", "Bookmark"),
    };
    let count = match p.kind {
        InteractionKind::Like => util::count_label(state.count, "like", "likes"),
        InteractionKind::Bookmark => util::count_label(state.count, "bookmark", "bookmarks"),
    };
    html! {
        <button
            type="button"
            class={ classes!("btn", "btn-sm", "bi-btn", icon, state.active.then_some("active")) }
            aria-label={ label }
            aria-pressed={ if state.active { "true" } else { "false" } }
            aria-busy={ if p.state.pending { "true" } else { "false" } }
            disabled={ p.state.state.is_none() }
            onclick={ p.on_click.reform(|_| ()) }
        >
            <span class="ms-1">{ count }</span>
        </button>
    }
}
