use yew::prelude::*;

/// Emoji offered to the user. Reactions picked by others may still use any emoji.
pub const PALETTE: [&str; 6] = ["👍", "❤️", "😋", "🔥", "😮", "😢"];

#[derive(Clone, PartialEq, Properties)]
pub struct ReactionBarProps {
    pub counts: Vec<(String, usize)>,
    pub mine: Option<String>,
    pub pending: bool,
    pub on_react: Callback<String>,
}

#[function_component(ReactionBar)]
pub fn reaction_bar(p: &ReactionBarProps) -> Html {
    let count_of = |emoji: &str| {
        p.counts
            .iter()
            .find(|(e, _)| e == emoji)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    };
    let others = p
        .counts
        .iter()
        .filter(|(e, _)| !PALETTE.contains(&e.as_str()))
        .map(|(e, _)| e.as_str());
    let button = |emoji: &str| {
        let is_mine = p.mine.as_deref() == Some(emoji);
        let count = count_of(emoji);
        let on_click = {
            let emoji = String::from(emoji);
            p.on_react.reform(move |_| emoji.clone())
        };
        html! {
            <button
                type="button"
                class={ classes!("btn", "btn-sm", "reaction", is_mine.then_some("active")) }
                aria-pressed={ if is_mine { "true" } else { "false" } }
                disabled={ p.pending }
                onclick={ on_click }
            >
                { emoji }
                { for (count > 0).then(|| html! { <span class="ms-1">{ count }</span> }) }
            </button>
        }
    };
    html! {
        <div class="reaction-bar d-flex gap-1" aria-busy={ if p.pending { "true" } else { "false" } }>
            { for PALETTE.iter().map(|e| button(e)) }
            { for others.map(|e| button(e)) }
        </div>
    }
}
