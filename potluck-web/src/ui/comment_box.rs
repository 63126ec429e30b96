use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct CommentBoxProps {
    pub placeholder: AttrValue,
    pub disabled: bool,
    pub on_submit: Callback<String>,
    /// Empties the box whenever it changes to a new `Some`
    #[prop_or_default]
    pub clear_on: Option<u64>,
}

#[function_component(CommentBox)]
pub fn comment_box(p: &CommentBoxProps) -> Html {
    let text = use_state(String::new);
    let on_input = {
        let text = text.clone();
        Callback::from(move |e: InputEvent| {
            let input: web_sys::HtmlTextAreaElement = e.target_unchecked_into();
            text.set(input.value())
        })
    };
    {
        let text = text.clone();
        use_effect_with_deps(
            move |clear_on| {
                if clear_on.is_some() {
                    text.set(String::new());
                }
                || ()
            },
            p.clear_on,
        );
    }
    // the text stays until the post is acknowledged, so a failed post can be retried
    let on_submit = {
        let text = text.clone();
        p.on_submit.reform(move |e: SubmitEvent| {
            e.prevent_default();
            (*text).clone()
        })
    };
    html! {
        <form class="comment-box d-flex gap-2 my-2" onsubmit={ on_submit }>
            <textarea
                class="form-control"
                rows="2"
                placeholder={ p.placeholder.clone() }
                value={ (*text).clone() }
                oninput={ on_input }
            />
            <button
                type="submit"
                class="btn btn-primary"
                disabled={ p.disabled || text.trim().is_empty() }
            >
                { "Send" }
            </button>
        </form>
    }
}
