use potluck_client::store::Theme;
use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct SettingsMenuProps {
    pub user: String,
    pub theme: Theme,
    pub on_toggle_theme: Callback<()>,
    pub on_logout: Callback<()>,
}

#[function_component(SettingsMenu)]
pub fn settings_menu(p: &SettingsMenuProps) -> Html {
    let theme_label = match p.theme {
        Theme::Light => "Dark mode",
        Theme::Dark => "Light mode",
    };
    html! {
        <div class="dropdown d-flex justify-content-end">
            <button
                type="button"
                class="btn btn-light m-3 bi-btn bi-person-circle"
                title={ p.user.clone() }
                data-bs-toggle="dropdown"
            >
                { &p.user }
            </button>
            <ul class="dropdown-menu dropdown-menu-dark mt-3">
                <li><a class="dropdown-item" href="#" onclick={p.on_toggle_theme.reform(|e: MouseEvent| e.prevent_default())}>
                    <span class="bi-circle-half me-2" aria-hidden="true"></span>
                    { theme_label }
                </a></li>
                <li><a class="dropdown-item" href="#" onclick={p.on_logout.reform(|e: MouseEvent| e.prevent_default())}>
                    <span class="bi-power me-2" aria-hidden="true"></span>
                    { "Logout" }
                </a></li>
            </ul>
        </div>
    }
}
