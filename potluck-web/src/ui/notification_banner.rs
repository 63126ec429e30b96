use potluck_client::notification::{Level, Notification};
use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct NotificationBannerProps {
    pub notifications: Vec<Notification>,
    pub on_dismiss: Callback<u64>,
}

#[function_component(NotificationBanner)]
pub fn notification_banner(p: &NotificationBannerProps) -> Html {
    html! {
        <div class="notification-banner" aria-live="polite">
            { for p.notifications.iter().map(|n| {
                let class = match n.level {
                    Level::Info => "alert-info",
                    Level::Warning => "alert-warning",
                    Level::Error => "alert-danger",
                };
                let id = n.id;
                html! {
                    <div class={ classes!("alert", class, "d-flex", "align-items-center") } role="alert">
                        <div class="flex-fill">{ &n.message }</div>
                        <button
                            type="button"
                            class="btn-close"
                            aria-label="Dismiss"
                            onclick={ p.on_dismiss.reform(move |_| id) }
                        >
                        </button>
                    </div>
                }
            }) }
        </div>
    }
}
