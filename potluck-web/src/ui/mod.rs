mod app;
pub use app::{App, AppMsg};

mod comment_box;
pub use comment_box::CommentBox;

mod comment_thread;
pub use comment_thread::CommentThread;

mod like_button;
pub use like_button::{LikeButton, LikeState};

mod login;
pub use login::{Login, LoginInfo};

mod notification_banner;
pub use notification_banner::NotificationBanner;

mod reaction_bar;
pub use reaction_bar::{ReactionBar, PALETTE};

mod settings_menu;
pub use settings_menu::SettingsMenu;
