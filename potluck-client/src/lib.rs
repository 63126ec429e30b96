mod error;
pub use error::{Error, RemoteError};

mod http;
pub use http::{HttpRemote, MAX_RETRIES};

pub mod discussion;
pub mod interaction;
pub mod notification;
pub mod reaction;
pub mod store;
pub mod thread;

mod remote;
pub use remote::Remote;

mod view;
pub use view::TargetView;

pub mod api {
    pub use potluck_api::*;
}

pub mod prelude {
    pub use crate::{
        discussion::Discussion,
        interaction::{Interactions, Settlement, ToggleState},
        notification::Level,
        reaction::{ReactionOutcome, Reactions},
        store::{AppStore, KeyValueStore, Theme},
        thread::{ThreadNode, ThreadOrder},
        Remote, TargetView,
    };
}
