//! Application-wide state: the logged-in session, the theme and pending notifications.
//!
//! Nothing here is global. The UI owns one `AppStore` and hands it down, and tests build
//! their own over a `MemoryStore`.

use std::collections::HashMap;

use crate::{
    api::{Session, UserId},
    notification::{Level, Notification, Notifications},
};

const KEY_SESSION: &str = "session";
const KEY_HOST: &str = "host";
const KEY_THEME: &str = "theme";

/// Persistent string storage, eg. the browser's local storage
pub trait KeyValueStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore(HashMap<String, String>);

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: String) {
        self.0.insert(String::from(key), value);
    }

    fn remove(&mut self, key: &str) {
        self.0.remove(key);
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

pub struct AppStore<S> {
    storage: S,
    host: Option<String>,
    session: Option<Session>,
    theme: Theme,
    notifications: Notifications,
}

impl<S: KeyValueStore> AppStore<S> {
    /// Restores whatever was persisted by a previous run
    pub fn hydrate(storage: S) -> AppStore<S> {
        let host = storage.load(KEY_HOST);
        let session = load_json(&storage, KEY_SESSION);
        let theme = load_json(&storage, KEY_THEME).unwrap_or_default();
        tracing::debug!(logged_in = session.is_some(), ?theme, "hydrated app store");
        AppStore {
            storage,
            host,
            session,
            theme,
            notifications: Notifications::default(),
        }
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn viewer(&self) -> Option<UserId> {
        self.session.as_ref().map(|s| s.user_id)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn login(&mut self, host: String, session: Session) {
        self.storage.save(KEY_HOST, host.clone());
        save_json(&mut self.storage, KEY_SESSION, &session);
        self.host = Some(host);
        self.session = Some(session);
    }

    /// Forgets the session and everything tied to it. The host and theme are kept, as
    /// they are preferences of the device rather than of the user.
    pub fn logout(&mut self) {
        self.storage.remove(KEY_SESSION);
        self.session = None;
        self.notifications.clear();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        save_json(&mut self.storage, KEY_THEME, &theme);
        self.theme = theme;
    }

    pub fn notify(&mut self, level: Level, message: String) -> u64 {
        self.notifications.push(level, message)
    }

    pub fn dismiss(&mut self, id: u64) {
        self.notifications.dismiss(id);
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }
}

fn load_json<S, T>(storage: &S, key: &str) -> Option<T>
where
    S: KeyValueStore,
    T: for<'de> serde::Deserialize<'de>,
{
    let raw = storage.load(key)?;
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(err) => {
            tracing::warn!(?err, key, "ignoring malformed persisted value");
            None
        }
    }
}

fn save_json<S: KeyValueStore, T: serde::Serialize>(storage: &mut S, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => storage.save(key, json),
        Err(err) => tracing::error!(?err, key, "failed serializing value to persist"),
    }
}
