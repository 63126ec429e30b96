use gloo_storage::{LocalStorage, Storage};
use potluck_client::store::KeyValueStore;

/// `KeyValueStore` over the browser's local storage
pub struct BrowserStorage;

impl KeyValueStore for BrowserStorage {
    fn load(&self, key: &str) -> Option<String> {
        match LocalStorage::get(key) {
            Ok(v) => Some(v),
            Err(gloo_storage::errors::StorageError::KeyNotFound(_)) => None,
            Err(err) => {
                tracing::warn!(?err, key, "failed reading from local storage");
                None
            }
        }
    }

    fn save(&mut self, key: &str, value: String) {
        if let Err(err) = LocalStorage::set(key, value) {
            tracing::error!(?err, key, "failed saving to local storage");
        }
    }

    fn remove(&mut self, key: &str) {
        LocalStorage::delete(key);
    }
}
