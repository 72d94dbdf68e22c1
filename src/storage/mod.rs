use crate::session::SessionStore;

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

/// [`SessionStore`] backed by `window.localStorage`. Without a window every
/// read misses and writes are dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalSessionStore;

impl SessionStore for LocalSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(key, value);
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(key);
        }
    }
}
