/// Token storage
///
/// The client never decides where tokens live; it reads and writes through
/// this trait. A CLI might back it with the OS keyring, a test with plain
/// memory.

use std::sync::RwLock;

/// Storage for the bearer token
///
/// Implementations must be safe to share across threads; the client holds
/// the store behind an `Arc`.
pub trait TokenStore: Send + Sync {
    /// Returns the stored token, if any
    fn get(&self) -> Option<String>;

    /// Replaces the stored token
    fn set(&self, token: &str);

    /// Removes the stored token
    fn clear(&self);
}

/// In-memory token store
///
/// The token lives for the life of the process. Suitable for tests and
/// short-lived tools; anything needing persistence implements
/// [`TokenStore`] itself.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn set(&self, token: &str) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token.to_string());
        }
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get(), None);

        store.set("token-a");
        assert_eq!(store.get(), Some("token-a".to_string()));

        store.set("token-b");
        assert_eq!(store.get(), Some("token-b".to_string()));

        store.clear();
        assert_eq!(store.get(), None);
    }
}
