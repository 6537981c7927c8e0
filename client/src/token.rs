//! Token storage with session and persistent scopes.
//!
//! Tokens always live in memory for the session. When the user asked to
//! be remembered, they are additionally written to a file so a later
//! session can pick them up.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// An access/refresh token pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// In-memory token store with optional file persistence
#[derive(Debug, Default)]
pub struct TokenStore {
    state: Mutex<Option<StoredTokens>>,
    persist_path: Option<PathBuf>,
    // Tracks whether the current pair is remembered, so a rotation keeps
    // writing to the same scope the pair was stored with
    remembered: AtomicBool,
}

impl TokenStore {
    /// Session-only store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that persists remembered tokens to `path`. A pair loaded
    /// from the file counts as remembered, so later rotations rewrite it.
    pub fn with_persistence(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let initial: Option<StoredTokens> = std::fs::read_to_string(&path)
            .ok()
            .and_then(|body| serde_json::from_str(&body).ok());

        Self {
            remembered: AtomicBool::new(initial.is_some()),
            state: Mutex::new(initial),
            persist_path: Some(path),
        }
    }

    /// Store a token pair. With `remember` set and persistence
    /// configured, the pair is also written to disk; without `remember`
    /// any previously persisted pair is removed.
    pub fn set(&self, tokens: StoredTokens, remember: bool) {
        self.remembered.store(remember, Ordering::SeqCst);
        if let Some(path) = &self.persist_path {
            if remember {
                if let Ok(body) = serde_json::to_string(&tokens) {
                    if let Err(err) = std::fs::write(path, body) {
                        tracing::warn!(?err, "failed to persist tokens");
                    }
                }
            } else {
                let _ = std::fs::remove_file(path);
            }
        }
        *self.state.lock().expect("token store poisoned") = Some(tokens);
    }

    /// Whether the current pair is stored in the persistent scope
    pub fn is_remembered(&self) -> bool {
        self.remembered.load(Ordering::SeqCst)
    }

    pub fn access_token(&self) -> Option<String> {
        self.state
            .lock()
            .expect("token store poisoned")
            .as_ref()
            .map(|t| t.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state
            .lock()
            .expect("token store poisoned")
            .as_ref()
            .map(|t| t.refresh_token.clone())
    }

    /// Wipe all credentials, both in memory and on disk
    pub fn clear(&self) {
        self.remembered.store(false, Ordering::SeqCst);
        *self.state.lock().expect("token store poisoned") = None;
        if let Some(path) = &self.persist_path {
            let _ = std::fs::remove_file(path);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().expect("token store poisoned").is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(access: &str, refresh: &str) -> StoredTokens {
        StoredTokens {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
        }
    }

    #[test]
    fn test_session_store_round_trip() {
        let store = TokenStore::new();
        assert!(store.is_empty());

        store.set(pair("a1", "r1"), false);
        assert_eq!(store.access_token().as_deref(), Some("a1"));
        assert_eq!(store.refresh_token().as_deref(), Some("r1"));

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_replaces_previous_pair() {
        let store = TokenStore::new();
        store.set(pair("a1", "r1"), false);
        store.set(pair("a2", "r2"), false);
        assert_eq!(store.access_token().as_deref(), Some("a2"));
        assert_eq!(store.refresh_token().as_deref(), Some("r2"));
    }

    #[test]
    fn test_remembered_tokens_survive_reload() {
        let dir = std::env::temp_dir().join(format!("scm-client-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tokens.json");

        {
            let store = TokenStore::with_persistence(&path);
            store.set(pair("a1", "r1"), true);
        }

        let reloaded = TokenStore::with_persistence(&path);
        assert_eq!(reloaded.access_token().as_deref(), Some("a1"));

        reloaded.clear();
        assert!(!path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_reloaded_store_counts_as_remembered() {
        let dir = std::env::temp_dir().join(format!("scm-client-r-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tokens.json");

        {
            let store = TokenStore::with_persistence(&path);
            assert!(!store.is_remembered());
            store.set(pair("a1", "r1"), true);
            assert!(store.is_remembered());
        }

        // A pair loaded from disk stays in the persistent scope, so a
        // rotation keeps updating the file
        let reloaded = TokenStore::with_persistence(&path);
        assert!(reloaded.is_remembered());

        reloaded.set(pair("a2", "r2"), reloaded.is_remembered());
        let on_disk: StoredTokens =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.refresh_token, "r2");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unremembered_set_removes_persisted_pair() {
        let dir = std::env::temp_dir().join(format!("scm-client-u-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tokens.json");

        {
            let store = TokenStore::with_persistence(&path);
            store.set(pair("a1", "r1"), true);
        }
        assert!(path.exists());

        let store = TokenStore::with_persistence(&path);
        store.set(pair("a2", "r2"), false);
        assert!(!store.is_remembered());
        assert!(!path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unremembered_tokens_are_session_only() {
        let dir = std::env::temp_dir().join(format!("scm-client-s-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tokens.json");

        {
            let store = TokenStore::with_persistence(&path);
            store.set(pair("a1", "r1"), false);
            assert_eq!(store.access_token().as_deref(), Some("a1"));
        }

        let reloaded = TokenStore::with_persistence(&path);
        assert!(reloaded.is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
