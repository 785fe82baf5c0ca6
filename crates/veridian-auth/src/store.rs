//! Configuration store.
//!
//! All builder mutations flow through the [`ConfigStore`] contract:
//! retrieve the latest committed record, mutate it, commit it back. The
//! contract guarantees no mutation is applied to a stale copy, so
//! interleaved builder calls always observe each other's effects.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::ServerConfiguration;

/// Contract for retrieving and committing the configuration record.
///
/// `current` and `set` are the required primitives; `update` is the
/// read-modify-write convenience every builder method goes through.
pub trait ConfigStore {
    /// Returns a copy of the latest committed record.
    fn current(&self) -> ServerConfiguration;

    /// Commits a record, replacing the previous one.
    fn set(&self, configuration: ServerConfiguration);

    /// Applies a mutation to the latest committed record and commits the
    /// result.
    fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut ServerConfiguration),
        Self: Sized,
    {
        let mut configuration = self.current();
        mutate(&mut configuration);
        self.set(configuration);
    }
}

/// In-memory configuration store.
///
/// Commits swap an `Arc` atomically, so post-configuration readers holding
/// a snapshot are never blocked by a late commit.
#[derive(Clone, Default)]
pub struct InMemoryConfigStore {
    inner: Arc<ArcSwap<ServerConfiguration>>,
}

impl InMemoryConfigStore {
    /// Creates a store holding a default record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with an existing record.
    #[must_use]
    pub fn with_configuration(configuration: ServerConfiguration) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(configuration)),
        }
    }

    /// Returns a shared snapshot of the latest committed record.
    ///
    /// Cheaper than [`ConfigStore::current`] when the caller only reads.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ServerConfiguration> {
        self.inner.load_full()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn current(&self) -> ServerConfiguration {
        ServerConfiguration::clone(&self.inner.load())
    }

    fn set(&self, configuration: ServerConfiguration) {
        self.inner.store(Arc::new(configuration));
    }
}

impl fmt::Debug for InMemoryConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.inner.load();
        f.debug_struct("InMemoryConfigStore")
            .field("signing_credentials", &snapshot.signing_credentials.len())
            .field("grant_types", &snapshot.grant_types.len())
            .field("scopes", &snapshot.scopes.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_holds_default_record() {
        let store = InMemoryConfigStore::new();
        let configuration = store.current();
        assert!(configuration.signing_credentials.is_empty());
        assert!(configuration.grant_types.is_empty());
    }

    #[test]
    fn test_update_reads_latest_committed_state() {
        let store = InMemoryConfigStore::new();

        store.update(|configuration| {
            configuration.scopes.insert("openid".to_string());
        });
        store.update(|configuration| {
            // The first commit must be visible here.
            assert!(configuration.scopes.contains("openid"));
            configuration.scopes.insert("profile".to_string());
        });

        let current = store.current();
        let scopes: Vec<&str> = current.scopes.iter().map(String::as_str).collect();
        assert_eq!(scopes, ["openid", "profile"]);
    }

    #[test]
    fn test_set_replaces_previous_record() {
        let store = InMemoryConfigStore::new();
        store.update(|configuration| {
            configuration.claims.insert("email".to_string());
        });

        store.set(ServerConfiguration::new());
        assert!(store.current().claims.is_empty());
    }

    #[test]
    fn test_snapshot_is_stable_across_commits() {
        let store = InMemoryConfigStore::new();
        store.update(|configuration| {
            configuration.grant_types.insert("authorization_code".to_string());
        });

        let snapshot = store.snapshot();
        store.update(|configuration| {
            configuration.grant_types.insert("refresh_token".to_string());
        });

        assert_eq!(snapshot.grant_types.len(), 1);
        assert_eq!(store.snapshot().grant_types.len(), 2);
    }

    #[test]
    fn test_clones_share_state() {
        let store = InMemoryConfigStore::new();
        let clone = store.clone();

        store.update(|configuration| {
            configuration.scopes.insert("openid".to_string());
        });
        assert!(clone.current().scopes.contains("openid"));
    }
}
