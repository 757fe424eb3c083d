//! Ephemeral playable URLs for in-memory blobs.
//!
//! A `PlayableUrl` is minted from a blob and stays resolvable until it is
//! dropped, at which point the registry forgets the blob again.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use super::blob::FileBlob;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UrlId(u64);

impl fmt::Display for UrlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Default)]
struct Entries {
    next: u64,
    live: HashMap<u64, Arc<FileBlob>>,
}

/// Shared table of live URLs.
#[derive(Clone, Default)]
pub struct UrlRegistry {
    inner: Arc<Mutex<Entries>>,
}

impl UrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a new URL for `blob`.
    pub fn create(&self, blob: Arc<FileBlob>) -> PlayableUrl {
        let mut entries = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.next += 1;
        let id = entries.next;
        entries.live.insert(id, blob);
        PlayableUrl {
            id: UrlId(id),
            registry: self.clone(),
        }
    }

    pub fn resolve(&self, id: UrlId) -> Option<Arc<FileBlob>> {
        self.inner
            .lock()
            .ok()
            .and_then(|entries| entries.live.get(&id.0).cloned())
    }

    /// Number of URLs that have not been released yet.
    pub fn live_count(&self) -> usize {
        self.inner.lock().map(|e| e.live.len()).unwrap_or(0)
    }

    fn revoke(&self, id: UrlId) {
        if let Ok(mut entries) = self.inner.lock() {
            entries.live.remove(&id.0);
        }
    }
}

/// Owning handle to one registry entry. Released on drop.
pub struct PlayableUrl {
    id: UrlId,
    registry: UrlRegistry,
}

impl PlayableUrl {
    pub fn id(&self) -> UrlId {
        self.id
    }

    pub fn resolve(&self) -> Option<Arc<FileBlob>> {
        self.registry.resolve(self.id)
    }
}

impl fmt::Display for PlayableUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:playdeck/{}", self.id.0)
    }
}

impl fmt::Debug for PlayableUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PlayableUrl").field(&self.id.0).finish()
    }
}

impl Drop for PlayableUrl {
    fn drop(&mut self) {
        self.registry.revoke(self.id);
    }
}
