use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use oopsie_sdk::TaskStore;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// Default entry time-to-live (30 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(1800);

#[derive(Debug, Clone)]
struct Entry {
    id: String,
    inserted_at: Instant,
}

/// Time-bounded map of space name to space id.
///
/// A best-effort view of the store's spaces. Entries expire individually and
/// expiry is checked on read. All access goes through one lock that is never
/// held across a store call.
pub struct SpaceCache {
    store: Arc<dyn TaskStore>,
    entries: Mutex<HashMap<String, Entry>>,
    ttl: Duration,
}

impl SpaceCache {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self::with_ttl(store, DEFAULT_TTL)
    }

    pub fn with_ttl(store: Arc<dyn TaskStore>, ttl: Duration) -> Self {
        Self {
            store,
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the cache contents with the store's space list.
    ///
    /// On failure the current contents are kept and the error is logged.
    pub async fn load(&self) {
        let spaces = match self.store.list_spaces().await {
            Ok(spaces) => spaces,
            Err(e) => {
                error!("Failed to load spaces, keeping cached entries: {}", e);
                return;
            }
        };

        let now = Instant::now();
        let fresh: HashMap<String, Entry> = spaces
            .into_iter()
            .map(|space| {
                (
                    space.name,
                    Entry {
                        id: space.id,
                        inserted_at: now,
                    },
                )
            })
            .collect();

        let count = fresh.len();
        *self.lock() = fresh;
        info!("Space cache loaded with {} spaces", count);
    }

    /// Insert or overwrite one entry without a reload
    pub fn add(&self, name: impl Into<String>, id: impl Into<String>) {
        let name = name.into();
        debug!("Space cache add: {}", name);
        self.lock().insert(
            name,
            Entry {
                id: id.into(),
                inserted_at: Instant::now(),
            },
        );
    }

    /// Snapshot of the non-expired entries.
    ///
    /// Expired entries are evicted as a side effect.
    pub fn get_spaces(&self) -> HashMap<String, String> {
        let now = Instant::now();
        let mut entries = self.lock();
        entries.retain(|_, entry| now.duration_since(entry.inserted_at) < self.ttl);
        entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.id.clone()))
            .collect()
    }

    /// Force a reload from the store
    pub async fn invalidate(&self) {
        self.load().await;
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of entries currently held, expired or not
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
