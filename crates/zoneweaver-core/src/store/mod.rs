// ── Inventory store ──
//
// Holds the latest network inventory as one immutable snapshot. Reads are
// wait-free; every replacement bumps a version on a `watch` channel so
// subscribers can react.

mod stream;

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::Inventory;

pub use stream::InventoryStream;

/// Latest inventory snapshot for one host.
pub struct InventoryStore {
    snapshot: Arc<ArcSwap<Inventory>>,
    version: watch::Sender<u64>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl InventoryStore {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (last_refresh, _) = watch::channel(None);

        Self {
            snapshot: Arc::new(ArcSwap::from_pointee(Inventory::default())),
            version,
            last_refresh,
        }
    }

    /// Replace the snapshot wholesale and notify subscribers.
    pub(crate) fn apply(&self, inventory: Inventory) {
        let stamp = inventory.collected_at.unwrap_or_else(Utc::now);
        self.snapshot.store(Arc::new(inventory));
        self.version.send_modify(|v| *v = v.wrapping_add(1));
        self.last_refresh.send_replace(Some(stamp));
    }

    pub fn snapshot(&self) -> Arc<Inventory> {
        self.snapshot.load_full()
    }

    /// Number of snapshots applied so far.
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub fn subscribe(&self) -> InventoryStream {
        InventoryStream::new(Arc::clone(&self.snapshot), self.version.subscribe())
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// How long ago the last refresh landed, or `None` if never refreshed.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_refresh().map(|t| Utc::now() - t)
    }
}

impl Default for InventoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Zone;

    fn with_zone(name: &str) -> Inventory {
        Inventory {
            zones: vec![Zone {
                name: name.into(),
                state: crate::model::ZoneState::Running,
                brand: None,
                zonepath: None,
                autoboot: None,
            }],
            ..Inventory::default()
        }
    }

    #[test]
    fn starts_empty() {
        let store = InventoryStore::new();
        assert!(store.snapshot().is_empty());
        assert_eq!(store.version(), 0);
        assert!(store.last_refresh().is_none());
        assert!(store.data_age().is_none());
    }

    #[test]
    fn apply_replaces_snapshot() {
        let store = InventoryStore::new();
        let before = store.snapshot();

        store.apply(with_zone("web"));

        assert!(before.is_empty());
        assert_eq!(store.snapshot().zones[0].name, "web");
        assert_eq!(store.version(), 1);
        assert!(store.last_refresh().is_some());
    }

    #[tokio::test]
    async fn subscribers_see_new_snapshots() {
        let store = InventoryStore::new();
        let mut stream = store.subscribe();
        assert!(stream.current().is_empty());

        store.apply(with_zone("db"));

        let latest = stream.changed().await.unwrap();
        assert_eq!(latest.zones[0].name, "db");
        assert_eq!(stream.current().zones.len(), 1);
    }
}
