use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::watch;

use crate::model::Inventory;

/// A subscription to inventory replacements.
///
/// Keeps the snapshot seen at creation (or at the last `changed()`), so a
/// consumer can diff against what it rendered last.
pub struct InventoryStream {
    current: Arc<Inventory>,
    source: Arc<ArcSwap<Inventory>>,
    receiver: watch::Receiver<u64>,
}

impl InventoryStream {
    pub(crate) fn new(source: Arc<ArcSwap<Inventory>>, receiver: watch::Receiver<u64>) -> Self {
        let current = source.load_full();
        Self {
            current,
            source,
            receiver,
        }
    }

    /// Snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> &Arc<Inventory> {
        &self.current
    }

    /// Latest snapshot, which may be newer than `current()`.
    pub fn latest(&self) -> Arc<Inventory> {
        self.source.load_full()
    }

    /// Wait for the next replacement, returning the new snapshot.
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<Inventory>> {
        self.receiver.changed().await.ok()?;
        let snap = self.source.load_full();
        self.current = Arc::clone(&snap);
        Some(snap)
    }
}
