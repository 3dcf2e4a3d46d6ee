#![forbid(unsafe_code)]

use ns_core::ids::OwnerId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// How long a drained owner entry may linger before eviction. Keeps the
/// registry from growing with every owner that ever imported.
const IDLE_EVICTION_MS: i64 = 10 * 60 * 1000;

#[derive(Debug, Default)]
struct GateEntry {
    in_flight: u32,
    last_released_ms: i64,
}

/// Per-owner admission gate in front of the import path. Acquisition is
/// non-blocking: when an owner already has `max_concurrent` imports in
/// flight, new requests are rejected immediately instead of queuing behind
/// the storage lock.
#[derive(Clone, Debug, Default)]
pub struct ImportGate {
    inner: Arc<Mutex<HashMap<String, GateEntry>>>,
}

#[derive(Debug)]
pub struct ImportPermit {
    owner: String,
    inner: Arc<Mutex<HashMap<String, GateEntry>>>,
}

impl ImportGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self, owner: &OwnerId, max_concurrent: u32) -> Option<ImportPermit> {
        let mut entries = lock(&self.inner);
        let now = now_ms();
        entries.retain(|_, entry| {
            entry.in_flight > 0 || now.saturating_sub(entry.last_released_ms) < IDLE_EVICTION_MS
        });

        let entry = entries.entry(owner.as_str().to_string()).or_default();
        if entry.in_flight >= max_concurrent {
            tracing::warn!(
                owner = owner.as_str(),
                max_concurrent,
                "import admission rejected"
            );
            return None;
        }
        entry.in_flight += 1;
        Some(ImportPermit {
            owner: owner.as_str().to_string(),
            inner: Arc::clone(&self.inner),
        })
    }

    pub fn in_flight(&self, owner: &OwnerId) -> u32 {
        lock(&self.inner)
            .get(owner.as_str())
            .map(|entry| entry.in_flight)
            .unwrap_or(0)
    }
}

impl Drop for ImportPermit {
    fn drop(&mut self) {
        let mut entries = lock(&self.inner);
        if let Some(entry) = entries.get_mut(&self.owner) {
            entry.in_flight = entry.in_flight.saturating_sub(1);
            entry.last_released_ms = now_ms();
        }
    }
}

fn lock(
    inner: &Arc<Mutex<HashMap<String, GateEntry>>>,
) -> MutexGuard<'_, HashMap<String, GateEntry>> {
    match inner.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration,
        Err(_) => return 0,
    };

    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
