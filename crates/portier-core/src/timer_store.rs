//! Persistence seam for pending timers.
//!
//! A store holds at most one [`PendingTimer`] per [`ScheduleKey`]. Waking up
//! at the deadline is not the store's job: the scheduler owns the clock and
//! only asks the store to remember what is armed, so a restart can pick the
//! timers back up.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::{PortierError, Result};
use crate::types::{PendingTimer, ScheduleKey};

pub trait TimerStore: Send + Sync {
    fn get(&self, key: &ScheduleKey) -> Result<Option<PendingTimer>>;

    /// Persist `timer` unless its key already has one.
    ///
    /// Returns `None` when the timer was stored and `Some(existing)` when the
    /// key was already armed, in which case nothing is written.
    fn insert_if_absent(&self, timer: &PendingTimer) -> Result<Option<PendingTimer>>;

    /// Delete the timer for `key`. Returns whether one existed.
    fn remove(&self, key: &ScheduleKey) -> Result<bool>;

    /// All pending timers, earliest deadline first.
    fn list(&self) -> Result<Vec<PendingTimer>>;
}

// ---------------------------------------------------------------------------
// MemoryTimerStore
// ---------------------------------------------------------------------------

/// Process-local store. Timers are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryTimerStore {
    timers: Mutex<BTreeMap<ScheduleKey, PendingTimer>>,
}

impl MemoryTimerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<ScheduleKey, PendingTimer>>> {
        self.timers
            .lock()
            .map_err(|_| PortierError::TimerStore("memory store lock poisoned".to_string()))
    }
}

impl TimerStore for MemoryTimerStore {
    fn get(&self, key: &ScheduleKey) -> Result<Option<PendingTimer>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn insert_if_absent(&self, timer: &PendingTimer) -> Result<Option<PendingTimer>> {
        let mut timers = self.lock()?;
        if let Some(existing) = timers.get(&timer.key) {
            return Ok(Some(existing.clone()));
        }
        timers.insert(timer.key.clone(), timer.clone());
        Ok(None)
    }

    fn remove(&self, key: &ScheduleKey) -> Result<bool> {
        Ok(self.lock()?.remove(key).is_some())
    }

    fn list(&self) -> Result<Vec<PendingTimer>> {
        let mut all: Vec<PendingTimer> = self.lock()?.values().cloned().collect();
        all.sort_by_key(|t| t.fire_at_ms);
        Ok(all)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
