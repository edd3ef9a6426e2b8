//! Durable [`TimerStore`] backed by redb.
//!
//! # Table design
//!
//! A single `PENDING_TIMERS` table keyed by the schedule key string:
//! ```text
//! "/office" -> JSON PendingTimer
//! ```
//!
//! One row per key is the whole invariant: `insert_if_absent` reads and
//! writes inside the same write transaction, and redb serializes write
//! transactions, so two arms for one key can never both land.

use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};

use crate::error::{PortierError, Result};
use crate::timer_store::TimerStore;
use crate::types::{PendingTimer, ScheduleKey};

/// Key: schedule key string. Value: JSON-encoded PendingTimer.
const PENDING_TIMERS: TableDefinition<&str, &[u8]> = TableDefinition::new("pending_timers");

fn db_err(e: impl std::fmt::Display) -> PortierError {
    PortierError::TimerStore(e.to_string())
}

fn decode(bytes: &[u8]) -> Result<PendingTimer> {
    serde_json::from_slice(bytes).map_err(db_err)
}

/// Persistent store for pending timers.
pub struct TimerDb {
    db: Database,
}

impl TimerDb {
    /// Open or create the database at `path` and make sure the table exists.
    ///
    /// Fails if another process holds the file open.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path).map_err(db_err)?;
        let wt = db.begin_write().map_err(db_err)?;
        wt.open_table(PENDING_TIMERS).map_err(db_err)?;
        wt.commit().map_err(db_err)?;
        Ok(Self { db })
    }
}

impl TimerStore for TimerDb {
    fn get(&self, key: &ScheduleKey) -> Result<Option<PendingTimer>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(PENDING_TIMERS).map_err(db_err)?;
        let found = table.get(key.as_str()).map_err(db_err)?;
        found.map(|guard| decode(guard.value())).transpose()
    }

    fn insert_if_absent(&self, timer: &PendingTimer) -> Result<Option<PendingTimer>> {
        let value = serde_json::to_vec(timer).map_err(db_err)?;
        let wt = self.db.begin_write().map_err(db_err)?;
        let existing = {
            let mut table = wt.open_table(PENDING_TIMERS).map_err(db_err)?;
            let existing = table
                .get(timer.key.as_str())
                .map_err(db_err)?
                .map(|guard| guard.value().to_vec());
            if existing.is_none() {
                table
                    .insert(timer.key.as_str(), value.as_slice())
                    .map_err(db_err)?;
            }
            existing
        };
        match existing {
            Some(bytes) => {
                wt.abort().map_err(db_err)?;
                decode(&bytes).map(Some)
            }
            None => {
                wt.commit().map_err(db_err)?;
                Ok(None)
            }
        }
    }

    fn remove(&self, key: &ScheduleKey) -> Result<bool> {
        let wt = self.db.begin_write().map_err(db_err)?;
        let removed = {
            let mut table = wt.open_table(PENDING_TIMERS).map_err(db_err)?;
            let removed = table.remove(key.as_str()).map_err(db_err)?.is_some();
            removed
        };
        wt.commit().map_err(db_err)?;
        Ok(removed)
    }

    fn list(&self) -> Result<Vec<PendingTimer>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(PENDING_TIMERS).map_err(db_err)?;

        let mut result = Vec::new();
        for entry in table.iter().map_err(db_err)? {
            let (_, v) = entry.map_err(db_err)?;
            result.push(decode(v.value())?);
        }
        result.sort_by_key(|t| t.fire_at_ms);
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
