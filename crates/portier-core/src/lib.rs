pub mod config;
pub mod error;
pub mod io;
pub mod timer_db;
pub mod timer_store;
pub mod types;

pub use error::{PortierError, Result};
pub use timer_db::TimerDb;
pub use timer_store::{MemoryTimerStore, TimerStore};
pub use types::{ActionResult, ArmOutcome, DoorSelection, PendingTimer, ScheduleKey, Target};
