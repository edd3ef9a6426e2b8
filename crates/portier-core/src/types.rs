use crate::error::{PortierError, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// A lock that can be unlocked remotely.
///
/// `Street` is always opened first; `Floor` is the one opened after the delay
/// in dual mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Street,
    Floor,
}

impl Target {
    pub fn all() -> &'static [Target] {
        &[Target::Street, Target::Floor]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Street => "street",
            Target::Floor => "floor",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = PortierError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "street" => Ok(Target::Street),
            "floor" => Ok(Target::Floor),
            other => Err(PortierError::UnknownTarget(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// DoorSelection
// ---------------------------------------------------------------------------

/// What an unlock request asks for, decided by the `door` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorSelection {
    /// Open one lock now.
    Single(Target),
    /// Open the street lock now and the floor lock after the delay.
    Both,
}

impl DoorSelection {
    /// Absent, empty, `both` and `all` select dual mode; a lock name selects
    /// that lock alone.
    pub fn parse(door: Option<&str>) -> Result<Self> {
        match door {
            None | Some("") | Some("both") | Some("all") => Ok(DoorSelection::Both),
            Some(name) => name.parse().map(DoorSelection::Single),
        }
    }
}

/// Parse the `timeout` override carried by an arm request.
///
/// `None` means "use the configured default". Zero is passed through and
/// treated as the default by the scheduler.
pub fn parse_delay(raw: Option<&str>) -> Result<Option<u64>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<u64>()
            .map(Some)
            .map_err(|_| PortierError::InvalidDelay(s.to_string())),
    }
}

// ---------------------------------------------------------------------------
// ScheduleKey
// ---------------------------------------------------------------------------

const MAX_KEY_LEN: usize = 256;

/// Identifies the session a pending timer belongs to.
///
/// Derived from the request path so that `/` and `/office` arm independent
/// timers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScheduleKey(String);

impl ScheduleKey {
    /// Normalize a request path into a key. Trailing slashes are dropped and
    /// an empty path becomes `/`.
    pub fn from_path(path: &str) -> Result<Self> {
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() {
            "/".to_string()
        } else if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        Self::validate(&normalized)?;
        Ok(Self(normalized))
    }

    pub fn root() -> Self {
        Self("/".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(key: &str) -> Result<()> {
        if key.len() > MAX_KEY_LEN {
            return Err(PortierError::InvalidKey(format!(
                "longer than {MAX_KEY_LEN} bytes"
            )));
        }
        if key.chars().any(char::is_control) {
            return Err(PortierError::InvalidKey(
                "contains control characters".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for ScheduleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ScheduleKey {
    type Error = PortierError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_path(&value)
    }
}

impl From<ScheduleKey> for String {
    fn from(key: ScheduleKey) -> Self {
        key.0
    }
}

// ---------------------------------------------------------------------------
// ActionResult
// ---------------------------------------------------------------------------

/// Outcome of a single unlock attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub target: Target,
    pub success: bool,
    pub message: String,
}

impl ActionResult {
    pub fn ok(target: Target, message: impl Into<String>) -> Self {
        Self {
            target,
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(target: Target, message: impl Into<String>) -> Self {
        Self {
            target,
            success: false,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// PendingTimer
// ---------------------------------------------------------------------------

/// The single persisted record behind an armed key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTimer {
    pub key: ScheduleKey,
    pub target: Target,
    /// Wall-clock deadline, milliseconds since the Unix epoch.
    pub fire_at_ms: i64,
    pub armed_at: DateTime<Utc>,
}

impl PendingTimer {
    pub fn new(key: ScheduleKey, target: Target, armed_at: DateTime<Utc>, delay_secs: u64) -> Self {
        let delay_ms = i64::try_from(delay_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        Self {
            key,
            target,
            fire_at_ms: armed_at.timestamp_millis().saturating_add(delay_ms),
            armed_at,
        }
    }

    pub fn fire_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.fire_at_ms).single()
    }

    /// Milliseconds left until the deadline, zero once it has passed.
    pub fn remaining_ms(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from(self.fire_at_ms.saturating_sub(now.timestamp_millis())).unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// ArmOutcome
// ---------------------------------------------------------------------------

/// Result of asking the scheduler to arm a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArmOutcome {
    Accepted { delay_secs: u64, fire_at_ms: i64 },
    /// A timer was already pending; nothing changed.
    Rejected { fire_at_ms: i64 },
}

impl ArmOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ArmOutcome::Accepted { .. })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
