use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortierError {
    #[error("config not found: {0}")]
    ConfigNotFound(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("unknown door '{0}': expected street, floor, both or all")]
    UnknownTarget(String),

    #[error("invalid delay '{0}': must be a whole number of seconds")]
    InvalidDelay(String),

    #[error("delay {requested}s exceeds the maximum of {max}s")]
    DelayTooLong { requested: u64, max: u64 },

    #[error("invalid schedule key: {0}")]
    InvalidKey(String),

    #[error("timer already set")]
    TimerAlreadySet,

    #[error("no pending timer for {0}")]
    TimerNotFound(String),

    #[error("timer store error: {0}")]
    TimerStore(String),

    #[error("scheduler unavailable for {0}")]
    SchedulerUnavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PortierError>;
