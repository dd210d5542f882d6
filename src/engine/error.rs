//! Engine error types.

/// Engine error type.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("engine is already running")]
    AlreadyRunning,
    #[error("engine was stopped and cannot be restarted")]
    Terminated,
    #[error("config error: {0}")]
    Config(String),
    #[error("run loop failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
