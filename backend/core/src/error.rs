use thiserror::Error;

/// Top-level error type for the botkit runtime.
#[derive(Debug, Error)]
pub enum BotkitError {
    #[error("settings storage error: {0}")]
    Storage(String),

    #[error("settings file still unreadable after reset: {0}")]
    CorruptStore(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
