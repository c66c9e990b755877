use thiserror::Error;

// Failures talking to the remote attendance API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("attendance api transport error: {0}")]
    Transport(String),
    #[error(
        "attendance api upstream error {status}: {}",
        .message.as_deref().unwrap_or("no message")
    )]
    Upstream {
        status: u16,
        message: Option<String>,
    },
    #[error("attendance api response malformed: {0}")]
    Malformed(String),
}

// Failures reading or persisting the session key/value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Failures of the operator session workflows.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("login rejected: {0}")]
    LoginRejected(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

// Rejected rotation timing settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RotationSettingsError {
    #[error("rotation interval must be at least one tick")]
    ZeroInterval,
    #[error("rotation tick must be longer than zero")]
    ZeroTick,
}
