// Domain layer: attendance entities, errors and the ports use cases depend on.

pub mod entities;
pub mod errors;
pub mod ports;

pub use entities::{
    AttendanceStatus, LoggedInUser, RotationPhase, RotationState, StudentRecord, Token,
};
pub use errors::{ApiError, RotationSettingsError, SessionError, StoreError};
pub use ports::{
    AttendanceApi, SESSION_BATCH_NAMES_KEY, SESSION_TOKEN_KEY, SESSION_USER_ID_KEY, SessionStore,
    TokenIssuer,
};
