// Use cases layer: token rotation and the operator workflows around it.

pub mod dashboard;
pub mod rotation;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use dashboard::{AttendanceBoard, DashboardUseCase, RecordFilter, StatusFilter};
pub use rotation::{RotationSettings, TOKEN_ROTATION_INTERVAL_SECS, TokenRotationController};
pub use session::{LoginUseCase, LogoutUseCase, resolve_batch, stored_batches};
