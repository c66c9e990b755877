use async_trait::async_trait;

use crate::domain::entities::{LoggedInUser, StudentRecord, Token};
use crate::domain::errors::{ApiError, StoreError};

// Session keys. The login flow owns user id and batch list; the rotation
// controller only ever writes or clears the token key.
pub const SESSION_TOKEN_KEY: &str = "token";
pub const SESSION_USER_ID_KEY: &str = "userId";
pub const SESSION_BATCH_NAMES_KEY: &str = "batchNames";

// Port for requesting a fresh attendance token for a batch.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue_token(&self, batch_name: &str) -> Result<Token, ApiError>;
}

// Port for the remaining attendance API operations.
#[async_trait]
pub trait AttendanceApi: Send + Sync {
    async fn login(&self, user_id: &str, password: &str) -> Result<LoggedInUser, ApiError>;
    async fn attendance_records(&self, batch_name: &str) -> Result<Vec<StudentRecord>, ApiError>;
    async fn update_attendance(
        &self,
        batch_name: &str,
        changed: &[StudentRecord],
    ) -> Result<(), ApiError>;
    async fn delete_attendance(&self, batch_name: &str) -> Result<String, ApiError>;
    async fn departments(&self) -> Result<Vec<String>, ApiError>;
}

// Port for the persisted key/value session state.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<bool, StoreError>;
}

impl<T: SessionStore + ?Sized> SessionStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        (**self).remove(key)
    }
}

impl<T: SessionStore + ?Sized> SessionStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        (**self).remove(key)
    }
}

#[async_trait]
impl<T: AttendanceApi + ?Sized> AttendanceApi for std::sync::Arc<T> {
    async fn login(&self, user_id: &str, password: &str) -> Result<LoggedInUser, ApiError> {
        (**self).login(user_id, password).await
    }

    async fn attendance_records(&self, batch_name: &str) -> Result<Vec<StudentRecord>, ApiError> {
        (**self).attendance_records(batch_name).await
    }

    async fn update_attendance(
        &self,
        batch_name: &str,
        changed: &[StudentRecord],
    ) -> Result<(), ApiError> {
        (**self).update_attendance(batch_name, changed).await
    }

    async fn delete_attendance(&self, batch_name: &str) -> Result<String, ApiError> {
        (**self).delete_attendance(batch_name).await
    }

    async fn departments(&self) -> Result<Vec<String>, ApiError> {
        (**self).departments().await
    }
}
