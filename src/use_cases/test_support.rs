use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::domain::{
    ApiError, AttendanceApi, AttendanceStatus, LoggedInUser, SessionStore, StoreError,
    StudentRecord, Token, TokenIssuer,
};

// Token issuer fake: call N returns `token-N` unless scripted to fail.
#[derive(Clone, Default)]
pub(crate) struct ScriptedIssuer {
    calls: Arc<AtomicUsize>,
    failing_calls: Arc<HashSet<usize>>,
    // When set, every call waits for one permit before answering.
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedIssuer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_on(calls: &[usize]) -> Self {
        Self {
            failing_calls: Arc::new(calls.iter().copied().collect()),
            ..Self::default()
        }
    }

    pub(crate) fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let issuer = Self {
            gate: Some(gate.clone()),
            ..Self::default()
        };
        (issuer, gate)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenIssuer for ScriptedIssuer {
    async fn issue_token(&self, _batch_name: &str) -> Result<Token, ApiError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        if self.failing_calls.contains(&call) {
            return Err(ApiError::Transport("scripted failure".to_string()));
        }
        Ok(Token::new(format!("token-{call}")))
    }
}

// Session store fake whose every operation fails.
pub(crate) struct FailingStore;

impl SessionStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Io(std::io::Error::other("get failed")))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("set failed")))
    }

    fn remove(&self, _key: &str) -> Result<bool, StoreError> {
        Err(StoreError::Io(std::io::Error::other("remove failed")))
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct ApiFailureFlags {
    pub login: bool,
    pub records: bool,
    pub update: bool,
    pub delete: bool,
    pub departments: bool,
}

// Attendance API fake that serves fixed rows and records writes.
#[derive(Clone, Default)]
pub(crate) struct RecordingApi {
    records: Vec<StudentRecord>,
    departments: Vec<String>,
    failures: ApiFailureFlags,
    updates: Arc<Mutex<Vec<(String, Vec<StudentRecord>)>>>,
    deletes: Arc<Mutex<Vec<String>>>,
}

impl RecordingApi {
    pub(crate) fn new(records: Vec<StudentRecord>) -> Self {
        Self {
            records,
            departments: vec!["CSE".to_string(), "ECE".to_string()],
            ..Self::default()
        }
    }

    pub(crate) fn with_failures(mut self, failures: ApiFailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn updates(&self) -> Vec<(String, Vec<StudentRecord>)> {
        self.updates.lock().expect("updates mutex poisoned").clone()
    }

    pub(crate) fn deletes(&self) -> Vec<String> {
        self.deletes.lock().expect("deletes mutex poisoned").clone()
    }
}

fn upstream_failure() -> ApiError {
    ApiError::Upstream {
        status: 500,
        message: Some("scripted failure".to_string()),
    }
}

#[async_trait]
impl AttendanceApi for RecordingApi {
    async fn login(&self, user_id: &str, password: &str) -> Result<LoggedInUser, ApiError> {
        if self.failures.login {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        if password != "secret" {
            return Err(ApiError::Upstream {
                status: 401,
                message: Some("Invalid credentials".to_string()),
            });
        }
        Ok(LoggedInUser {
            user_id: user_id.to_string(),
            batch_names: vec!["CS-A".to_string(), "CS-B".to_string()],
        })
    }

    async fn attendance_records(&self, _batch_name: &str) -> Result<Vec<StudentRecord>, ApiError> {
        if self.failures.records {
            return Err(upstream_failure());
        }
        Ok(self.records.clone())
    }

    async fn update_attendance(
        &self,
        batch_name: &str,
        changed: &[StudentRecord],
    ) -> Result<(), ApiError> {
        if self.failures.update {
            return Err(upstream_failure());
        }
        let mut guard = self.updates.lock().expect("updates mutex poisoned");
        guard.push((batch_name.to_string(), changed.to_vec()));
        Ok(())
    }

    async fn delete_attendance(&self, batch_name: &str) -> Result<String, ApiError> {
        if self.failures.delete {
            return Err(upstream_failure());
        }
        let mut guard = self.deletes.lock().expect("deletes mutex poisoned");
        guard.push(batch_name.to_string());
        Ok(format!("Attendance deleted for {batch_name}"))
    }

    async fn departments(&self) -> Result<Vec<String>, ApiError> {
        if self.failures.departments {
            return Err(upstream_failure());
        }
        Ok(self.departments.clone())
    }
}

pub(crate) fn student(
    id: usize,
    name: &str,
    department: &str,
    status: AttendanceStatus,
) -> StudentRecord {
    StudentRecord {
        id,
        user_id: format!("U{id:03}"),
        name: name.to_string(),
        department: department.to_string(),
        status,
    }
}
