// Wire payloads exchanged with the attendance API.

use serde::{Deserialize, Serialize};

use crate::domain::{AttendanceStatus, StudentRecord};

#[derive(Debug, Serialize)]
pub struct BatchRequest<'a> {
    pub batch_name: &'a str,
}

// `PUT /batch/generate` reply; both levels are optional so a missing token is
// reported as malformed rather than as a decode failure.
#[derive(Debug, Deserialize)]
pub struct GenerateTokenResponse {
    #[serde(rename = "updatedBatch")]
    pub updated_batch: Option<UpdatedBatch>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatedBatch {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    #[serde(rename = "userId")]
    pub user_id: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub user: LoginUser,
}

#[derive(Debug, Deserialize)]
pub struct LoginUser {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "batchNames", default)]
    pub batch_names: Vec<String>,
}

// One student as returned by `POST /profile/view`.
#[derive(Debug, Deserialize)]
pub struct AttendanceRecordDto {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub department: String,
    // Entries are opaque to the client; only emptiness matters.
    #[serde(default)]
    pub attendance: Vec<serde_json::Value>,
}

impl AttendanceRecordDto {
    pub fn into_record(self, id: usize) -> StudentRecord {
        let status = if self.attendance.is_empty() {
            AttendanceStatus::Absent
        } else {
            AttendanceStatus::Present
        };
        StudentRecord {
            id,
            user_id: self.user_id,
            name: self.name,
            department: self.department,
            status,
        }
    }
}

// Row shape sent back on update.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentRowDto {
    pub id: usize,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    pub department: String,
    pub present: String,
}

impl From<&StudentRecord> for StudentRowDto {
    fn from(record: &StudentRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id.clone(),
            name: record.name.clone(),
            department: record.department.clone(),
            present: record.status.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateAttendanceRequest<'a> {
    pub students: Vec<StudentRowDto>,
    pub batch_name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct DeleteAttendanceResponse {
    #[serde(default)]
    pub msg: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}
