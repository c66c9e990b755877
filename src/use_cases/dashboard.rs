// Attendance dashboard: the record table for one batch plus its remote operations.

use std::str::FromStr;

use tracing::{info, warn};

use crate::domain::{ApiError, AttendanceApi, AttendanceStatus, StudentRecord};

pub const RECORDS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Present,
    Absent,
}

impl StatusFilter {
    fn accepts(self, status: AttendanceStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Present => status == AttendanceStatus::Present,
            StatusFilter::Absent => status == AttendanceStatus::Absent,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "present" => Ok(StatusFilter::Present),
            "absent" => Ok(StatusFilter::Absent),
            other => Err(format!("unknown status filter '{other}'")),
        }
    }
}

/// Row filter applied before pagination.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Case-insensitive substring of the name or user id; empty matches all.
    pub search: String,
    /// Exact department; `None` matches all.
    pub department: Option<String>,
    pub status: StatusFilter,
}

impl RecordFilter {
    pub fn matches(&self, record: &StudentRecord) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = record.name.to_lowercase().contains(&needle)
            || record.user_id.to_lowercase().contains(&needle);
        let matches_department = self
            .department
            .as_deref()
            .is_none_or(|department| record.department == department);

        matches_search && matches_department && self.status.accepts(record.status)
    }
}

/// Loaded attendance rows for a batch with pending, not yet submitted, toggles.
#[derive(Debug, Clone)]
pub struct AttendanceBoard {
    batch_name: String,
    records: Vec<StudentRecord>,
    departments: Vec<String>,
    // One entry per toggled row, holding its latest state.
    changed: Vec<StudentRecord>,
}

impl AttendanceBoard {
    pub fn new(
        batch_name: impl Into<String>,
        records: Vec<StudentRecord>,
        departments: Vec<String>,
    ) -> Self {
        Self {
            batch_name: batch_name.into(),
            records,
            departments,
            changed: Vec::new(),
        }
    }

    pub fn batch_name(&self) -> &str {
        &self.batch_name
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    /// Departments reported by the API.
    pub fn departments(&self) -> &[String] {
        &self.departments
    }

    /// Distinct departments of the loaded rows, in first-seen order.
    pub fn record_departments(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.department.as_str()) {
                seen.push(&record.department);
            }
        }
        seen
    }

    pub fn filtered(&self, filter: &RecordFilter) -> Vec<&StudentRecord> {
        self.records.iter().filter(|r| filter.matches(r)).collect()
    }

    pub fn page_count(&self, filter: &RecordFilter) -> usize {
        self.filtered(filter).len().div_ceil(RECORDS_PER_PAGE)
    }

    /// Rows of a 1-based page of the filtered table; out-of-range pages are empty.
    pub fn page(&self, filter: &RecordFilter, page: usize) -> Vec<&StudentRecord> {
        let Some(skip) = page
            .checked_sub(1)
            .and_then(|index| index.checked_mul(RECORDS_PER_PAGE))
        else {
            return Vec::new();
        };
        self.filtered(filter)
            .into_iter()
            .skip(skip)
            .take(RECORDS_PER_PAGE)
            .collect()
    }

    /// Flips a row's status, returning the new status, or `None` for an unknown id.
    pub fn toggle(&mut self, id: usize) -> Option<AttendanceStatus> {
        let record = self.records.iter_mut().find(|r| r.id == id)?;
        record.status = record.status.toggled();
        let updated = record.clone();

        match self.changed.iter_mut().find(|c| c.id == id) {
            Some(existing) => *existing = updated.clone(),
            None => self.changed.push(updated.clone()),
        }
        Some(updated.status)
    }

    pub fn toggle_user(&mut self, user_id: &str) -> Option<AttendanceStatus> {
        let id = self.records.iter().find(|r| r.user_id == user_id)?.id;
        self.toggle(id)
    }

    pub fn changes(&self) -> &[StudentRecord] {
        &self.changed
    }

    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }
}

// Dashboard use case with the attendance API injected.
pub struct DashboardUseCase<A> {
    pub api: A,
}

impl<A> DashboardUseCase<A>
where
    A: AttendanceApi,
{
    /// Fetches rows and departments. A department failure only empties the list.
    pub async fn load(&self, batch_name: &str) -> Result<AttendanceBoard, ApiError> {
        let records = self.api.attendance_records(batch_name).await?;
        let departments = self.api.departments().await.unwrap_or_else(|e| {
            warn!(batch = %batch_name, error = %e, "failed to fetch departments");
            Vec::new()
        });

        info!(batch = %batch_name, rows = records.len(), "attendance loaded");
        Ok(AttendanceBoard::new(batch_name, records, departments))
    }

    /// Sends pending toggles and clears them on success. Returns how many were sent.
    pub async fn submit(&self, board: &mut AttendanceBoard) -> Result<usize, ApiError> {
        if !board.has_changes() {
            return Ok(0);
        }

        self.api
            .update_attendance(&board.batch_name, &board.changed)
            .await?;

        let sent = board.changed.len();
        board.changed.clear();
        info!(batch = %board.batch_name, sent, "attendance updated");
        Ok(sent)
    }

    /// Deletes every attendance record of the batch, returning the server message.
    pub async fn purge(&self, batch_name: &str) -> Result<String, ApiError> {
        let message = self.api.delete_attendance(batch_name).await?;
        info!(batch = %batch_name, "attendance deleted");
        Ok(message)
    }
}
