use std::fmt;

// Opaque attendance credential scanned by students for one batch window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// High-level phase of the token rotation display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPhase {
    /// Display hidden, no timers held.
    Idle,
    /// Token shown, countdown running.
    Displaying,
    /// Countdown expired, waiting on the next token.
    Regenerating,
}

/// Observable state of a token rotation controller.
///
/// `seconds_remaining` stays within `1..=interval`; while regenerating it holds at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationState {
    pub active: bool,
    pub seconds_remaining: u32,
    pub is_regenerating: bool,
    pub current_token: Option<Token>,
    /// Bumped for every issuance cycle and on deactivation; responses tagged
    /// with an older generation are dropped.
    pub generation: u64,
    // Bumped on every activation so timers from an earlier activation cannot write.
    pub(crate) epoch: u64,
}

impl RotationState {
    pub fn idle(interval_seconds: u32) -> Self {
        Self {
            active: false,
            seconds_remaining: interval_seconds,
            is_regenerating: false,
            current_token: None,
            generation: 0,
            epoch: 0,
        }
    }

    pub fn phase(&self) -> RotationPhase {
        match (self.active, self.is_regenerating) {
            (false, _) => RotationPhase::Idle,
            (true, false) => RotationPhase::Displaying,
            (true, true) => RotationPhase::Regenerating,
        }
    }
}

// Operator identity returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedInUser {
    pub user_id: String,
    pub batch_names: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn toggled(self) -> Self {
        match self {
            AttendanceStatus::Present => AttendanceStatus::Absent,
            AttendanceStatus::Absent => AttendanceStatus::Present,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// One row of the attendance dashboard for a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    // 1-based position in the fetched list; stable key for toggling.
    pub id: usize,
    pub user_id: String,
    pub name: String,
    pub department: String,
    pub status: AttendanceStatus,
}
