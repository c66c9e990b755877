use std::{env, path::PathBuf, time::Duration};

use url::Url;

// Runtime constants and environment-driven settings.

pub fn api_base_url() -> Result<Url, url::ParseError> {
    let raw =
        env::var("ATTENDANCE_API_URL").unwrap_or_else(|_| "http://127.0.0.1:5000".to_string());
    Url::parse(&raw)
}

pub fn session_store_path() -> PathBuf {
    env::var("ATTENDANCE_SESSION_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".attendance_session.json"))
}

// Unset (or unparsable) means no client-side timeout.
pub fn api_timeout() -> Option<Duration> {
    env::var("ATTENDANCE_API_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_millis)
}
