// Excel export of the attendance table.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rust_xlsxwriter::{Workbook, XlsxError};
use thiserror::Error;

use crate::domain::StudentRecord;

pub const SHEET_NAME: &str = "Present Students";

const HEADER: [&str; 5] = ["id", "userId", "name", "department", "present"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to build workbook: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("failed to prepare export directory: {0}")]
    Io(#[from] io::Error),
}

/// `Present_Students_<batch>_<timestamp>.xlsx`, timestamp in ISO-8601 with separators as `_`.
pub fn export_file_name(batch_name: &str, now: DateTime<Utc>) -> String {
    let timestamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.', '-'], "_");
    format!("Present_Students_{batch_name}_{timestamp}.xlsx")
}

/// One sheet with a header row followed by one row per record.
pub fn build_workbook(records: &[StudentRecord]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, title) in (0..).zip(HEADER) {
        worksheet.write_string(0, col, title)?;
    }
    for (row, record) in (1..).zip(records) {
        worksheet.write_number(row, 0, record.id as f64)?;
        worksheet.write_string(row, 1, record.user_id.as_str())?;
        worksheet.write_string(row, 2, record.name.as_str())?;
        worksheet.write_string(row, 3, record.department.as_str())?;
        worksheet.write_string(row, 4, record.status.as_str())?;
    }
    Ok(workbook)
}

/// Writes the rows into `dir` and returns the created file path.
pub fn export_records(
    dir: &Path,
    batch_name: &str,
    records: &[StudentRecord],
    now: DateTime<Utc>,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(batch_name, now));
    let mut workbook = build_workbook(records)?;
    workbook.save(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AttendanceStatus;
    use chrono::TimeZone;

    // Every xlsx file is a zip archive.
    const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

    fn record(id: usize, name: &str) -> StudentRecord {
        StudentRecord {
            id,
            user_id: format!("U{id}"),
            name: name.to_string(),
            department: "CSE".to_string(),
            status: AttendanceStatus::Present,
        }
    }

    #[test]
    fn when_naming_export_then_timestamp_separators_are_underscores() {
        let now = Utc
            .with_ymd_and_hms(2024, 10, 19, 12, 34, 56)
            .single()
            .expect("valid time");

        assert_eq!(
            export_file_name("CS-A", now),
            "Present_Students_CS-A_2024_10_19T12_34_56_000Z.xlsx"
        );
    }

    #[test]
    fn when_building_workbook_then_single_sheet_is_named_present_students() {
        let records = [record(1, "Rao, Asha \"AR\""), record(2, "Bilal")];
        let mut workbook = build_workbook(&records).expect("build");

        let sheet = workbook.worksheet_from_name(SHEET_NAME).expect("sheet");
        assert_eq!(sheet.name(), "Present Students");
        assert!(workbook.worksheet_from_index(1).is_err());

        let bytes = workbook.save_to_buffer().expect("save");
        assert!(bytes.starts_with(ZIP_MAGIC));
    }

    #[test]
    fn when_exporting_then_workbook_is_created_in_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("exports");
        let now = Utc::now();

        let path = export_records(&target, "CS-A", &[record(1, "Asha")], now).expect("export");

        assert!(path.starts_with(&target));
        assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("xlsx"));
        let bytes = std::fs::read(path).expect("read");
        assert!(bytes.starts_with(ZIP_MAGIC));
    }

    #[test]
    fn when_exporting_no_rows_then_header_only_workbook_is_written() {
        let dir = tempfile::tempdir().expect("tempdir");

        let path = export_records(dir.path(), "CS-A", &[], Utc::now()).expect("export");

        assert!(std::fs::metadata(path).expect("metadata").len() > 0);
    }
}
