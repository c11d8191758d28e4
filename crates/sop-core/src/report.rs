use crate::error::{Result, SopError};
use crate::issue::Issue;
use crate::meeting::Meeting;
use crate::object::Object;
use chrono::Utc;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;

// ---------------------------------------------------------------------------
// Workbook assembly
// ---------------------------------------------------------------------------

/// Build the multi-sheet status report and return the workbook bytes.
///
/// Shared by the CLI (writes a file) and the server (download response).
pub fn build_workbook(root: &Path) -> Result<Vec<u8>> {
    let objects = Object::list(root)?;
    let issues = Issue::list(root)?;
    let meetings = Meeting::list(root)?;

    assemble(&objects, &issues, &meetings).map_err(|e| SopError::Report(e.to_string()))
}

fn assemble(objects: &[Object], issues: &[Issue], meetings: &[Meeting]) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let now = Utc::now();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Objects")?;
    write_headers(
        sheet,
        &bold,
        &["Slug", "Title", "Owner", "Stage", "Progress %", "Aging Days", "Open Issues"],
    )?;
    for (i, object) in objects.iter().filter(|o| !o.archived).enumerate() {
        let row = (i + 1) as u32;
        let open_issues = issues
            .iter()
            .filter(|iss| {
                iss.object_slug == object.slug
                    && iss.status != crate::types::IssueStatus::Closed
                    && !iss.archived
            })
            .count();
        sheet.write_string(row, 0, &object.slug)?;
        sheet.write_string(row, 1, &object.title)?;
        sheet.write_string(row, 2, object.owner.as_deref().unwrap_or(""))?;
        sheet.write_string(row, 3, object.stage.as_str())?;
        sheet.write_number(row, 4, object.progress_percent() as f64)?;
        sheet.write_number(row, 5, object.aging_days(now) as f64)?;
        sheet.write_number(row, 6, open_issues as f64)?;
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name("Issues")?;
    write_headers(
        sheet,
        &bold,
        &["Object", "Title", "Severity", "Status", "Owner", "Opened", "Closed"],
    )?;
    for (i, issue) in issues.iter().filter(|i| !i.archived).enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &issue.object_slug)?;
        sheet.write_string(row, 1, &issue.title)?;
        sheet.write_string(row, 2, issue.severity.as_str())?;
        sheet.write_string(row, 3, issue.status.as_str())?;
        sheet.write_string(row, 4, issue.owner.as_deref().unwrap_or(""))?;
        sheet.write_string(row, 5, &issue.created_at.format("%Y-%m-%d").to_string())?;
        let closed = issue
            .closed_at
            .map(|c| c.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        sheet.write_string(row, 6, &closed)?;
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name("Meetings")?;
    write_headers(
        sheet,
        &bold,
        &["Date", "Title", "Attendees", "Has Minutes", "Linked Issues"],
    )?;
    for (i, meeting) in meetings.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &meeting.held_on.format("%Y-%m-%d").to_string())?;
        sheet.write_string(row, 1, &meeting.title)?;
        sheet.write_string(row, 2, &meeting.attendees.join(", "))?;
        sheet.write_string(row, 3, if meeting.minutes.is_some() { "yes" } else { "no" })?;
        sheet.write_number(row, 4, meeting.linked_issues.len() as f64)?;
    }

    workbook.save_to_buffer()
}

fn write_headers(
    sheet: &mut Worksheet,
    bold: &Format,
    headers: &[&str],
) -> std::result::Result<(), XlsxError> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, bold)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn workbook_bytes_are_zip() {
        let dir = TempDir::new().unwrap();
        Object::create(dir.path(), "customer-master", "Customer Master").unwrap();
        Issue::create(dir.path(), "customer-master", "Dup rows").unwrap();
        Meeting::create(
            dir.path(),
            "SOP",
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
        )
        .unwrap();

        let bytes = build_workbook(dir.path()).unwrap();
        // xlsx is a zip container: PK magic.
        assert_eq!(&bytes[..2], b"PK");
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn workbook_contains_three_worksheet_parts() {
        let dir = TempDir::new().unwrap();
        let bytes = build_workbook(dir.path()).unwrap();
        // Zip entry names are stored uncompressed in the archive directory.
        for part in ["sheet1.xml", "sheet2.xml", "sheet3.xml"] {
            let needle = part.as_bytes();
            let found = bytes.windows(needle.len()).any(|w| w == needle);
            assert!(found, "expected {part} in the archive");
        }
    }

    #[test]
    fn empty_workspace_still_builds() {
        let dir = TempDir::new().unwrap();
        let bytes = build_workbook(dir.path()).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
