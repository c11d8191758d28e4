use crate::error::{Result, SopError};
use crate::issue::Issue;
use crate::object::Object;
use crate::types::{IssueSeverity, IssueStatus, Stage};
use serde::Serialize;
use std::path::Path;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Column templates
// ---------------------------------------------------------------------------

pub const OBJECT_COLUMNS: [&str; 5] = ["slug", "title", "description", "owner", "stage"];
pub const ISSUE_COLUMNS: [&str; 6] = [
    "object_slug",
    "title",
    "description",
    "severity",
    "owner",
    "status",
];

// ---------------------------------------------------------------------------
// Import report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ImportError {
    pub line: u64,
    pub message: String,
}

/// Outcome of a partial-failure-tolerant import: valid rows are created,
/// bad rows are reported per line.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub created: Vec<String>,
    pub errors: Vec<ImportError>,
}

// ---------------------------------------------------------------------------
// Object import/export
// ---------------------------------------------------------------------------

/// Import objects from CSV text with the `OBJECT_COLUMNS` template.
pub fn import_objects(root: &Path, data: &str) -> Result<ImportReport> {
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    check_headers(&mut reader, &OBJECT_COLUMNS)?;

    let mut report = ImportReport::default();
    for record in reader.records() {
        let record = record.map_err(|e| SopError::CsvImport(e.to_string()))?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(report.created.len() as u64 + 1);

        match import_object_row(root, &record) {
            Ok(slug) => report.created.push(slug),
            Err(e) => report.errors.push(ImportError {
                line,
                message: e.to_string(),
            }),
        }
    }
    Ok(report)
}

fn import_object_row(root: &Path, record: &csv::StringRecord) -> Result<String> {
    let slug = field(record, 0);
    let title = field(record, 1);
    if title.is_empty() {
        return Err(SopError::CsvImport("title is required".to_string()));
    }

    let stage_raw = field(record, 4);
    let stage = if stage_raw.is_empty() {
        Stage::Scoping
    } else {
        Stage::from_str(&stage_raw)?
    };

    let mut object = Object::create(root, slug, title)?;
    let description = field(record, 2);
    if !description.is_empty() {
        object.description = Some(description);
    }
    let owner = field(record, 3);
    if !owner.is_empty() {
        object.owner = Some(owner);
    }
    if stage > Stage::Scoping {
        object.advance(stage)?;
    }
    object.save(root)?;
    Ok(object.slug)
}

/// Export all non-archived objects in template column order.
pub fn export_objects(root: &Path) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(OBJECT_COLUMNS)
        .map_err(|e| SopError::CsvImport(e.to_string()))?;

    for object in Object::list(root)? {
        if object.archived {
            continue;
        }
        writer
            .write_record([
                object.slug.as_str(),
                object.title.as_str(),
                object.description.as_deref().unwrap_or(""),
                object.owner.as_deref().unwrap_or(""),
                object.stage.as_str(),
            ])
            .map_err(|e| SopError::CsvImport(e.to_string()))?;
    }

    finish(writer)
}

// ---------------------------------------------------------------------------
// Issue import/export
// ---------------------------------------------------------------------------

/// Import issues from CSV text with the `ISSUE_COLUMNS` template.
pub fn import_issues(root: &Path, data: &str) -> Result<ImportReport> {
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    check_headers(&mut reader, &ISSUE_COLUMNS)?;

    let mut report = ImportReport::default();
    for record in reader.records() {
        let record = record.map_err(|e| SopError::CsvImport(e.to_string()))?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(report.created.len() as u64 + 1);

        match import_issue_row(root, &record) {
            Ok(id) => report.created.push(id),
            Err(e) => report.errors.push(ImportError {
                line,
                message: e.to_string(),
            }),
        }
    }
    Ok(report)
}

fn import_issue_row(root: &Path, record: &csv::StringRecord) -> Result<String> {
    let object_slug = field(record, 0);
    let title = field(record, 1);
    if title.is_empty() {
        return Err(SopError::CsvImport("title is required".to_string()));
    }

    let severity_raw = field(record, 3);
    let severity = if severity_raw.is_empty() {
        IssueSeverity::Medium
    } else {
        IssueSeverity::from_str(&severity_raw)?
    };
    let status_raw = field(record, 5);
    let status = if status_raw.is_empty() {
        IssueStatus::Open
    } else {
        IssueStatus::from_str(&status_raw)?
    };

    let mut issue = Issue::create(root, object_slug, title)?;
    let description = field(record, 2);
    if !description.is_empty() {
        issue.description = Some(description);
    }
    let owner = field(record, 4);
    if !owner.is_empty() {
        issue.owner = Some(owner);
    }
    issue.severity = severity;
    issue.set_status(status);
    issue.save(root)?;
    Ok(issue.id)
}

/// Export all non-archived issues in template column order.
pub fn export_issues(root: &Path) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(ISSUE_COLUMNS)
        .map_err(|e| SopError::CsvImport(e.to_string()))?;

    for issue in Issue::list(root)? {
        if issue.archived {
            continue;
        }
        writer
            .write_record([
                issue.object_slug.as_str(),
                issue.title.as_str(),
                issue.description.as_deref().unwrap_or(""),
                issue.severity.as_str(),
                issue.owner.as_deref().unwrap_or(""),
                issue.status.as_str(),
            ])
            .map_err(|e| SopError::CsvImport(e.to_string()))?;
    }

    finish(writer)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn field(record: &csv::StringRecord, index: usize) -> String {
    record.get(index).unwrap_or("").trim().to_string()
}

fn check_headers<R: std::io::Read>(reader: &mut csv::Reader<R>, expected: &[&str]) -> Result<()> {
    let headers = reader
        .headers()
        .map_err(|e| SopError::CsvImport(e.to_string()))?;
    let actual: Vec<&str> = headers.iter().map(str::trim).collect();
    if actual != expected {
        return Err(SopError::CsvImport(format!(
            "unexpected header row: expected '{}', got '{}'",
            expected.join(","),
            actual.join(",")
        )));
    }
    Ok(())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| SopError::CsvImport(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| SopError::CsvImport(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
