use thiserror::Error;

#[derive(Debug, Error)]
pub enum SopError {
    #[error("not initialized: run 'sop init'")]
    NotInitialized,

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("object already exists: {0}")]
    ObjectExists(String),

    #[error("issue not found: {0}")]
    IssueNotFound(String),

    #[error("meeting not found: {0}")]
    MeetingNotFound(String),

    #[error("recurring meeting not found: {0}")]
    RecurringNotFound(String),

    #[error("recurring meeting already exists: {0}")]
    RecurringExists(String),

    #[error("token not found: {0}")]
    TokenNotFound(String),

    #[error("invalid slug '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug(String),

    #[error("invalid stage: {0}")]
    InvalidStage(String),

    #[error("invalid issue status: {0}")]
    InvalidStatus(String),

    #[error("invalid severity: {0}")]
    InvalidSeverity(String),

    #[error("invalid scope: {0}")]
    InvalidScope(String),

    #[error("invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("invalid recurrence: {0}")]
    InvalidRecurrence(String),

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("csv import failed: {0}")]
    CsvImport(String),

    #[error("report generation failed: {0}")]
    Report(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SopError>;
