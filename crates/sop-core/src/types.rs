use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// The fixed nine-stage lifecycle of a migration object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Scoping,
    Mapping,
    Extraction,
    Transformation,
    Load,
    Validation,
    Uat,
    Cutover,
    Complete,
}

impl Stage {
    pub fn all() -> &'static [Stage] {
        &[
            Stage::Scoping,
            Stage::Mapping,
            Stage::Extraction,
            Stage::Transformation,
            Stage::Load,
            Stage::Validation,
            Stage::Uat,
            Stage::Cutover,
            Stage::Complete,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Stage> {
        let all = Stage::all();
        let i = self.index();
        all.get(i + 1).copied()
    }

    /// Percent-complete for display: linear map of the stage index onto 0..=100.
    pub fn progress_percent(self) -> u8 {
        let last = Stage::all().len() - 1;
        (self.index() * 100 / last) as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Scoping => "scoping",
            Stage::Mapping => "mapping",
            Stage::Extraction => "extraction",
            Stage::Transformation => "transformation",
            Stage::Load => "load",
            Stage::Validation => "validation",
            Stage::Uat => "uat",
            Stage::Cutover => "cutover",
            Stage::Complete => "complete",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = crate::error::SopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scoping" => Ok(Stage::Scoping),
            "mapping" => Ok(Stage::Mapping),
            "extraction" => Ok(Stage::Extraction),
            "transformation" => Ok(Stage::Transformation),
            "load" => Ok(Stage::Load),
            "validation" => Ok(Stage::Validation),
            "uat" => Ok(Stage::Uat),
            "cutover" => Ok(Stage::Cutover),
            "complete" => Ok(Stage::Complete),
            _ => Err(crate::error::SopError::InvalidStage(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// IssueStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Open,
    InProgress,
    Closed,
}

impl IssueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueStatus::Open => "open",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IssueStatus {
    type Err = crate::error::SopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(IssueStatus::Open),
            "in_progress" => Ok(IssueStatus::InProgress),
            "closed" => Ok(IssueStatus::Closed),
            _ => Err(crate::error::SopError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// IssueSeverity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IssueSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueSeverity::Low => "low",
            IssueSeverity::Medium => "medium",
            IssueSeverity::High => "high",
            IssueSeverity::Critical => "critical",
        }
    }
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IssueSeverity {
    type Err = crate::error::SopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(IssueSeverity::Low),
            "medium" => Ok(IssueSeverity::Medium),
            "high" => Ok(IssueSeverity::High),
            "critical" => Ok(IssueSeverity::Critical),
            _ => Err(crate::error::SopError::InvalidSeverity(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// RecurrencePattern
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Custom,
}

impl RecurrencePattern {
    pub fn as_str(self) -> &'static str {
        match self {
            RecurrencePattern::Daily => "daily",
            RecurrencePattern::Weekly => "weekly",
            RecurrencePattern::Biweekly => "biweekly",
            RecurrencePattern::Monthly => "monthly",
            RecurrencePattern::Custom => "custom",
        }
    }
}

impl fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecurrencePattern {
    type Err = crate::error::SopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(RecurrencePattern::Daily),
            "weekly" => Ok(RecurrencePattern::Weekly),
            "biweekly" => Ok(RecurrencePattern::Biweekly),
            "monthly" => Ok(RecurrencePattern::Monthly),
            "custom" => Ok(RecurrencePattern::Custom),
            _ => Err(crate::error::SopError::InvalidRecurrence(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// TokenScope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenScope {
    #[serde(rename = "issues:read")]
    IssuesRead,
    #[serde(rename = "issues:write")]
    IssuesWrite,
}

impl TokenScope {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenScope::IssuesRead => "issues:read",
            TokenScope::IssuesWrite => "issues:write",
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TokenScope {
    type Err = crate::error::SopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "issues:read" => Ok(TokenScope::IssuesRead),
            "issues:write" => Ok(TokenScope::IssuesWrite),
            _ => Err(crate::error::SopError::InvalidScope(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_ordering() {
        assert!(Stage::Scoping < Stage::Mapping);
        assert!(Stage::Validation < Stage::Uat);
        assert!(Stage::Complete > Stage::Cutover);
    }

    #[test]
    fn stage_next() {
        assert_eq!(Stage::Scoping.next(), Some(Stage::Mapping));
        assert_eq!(Stage::Cutover.next(), Some(Stage::Complete));
        assert_eq!(Stage::Complete.next(), None);
    }

    #[test]
    fn stage_roundtrip() {
        use std::str::FromStr;
        for stage in Stage::all() {
            let parsed = Stage::from_str(stage.as_str()).unwrap();
            assert_eq!(*stage, parsed);
        }
    }

    #[test]
    fn stage_count_is_nine() {
        assert_eq!(Stage::all().len(), 9);
    }

    #[test]
    fn progress_percent_endpoints() {
        assert_eq!(Stage::Scoping.progress_percent(), 0);
        assert_eq!(Stage::Complete.progress_percent(), 100);
    }

    #[test]
    fn progress_percent_monotonic() {
        let mut last = 0;
        for stage in Stage::all() {
            let p = stage.progress_percent();
            assert!(p >= last, "percent must not decrease at {stage}");
            last = p;
        }
    }

    #[test]
    fn issue_status_roundtrip() {
        use std::str::FromStr;
        for s in ["open", "in_progress", "closed"] {
            assert_eq!(IssueStatus::from_str(s).unwrap().as_str(), s);
        }
        assert!(IssueStatus::from_str("bogus").is_err());
    }

    #[test]
    fn severity_ordering() {
        assert!(IssueSeverity::Low < IssueSeverity::Critical);
        assert!(IssueSeverity::Medium < IssueSeverity::High);
    }

    #[test]
    fn scope_roundtrip() {
        use std::str::FromStr;
        assert_eq!(
            TokenScope::from_str("issues:read").unwrap(),
            TokenScope::IssuesRead
        );
        assert_eq!(
            TokenScope::from_str("issues:write").unwrap(),
            TokenScope::IssuesWrite
        );
        assert!(TokenScope::from_str("admin").is_err());
    }

    #[test]
    fn pattern_roundtrip() {
        use std::str::FromStr;
        for p in ["daily", "weekly", "biweekly", "monthly", "custom"] {
            assert_eq!(RecurrencePattern::from_str(p).unwrap().as_str(), p);
        }
    }
}
