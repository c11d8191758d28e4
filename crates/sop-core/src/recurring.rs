use crate::error::{Result, SopError};
use crate::paths;
use crate::types::RecurrencePattern;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Recurrence
// ---------------------------------------------------------------------------

/// A repeating-meeting schedule definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recurrence {
    pub pattern: RecurrencePattern,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// 0 = Sunday … 6 = Saturday. Defaults to the start date's weekday.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u8>,
    /// 1..=31; clamped to the last valid day of short months.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    /// Step for the `custom` pattern. Defaults to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_days: Option<u32>,
}

impl Recurrence {
    pub fn validate(&self) -> Result<()> {
        if let Some(dow) = self.day_of_week {
            if dow > 6 {
                return Err(SopError::InvalidRecurrence(format!(
                    "day_of_week {dow} out of range 0..=6"
                )));
            }
        }
        if let Some(dom) = self.day_of_month {
            if !(1..=31).contains(&dom) {
                return Err(SopError::InvalidRecurrence(format!(
                    "day_of_month {dom} out of range 1..=31"
                )));
            }
        }
        if let Some(interval) = self.interval_days {
            if interval == 0 {
                return Err(SopError::InvalidRecurrence(
                    "interval_days must be at least 1".to_string(),
                ));
            }
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(SopError::InvalidRecurrence(
                    "end_date precedes start_date".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Occurrence expansion
// ---------------------------------------------------------------------------

/// Expand a recurrence into the ordered list of dates it occurs on within
/// `[range_start, range_end]`, clipped to `[start_date, end_date]`.
///
/// Pure calendar arithmetic: no side effects, identical inputs yield
/// identical output.
pub fn generate_occurrences(
    rec: &Recurrence,
    range_start: NaiveDate,
    range_end: NaiveDate,
) -> Vec<NaiveDate> {
    let lower = rec.start_date.max(range_start);
    let upper = match rec.end_date {
        Some(end) => end.min(range_end),
        None => range_end,
    };
    if upper < lower {
        return Vec::new();
    }

    match rec.pattern {
        RecurrencePattern::Daily => stepped(rec.start_date, 1, lower, upper),
        RecurrencePattern::Weekly => stepped(weekly_anchor(rec), 7, lower, upper),
        RecurrencePattern::Biweekly => stepped(weekly_anchor(rec), 14, lower, upper),
        RecurrencePattern::Custom => {
            let step = rec.interval_days.unwrap_or(1).max(1) as i64;
            stepped(rec.start_date, step, lower, upper)
        }
        RecurrencePattern::Monthly => monthly(rec, lower, upper),
    }
}

/// First date on/after the start matching the requested weekday
/// (0 = Sunday … 6 = Saturday).
fn weekly_anchor(rec: &Recurrence) -> NaiveDate {
    let Some(dow) = rec.day_of_week else {
        return rec.start_date;
    };
    let mut d = rec.start_date;
    while d.weekday().num_days_from_sunday() != dow as u32 {
        d += Duration::days(1);
    }
    d
}

/// Dates `anchor + k * step` (k ≥ 0) falling inside `[lower, upper]`.
fn stepped(anchor: NaiveDate, step: i64, lower: NaiveDate, upper: NaiveDate) -> Vec<NaiveDate> {
    let mut first = anchor;
    if lower > anchor {
        let gap = (lower - anchor).num_days();
        let k = gap.div_euclid(step) + i64::from(gap % step != 0);
        first = anchor + Duration::days(k * step);
    }

    let mut out = Vec::new();
    let mut d = first;
    while d <= upper {
        out.push(d);
        d += Duration::days(step);
    }
    out
}

/// One date per month on the target day, clamped to short months.
fn monthly(rec: &Recurrence, lower: NaiveDate, upper: NaiveDate) -> Vec<NaiveDate> {
    let target_day = rec.day_of_month.unwrap_or(rec.start_date.day());

    let mut out = Vec::new();
    let (mut year, mut month) = (lower.year(), lower.month());
    loop {
        let first_of_month = match NaiveDate::from_ymd_opt(year, month, 1) {
            Some(d) => d,
            None => break,
        };
        if first_of_month > upper {
            break;
        }

        let day = target_day.min(days_in_month(year, month));
        // from_ymd_opt cannot fail here: day is clamped to the month length.
        if let Some(d) = NaiveDate::from_ymd_opt(year, month, day) {
            if d >= lower && d <= upper {
                out.push(d);
            }
        }

        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    out
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

// ---------------------------------------------------------------------------
// ScheduleLog
// ---------------------------------------------------------------------------

/// Per-occurrence record of what happened on one concrete date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleLog {
    pub date: NaiveDate,
    #[serde(default)]
    pub invite_sent: bool,
    #[serde(default)]
    pub attended: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// RecurringMeeting
// ---------------------------------------------------------------------------

/// A template describing a repeating meeting's schedule pattern, plus the
/// per-date logs recorded against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringMeeting {
    pub slug: String,
    pub title: String,
    pub recurrence: Recurrence,
    #[serde(default)]
    pub logs: Vec<ScheduleLog>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecurringMeeting {
    pub fn create(
        root: &Path,
        slug: impl Into<String>,
        title: impl Into<String>,
        recurrence: Recurrence,
    ) -> Result<Self> {
        let slug = slug.into();
        paths::validate_slug(&slug)?;
        recurrence.validate()?;

        let dir = paths::recurring_dir(root, &slug);
        if dir.exists() {
            return Err(SopError::RecurringExists(slug));
        }

        let now = Utc::now();
        let meeting = Self {
            slug,
            title: title.into(),
            recurrence,
            logs: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        meeting.save(root)?;
        Ok(meeting)
    }

    pub fn load(root: &Path, slug: &str) -> Result<Self> {
        let manifest = paths::recurring_manifest(root, slug);
        if !manifest.exists() {
            return Err(SopError::RecurringNotFound(slug.to_string()));
        }
        let data = std::fs::read_to_string(&manifest)?;
        let meeting: RecurringMeeting = serde_yaml::from_str(&data)?;
        Ok(meeting)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let manifest = paths::recurring_manifest(root, &self.slug);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&manifest, data.as_bytes())
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = root.join(paths::RECURRING_DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut meetings = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                let slug = entry.file_name().to_string_lossy().into_owned();
                match Self::load(root, &slug) {
                    Ok(m) => meetings.push(m),
                    Err(SopError::RecurringNotFound(_)) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        meetings.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(meetings)
    }

    pub fn occurrences(&self, range_start: NaiveDate, range_end: NaiveDate) -> Vec<NaiveDate> {
        generate_occurrences(&self.recurrence, range_start, range_end)
    }

    /// Insert or replace the log for a date. One log per occurrence date.
    pub fn upsert_log(&mut self, log: ScheduleLog) {
        self.logs.retain(|l| l.date != log.date);
        self.logs.push(log);
        self.logs.sort_by_key(|l| l.date);
        self.updated_at = Utc::now();
    }

    pub fn log_for(&self, date: NaiveDate) -> Option<&ScheduleLog> {
        self.logs.iter().find(|l| l.date == date)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
