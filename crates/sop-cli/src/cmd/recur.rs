use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::NaiveDate;
use clap::Subcommand;
use sop_core::recurring::{Recurrence, RecurringMeeting, ScheduleLog};
use sop_core::types::RecurrencePattern;
use std::path::Path;
use std::str::FromStr;

#[derive(Subcommand)]
pub enum RecurSubcommand {
    /// Create a recurring meeting template
    Create {
        slug: String,
        #[arg(long)]
        title: Option<String>,
        /// daily, weekly, biweekly, monthly, or custom
        #[arg(long)]
        pattern: String,
        /// First date of the schedule (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Last date of the schedule (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        /// Weekday for weekly/biweekly (0 = Sunday .. 6 = Saturday)
        #[arg(long)]
        day_of_week: Option<u8>,
        /// Day of month for monthly (1..=31, clamped to short months)
        #[arg(long)]
        day_of_month: Option<u32>,
        /// Step in days for the custom pattern
        #[arg(long)]
        interval: Option<u32>,
    },
    /// List recurring meeting templates
    List,
    /// Expand a template into concrete dates
    Occurrences {
        slug: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Record what happened on one occurrence date
    Log {
        slug: String,
        date: String,
        #[arg(long)]
        invite_sent: bool,
        #[arg(long)]
        attended: bool,
        #[arg(long)]
        notes: Option<String>,
    },
}

pub fn run(root: &Path, subcmd: RecurSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        RecurSubcommand::Create {
            slug,
            title,
            pattern,
            start,
            end,
            day_of_week,
            day_of_month,
            interval,
        } => create(
            root,
            &slug,
            title,
            &pattern,
            &start,
            end.as_deref(),
            day_of_week,
            day_of_month,
            interval,
            json,
        ),
        RecurSubcommand::List => list(root, json),
        RecurSubcommand::Occurrences { slug, from, to } => occurrences(root, &slug, &from, &to, json),
        RecurSubcommand::Log {
            slug,
            date,
            invite_sent,
            attended,
            notes,
        } => log(root, &slug, &date, invite_sent, attended, notes, json),
    }
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| sop_core::SopError::InvalidDate(s.to_string()).into())
}

#[allow(clippy::too_many_arguments)]
fn create(
    root: &Path,
    slug: &str,
    title: Option<String>,
    pattern: &str,
    start: &str,
    end: Option<&str>,
    day_of_week: Option<u8>,
    day_of_month: Option<u32>,
    interval: Option<u32>,
    json: bool,
) -> anyhow::Result<()> {
    let title = title.unwrap_or_else(|| slug.replace('-', " "));
    let recurrence = Recurrence {
        pattern: RecurrencePattern::from_str(pattern)?,
        start_date: parse_date(start)?,
        end_date: end.map(parse_date).transpose()?,
        day_of_week,
        day_of_month,
        interval_days: interval,
    };
    let meeting = RecurringMeeting::create(root, slug, &title, recurrence)
        .with_context(|| format!("failed to create recurring meeting '{slug}'"))?;

    if json {
        print_json(&meeting)?;
    } else {
        println!("Created recurring meeting: {slug} — {title}");
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let meetings = RecurringMeeting::list(root).context("failed to list recurring meetings")?;

    if json {
        print_json(&meetings)?;
        return Ok(());
    }

    if meetings.is_empty() {
        println!("No recurring meetings.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = meetings
        .iter()
        .map(|m| {
            vec![
                m.slug.clone(),
                m.recurrence.pattern.to_string(),
                m.recurrence.start_date.to_string(),
                m.recurrence
                    .end_date
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                m.logs.len().to_string(),
                m.title.clone(),
            ]
        })
        .collect();
    print_table(&["SLUG", "PATTERN", "START", "END", "LOGS", "TITLE"], rows);
    Ok(())
}

fn occurrences(root: &Path, slug: &str, from: &str, to: &str, json: bool) -> anyhow::Result<()> {
    let meeting = RecurringMeeting::load(root, slug)
        .with_context(|| format!("recurring meeting '{slug}' not found"))?;
    let dates = meeting.occurrences(parse_date(from)?, parse_date(to)?);

    if json {
        let list: Vec<_> = dates
            .iter()
            .map(|d| serde_json::json!({ "date": d, "log": meeting.log_for(*d) }))
            .collect();
        print_json(&list)?;
        return Ok(());
    }

    if dates.is_empty() {
        println!("No occurrences in range.");
        return Ok(());
    }

    for d in &dates {
        match meeting.log_for(*d) {
            Some(l) => println!(
                "{d}  invite: {}  attended: {}{}",
                if l.invite_sent { "sent" } else { "-" },
                if l.attended { "yes" } else { "no" },
                l.notes.as_deref().map(|n| format!("  {n}")).unwrap_or_default(),
            ),
            None => println!("{d}"),
        }
    }
    Ok(())
}

fn log(
    root: &Path,
    slug: &str,
    date: &str,
    invite_sent: bool,
    attended: bool,
    notes: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let mut meeting = RecurringMeeting::load(root, slug)
        .with_context(|| format!("recurring meeting '{slug}' not found"))?;
    meeting.upsert_log(ScheduleLog {
        date: parse_date(date)?,
        invite_sent,
        attended,
        notes,
    });
    meeting.save(root)?;

    if json {
        print_json(&meeting.logs)?;
    } else {
        println!("Logged {date} for {slug}");
    }
    Ok(())
}
