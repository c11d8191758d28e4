use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::NaiveDate;
use clap::Subcommand;
use minutes_agent::{MinutesClient, MinutesMode};
use sop_core::meeting::{link_action_items, ActionItem, Meeting, Minutes};
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum MeetingSubcommand {
    /// Record a held meeting
    Create {
        title: String,
        /// Date the meeting was held (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Attendees (repeatable)
        #[arg(long)]
        attendee: Vec<String>,
    },
    /// List meetings
    List,
    /// Show meeting details
    Show { id: String },
    /// Attach a transcript from a file
    Transcript { id: String, file: PathBuf },
    /// Add an action item (converted to an issue by link-actions)
    Action {
        id: String,
        title: String,
        #[arg(long)]
        object: String,
        #[arg(long)]
        owner: Option<String>,
    },
    /// Generate minutes-of-meeting from the transcript
    Minutes {
        id: String,
        /// concise or detailed
        #[arg(long, default_value = "concise")]
        mode: String,
    },
    /// Convert pending action items into issues
    LinkActions { id: String },
    /// Polish an email draft
    Email {
        #[arg(long)]
        subject: String,
        /// File containing the rough draft
        file: PathBuf,
    },
}

pub fn run(root: &Path, subcmd: MeetingSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        MeetingSubcommand::Create {
            title,
            date,
            attendee,
        } => create(root, &title, &date, attendee, json),
        MeetingSubcommand::List => list(root, json),
        MeetingSubcommand::Show { id } => show(root, &id, json),
        MeetingSubcommand::Transcript { id, file } => transcript(root, &id, &file),
        MeetingSubcommand::Action {
            id,
            title,
            object,
            owner,
        } => action(root, &id, &title, &object, owner),
        MeetingSubcommand::Minutes { id, mode } => minutes(root, &id, &mode, json),
        MeetingSubcommand::LinkActions { id } => link_actions(root, &id, json),
        MeetingSubcommand::Email { subject, file } => email(&subject, &file, json),
    }
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| sop_core::SopError::InvalidDate(s.to_string()).into())
}

fn create(
    root: &Path,
    title: &str,
    date: &str,
    attendees: Vec<String>,
    json: bool,
) -> anyhow::Result<()> {
    let held_on = parse_date(date)?;
    let mut meeting = Meeting::create(root, title, held_on)?;
    meeting.attendees = if attendees.is_empty() {
        sop_core::config::Config::load(root)
            .map(|c| c.default_attendees)
            .unwrap_or_default()
    } else {
        attendees
    };
    meeting.save(root)?;

    if json {
        print_json(&meeting)?;
    } else {
        println!("Created meeting {} — {title} ({date})", meeting.id);
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let meetings = Meeting::list(root).context("failed to list meetings")?;

    if json {
        print_json(&meetings)?;
        return Ok(());
    }

    if meetings.is_empty() {
        println!("No meetings yet.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = meetings
        .iter()
        .map(|m| {
            vec![
                m.id.clone(),
                m.held_on.to_string(),
                if m.minutes.is_some() { "yes" } else { "" }.to_string(),
                m.linked_issues.len().to_string(),
                m.title.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "DATE", "MINUTES", "ISSUES", "TITLE"], rows);
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let meeting = Meeting::load(root, id).with_context(|| format!("meeting '{id}' not found"))?;

    if json {
        print_json(&meeting)?;
        return Ok(());
    }

    println!("Meeting: {} — {}", meeting.id, meeting.title);
    println!("Held: {}", meeting.held_on);
    if !meeting.attendees.is_empty() {
        println!("Attendees: {}", meeting.attendees.join(", "));
    }
    if let Some(minutes) = &meeting.minutes {
        println!("\nTL;DR: {}", minutes.tldr);
        for p in &minutes.discussion_points {
            println!("  - {p}");
        }
        if !minutes.next_steps.is_empty() {
            println!("Next steps:");
            for s in &minutes.next_steps {
                println!("  - {s}");
            }
        }
        if !minutes.quote.is_empty() {
            println!("Quote: \"{}\"", minutes.quote);
        }
        println!("(generated by {})", minutes.model_used);
    }
    if !meeting.action_items.is_empty() {
        println!("Action items:");
        for (i, item) in meeting.action_items.iter().enumerate() {
            let linked = if i < meeting.linked_issues.len() {
                " [linked]"
            } else {
                ""
            };
            println!("  - {} → {}{linked}", item.title, item.object_slug);
        }
    }
    Ok(())
}

fn transcript(root: &Path, id: &str, file: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let mut meeting = Meeting::load(root, id).with_context(|| format!("meeting '{id}' not found"))?;
    meeting.set_transcript(text);
    meeting.save(root)?;
    println!("Attached transcript to {id}");
    Ok(())
}

fn action(
    root: &Path,
    id: &str,
    title: &str,
    object: &str,
    owner: Option<String>,
) -> anyhow::Result<()> {
    let mut meeting = Meeting::load(root, id).with_context(|| format!("meeting '{id}' not found"))?;
    meeting.add_action_item(ActionItem {
        title: title.to_string(),
        object_slug: object.to_string(),
        owner,
    });
    meeting.save(root)?;
    println!("Added action item to {id}");
    Ok(())
}

fn minutes(root: &Path, id: &str, mode: &str, json: bool) -> anyhow::Result<()> {
    let mode = match mode {
        "concise" => MinutesMode::Concise,
        "detailed" => MinutesMode::Detailed,
        other => anyhow::bail!("unknown mode '{other}': expected concise or detailed"),
    };

    let mut meeting = Meeting::load(root, id).with_context(|| format!("meeting '{id}' not found"))?;
    let transcript = meeting
        .transcript
        .clone()
        .with_context(|| format!("meeting '{id}' has no transcript"))?;

    let client = MinutesClient::from_env()?;
    let rt = tokio::runtime::Runtime::new()?;
    let draft = rt.block_on(client.generate_minutes(&meeting.title, &transcript, mode))?;

    let minutes = Minutes {
        tldr: draft.tldr,
        discussion_points: draft.discussion_points,
        next_steps: draft.next_steps,
        action_log: draft.action_log,
        quote: draft.quote,
        model_used: draft.model_used,
    };
    meeting.set_minutes(minutes.clone());
    meeting.save(root)?;

    if json {
        print_json(&minutes)?;
    } else {
        println!("TL;DR: {}", minutes.tldr);
        println!("(generated by {})", minutes.model_used);
    }
    Ok(())
}

fn link_actions(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let mut meeting = Meeting::load(root, id).with_context(|| format!("meeting '{id}' not found"))?;
    let created = link_action_items(root, &mut meeting)?;

    if json {
        print_json(&created)?;
    } else if created.is_empty() {
        println!("Nothing to link.");
    } else {
        println!("Created {} issue(s):", created.len());
        for issue_id in &created {
            println!("  {issue_id}");
        }
    }
    Ok(())
}

fn email(subject: &str, file: &Path, json: bool) -> anyhow::Result<()> {
    let body = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let client = MinutesClient::from_env()?;
    let rt = tokio::runtime::Runtime::new()?;
    let draft = rt.block_on(client.polish_email(subject, &body));

    if json {
        print_json(&draft)?;
    } else {
        println!("Subject: {}", draft.subject);
        println!("\n{}", draft.body);
    }
    Ok(())
}
