use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::Utc;
use clap::Subcommand;
use sop_core::csv_io;
use sop_core::issue::Issue;
use sop_core::types::{IssueSeverity, IssueStatus};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Subcommand)]
pub enum IssueSubcommand {
    /// Open an issue against an object
    Create {
        object_slug: String,
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        severity: Option<String>,
        #[arg(long)]
        owner: Option<String>,
    },
    /// List issues
    List {
        /// Filter by object slug
        #[arg(long)]
        object: Option<String>,
        /// Filter by status (open, in_progress, closed)
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        include_archived: bool,
    },
    /// Show issue details
    Show { id: String },
    /// Set the issue status
    Status { id: String, status: String },
    /// Close an issue
    Close { id: String },
    /// Archive an issue
    Archive { id: String },
    /// Add a comment
    Comment {
        id: String,
        body: String,
        #[arg(long)]
        author: Option<String>,
    },
    /// Bulk-import issues from a CSV file
    Import { file: PathBuf },
    /// Export issues to CSV (stdout, or --out)
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

pub fn run(root: &Path, subcmd: IssueSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        IssueSubcommand::Create {
            object_slug,
            title,
            description,
            severity,
            owner,
        } => create(root, &object_slug, &title, description, severity, owner, json),
        IssueSubcommand::List {
            object,
            status,
            include_archived,
        } => list(root, object.as_deref(), status.as_deref(), include_archived, json),
        IssueSubcommand::Show { id } => show(root, &id, json),
        IssueSubcommand::Status { id, status } => set_status(root, &id, &status, json),
        IssueSubcommand::Close { id } => close(root, &id, json),
        IssueSubcommand::Archive { id } => archive(root, &id, json),
        IssueSubcommand::Comment { id, body, author } => comment(root, &id, &body, author),
        IssueSubcommand::Import { file } => import(root, &file, json),
        IssueSubcommand::Export { out } => export(root, out.as_deref()),
    }
}

fn create(
    root: &Path,
    object_slug: &str,
    title: &str,
    description: Option<String>,
    severity: Option<String>,
    owner: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let mut issue = Issue::create(root, object_slug, title)
        .with_context(|| format!("failed to create issue on '{object_slug}'"))?;
    if let Some(s) = severity {
        issue.severity = IssueSeverity::from_str(&s)?;
    }
    issue.description = description;
    issue.owner = owner;
    issue.save(root)?;

    if json {
        print_json(&issue)?;
    } else {
        println!("Opened issue {} on {object_slug}: {title}", issue.id);
    }
    Ok(())
}

fn list(
    root: &Path,
    object: Option<&str>,
    status: Option<&str>,
    include_archived: bool,
    json: bool,
) -> anyhow::Result<()> {
    let status = status.map(IssueStatus::from_str).transpose()?;
    let mut issues = match object {
        Some(slug) => Issue::list_for_object(root, slug)?,
        None => Issue::list(root)?,
    };
    if !include_archived {
        issues.retain(|i| !i.archived);
    }
    if let Some(s) = status {
        issues.retain(|i| i.status == s);
    }

    if json {
        print_json(&issues)?;
        return Ok(());
    }

    if issues.is_empty() {
        println!("No issues.");
        return Ok(());
    }

    let now = Utc::now();
    let rows: Vec<Vec<String>> = issues
        .iter()
        .map(|i| {
            vec![
                i.id.clone(),
                i.object_slug.clone(),
                i.severity.to_string(),
                i.status.to_string(),
                format!("{}d", i.aging_days(now)),
                i.owner.clone().unwrap_or_default(),
                i.title.clone(),
            ]
        })
        .collect();
    print_table(
        &["ID", "OBJECT", "SEVERITY", "STATUS", "AGE", "OWNER", "TITLE"],
        rows,
    );
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let issue = Issue::load(root, id).with_context(|| format!("issue '{id}' not found"))?;

    if json {
        print_json(&issue)?;
        return Ok(());
    }

    println!("Issue: {} — {}", issue.id, issue.title);
    println!("Object: {}", issue.object_slug);
    println!("Severity: {}  Status: {}", issue.severity, issue.status);
    if let Some(d) = &issue.description {
        println!("  {d}");
    }
    if let Some(owner) = &issue.owner {
        println!("Owner: {owner}");
    }
    if let Some(m) = &issue.source_meeting {
        println!("Raised in meeting: {m}");
    }
    if let Some(closed) = issue.closed_at {
        println!("Closed: {}", closed.format("%Y-%m-%d"));
    }
    for c in &issue.comments {
        println!(
            "[{}] {}: {}",
            c.id,
            c.author.as_deref().unwrap_or("anon"),
            c.body
        );
    }
    Ok(())
}

fn set_status(root: &Path, id: &str, status: &str, json: bool) -> anyhow::Result<()> {
    let mut issue = Issue::load(root, id).with_context(|| format!("issue '{id}' not found"))?;
    issue.set_status(IssueStatus::from_str(status)?);
    issue.save(root)?;

    if json {
        print_json(&issue)?;
    } else {
        println!("{id}: {}", issue.status);
    }
    Ok(())
}

fn close(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let mut issue = Issue::load(root, id).with_context(|| format!("issue '{id}' not found"))?;
    issue.close();
    issue.save(root)?;

    if json {
        print_json(&issue)?;
    } else {
        println!("Closed issue {id}");
    }
    Ok(())
}

fn archive(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let mut issue = Issue::load(root, id).with_context(|| format!("issue '{id}' not found"))?;
    issue.set_archived(true);
    issue.save(root)?;

    if json {
        print_json(&issue)?;
    } else {
        println!("Archived issue {id}");
    }
    Ok(())
}

fn comment(root: &Path, id: &str, body: &str, author: Option<String>) -> anyhow::Result<()> {
    let mut issue = Issue::load(root, id).with_context(|| format!("issue '{id}' not found"))?;
    let comment_id = issue.add_comment(body, author);
    issue.save(root)?;
    println!("Added comment {comment_id} to {id}");
    Ok(())
}

fn import(root: &Path, file: &Path, json: bool) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let report = csv_io::import_issues(root, &data)?;

    if json {
        print_json(&report)?;
        return Ok(());
    }

    println!("Imported {} issue(s)", report.created.len());
    for err in &report.errors {
        println!("  line {}: {}", err.line, err.message);
    }
    Ok(())
}

fn export(root: &Path, out: Option<&Path>) -> anyhow::Result<()> {
    let csv = csv_io::export_issues(root)?;
    match out {
        Some(path) => {
            std::fs::write(path, &csv)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}
