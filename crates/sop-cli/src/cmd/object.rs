use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::Utc;
use clap::Subcommand;
use sop_core::csv_io;
use sop_core::object::Object;
use sop_core::types::Stage;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Subcommand)]
pub enum ObjectSubcommand {
    /// Create a new migration object
    Create {
        slug: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        owner: Option<String>,
    },
    /// List objects
    List {
        #[arg(long)]
        include_archived: bool,
    },
    /// Show object details
    Show { slug: String },
    /// Advance an object to a later stage
    Advance { slug: String, stage: String },
    /// Archive an object
    Archive { slug: String },
    /// Add a comment
    Comment {
        slug: String,
        body: String,
        #[arg(long)]
        author: Option<String>,
    },
    /// Bulk-import objects from a CSV file
    Import { file: PathBuf },
    /// Export objects to CSV (stdout, or --out)
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

pub fn run(root: &Path, subcmd: ObjectSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ObjectSubcommand::Create {
            slug,
            title,
            description,
            owner,
        } => create(root, &slug, title, description, owner, json),
        ObjectSubcommand::List { include_archived } => list(root, include_archived, json),
        ObjectSubcommand::Show { slug } => show(root, &slug, json),
        ObjectSubcommand::Advance { slug, stage } => advance(root, &slug, &stage, json),
        ObjectSubcommand::Archive { slug } => archive(root, &slug, json),
        ObjectSubcommand::Comment { slug, body, author } => comment(root, &slug, &body, author),
        ObjectSubcommand::Import { file } => import(root, &file, json),
        ObjectSubcommand::Export { out } => export(root, out.as_deref()),
    }
}

fn create(
    root: &Path,
    slug: &str,
    title: Option<String>,
    description: Option<String>,
    owner: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let title = title.unwrap_or_else(|| slug.replace('-', " "));
    let mut object = Object::create(root, slug, &title)
        .with_context(|| format!("failed to create object '{slug}'"))?;
    if let Some(d) = description {
        object.set_description(d);
    }
    if let Some(o) = owner {
        object.set_owner(o);
    }
    object.save(root)?;

    if json {
        print_json(&object)?;
    } else {
        println!("Created object: {slug} — {title}");
        println!("Next: sop object advance {slug} mapping");
    }
    Ok(())
}

fn list(root: &Path, include_archived: bool, json: bool) -> anyhow::Result<()> {
    let mut objects = Object::list(root).context("failed to list objects")?;
    if !include_archived {
        objects.retain(|o| !o.archived);
    }

    if json {
        let now = Utc::now();
        let summaries: Vec<_> = objects
            .iter()
            .map(|o| {
                serde_json::json!({
                    "slug": o.slug,
                    "title": o.title,
                    "owner": o.owner,
                    "stage": o.stage.to_string(),
                    "progress_percent": o.progress_percent(),
                    "aging_days": o.aging_days(now),
                    "archived": o.archived,
                })
            })
            .collect();
        print_json(&summaries)?;
        return Ok(());
    }

    if objects.is_empty() {
        println!("No objects yet.");
        return Ok(());
    }

    let now = Utc::now();
    let rows: Vec<Vec<String>> = objects
        .iter()
        .map(|o| {
            vec![
                o.slug.clone(),
                o.stage.to_string(),
                format!("{}%", o.progress_percent()),
                format!("{}d", o.aging_days(now)),
                o.owner.clone().unwrap_or_default(),
                o.title.clone(),
            ]
        })
        .collect();
    print_table(&["SLUG", "STAGE", "PROGRESS", "AGING", "OWNER", "TITLE"], rows);
    Ok(())
}

fn show(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    let object = Object::load(root, slug).with_context(|| format!("object '{slug}' not found"))?;

    if json {
        print_json(&object)?;
        return Ok(());
    }

    println!("Object: {} — {}", object.slug, object.title);
    if let Some(d) = &object.description {
        println!("  {d}");
    }
    println!(
        "Stage: {} ({}%, {} days in stage)",
        object.stage,
        object.progress_percent(),
        object.aging_days(Utc::now())
    );
    if let Some(owner) = &object.owner {
        println!("Owner: {owner}");
    }
    if object.archived {
        println!("Status: archived");
    }
    if !object.stage_history.is_empty() {
        println!("History:");
        for t in &object.stage_history {
            let exited = t
                .exited
                .map(|e| e.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "now".to_string());
            println!("  {} {} → {}", t.stage, t.entered.format("%Y-%m-%d"), exited);
        }
    }
    for c in &object.comments {
        println!(
            "[{}] {}: {}",
            c.id,
            c.author.as_deref().unwrap_or("anon"),
            c.body
        );
    }
    Ok(())
}

fn advance(root: &Path, slug: &str, stage: &str, json: bool) -> anyhow::Result<()> {
    let mut object = Object::load(root, slug).with_context(|| format!("object '{slug}' not found"))?;
    let target = Stage::from_str(stage)?;
    object.advance(target)?;
    object.save(root)?;

    if json {
        print_json(&object)?;
    } else {
        println!(
            "{slug}: {} ({}% complete)",
            object.stage,
            object.progress_percent()
        );
    }
    Ok(())
}

fn archive(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    let mut object = Object::load(root, slug).with_context(|| format!("object '{slug}' not found"))?;
    object.set_archived(true);
    object.save(root)?;

    if json {
        print_json(&object)?;
    } else {
        println!("Archived object: {slug}");
    }
    Ok(())
}

fn comment(root: &Path, slug: &str, body: &str, author: Option<String>) -> anyhow::Result<()> {
    let mut object = Object::load(root, slug).with_context(|| format!("object '{slug}' not found"))?;
    let id = object.add_comment(body, author);
    object.save(root)?;
    println!("Added comment {id} to {slug}");
    Ok(())
}

fn import(root: &Path, file: &Path, json: bool) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let report = csv_io::import_objects(root, &data)?;

    if json {
        print_json(&report)?;
        return Ok(());
    }

    println!("Imported {} object(s)", report.created.len());
    for err in &report.errors {
        println!("  line {}: {}", err.line, err.message);
    }
    Ok(())
}

fn export(root: &Path, out: Option<&Path>) -> anyhow::Result<()> {
    let csv = csv_io::export_objects(root)?;
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
