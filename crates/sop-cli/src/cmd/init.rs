use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, project: Option<&str>) -> anyhow::Result<()> {
    let project = match project {
        Some(p) => p.to_string(),
        None => root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string()),
    };

    println!("Initializing S&OP tracker in: {}", root.display());
    let config = sop_core::config::init(root, &project).context("failed to scaffold .sop/")?;
    println!("  project: {}", config.project);
    println!("Next: sop object create <slug> --title <title>");
    Ok(())
}
