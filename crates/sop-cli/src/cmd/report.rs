use anyhow::Context;
use std::path::{Path, PathBuf};

pub fn run(root: &Path, out: Option<PathBuf>) -> anyhow::Result<()> {
    let bytes = sop_core::report::build_workbook(root).context("failed to build workbook")?;
    let out = out.unwrap_or_else(|| PathBuf::from("sop-status.xlsx"));
    std::fs::write(&out, &bytes).with_context(|| format!("failed to write {}", out.display()))?;
    println!("Wrote {} ({} bytes)", out.display(), bytes.len());
    Ok(())
}
