use crate::error::{Result, SopError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const SOP_DIR: &str = ".sop";
pub const OBJECTS_DIR: &str = ".sop/objects";
pub const ISSUES_DIR: &str = ".sop/issues";
pub const MEETINGS_DIR: &str = ".sop/meetings";
pub const RECURRING_DIR: &str = ".sop/recurring";

pub const CONFIG_FILE: &str = ".sop/config.yaml";
pub const TOKENS_FILE: &str = ".sop/tokens.yaml";
pub const PINS_FILE: &str = ".sop/pins.yaml";

pub const MANIFEST_FILE: &str = "manifest.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn sop_dir(root: &Path) -> PathBuf {
    root.join(SOP_DIR)
}

pub fn object_dir(root: &Path, slug: &str) -> PathBuf {
    root.join(OBJECTS_DIR).join(slug)
}

pub fn object_manifest(root: &Path, slug: &str) -> PathBuf {
    object_dir(root, slug).join(MANIFEST_FILE)
}

pub fn issue_dir(root: &Path, id: &str) -> PathBuf {
    root.join(ISSUES_DIR).join(id)
}

pub fn issue_manifest(root: &Path, id: &str) -> PathBuf {
    issue_dir(root, id).join(MANIFEST_FILE)
}

pub fn meeting_dir(root: &Path, id: &str) -> PathBuf {
    root.join(MEETINGS_DIR).join(id)
}

pub fn meeting_manifest(root: &Path, id: &str) -> PathBuf {
    meeting_dir(root, id).join(MANIFEST_FILE)
}

pub fn recurring_dir(root: &Path, slug: &str) -> PathBuf {
    root.join(RECURRING_DIR).join(slug)
}

pub fn recurring_manifest(root: &Path, slug: &str) -> PathBuf {
    recurring_dir(root, slug).join(MANIFEST_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn tokens_path(root: &Path) -> PathBuf {
    root.join(TOKENS_FILE)
}

pub fn pins_path(root: &Path) -> PathBuf {
    root.join(PINS_FILE)
}

// ---------------------------------------------------------------------------
// Slug validation
// ---------------------------------------------------------------------------

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_re() -> &'static Regex {
    SLUG_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > 64 || !slug_re().is_match(slug) {
        return Err(SopError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_slugs() {
        for slug in ["customer-master", "a", "gl-accounts-2024", "x1"] {
            validate_slug(slug).unwrap_or_else(|_| panic!("expected valid: {slug}"));
        }
    }

    #[test]
    fn invalid_slugs() {
        for slug in [
            "",
            "-starts-with-dash",
            "ends-with-dash-",
            "has spaces",
            "UPPER",
            "a_b",
        ] {
            assert!(validate_slug(slug).is_err(), "expected invalid: {slug}");
        }
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(config_path(root), PathBuf::from("/tmp/proj/.sop/config.yaml"));
        assert_eq!(
            object_manifest(root, "customer-master"),
            PathBuf::from("/tmp/proj/.sop/objects/customer-master/manifest.yaml")
        );
        assert_eq!(
            recurring_manifest(root, "weekly-sop"),
            PathBuf::from("/tmp/proj/.sop/recurring/weekly-sop/manifest.yaml")
        );
    }
}
