use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn sop(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sop").unwrap();
    cmd.current_dir(dir.path()).env("SOP_ROOT", dir.path());
    cmd
}

fn init_project(dir: &TempDir) {
    sop(dir).arg("init").assert().success();
}

// ---------------------------------------------------------------------------
// sop init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_directory_tree() {
    let dir = TempDir::new().unwrap();
    sop(&dir).arg("init").assert().success();

    assert!(dir.path().join(".sop").is_dir());
    assert!(dir.path().join(".sop/objects").is_dir());
    assert!(dir.path().join(".sop/issues").is_dir());
    assert!(dir.path().join(".sop/meetings").is_dir());
    assert!(dir.path().join(".sop/recurring").is_dir());
    assert!(dir.path().join(".sop/config.yaml").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    sop(&dir).arg("init").assert().success();
    sop(&dir).arg("init").assert().success();
}

// ---------------------------------------------------------------------------
// sop object
// ---------------------------------------------------------------------------

#[test]
fn object_create_and_list() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    sop(&dir)
        .args([
            "object",
            "create",
            "customer-master",
            "--title",
            "Customer Master",
            "--owner",
            "alice",
        ])
        .assert()
        .success();

    sop(&dir)
        .args(["object", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("customer-master"))
        .stdout(predicate::str::contains("scoping"));
}

#[test]
fn object_advance_forward_only() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    sop(&dir)
        .args(["object", "create", "vendors", "--title", "Vendors"])
        .assert()
        .success();

    sop(&dir)
        .args(["object", "advance", "vendors", "extraction"])
        .assert()
        .success()
        .stdout(predicate::str::contains("extraction"));

    sop(&dir)
        .args(["object", "advance", "vendors", "mapping"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("forward-only"));
}

#[test]
fn object_invalid_stage_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    sop(&dir)
        .args(["object", "create", "vendors"])
        .assert()
        .success();

    sop(&dir)
        .args(["object", "advance", "vendors", "warp-drive"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid stage"));
}

#[test]
fn object_archive_hides_from_list() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    sop(&dir)
        .args(["object", "create", "vendors"])
        .assert()
        .success();
    sop(&dir)
        .args(["object", "archive", "vendors"])
        .assert()
        .success();

    sop(&dir)
        .args(["object", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vendors").not());

    sop(&dir)
        .args(["object", "list", "--include-archived"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vendors"));
}

#[test]
fn object_json_output() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    sop(&dir)
        .args(["object", "create", "gl-accounts", "--title", "GL"])
        .assert()
        .success();

    let output = sop(&dir)
        .args(["--json", "object", "show", "gl-accounts"])
        .output()
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["slug"], "gl-accounts");
    assert_eq!(parsed["stage"], "scoping");
}

// ---------------------------------------------------------------------------
// sop object import/export
// ---------------------------------------------------------------------------

#[test]
fn object_csv_roundtrip() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let csv_path = dir.path().join("objects.csv");
    std::fs::write(
        &csv_path,
        "slug,title,description,owner,stage\n\
         customer-master,Customer Master,,alice,scoping\n\
         BAD SLUG,Broken,,,scoping\n\
         vendors,Vendors,,bob,mapping\n",
    )
    .unwrap();

    sop(&dir)
        .args(["object", "import"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 object(s)"))
        .stdout(predicate::str::contains("line 3"));

    sop(&dir)
        .args(["object", "export"])
        .assert()
        .success()
        .stdout(predicate::str::contains("customer-master"))
        .stdout(predicate::str::contains("vendors"));
}

// ---------------------------------------------------------------------------
// sop issue
// ---------------------------------------------------------------------------

#[test]
fn issue_lifecycle() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    sop(&dir)
        .args(["object", "create", "obj", "--title", "Obj"])
        .assert()
        .success();

    let output = sop(&dir)
        .args([
            "--json",
            "issue",
            "create",
            "obj",
            "Dup rows",
            "--severity",
            "high",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let id = parsed["id"].as_str().unwrap().to_string();
    assert_eq!(parsed["severity"], "high");

    sop(&dir)
        .args(["issue", "close", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Closed"));

    sop(&dir)
        .args(["issue", "list", "--status", "closed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dup rows"));
}

#[test]
fn issue_against_missing_object_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    sop(&dir)
        .args(["issue", "create", "ghost", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("object not found"));
}

// ---------------------------------------------------------------------------
// sop meeting / recur
// ---------------------------------------------------------------------------

#[test]
fn meeting_actions_link_to_issues() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    sop(&dir)
        .args(["object", "create", "obj", "--title", "Obj"])
        .assert()
        .success();

    let output = sop(&dir)
        .args([
            "--json",
            "meeting",
            "create",
            "Weekly S&OP",
            "--date",
            "2024-03-04",
            "--attendee",
            "alice",
        ])
        .output()
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let id = parsed["id"].as_str().unwrap().to_string();

    sop(&dir)
        .args([
            "meeting",
            "action",
            &id,
            "Fix dedupe rule",
            "--object",
            "obj",
            "--owner",
            "alice",
        ])
        .assert()
        .success();

    sop(&dir)
        .args(["meeting", "link-actions", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created 1 issue(s)"));

    // Repeat link is a no-op.
    sop(&dir)
        .args(["meeting", "link-actions", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to link"));

    sop(&dir)
        .args(["issue", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fix dedupe rule"));
}

#[test]
fn recur_occurrences_expand() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    sop(&dir)
        .args([
            "recur",
            "create",
            "weekly-sop",
            "--pattern",
            "weekly",
            "--start",
            "2024-01-01",
            "--day-of-week",
            "1",
        ])
        .assert()
        .success();

    sop(&dir)
        .args([
            "recur",
            "occurrences",
            "weekly-sop",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-01-01"))
        .stdout(predicate::str::contains("2024-01-29"));

    sop(&dir)
        .args([
            "recur", "log", "weekly-sop", "2024-01-08", "--attended", "--invite-sent",
        ])
        .assert()
        .success();

    sop(&dir)
        .args([
            "recur",
            "occurrences",
            "weekly-sop",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("attended: yes"));
}

// ---------------------------------------------------------------------------
// sop report / token
// ---------------------------------------------------------------------------

#[test]
fn report_writes_workbook() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    sop(&dir)
        .args(["object", "create", "obj", "--title", "Obj"])
        .assert()
        .success();

    let out = dir.path().join("status.xlsx");
    sop(&dir)
        .args(["report", "--out"])
        .arg(&out)
        .assert()
        .success();

    let bytes = std::fs::read(&out).unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn token_create_list_revoke() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let output = sop(&dir)
        .args([
            "--json",
            "token",
            "create",
            "ci",
            "--owner",
            "alice",
            "--scope",
            "issues:read",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let id = parsed["id"].as_str().unwrap().to_string();
    assert!(parsed["token"].as_str().unwrap().starts_with("sop_"));

    sop(&dir)
        .args(["token", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice"))
        // Only the display prefix is shown, never a full token.
        .stdout(predicate::str::contains(parsed["token"].as_str().unwrap()).not());

    sop(&dir)
        .args(["token", "revoke", &id])
        .assert()
        .success();

    sop(&dir)
        .args(["token", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("revoked"));
}

#[test]
fn token_requires_scope() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    sop(&dir)
        .args(["token", "create", "ci", "--owner", "alice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--scope"));
}

// ---------------------------------------------------------------------------
// sop pin
// ---------------------------------------------------------------------------

#[test]
fn pin_add_list_remove() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    sop(&dir)
        .args(["pin", "add", "alice", "customer-master"])
        .assert()
        .success();
    sop(&dir)
        .args(["pin", "list", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("customer-master"));

    sop(&dir)
        .args(["pin", "remove", "alice", "customer-master"])
        .assert()
        .success();
    sop(&dir)
        .args(["pin", "list", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No pins"));
}
