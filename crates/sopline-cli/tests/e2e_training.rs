//! E2E CLI tests covering:
//! - Identity (`sop whoami`)
//! - Training progress for a person, the team and the organization (`sop progress`)
//! - Team invitations (`sop invite`)
//! - Plan catalogue and limit checks (`sop plans`)
//! - Effective configuration (`sop config`) and completions

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

const OWNER_ID: &str = "u0000000-0000-0000-0000-000000000001";
const PRIYA_ID: &str = "u0000000-0000-0000-0000-000000000003";

fn sop_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sop"));
    cmd.current_dir(dir);
    cmd.env("SOPLINE_LOG", "error");
    cmd.env("SOPLINE_DEV_MOCK", "true");
    cmd.env("XDG_CONFIG_HOME", dir);
    cmd.env("HOME", dir);
    cmd.env_remove("FORMAT");
    cmd.env_remove("STRIPE_STARTER_PRICE_ID");
    cmd.env_remove("STRIPE_PRO_PRICE_ID");
    cmd
}

fn sop_json(dir: &Path, args: &[&str]) -> Value {
    let output = sop_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("sop should not crash");
    assert!(
        output.status.success(),
        "sop {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("--json should produce valid JSON")
}

// ---------------------------------------------------------------------------
// whoami
// ---------------------------------------------------------------------------

#[test]
fn whoami_reports_fixed_owner_identity() {
    let dir = TempDir::new().unwrap();
    let json = sop_json(dir.path(), &["whoami"]);
    assert_eq!(json["user"]["id"], OWNER_ID);
    assert_eq!(json["user"]["email"], "owner@demo.com");
    assert_eq!(json["profile"]["role"], "owner");
    assert_eq!(json["organization"]["subscription_status"], "trialing");
    assert_eq!(json["plan"], "starter");
    assert_eq!(json["can_manage_team"], true);
}

#[test]
fn whoami_text_output_is_key_value_lines() {
    let dir = TempDir::new().unwrap();
    sop_cmd(dir.path())
        .args(["whoami", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("id={OWNER_ID}\n")))
        .stdout(predicate::str::contains("email=owner@demo.com\n"))
        .stdout(predicate::str::contains("role=owner\n"));
}

// ---------------------------------------------------------------------------
// progress
// ---------------------------------------------------------------------------

#[test]
fn progress_for_employee_counts_completed_steps() {
    let dir = TempDir::new().unwrap();
    let json = sop_json(dir.path(), &["progress", "--employee", PRIYA_ID]);
    assert_eq!(json["employee_id"], PRIYA_ID);
    assert_eq!(json["total_steps"], 7);
    assert_eq!(json["completed_steps"], 4);
    assert_eq!(json["percent"], 57);

    let assignments = json["assignments"].as_array().unwrap();
    assert_eq!(assignments.len(), 2);
    let percents: Vec<u64> = assignments
        .iter()
        .map(|a| a["percent"].as_u64().unwrap())
        .collect();
    assert!(percents.contains(&100));
    assert!(percents.contains(&25));
}

#[test]
fn progress_defaults_to_signed_in_user() {
    let dir = TempDir::new().unwrap();
    let json = sop_json(dir.path(), &["progress"]);
    assert_eq!(json["employee_id"], OWNER_ID);
    assert_eq!(json["percent"], 50);
    assert_eq!(json["assignments"][0]["tier"], "on_track");
}

#[test]
fn progress_for_unknown_employee_is_empty() {
    let dir = TempDir::new().unwrap();
    let json = sop_json(dir.path(), &["progress", "--employee", "nobody"]);
    assert_eq!(json["assignments"].as_array().unwrap().len(), 0);
    assert_eq!(json["percent"], 0);
}

#[test]
fn progress_team_excludes_owner() {
    let dir = TempDir::new().unwrap();
    let json = sop_json(dir.path(), &["progress", "--team"]);
    let team = json.as_array().unwrap();
    assert_eq!(team.len(), 3);
    assert!(team.iter().all(|m| m["role"] != "owner"));

    let priya = team.iter().find(|m| m["employee_id"] == PRIYA_ID).unwrap();
    assert_eq!(priya["total_assignments"], 2);
    assert_eq!(priya["completed_assignments"], 1);
    assert_eq!(priya["percent"], 50);
}

#[test]
fn progress_org_summarizes_dashboard_counters() {
    let dir = TempDir::new().unwrap();
    let json = sop_json(dir.path(), &["progress", "--org"]);
    assert_eq!(json["procedure_count"], 3);
    assert_eq!(json["team_size"], 3);
    assert_eq!(json["total_assignments"], 5);
    assert_eq!(json["completed_assignments"], 2);
    assert_eq!(json["in_progress_assignments"], 3);
    assert_eq!(json["completion_rate"], 40);
}

#[test]
fn progress_org_text_output() {
    let dir = TempDir::new().unwrap();
    sop_cmd(dir.path())
        .args(["progress", "--org", "--format", "text"])
        .assert()
        .success()
        .stdout("sops=3\nteam=3\ncompleted=2\nin_progress=3\ncompletion_rate=40\n");
}

// ---------------------------------------------------------------------------
// invite
// ---------------------------------------------------------------------------

#[test]
fn invite_echoes_normalized_invitation() {
    let dir = TempDir::new().unwrap();
    let json = sop_json(dir.path(), &["invite", " New.Hire@Example.com ", "--role", "manager"]);
    assert!(json["id"].as_str().is_some_and(|id| id.starts_with("mock-")));
    assert_eq!(json["email"], "new.hire@example.com");
    assert_eq!(json["role"], "manager");
    assert_eq!(json["invited_by"], OWNER_ID);
    assert!(json["accepted_at"].is_null());
}

#[test]
fn invite_check_finds_nothing_pending() {
    let dir = TempDir::new().unwrap();
    let json = sop_json(dir.path(), &["invite", "New.Hire@Example.com", "--check"]);
    assert_eq!(json["email"], "new.hire@example.com");
    assert!(json["invitation"].is_null());

    sop_cmd(dir.path())
        .args(["invite", "new.hire@example.com", "--check", "--format", "text"])
        .assert()
        .success()
        .stdout("none\n");
}

#[test]
fn invite_malformed_email_fails_with_code() {
    let dir = TempDir::new().unwrap();
    let output = sop_cmd(dir.path())
        .args(["invite", "not-an-address", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let err: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(err["error"]["error_code"], "E5001");
}

// ---------------------------------------------------------------------------
// plans
// ---------------------------------------------------------------------------

#[test]
fn plans_lists_catalogue() {
    let dir = TempDir::new().unwrap();
    let json = sop_json(dir.path(), &["plans"]);
    let plans = json.as_array().unwrap();
    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0]["plan"], "starter");
    assert_eq!(plans[0]["monthly_price"], 29);
    assert_eq!(plans[1]["plan"], "pro");
    assert_eq!(plans[1]["sop_limit"], "unlimited");
}

#[test]
fn plans_gate_blocks_over_limit() {
    let dir = TempDir::new().unwrap();
    let json = sop_json(dir.path(), &["plans", "--plan", "starter", "--employees", "10", "--sops", "3"]);
    let starter = &json[0];
    assert_eq!(starter["employee_seat"]["allowed"], false);
    assert!(
        starter["employee_seat"]["reason"]
            .as_str()
            .unwrap()
            .contains("up to 10 employees")
    );
    assert_eq!(starter["sop_slot"]["allowed"], true);
}

#[test]
fn plans_price_ids_come_from_environment() {
    let dir = TempDir::new().unwrap();
    let output = sop_cmd(dir.path())
        .env("STRIPE_PRO_PRICE_ID", "price_pro_123")
        .args(["plans", "--plan", "pro", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["price_id"], "price_pro_123");
}

#[test]
fn plans_unknown_plan_fails_with_code() {
    let dir = TempDir::new().unwrap();
    let output = sop_cmd(dir.path())
        .args(["plans", "--plan", "enterprise", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let err: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(err["error"]["error_code"], "E4002");
}

// ---------------------------------------------------------------------------
// config / completions
// ---------------------------------------------------------------------------

#[test]
fn config_reports_effective_backend() {
    let dir = TempDir::new().unwrap();
    let json = sop_json(dir.path(), &["config"]);
    assert_eq!(json["project"]["backend"]["dev_mock"], true);
    assert_eq!(json["resolved_output"], "json");
}

#[test]
fn config_reports_format_flag_when_piped() {
    let dir = TempDir::new().unwrap();
    sop_cmd(dir.path())
        .args(["--format", "pretty", "config"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("resolved_output = \"pretty\"\n"));
}

#[test]
fn config_project_shows_file_contents() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".sopline")).unwrap();
    std::fs::write(
        dir.path().join(".sopline/config.toml"),
        "[backend]\nurl = \"https://db.example.com\"\n",
    )
    .unwrap();
    let json = sop_json(dir.path(), &["config", "--project"]);
    assert_eq!(json["backend"]["url"], "https://db.example.com");
}

#[test]
fn completions_generate_a_script() {
    let dir = TempDir::new().unwrap();
    sop_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sop"));
}
