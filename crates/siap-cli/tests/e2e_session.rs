//! E2E tests for sign-in, the route guard, tabs and theme.

mod common;

use common::{stdout_of, Sandbox};
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

// ─── Route guard ───────────────────────────────────────────────────

#[test]
fn gated_commands_redirect_without_session() {
    let sandbox = Sandbox::new();

    for args in [
        vec!["list", "workers"],
        vec!["show", "assets", "a1"],
        vec!["profile"],
        vec!["delete", "oncall", "r1"],
        vec!["add", "routine", "--set", "jalan_tol=Cipularang"],
    ] {
        sandbox
            .cmd()
            .args(&args)
            .assert()
            .code(2)
            .stdout(contains("redirect: /"));
    }
}

#[test]
fn redirect_happens_before_input_is_read() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["add", "workers", "--attach", "photo=/no/such/file.jpg"])
        .assert()
        .code(2)
        .stdout(contains("redirect: /"));
}

#[test]
fn unknown_role_match_is_a_usage_error() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["--role-match", "fuzzy", "tabs"])
        .assert()
        .failure()
        .stderr(contains("exact or ignore_case"));
}

// ─── Sign-in / sign-out ────────────────────────────────────────────

#[test]
fn login_caches_token_role_and_email() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["account", "add", "--email", "Head@Siap.id", "--password", "pw", "--role", "Head"])
        .assert()
        .success()
        .stdout(contains("Account created"));

    sandbox
        .cmd()
        .args(["login", "--email", "head@siap.id", "--password", "pw"])
        .assert()
        .success()
        .stdout(contains("Signed in as head@siap.id (Head)"))
        .stdout(contains("navigate: /dashboard"));

    let session = sandbox.session_json();
    assert_eq!(session["role"], "Head");
    assert_eq!(session["email"], "head@siap.id");
    assert!(session["token"].as_str().is_some_and(|t| !t.is_empty()));

    sandbox
        .cmd()
        .arg("profile")
        .assert()
        .success()
        .stdout(contains("email: head@siap.id"))
        .stdout(contains("role: Head"));
}

#[test]
fn wrong_password_leaves_session_empty() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["account", "add", "--email", "spv@siap.id", "--password", "pw", "--role", "SPV"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["login", "--email", "spv@siap.id", "--password", "nope"])
        .assert()
        .code(1)
        .stderr(contains("invalid email or password"));

    sandbox
        .cmd()
        .arg("profile")
        .assert()
        .code(2)
        .stdout(contains("redirect: /"));
}

#[test]
fn duplicate_account_is_rejected() {
    let sandbox = Sandbox::new();
    let add = ["account", "add", "--email", "a@siap.id", "--password", "pw"];
    sandbox.cmd().args(add).assert().success();
    sandbox
        .cmd()
        .args(add)
        .assert()
        .code(1)
        .stderr(contains("already exists"));
}

#[test]
fn logout_is_idempotent() {
    let sandbox = Sandbox::new();
    sandbox.sign_in_as("maint@siap.id", "Maintainer");

    for _ in 0..2 {
        sandbox
            .cmd()
            .arg("logout")
            .assert()
            .success()
            .stdout(contains("Signed out"))
            .stdout(contains("navigate: /"));
    }

    sandbox
        .cmd()
        .args(["list", "oncall"])
        .assert()
        .code(2)
        .stdout(contains("redirect: /"));
}

// ─── Tabs ──────────────────────────────────────────────────────────

#[test]
fn tabs_are_hidden_when_signed_out() {
    let sandbox = Sandbox::new();
    let assert = sandbox.cmd().arg("tabs").assert().success();
    assert!(stdout_of(&assert).trim().is_empty());
}

#[test]
fn maintainer_sees_field_tabs() {
    let sandbox = Sandbox::new();
    sandbox.sign_in_as("maint@siap.id", "Maintainer");

    let assert = sandbox
        .cmd()
        .args(["tabs", "--active", "/oncall/r1"])
        .assert()
        .success();
    let out = stdout_of(&assert);
    let labels: Vec<&str> = out
        .lines()
        .filter_map(|l| l.get(2..))
        .filter_map(|l| l.split_whitespace().next())
        .collect();

    assert_eq!(labels.first(), Some(&"Home"));
    assert_eq!(labels.last(), Some(&"Profile"));
    assert_eq!(labels.len(), 6);
    assert!(out.lines().any(|l| l.starts_with('*') && l.contains("/oncall")));
}

#[test]
fn admin_sees_home_and_profile_only() {
    let sandbox = Sandbox::new();
    sandbox.sign_in_as("admin@siap.id", "Admin");

    sandbox
        .cmd()
        .arg("tabs")
        .assert()
        .success()
        .stdout(contains("/dashboard"))
        .stdout(contains("/profile"))
        .stdout(contains("/oncall").not())
        .stdout(contains("/worker").not());
}

// ─── Theme ─────────────────────────────────────────────────────────

#[test]
fn theme_survives_logout() {
    let sandbox = Sandbox::new();
    sandbox.cmd().arg("theme").assert().success().stdout("light\n");
    sandbox
        .cmd()
        .args(["theme", "toggle"])
        .assert()
        .success()
        .stdout("dark\n");

    sandbox.sign_in_as("spv@siap.id", "SPV");
    sandbox.cmd().arg("logout").assert().success();

    sandbox.cmd().arg("theme").assert().success().stdout("dark\n");
    assert_eq!(sandbox.session_json()["theme"], "dark");
    assert!(sandbox.session_json().get("token").is_none());
}

#[test]
fn unknown_theme_is_rejected() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["theme", "sepia"])
        .assert()
        .code(1)
        .stderr(contains("unknown theme"));
}
