use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use opsdesk_cli::commands::request::ActionsArgs;
use opsdesk_cli::commands::ticket::{ListArgs, SubmitArgs};
use opsdesk_cli::commands::{config, doctor, form, request, ticket};
use serde_json::Value;
use tempfile::TempDir;

const ANSWERS: &str = r#"
[issue]
category = "hardware"
subcategory = "Printer problems"
priority = "high"
title = "Printer jams on every job"

[details]
description = "Paper jams after the first page."
occurred_on = 2026-03-02
device.type = "printer"
device.asset_tag = "AT-0042"
workaround = "no"

[troubleshooting]
troubleshooting_steps = ["Restarted the device", "Checked cables"]
contact.preferred_method = "email"
"#;

#[test]
fn form_schema_prints_steps_for_known_form() {
    let result = form::run_schema("it-issue");
    assert_eq!(result.exit_code, 0, "expected schema output");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["name"], "it-issue");
    let steps: Vec<_> = payload["steps"]
        .as_array()
        .expect("steps array")
        .iter()
        .map(|step| step["id"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(steps, vec!["issue", "details", "troubleshooting", "review"]);
}

#[test]
fn form_schema_rejects_unknown_form() {
    let result = form::run_schema("payroll");
    assert_eq!(result.exit_code, 2);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "form-schema");
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "unknown_form");
}

#[test]
fn request_actions_enable_review_for_stage_role() {
    let result = request::run_actions(ActionsArgs {
        kind: "cash".to_string(),
        status: "pending_finance".to_string(),
        role: Some("finance".to_string()),
        acted: true,
        not_owner: true,
    });
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["badge"]["label"], "Pending Finance");
    assert_eq!(action_state(&payload, "approve"), "enabled");
    assert_eq!(action_state(&payload, "reject"), "enabled");
    assert_eq!(action_state(&payload, "edit"), "disabled");
    assert_eq!(action_state(&payload, "delete"), "disabled");
}

#[test]
fn request_actions_default_to_session_role() {
    with_env(&[("OPSDESK_SESSION_ROLE", "supervisor")], || {
        let result = request::run_actions(ActionsArgs {
            kind: "cash".to_string(),
            status: "pending_finance".to_string(),
            not_owner: true,
            ..ActionsArgs::default()
        });
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["role"], "supervisor");
        assert_eq!(action_state(&payload, "approve"), "disabled");
    });
}

#[test]
fn request_actions_reject_unknown_status_for_kind() {
    let result = request::run_actions(ActionsArgs {
        kind: "it".to_string(),
        status: "pending_finance".to_string(),
        role: Some("admin".to_string()),
        ..ActionsArgs::default()
    });
    assert_eq!(result.exit_code, 2);
    assert_eq!(parse_payload(&result.output)["error_class"], "unknown_status");
}

#[test]
fn ticket_submit_dry_run_builds_review_and_payload() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let answers = write_file(&dir, "answers.toml", ANSWERS);
        let log = write_file(&dir, "error.log", "paper jam at tray 2");

        let result = ticket::run_submit(SubmitArgs {
            answers,
            attachments: vec![log],
            dry_run: true,
        });
        assert_eq!(result.exit_code, 0, "unexpected output: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "ready");
        assert_eq!(payload["payload"]["device"]["type"], "printer");
        assert_eq!(payload["payload"]["contact"]["preferred_method"], "email");
        assert_eq!(payload["payload"]["occurred_on"], "2026-03-02");
        assert!(payload["payload"].get("workaround_description").is_none());
        assert_eq!(payload["payload"]["attachments"][0]["name"], "error.log");
        assert_eq!(payload["review"]["attachments"].as_array().map(Vec::len), Some(1));
    });
}

#[test]
fn ticket_submit_stops_on_first_invalid_step() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let answers = write_file(
            &dir,
            "answers.toml",
            "[issue]\ncategory = \"hardware\"\npriority = \"high\"\ntitle = \"Printer jams\"\n",
        );

        let result =
            ticket::run_submit(SubmitArgs { answers, attachments: Vec::new(), dry_run: true });
        assert_eq!(result.exit_code, 4);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "validation");
        assert_eq!(payload["step"], "issue");
        assert_eq!(payload["errors"][0]["field"], "subcategory");
    });
}

#[test]
fn ticket_submit_rejects_unaccepted_attachment_type() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let answers = write_file(&dir, "answers.toml", ANSWERS);
        let binary = write_file(&dir, "installer.exe", "MZ");

        let result =
            ticket::run_submit(SubmitArgs { answers, attachments: vec![binary], dry_run: true });
        assert_eq!(result.exit_code, 5);
        assert_eq!(parse_payload(&result.output)["error_class"], "attachment_rejected");
    });
}

#[test]
fn ticket_submit_reports_config_failure() {
    with_env(&[("OPSDESK_API_BASE_URL", "ftp://ops.example.com")], || {
        let dir = TempDir::new().expect("temp dir");
        let answers = write_file(&dir, "answers.toml", ANSWERS);

        let result =
            ticket::run_submit(SubmitArgs { answers, attachments: Vec::new(), dry_run: true });
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "ticket-submit");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn ticket_list_rejects_bad_filters_before_fetching() {
    with_env(&[], || {
        let result = ticket::run_list(ListArgs {
            status: Some("pending_finance".to_string()),
            ..ListArgs::default()
        });
        assert_eq!(result.exit_code, 2);
        assert_eq!(parse_payload(&result.output)["error_class"], "invalid_filter");

        let result = ticket::run_list(ListArgs {
            from: Some("2026-03-10".to_string()),
            to: Some("2026-03-01".to_string()),
            ..ListArgs::default()
        });
        assert_eq!(result.exit_code, 2);
    });
}

#[test]
fn doctor_skips_reachability_without_token() {
    with_env(&[], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 1);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][0]["name"], "config_validation");
        assert_eq!(payload["checks"][0]["status"], "pass");
        assert_eq!(payload["checks"][1]["name"], "api_token");
        assert_eq!(payload["checks"][1]["status"], "fail");
        assert_eq!(payload["checks"][2]["status"], "skipped");
    });
}

#[test]
fn doctor_reports_config_failure() {
    with_env(&[("OPSDESK_LISTING_PAGE_SIZE", "0")], || {
        let result = doctor::run(false);
        assert_eq!(result.exit_code, 1);
        assert!(result.output.starts_with("doctor: one or more readiness checks failed"));
        assert!(result.output.contains("- [fail] config_validation"));
        assert!(result.output.contains("- [skip] api_reachability"));
    });
}

#[test]
fn config_output_attributes_sources_and_redacts_token() {
    with_env(
        &[
            ("OPSDESK_API_TOKEN", "eyJhbGciOiJIUzI1NiJ9.secret-part"),
            ("OPSDESK_LOG_LEVEL", "debug"),
        ],
        || {
            let output = config::run();
            assert!(output.contains("- api.token = eyJh*** (source: env (OPSDESK_API_TOKEN))"));
            assert!(!output.contains("secret-part"));
            assert!(output.contains("- logging.level = debug (source: env (OPSDESK_LOG_LEVEL))"));
            assert!(output.contains("- listing.page_size = 10 (source: default)"));
        },
    );
}

fn action_state(payload: &Value, action: &str) -> String {
    payload["actions"]
        .as_array()
        .and_then(|actions| actions.iter().find(|entry| entry["action"] == action))
        .and_then(|entry| entry["state"].as_str())
        .unwrap_or("missing")
        .to_string()
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "OPSDESK_API_BASE_URL",
        "OPSDESK_API_TOKEN",
        "OPSDESK_API_TIMEOUT_SECS",
        "OPSDESK_SESSION_USER_ID",
        "OPSDESK_SESSION_ROLE",
        "OPSDESK_UPLOADS_MAX_FILE_SIZE_MB",
        "OPSDESK_UPLOADS_ACCEPTED_EXTENSIONS",
        "OPSDESK_LISTING_PAGE_SIZE",
        "OPSDESK_LOGGING_LEVEL",
        "OPSDESK_LOGGING_FORMAT",
        "OPSDESK_LOG_LEVEL",
        "OPSDESK_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
