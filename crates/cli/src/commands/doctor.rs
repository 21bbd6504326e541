use opsdesk_client::{ApiClient, HttpTransport};
use opsdesk_core::config::AppConfig;
use serde::Serialize;

use crate::commands::{load_config, CommandResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

impl DoctorCheck {
    fn skipped(name: &'static str, reason: &str) -> Self {
        Self { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Fail { 1 } else { 0 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match load_config() {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            let token = check_api_token(&config);
            let token_ok = token.status == CheckStatus::Pass;
            checks.push(token);
            if token_ok {
                checks.push(check_api_reachability(&config));
            } else {
                checks.push(DoctorCheck::skipped("api_reachability", "no api token is configured"));
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck::skipped("api_token", "configuration did not load"));
            checks.push(DoctorCheck::skipped("api_reachability", "configuration did not load"));
        }
    }

    // Skipped checks do not fail the report on their own.
    let all_pass = checks.iter().all(|check| check.status != CheckStatus::Fail);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_api_token(config: &AppConfig) -> DoctorCheck {
    if config.has_token() {
        DoctorCheck {
            name: "api_token",
            status: CheckStatus::Pass,
            details: "bearer token is configured".to_string(),
        }
    } else {
        DoctorCheck {
            name: "api_token",
            status: CheckStatus::Fail,
            details: "set OPSDESK_API_TOKEN or api.token to authenticate".to_string(),
        }
    }
}

fn check_api_reachability(config: &AppConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "api_reachability",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let result = runtime.block_on(async {
        let transport = HttpTransport::from_config(&config.api).map_err(|error| error.to_string())?;
        let client = ApiClient::new(transport, config.api.token.clone());
        client.users().me().await.map_err(|error| error.to_string())
    });

    match result {
        Ok(user) => DoctorCheck {
            name: "api_reachability",
            status: CheckStatus::Pass,
            details: format!(
                "authenticated as `{}` ({}) at `{}`",
                user.email,
                user.role.as_str(),
                config.api.base_url
            ),
        },
        Err(error) => DoctorCheck { name: "api_reachability", status: CheckStatus::Fail, details: error },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
