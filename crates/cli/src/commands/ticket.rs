use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use opsdesk_client::{submit, ApiClient, ClientError, HttpTransport, Transport};
use opsdesk_core::config::AppConfig;
use opsdesk_core::wizard::build_payload;
use opsdesk_core::{
    AnyStatus, Attachment, DateRange, FieldError, FieldValue, FormKind, ItTicket, ListView, Notice,
    Priority, RequestKind, ReviewSummary, RowAction, Session, StepOutcome, WizardController,
    WorkflowStatus,
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::commands::{api_failure, load_config, runtime, CommandResult};

const SUBMIT: &str = "ticket-submit";
const LIST: &str = "ticket-list";

#[derive(Clone, Debug, Default)]
pub struct SubmitArgs {
    pub answers: PathBuf,
    pub attachments: Vec<PathBuf>,
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
struct StepFailure<'a> {
    command: &'static str,
    status: &'static str,
    error_class: &'static str,
    step: &'a str,
    step_title: &'a str,
    errors: &'a [FieldError],
}

#[derive(Debug, Serialize)]
struct DryRunOutput {
    command: &'static str,
    status: &'static str,
    review: ReviewSummary,
    payload: Value,
}

#[derive(Debug, Serialize)]
struct SubmitOutput {
    command: &'static str,
    status: &'static str,
    reference: String,
    notice: Notice,
    review: ReviewSummary,
}

/// Drives the IT issue wizard from an answers file, one step at a time, then
/// submits the draft with its attachments.
pub fn run_submit(args: SubmitArgs) -> CommandResult {
    let config = match load_config() {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                SUBMIT,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let answers = match read_answers(&args.answers) {
        Ok(answers) => answers,
        Err(error) => {
            return CommandResult::failure(SUBMIT, "answers_read", format!("{error:#}"), 2);
        }
    };

    let mut wizard = match WizardController::new(FormKind::ItIssue.schema()) {
        Ok(wizard) => wizard,
        Err(error) => return CommandResult::failure(SUBMIT, "schema", error.to_string(), 2),
    };

    if let Err(result) = fill_steps(&mut wizard, &answers) {
        return result;
    }

    let policy = config.uploads.policy();
    for path in &args.attachments {
        let attachment = match Attachment::from_path(path) {
            Ok(attachment) => attachment,
            Err(error) => {
                return CommandResult::failure(
                    SUBMIT,
                    "attachment_read",
                    format!("could not read `{}`: {error}", path.display()),
                    5,
                );
            }
        };
        if let Err(rejection) = policy.check(&attachment) {
            return CommandResult::failure(SUBMIT, "attachment_rejected", rejection.to_string(), 5);
        }
        if let Err(error) = wizard.add_attachment(attachment) {
            return CommandResult::failure(SUBMIT, "wizard", error.to_string(), 4);
        }
    }

    let review = wizard.review();
    if args.dry_run {
        let payload = build_payload(wizard.schema(), wizard.values(), wizard.attachments());
        return CommandResult::report(
            SUBMIT,
            &DryRunOutput { command: SUBMIT, status: "ready", review, payload },
        );
    }

    let runtime = match runtime(SUBMIT) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let outcome = runtime.block_on(async {
        let transport = HttpTransport::from_config(&config.api)?;
        let client = ApiClient::new(transport, config.api.token.clone());
        submit(&client, &mut wizard).await.map_err(opsdesk_core::ApplicationError::from)
    });

    match outcome {
        Ok(receipt) => {
            info!(event_name = "cli.ticket_submitted", reference = %receipt.reference, "ticket submitted");
            CommandResult::report(
                SUBMIT,
                &SubmitOutput {
                    command: SUBMIT,
                    status: "ok",
                    reference: receipt.reference,
                    notice: receipt.notice,
                    review,
                },
            )
        }
        Err(error) => api_failure(SUBMIT, error),
    }
}

fn fill_steps(wizard: &mut WizardController, answers: &Value) -> Result<(), CommandResult> {
    while !wizard.is_last_step() {
        let step = wizard.step().clone();
        for field in &step.fields {
            let Some(raw) = answer(answers, &step.id, &field.key) else {
                continue;
            };
            FieldValue::from_json(field, raw)
                .and_then(|value| wizard.set_value(&field.key, value))
                .map_err(|error| CommandResult::failure(SUBMIT, "invalid_answer", error.to_string(), 4))?;
        }

        match wizard.next() {
            Ok(StepOutcome::Blocked { errors, .. }) => {
                let failure = StepFailure {
                    command: SUBMIT,
                    status: "error",
                    error_class: "validation",
                    step: &step.id,
                    step_title: &step.title,
                    errors: &errors,
                };
                return Err(CommandResult::report(SUBMIT, &failure).with_exit_code(4));
            }
            Ok(_) => {}
            Err(error) => {
                return Err(CommandResult::failure(SUBMIT, "wizard", error.to_string(), 4));
            }
        }
    }
    Ok(())
}

fn read_answers(path: &Path) -> anyhow::Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read `{}`", path.display()))?;
    let doc: toml::Value =
        raw.parse().with_context(|| format!("could not parse `{}`", path.display()))?;
    Ok(toml_to_json(doc))
}

/// TOML datetimes become their string form so date fields can parse them.
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(text) => Value::String(text),
        toml::Value::Integer(number) => Value::from(number),
        toml::Value::Float(number) => Value::from(number),
        toml::Value::Boolean(flag) => Value::Bool(flag),
        toml::Value::Datetime(datetime) => Value::String(datetime.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table.into_iter().map(|(key, value)| (key, toml_to_json(value))).collect(),
        ),
    }
}

/// Answers are grouped by step id; a flat top-level key works too.
fn answer<'a>(answers: &'a Value, step_id: &str, key: &str) -> Option<&'a Value> {
    answers.get(step_id).and_then(|section| lookup(section, key)).or_else(|| lookup(answers, key))
}

fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    if let Some(value) = root.get(key) {
        return Some(value);
    }
    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

#[derive(Clone, Debug, Default)]
pub struct ListArgs {
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
struct TicketRow {
    id: String,
    reference: String,
    title: Option<String>,
    status: &'static str,
    priority: Option<&'static str>,
    actions: Vec<RowAction>,
}

#[derive(Debug, Serialize)]
struct ListOutput {
    command: &'static str,
    page: u32,
    total_pages: Option<u32>,
    total_count: Option<u64>,
    rows: Vec<TicketRow>,
}

pub fn run_list(args: ListArgs) -> CommandResult {
    let config = match load_config() {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                LIST,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let mut view: ListView<ItTicket> = ListView::new(config.listing.page_size);
    if let Err(message) = apply_filters(&mut view, &args) {
        return CommandResult::failure(LIST, "invalid_filter", message, 2);
    }

    let runtime = match runtime(LIST) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let fetched = runtime.block_on(async {
        let transport = HttpTransport::from_config(&config.api)?;
        let client = ApiClient::new(transport, config.api.token.clone());
        let session = resolve_session(&client, &config).await?;
        let api = &client;
        opsdesk_client::refresh(&mut view, |query| async move { api.it_support().list(&query).await })
            .await?;
        Ok::<_, ClientError>(session)
    });
    let session = match fetched {
        Ok(session) => session,
        Err(error) => return api_failure(LIST, error.into()),
    };

    let rows = ticket_rows(&session, view.rows());
    let pagination = view.pagination();
    CommandResult::report(
        LIST,
        &ListOutput {
            command: LIST,
            page: view.page().page,
            total_pages: pagination.map(|pagination| pagination.total_pages),
            total_count: pagination.map(|pagination| pagination.total_count),
            rows,
        },
    )
}

/// The configured user when an id is set, otherwise whoever the token
/// belongs to according to `GET /users/me`.
async fn resolve_session<T: Transport>(
    client: &ApiClient<T>,
    config: &AppConfig,
) -> Result<Session, ClientError> {
    if config.session.user_id.is_none() && config.has_token() {
        let user = client.users().me().await?;
        return Ok(Session::new(user, config.api.token.clone()));
    }
    Ok(Session::configured(
        config.session.user_id.clone(),
        config.session.role,
        config.api.token.clone(),
    ))
}

fn ticket_rows(session: &Session, tickets: &[ItTicket]) -> Vec<TicketRow> {
    tickets
        .iter()
        .map(|ticket| TicketRow {
            id: ticket.id.to_string(),
            reference: ticket.display_reference().to_string(),
            title: ticket.title.clone(),
            status: ticket.status.badge().label,
            priority: ticket.priority.map(Priority::as_str),
            actions: session
                .actions_for(ticket)
                .into_iter()
                .filter(|affordance| affordance.is_enabled())
                .map(|affordance| affordance.action)
                .collect(),
        })
        .collect()
}

fn apply_filters(view: &mut ListView<ItTicket>, args: &ListArgs) -> Result<(), String> {
    view.set_search(args.search.clone().filter(|search| !search.trim().is_empty()));

    if let Some(raw) = &args.status {
        let status = AnyStatus::parse(RequestKind::ItTicket, raw)
            .ok_or_else(|| format!("unknown ticket status `{raw}`"))?;
        view.set_status(Some(status.as_str().to_string()));
    }

    if let Some(raw) = &args.priority {
        let priority = Priority::parse(raw).ok_or_else(|| format!("unknown priority `{raw}`"))?;
        view.set_priority(Some(priority));
    }

    let from = args.from.as_deref().map(parse_date).transpose()?;
    let to = args.to.as_deref().map(parse_date).transpose()?;
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(format!("date range starts after it ends ({from} > {to})"));
        }
    }
    view.set_date_range(DateRange { from, to });

    if let Some(page) = args.page {
        // Without pagination from a previous fetch the page cannot be clamped yet.
        view.set_page(page);
    }
    Ok(())
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("expected a YYYY-MM-DD date, got `{raw}`"))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use opsdesk_client::{ApiClient, Method, ScriptedTransport};
    use opsdesk_core::config::AppConfig;
    use opsdesk_core::{ItTicket, Role, RowAction, Session};
    use secrecy::SecretString;
    use serde_json::json;

    use super::{answer, resolve_session, ticket_rows, toml_to_json};

    fn ticket(requested_by: &str) -> ItTicket {
        let now = Utc::now();
        serde_json::from_value(json!({
            "_id": "t-1",
            "ticketNumber": "IT-0001",
            "status": "pending_it_review",
            "priority": "high",
            "requestedBy": requested_by,
            "title": "Printer offline",
            "approvalChain": [{"level": 1, "status": "pending"}],
            "createdAt": now,
            "updatedAt": now
        }))
        .expect("decode ticket")
    }

    #[test]
    fn rows_carry_actions_for_the_session_user() {
        let tickets = vec![ticket("u-1")];

        let owner = Session::configured(Some("u-1".to_string()), Role::Employee, None);
        let rows = ticket_rows(&owner, &tickets);
        assert_eq!(rows[0].reference, "IT-0001");
        assert!(rows[0].actions.contains(&RowAction::Delete));

        let anonymous = Session::configured(None, Role::Employee, None);
        assert!(!ticket_rows(&anonymous, &tickets)[0].actions.contains(&RowAction::Delete));
    }

    #[test]
    fn session_comes_from_users_me_when_no_id_is_configured() {
        let mut config = AppConfig::default();
        config.session.user_id = None;
        config.api.token = Some(SecretString::from("test-token".to_string()));

        let client = ApiClient::new(ScriptedTransport::new(), config.api.token.clone());
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        let session = runtime.block_on(async {
            client
                .transport()
                .push_json(200, json!({"_id": "u-7", "name": "Grace", "role": "it_support"}))
                .await;
            resolve_session(&client, &config).await.expect("session")
        });

        assert_eq!(session.user_id(), "u-7");
        assert_eq!(session.role(), Role::ItSupport);
        let requests = runtime.block_on(client.transport().requests());
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(requests[0].path, "/users/me");
    }

    #[test]
    fn configured_id_skips_the_lookup() {
        let mut config = AppConfig::default();
        config.session.user_id = Some("u-1".to_string());
        config.session.role = Role::Supervisor;
        config.api.token = Some(SecretString::from("test-token".to_string()));

        let client = ApiClient::new(ScriptedTransport::new(), config.api.token.clone());
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        let session = runtime.block_on(resolve_session(&client, &config)).expect("session");

        assert_eq!(session.user_id(), "u-1");
        assert_eq!(session.role(), Role::Supervisor);
        assert!(runtime.block_on(client.transport().requests()).is_empty());
    }

    #[test]
    fn answers_resolve_by_step_then_top_level() {
        let answers = json!({
            "issue": {"title": "VPN drops"},
            "details": {"device": {"type": "laptop"}},
            "priority": "high",
        });

        assert_eq!(answer(&answers, "issue", "title"), Some(&json!("VPN drops")));
        assert_eq!(answer(&answers, "details", "device.type"), Some(&json!("laptop")));
        assert_eq!(answer(&answers, "issue", "priority"), Some(&json!("high")));
        assert_eq!(answer(&answers, "issue", "category"), None);
    }

    #[test]
    fn toml_dates_become_strings() {
        let doc: toml::Value = "occurred_on = 2026-03-01\ncount = 2\n".parse().expect("toml");
        let value = toml_to_json(doc);
        assert_eq!(value["occurred_on"], json!("2026-03-01"));
        assert_eq!(value["count"], json!(2));
    }
}
