use opsdesk_core::{
    ActionAffordance, ActionPolicy, AnyStatus, RecordFacts, RequestKind, Role, StatusBadge,
};
use serde::Serialize;

use crate::commands::{load_config, CommandResult};

const ACTIONS: &str = "request-actions";

#[derive(Clone, Debug, Default)]
pub struct ActionsArgs {
    pub kind: String,
    pub status: String,
    pub role: Option<String>,
    /// Someone already decided on the approval chain.
    pub acted: bool,
    pub not_owner: bool,
}

#[derive(Debug, Serialize)]
struct ActionsOutput {
    command: &'static str,
    kind: RequestKind,
    status: &'static str,
    badge: StatusBadge,
    role: Role,
    is_owner: bool,
    approval_untouched: bool,
    actions: Vec<ActionAffordance>,
}

/// Evaluates the row action table offline for one `(role, status)` pair.
pub fn run_actions(args: ActionsArgs) -> CommandResult {
    let Some(kind) = RequestKind::parse(&args.kind) else {
        return CommandResult::failure(
            ACTIONS,
            "unknown_kind",
            format!("unknown request kind `{}`; expected cash|it|material", args.kind),
            2,
        );
    };

    let Some(status) = AnyStatus::parse(kind, &args.status) else {
        return CommandResult::failure(
            ACTIONS,
            "unknown_status",
            format!("`{}` is not a {kind} status", args.status),
            2,
        );
    };

    let role = match args.role.as_deref() {
        Some(raw) => match Role::parse(raw) {
            Some(role) => role,
            None => {
                let known: Vec<_> = Role::all().iter().map(|role| role.as_str()).collect();
                return CommandResult::failure(
                    ACTIONS,
                    "unknown_role",
                    format!("unknown role `{raw}`; expected one of {}", known.join("|")),
                    2,
                );
            }
        },
        None => match load_config() {
            Ok(config) => config.session.role,
            Err(error) => {
                return CommandResult::failure(
                    ACTIONS,
                    "config_validation",
                    format!("configuration issue: {error}"),
                    2,
                );
            }
        },
    };

    let facts = RecordFacts { status, is_owner: !args.not_owner, approval_untouched: !args.acted };
    CommandResult::report(
        ACTIONS,
        &ActionsOutput {
            command: ACTIONS,
            kind,
            status: status.as_str(),
            badge: status.badge(),
            role,
            is_owner: facts.is_owner,
            approval_untouched: facts.approval_untouched,
            actions: ActionPolicy::evaluate(role, &facts),
        },
    )
}
