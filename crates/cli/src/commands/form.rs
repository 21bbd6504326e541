use opsdesk_core::FormKind;

use crate::commands::CommandResult;

pub fn run_schema(kind: &str) -> CommandResult {
    let Some(kind) = FormKind::parse(kind) else {
        let known: Vec<_> = FormKind::all().iter().map(|kind| kind.as_str()).collect();
        return CommandResult::failure(
            "form-schema",
            "unknown_form",
            format!("unknown form `{kind}`; expected one of {}", known.join("|")),
            2,
        );
    };

    CommandResult::report("form-schema", &kind.schema())
}
