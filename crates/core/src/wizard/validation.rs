use serde::Serialize;

use crate::wizard::schema::{FieldKind, FieldSchema, WizardSchema};
use crate::wizard::values::{FieldValue, FormValues, Row};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

pub fn is_visible(field: &FieldSchema, values: &FormValues) -> bool {
    match &field.visible_when {
        None => true,
        Some(rule) => values
            .text(&rule.field)
            .is_some_and(|current| rule.any_of.iter().any(|allowed| allowed == current)),
    }
}

/// Options currently offered for `field`, or `None` for free-form kinds.
pub fn options_for<'a>(field: &'a FieldSchema, values: &FormValues) -> Option<&'a [String]> {
    match &field.kind {
        FieldKind::Select { options } | FieldKind::MultiSelect { options } => {
            Some(options.as_slice())
        }
        FieldKind::DependentSelect { parent, options }
        | FieldKind::DependentMultiSelect { parent, options } => Some(
            values
                .text(parent)
                .and_then(|selected| options.get(selected))
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        ),
        _ => None,
    }
}

/// Validates the visible fields of one step. Hidden fields are skipped even
/// when they hold a value.
pub fn validate_step(schema: &WizardSchema, step: usize, values: &FormValues) -> Vec<FieldError> {
    let Some(step) = schema.steps.get(step) else {
        return Vec::new();
    };

    step.fields
        .iter()
        .filter(|field| is_visible(field, values))
        .flat_map(|field| validate_field(field, values))
        .collect()
}

pub fn validate_all(schema: &WizardSchema, values: &FormValues) -> Vec<(usize, Vec<FieldError>)> {
    (0..schema.step_count())
        .map(|step| (step, validate_step(schema, step, values)))
        .filter(|(_, errors)| !errors.is_empty())
        .collect()
}

fn validate_field(field: &FieldSchema, values: &FormValues) -> Vec<FieldError> {
    let Some(value) = values.get(&field.key).filter(|value| !value.is_blank()) else {
        if field.required {
            return vec![FieldError::new(&field.key, format!("{} is required", field.label))];
        }
        return Vec::new();
    };

    check_value(field, &field.key, value, values)
}

fn check_value(
    field: &FieldSchema,
    path: &str,
    value: &FieldValue,
    values: &FormValues,
) -> Vec<FieldError> {
    match (&field.kind, value) {
        (FieldKind::Text | FieldKind::LongText, FieldValue::Text(_)) => Vec::new(),
        (FieldKind::Date, FieldValue::Date(_)) => Vec::new(),
        (FieldKind::Number { min }, FieldValue::Number(number)) => match min {
            Some(min) if number < min => {
                vec![FieldError::new(path, format!("{} must be at least {min}", field.label))]
            }
            _ => Vec::new(),
        },
        (
            FieldKind::Select { .. } | FieldKind::DependentSelect { .. },
            FieldValue::Text(selected),
        ) => {
            let options = options_for(field, values).unwrap_or(&[]);
            if options.iter().any(|option| option == selected) {
                Vec::new()
            } else {
                vec![FieldError::new(
                    path,
                    format!("`{selected}` is not a valid choice for {}", field.label),
                )]
            }
        }
        (
            FieldKind::MultiSelect { .. } | FieldKind::DependentMultiSelect { .. },
            FieldValue::List(selected),
        ) => {
            let options = options_for(field, values).unwrap_or(&[]);
            selected
                .iter()
                .filter(|item| !options.contains(item))
                .map(|item| {
                    FieldError::new(
                        path,
                        format!("`{item}` is not a valid choice for {}", field.label),
                    )
                })
                .collect()
        }
        (FieldKind::LineItems { columns, min_rows }, FieldValue::Rows(rows)) => {
            let mut errors = Vec::new();
            if rows.len() < *min_rows {
                errors.push(FieldError::new(
                    path,
                    format!("{} needs at least {min_rows} row(s)", field.label),
                ));
            }
            for (index, row) in rows.iter().enumerate() {
                errors.extend(check_row(columns, &format!("{path}[{index}]"), row, values));
            }
            errors
        }
        _ => vec![FieldError::new(path, format!("{} has the wrong kind of value", field.label))],
    }
}

fn check_row(columns: &[FieldSchema], prefix: &str, row: &Row, values: &FormValues) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for column in columns {
        let path = format!("{prefix}.{}", column.key);
        match row.get(&column.key).filter(|value| !value.is_blank()) {
            Some(value) => errors.extend(check_value(column, &path, value, values)),
            None if column.required => {
                errors.push(FieldError::new(&path, format!("{} is required", column.label)))
            }
            None => {}
        }
    }
    errors
}
