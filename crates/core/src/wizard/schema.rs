use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::wizard::WizardError;

/// Shows a field only while another field holds one of the listed values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Visibility {
    pub field: String,
    pub any_of: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    LongText,
    Date,
    Number {
        min: Option<Decimal>,
    },
    Select {
        options: Vec<String>,
    },
    MultiSelect {
        options: Vec<String>,
    },
    /// Options are chosen by the value of `parent`.
    DependentSelect {
        parent: String,
        options: BTreeMap<String, Vec<String>>,
    },
    DependentMultiSelect {
        parent: String,
        options: BTreeMap<String, Vec<String>>,
    },
    LineItems {
        columns: Vec<FieldSchema>,
        min_rows: usize,
    },
}

impl FieldKind {
    pub fn parent(&self) -> Option<&str> {
        match self {
            Self::DependentSelect { parent, .. } | Self::DependentMultiSelect { parent, .. } => {
                Some(parent)
            }
            _ => None,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, Self::MultiSelect { .. } | Self::DependentMultiSelect { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    /// Dotted keys (`device.asset_tag`) nest in the submitted payload.
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl FieldSchema {
    fn new(key: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind,
            required: false,
            visible_when: None,
            help: None,
        }
    }

    pub fn text(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldKind::Text)
    }

    pub fn long_text(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldKind::LongText)
    }

    pub fn date(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldKind::Date)
    }

    pub fn number(key: &str, label: &str, min: Option<Decimal>) -> Self {
        Self::new(key, label, FieldKind::Number { min })
    }

    pub fn select(key: &str, label: &str, options: &[&str]) -> Self {
        Self::new(key, label, FieldKind::Select { options: owned(options) })
    }

    pub fn multi_select(key: &str, label: &str, options: &[&str]) -> Self {
        Self::new(key, label, FieldKind::MultiSelect { options: owned(options) })
    }

    pub fn dependent_select(
        key: &str,
        label: &str,
        parent: &str,
        options: &[(&str, &[&str])],
    ) -> Self {
        Self::new(
            key,
            label,
            FieldKind::DependentSelect { parent: parent.to_string(), options: option_map(options) },
        )
    }

    pub fn dependent_multi_select(
        key: &str,
        label: &str,
        parent: &str,
        options: &[(&str, &[&str])],
    ) -> Self {
        Self::new(
            key,
            label,
            FieldKind::DependentMultiSelect {
                parent: parent.to_string(),
                options: option_map(options),
            },
        )
    }

    pub fn line_items(key: &str, label: &str, columns: Vec<FieldSchema>, min_rows: usize) -> Self {
        Self::new(key, label, FieldKind::LineItems { columns, min_rows })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn visible_when(mut self, field: &str, any_of: &[&str]) -> Self {
        self.visible_when = Some(Visibility { field: field.to_string(), any_of: owned(any_of) });
        self
    }

    pub fn help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepSchema {
    pub id: String,
    pub title: String,
    pub fields: Vec<FieldSchema>,
}

impl StepSchema {
    pub fn new(id: &str, title: &str, fields: Vec<FieldSchema>) -> Self {
        Self { id: id.to_string(), title: title.to_string(), fields }
    }

    /// A closing step that only shows the review summary.
    pub fn review(id: &str, title: &str) -> Self {
        Self::new(id, title, Vec::new())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WizardSchema {
    pub name: String,
    pub title: String,
    pub steps: Vec<StepSchema>,
}

impl WizardSchema {
    pub fn new(name: &str, title: &str, steps: Vec<StepSchema>) -> Self {
        Self { name: name.to_string(), title: title.to_string(), steps }
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = (usize, &FieldSchema)> {
        self.steps
            .iter()
            .enumerate()
            .flat_map(|(index, step)| step.fields.iter().map(move |field| (index, field)))
    }

    pub fn field(&self, key: &str) -> Option<&FieldSchema> {
        self.fields().map(|(_, field)| field).find(|field| field.key == key)
    }

    pub fn step_of(&self, key: &str) -> Option<usize> {
        self.fields().find(|(_, field)| field.key == key).map(|(index, _)| index)
    }

    /// Fields whose option set depends on `parent`.
    pub fn dependents_of<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a FieldSchema> {
        self.fields().map(|(_, field)| field).filter(move |field| field.kind.parent() == Some(parent))
    }

    /// Fields whose visibility is governed by `governor`.
    pub fn governed_by<'a>(&'a self, governor: &'a str) -> impl Iterator<Item = &'a FieldSchema> {
        self.fields().map(|(_, field)| field).filter(move |field| {
            field.visible_when.as_ref().is_some_and(|rule| rule.field == governor)
        })
    }

    /// Checks that keys are unique and that every reference points at an
    /// earlier or same-step field.
    pub fn check(&self) -> Result<(), WizardError> {
        if self.steps.is_empty() {
            return Err(WizardError::InvalidSchema(format!("wizard `{}` has no steps", self.name)));
        }

        let mut seen = HashSet::new();
        for (_, field) in self.fields() {
            if !seen.insert(field.key.as_str()) {
                return Err(WizardError::InvalidSchema(format!(
                    "field `{}` is declared more than once",
                    field.key
                )));
            }
        }

        for (index, field) in self.fields() {
            let references = field
                .kind
                .parent()
                .into_iter()
                .chain(field.visible_when.as_ref().map(|rule| rule.field.as_str()));
            for reference in references {
                match self.step_of(reference) {
                    Some(step) if step <= index => {}
                    Some(_) => {
                        return Err(WizardError::InvalidSchema(format!(
                            "field `{}` depends on `{reference}` from a later step",
                            field.key
                        )))
                    }
                    None => {
                        return Err(WizardError::InvalidSchema(format!(
                            "field `{}` depends on unknown field `{reference}`",
                            field.key
                        )))
                    }
                }
            }
        }

        Ok(())
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn option_map(options: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    options.iter().map(|(parent, children)| (parent.to_string(), owned(children))).collect()
}
