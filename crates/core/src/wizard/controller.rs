use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::attachment::{Attachment, AttachmentId, AttachmentList};
use crate::wizard::payload::build_payload;
use crate::wizard::review::ReviewSummary;
use crate::wizard::schema::{FieldKind, StepSchema, WizardSchema};
use crate::wizard::validation::{is_visible, options_for, validate_all, validate_step, FieldError};
use crate::wizard::values::{FieldValue, FormValues};
use crate::wizard::WizardError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryAction {
    Next,
    Submit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Editing,
    Submitting,
    Submitted,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    Moved { from: usize, to: usize },
    Blocked { step: usize, errors: Vec<FieldError> },
    Stayed { step: usize },
}

/// Side effects of a single value change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ChangeEffects {
    /// Dependent selections reset because their options changed.
    pub reset: Vec<String>,
    /// Conditional fields cleared because they became hidden.
    pub cleared: Vec<String>,
}

/// Everything needed for the single create call.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmissionDraft {
    pub form: String,
    pub payload: Value,
    pub attachments: Vec<Attachment>,
}

/// Step controller shared by every multi-step request form.
///
/// Values live for the whole draft: navigation never clears them, and only a
/// change to a governing or parent field can reset another field.
#[derive(Clone, Debug)]
pub struct WizardController {
    schema: WizardSchema,
    current: usize,
    values: FormValues,
    errors: Vec<FieldError>,
    attachments: AttachmentList,
    phase: Phase,
    last_failure: Option<String>,
}

impl WizardController {
    pub fn new(schema: WizardSchema) -> Result<Self, WizardError> {
        schema.check()?;
        Ok(Self {
            schema,
            current: 0,
            values: FormValues::new(),
            errors: Vec::new(),
            attachments: AttachmentList::new(),
            phase: Phase::Editing,
            last_failure: None,
        })
    }

    pub fn schema(&self) -> &WizardSchema {
        &self.schema
    }

    pub fn current_step(&self) -> usize {
        self.current
    }

    pub fn step(&self) -> &StepSchema {
        &self.schema.steps[self.current]
    }

    pub fn is_last_step(&self) -> bool {
        self.current + 1 == self.schema.step_count()
    }

    pub fn primary_action(&self) -> PrimaryAction {
        if self.is_last_step() {
            PrimaryAction::Submit
        } else {
            PrimaryAction::Next
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The submit control is enabled only on the last step while editing.
    pub fn can_submit(&self) -> bool {
        self.is_last_step() && self.phase == Phase::Editing
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn attachments(&self) -> &AttachmentList {
        &self.attachments
    }

    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// Options currently offered for `key`, following parent selections.
    pub fn options(&self, key: &str) -> Option<&[String]> {
        self.schema.field(key).and_then(|field| options_for(field, &self.values))
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.schema.field(key).is_some_and(|field| is_visible(field, &self.values))
    }

    pub fn set_value(&mut self, key: &str, value: FieldValue) -> Result<ChangeEffects, WizardError> {
        self.ensure_editing()?;
        let field = self.schema.field(key).ok_or_else(|| WizardError::UnknownField(key.to_string()))?;
        if matches!(field.kind, FieldKind::LineItems { .. }) != matches!(value, FieldValue::Rows(_))
        {
            return Err(WizardError::InvalidValue {
                field: key.to_string(),
                message: "line items take rows and other fields do not".to_string(),
            });
        }

        if self.values.get(key) == Some(&value) {
            return Ok(ChangeEffects::default());
        }

        let before = self.values.clone();
        self.values.insert(key, value);
        self.errors.retain(|error| !error_belongs_to(&error.field, key));

        let effects = self.cascade(key, &before);
        debug!(
            event_name = "wizard.value_changed",
            form = %self.schema.name,
            field = key,
            reset = ?effects.reset,
            cleared = ?effects.cleared,
            "wizard value changed"
        );
        Ok(effects)
    }

    pub fn clear_value(&mut self, key: &str) -> Result<ChangeEffects, WizardError> {
        self.ensure_editing()?;
        if self.schema.field(key).is_none() {
            return Err(WizardError::UnknownField(key.to_string()));
        }

        let before = self.values.clone();
        if self.values.remove(key).is_none() {
            return Ok(ChangeEffects::default());
        }
        Ok(self.cascade(key, &before))
    }

    /// Validates the current step and advances when it is clean.
    pub fn next(&mut self) -> Result<StepOutcome, WizardError> {
        self.ensure_editing()?;
        if self.is_last_step() {
            return Err(WizardError::AtLastStep);
        }

        let errors = validate_step(&self.schema, self.current, &self.values);
        if !errors.is_empty() {
            debug!(
                event_name = "wizard.step_blocked",
                form = %self.schema.name,
                step = self.current,
                error_count = errors.len(),
                "wizard step validation failed"
            );
            self.errors = errors.clone();
            return Ok(StepOutcome::Blocked { step: self.current, errors });
        }

        let from = self.current;
        self.current += 1;
        self.errors.clear();
        debug!(event_name = "wizard.step_advanced", form = %self.schema.name, from, to = self.current);
        Ok(StepOutcome::Moved { from, to: self.current })
    }

    /// Steps back without validating.
    pub fn previous(&mut self) -> Result<StepOutcome, WizardError> {
        self.ensure_editing()?;
        if self.current == 0 {
            return Ok(StepOutcome::Stayed { step: 0 });
        }

        let from = self.current;
        self.current -= 1;
        self.errors.clear();
        Ok(StepOutcome::Moved { from, to: self.current })
    }

    /// Jumps back to an earlier step, e.g. to edit a section from the review.
    pub fn goto(&mut self, step: usize) -> Result<StepOutcome, WizardError> {
        self.ensure_editing()?;
        if step > self.current {
            return Err(WizardError::ForwardJump { from: self.current, to: step });
        }
        if step == self.current {
            return Ok(StepOutcome::Stayed { step });
        }

        let from = self.current;
        self.current = step;
        self.errors.clear();
        Ok(StepOutcome::Moved { from, to: step })
    }

    pub fn add_attachment(&mut self, attachment: Attachment) -> Result<AttachmentId, WizardError> {
        self.ensure_editing()?;
        Ok(self.attachments.add(attachment))
    }

    pub fn remove_attachment(&mut self, id: AttachmentId) -> Result<Option<Attachment>, WizardError> {
        self.ensure_editing()?;
        Ok(self.attachments.remove(id))
    }

    pub fn review(&self) -> ReviewSummary {
        ReviewSummary::assemble(&self.schema, &self.values, &self.attachments)
    }

    /// Validates every step, builds the payload and locks the draft.
    ///
    /// On validation failure the controller moves to the first failing step.
    pub fn begin_submit(&mut self) -> Result<SubmissionDraft, WizardError> {
        match self.phase {
            Phase::Editing => {}
            Phase::Submitting => return Err(WizardError::AlreadySubmitting),
            Phase::Submitted => return Err(WizardError::AlreadySubmitted),
        }
        if !self.is_last_step() {
            return Err(WizardError::NotOnLastStep { step: self.current });
        }

        if let Some((step, errors)) = validate_all(&self.schema, &self.values).into_iter().next() {
            self.current = step;
            self.errors = errors.clone();
            return Err(WizardError::Incomplete { step, errors });
        }

        self.phase = Phase::Submitting;
        self.last_failure = None;
        Ok(SubmissionDraft {
            form: self.schema.name.clone(),
            payload: build_payload(&self.schema, &self.values, &self.attachments),
            attachments: self.attachments.as_slice().to_vec(),
        })
    }

    /// The create call failed: stay on the review step and allow a retry.
    pub fn submission_failed(&mut self, message: impl Into<String>) {
        if self.phase == Phase::Submitting {
            self.phase = Phase::Editing;
        }
        self.last_failure = Some(message.into());
    }

    /// The create call succeeded: the draft is discarded.
    pub fn submission_succeeded(&mut self) {
        self.phase = Phase::Submitted;
        self.values.clear();
        self.attachments.clear();
        self.errors.clear();
        self.last_failure = None;
    }

    fn ensure_editing(&self) -> Result<(), WizardError> {
        match self.phase {
            Phase::Editing => Ok(()),
            Phase::Submitting => Err(WizardError::AlreadySubmitting),
            Phase::Submitted => Err(WizardError::AlreadySubmitted),
        }
    }

    fn cascade(&mut self, key: &str, before: &FormValues) -> ChangeEffects {
        let mut effects = ChangeEffects::default();

        let dependents: Vec<_> = self.schema.dependents_of(key).cloned().collect();
        for dependent in dependents {
            let valid = options_for(&dependent, &self.values).unwrap_or(&[]).to_vec();
            let stale = match self.values.get(&dependent.key) {
                Some(FieldValue::Text(selected)) => !valid.contains(selected),
                Some(FieldValue::List(selected)) => selected.iter().any(|item| !valid.contains(item)),
                _ => false,
            };
            if !stale {
                continue;
            }

            let kept = match self.values.get(&dependent.key) {
                Some(FieldValue::List(selected)) if dependent.kind.is_multi() => Some(
                    selected.iter().filter(|item| valid.contains(item)).cloned().collect::<Vec<_>>(),
                ),
                _ => None,
            };
            match kept {
                Some(kept) => {
                    self.values.insert(dependent.key.clone(), FieldValue::List(kept));
                }
                None => {
                    self.values.remove(&dependent.key);
                }
            }
            effects.reset.push(dependent.key.clone());
            let nested = self.cascade(&dependent.key, before);
            effects.reset.extend(nested.reset);
            effects.cleared.extend(nested.cleared);
        }

        let governed: Vec<_> = self.schema.governed_by(key).cloned().collect();
        for field in governed {
            let was_visible = is_visible(&field, before);
            let now_visible = is_visible(&field, &self.values);
            if was_visible && !now_visible && self.values.remove(&field.key).is_some() {
                effects.cleared.push(field.key.clone());
                let nested = self.cascade(&field.key, before);
                effects.reset.extend(nested.reset);
                effects.cleared.extend(nested.cleared);
            }
        }

        effects
    }
}

fn error_belongs_to(error_field: &str, key: &str) -> bool {
    error_field == key
        || error_field.strip_prefix(key).is_some_and(|rest| rest.starts_with('[') || rest.starts_with('.'))
}
