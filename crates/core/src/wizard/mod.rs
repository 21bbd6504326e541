//! Multi-step form wizard: schema, draft values, validation and the
//! controller that drives navigation and submission.

pub mod controller;
pub mod payload;
pub mod review;
pub mod schema;
pub mod validation;
pub mod values;

use thiserror::Error;

pub use controller::{
    ChangeEffects, Phase, PrimaryAction, StepOutcome, SubmissionDraft, WizardController,
};
pub use payload::build_payload;
pub use review::{ReviewEntry, ReviewFile, ReviewSection, ReviewSummary};
pub use schema::{FieldKind, FieldSchema, StepSchema, Visibility, WizardSchema};
pub use validation::FieldError;
pub use values::{FieldValue, FormValues, Row};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("invalid wizard schema: {0}")]
    InvalidSchema(String),
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("invalid value for `{field}`: {message}")]
    InvalidValue { field: String, message: String },
    #[error("already on the last step")]
    AtLastStep,
    #[error("cannot jump forward from step {from} to step {to}")]
    ForwardJump { from: usize, to: usize },
    #[error("submission is only available from the last step (currently on step {step})")]
    NotOnLastStep { step: usize },
    #[error("step {step} has {} invalid field(s)", errors.len())]
    Incomplete { step: usize, errors: Vec<FieldError> },
    #[error("a submission is already in flight")]
    AlreadySubmitting,
    #[error("this form has already been submitted")]
    AlreadySubmitted,
}
