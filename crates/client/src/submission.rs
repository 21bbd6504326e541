use opsdesk_core::{
    ApplicationError, FormKind, Notice, RequestId, WizardController, WizardError,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::transport::Transport;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("no create route for form `{0}`")]
    UnknownForm(String),
}

impl From<SubmissionError> for ApplicationError {
    fn from(value: SubmissionError) -> Self {
        match value {
            SubmissionError::Wizard(error) => error.into(),
            SubmissionError::Client(error) => error.into(),
            SubmissionError::UnknownForm(form) => {
                Self::Configuration(format!("no create route for form `{form}`"))
            }
        }
    }
}

/// What the user gets back after a successful create call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub id: Option<RequestId>,
    pub reference: String,
    pub notice: Notice,
}

const REFERENCE_KEYS: &[&str] =
    &["ticketNumber", "referenceNumber", "requestNumber", "reference", "employeeId"];

impl Receipt {
    fn from_data(data: &Value) -> Self {
        let text = |key: &str| match data.get(key)? {
            Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        };
        let id = text("id").or_else(|| text("_id")).map(RequestId);
        let reference = REFERENCE_KEYS
            .iter()
            .find_map(|&key| text(key))
            .or_else(|| id.as_ref().map(ToString::to_string))
            .unwrap_or_else(|| "(unassigned)".to_string());
        let notice = Notice::submitted(&reference);
        Self { id, reference, notice }
    }
}

/// Submits the wizard's draft with exactly one create call.
///
/// The wizard is locked while the call is in flight. On success the draft is
/// discarded; on failure the wizard stays on its review step with the server
/// message recorded and submit re-enabled.
pub async fn submit<T: Transport>(
    client: &ApiClient<T>,
    wizard: &mut WizardController,
) -> Result<Receipt, SubmissionError> {
    let draft = wizard.begin_submit()?;
    let Some(kind) = FormKind::parse(&draft.form) else {
        wizard.submission_failed(format!("no create route for form `{}`", draft.form));
        return Err(SubmissionError::UnknownForm(draft.form));
    };

    info!(
        event_name = "submission.started",
        form = kind.as_str(),
        attachment_count = draft.attachments.len(),
        "submitting request"
    );

    let result = match kind {
        FormKind::ItIssue => client.it_support().create(&draft).await,
        FormKind::MaterialRequest => client.material_requests().create(&draft).await,
        FormKind::Onboarding => client.hr().create_employee(&draft).await,
    };

    match result {
        Ok(response) => {
            wizard.submission_succeeded();
            let receipt = Receipt::from_data(&response.data);
            info!(
                event_name = "submission.succeeded",
                form = kind.as_str(),
                reference = %receipt.reference,
                "request submitted"
            );
            Ok(receipt)
        }
        Err(error) => {
            let message = error.server_message();
            warn!(
                event_name = "submission.failed",
                form = kind.as_str(),
                error = %error,
                "request submission failed"
            );
            wizard.submission_failed(message);
            Err(error.into())
        }
    }
}
