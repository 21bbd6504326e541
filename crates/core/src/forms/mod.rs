//! Concrete wizard schemas for the request forms the portal offers.

pub mod it_issue;
pub mod material_request;
pub mod onboarding;

use serde::{Deserialize, Serialize};

use crate::wizard::WizardSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormKind {
    ItIssue,
    MaterialRequest,
    Onboarding,
}

impl FormKind {
    pub fn all() -> &'static [Self] {
        &[Self::ItIssue, Self::MaterialRequest, Self::Onboarding]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ItIssue => "it-issue",
            Self::MaterialRequest => "material-request",
            Self::Onboarding => "onboarding",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace('_', "-");
        Self::all().iter().copied().find(|kind| kind.as_str() == normalized)
    }

    pub fn schema(self) -> WizardSchema {
        match self {
            Self::ItIssue => it_issue::schema(),
            Self::MaterialRequest => material_request::schema(),
            Self::Onboarding => onboarding::schema(),
        }
    }
}
