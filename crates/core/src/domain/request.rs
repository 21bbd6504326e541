use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::approval::ApprovalChain;
use crate::domain::status::{
    AnyStatus, CashRequestStatus, ItTicketStatus, MaterialRequestStatus, Priority, RequestKind,
    WorkflowStatus,
};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A request record as returned by the backend.
///
/// Fields that only some workflows carry (amounts, device details, line items)
/// stay in `details` untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "S: WorkflowStatus"))]
pub struct Request<S> {
    #[serde(alias = "_id")]
    pub id: RequestId,
    #[serde(
        default,
        alias = "ticketNumber",
        alias = "referenceNumber",
        alias = "requestNumber"
    )]
    pub reference: Option<String>,
    pub status: S,
    #[serde(default)]
    pub priority: Option<Priority>,
    pub requested_by: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub justification: Option<String>,
    #[serde(default)]
    pub approval_chain: ApprovalChain,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: BTreeMap<String, Value>,
}

pub type CashRequest = Request<CashRequestStatus>;
pub type ItTicket = Request<ItTicketStatus>;
pub type MaterialRequest = Request<MaterialRequestStatus>;

impl<S> Request<S>
where
    S: WorkflowStatus,
{
    pub fn kind(&self) -> RequestKind {
        S::KIND
    }

    /// Only rejected requests may be revised.
    pub fn can_edit(&self) -> bool {
        self.status.is_terminal_rejected()
    }

    /// Deletion stays possible only while the first approval step is pending
    /// and nobody has acted on the chain.
    pub fn can_delete(&self) -> bool {
        self.approval_chain.is_untouched()
    }

    pub fn facts_for(&self, actor_id: &str) -> RecordFacts
    where
        S: Into<AnyStatus>,
    {
        RecordFacts {
            status: self.status.into(),
            is_owner: !actor_id.is_empty() && self.requested_by == actor_id,
            approval_untouched: self.approval_chain.is_untouched(),
        }
    }

    /// Ticket or reference number shown to users, falling back to the id.
    pub fn display_reference(&self) -> &str {
        self.reference.as_deref().unwrap_or(&self.id.0)
    }
}

/// Everything the action policy needs to know about a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordFacts {
    pub status: AnyStatus,
    pub is_owner: bool,
    pub approval_untouched: bool,
}
