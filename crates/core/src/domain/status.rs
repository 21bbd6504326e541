use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Which workflow a request belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    CashRequest,
    ItTicket,
    MaterialRequest,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CashRequest => "cash_request",
            Self::ItTicket => "it_ticket",
            Self::MaterialRequest => "material_request",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cash" | "cash_request" => Some(Self::CashRequest),
            "it" | "ticket" | "it_ticket" => Some(Self::ItTicket),
            "material" | "material_request" => Some(Self::MaterialRequest),
            _ => None,
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag colour used when a status is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Neutral,
    Processing,
    Warning,
    Success,
    Danger,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: &'static str,
    pub tone: Tone,
    pub icon: &'static str,
}

impl StatusBadge {
    pub const fn new(label: &'static str, tone: Tone, icon: &'static str) -> Self {
        Self { label, tone, icon }
    }
}

/// A workflow's enumerated states as mirrored by the client.
///
/// Transitions are owned by the server; the client only parses, displays,
/// and derives edit eligibility from the current value.
pub trait WorkflowStatus:
    Copy + Eq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: RequestKind;

    fn all() -> &'static [Self];

    fn as_str(self) -> &'static str;

    fn badge(self) -> StatusBadge;

    /// Rejected states in which the requester may revise and resubmit.
    fn is_terminal_rejected(self) -> bool;

    fn is_terminal(self) -> bool;

    fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim().to_ascii_lowercase();
        Self::all().iter().copied().find(|status| status.as_str() == needle)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashRequestStatus {
    PendingSupervisor,
    PendingFinance,
    Disbursed,
    JustificationPendingSupervisor,
    JustificationPendingFinance,
    Completed,
    Denied,
    JustificationRejected,
}

impl WorkflowStatus for CashRequestStatus {
    const KIND: RequestKind = RequestKind::CashRequest;

    fn all() -> &'static [Self] {
        &[
            Self::PendingSupervisor,
            Self::PendingFinance,
            Self::Disbursed,
            Self::JustificationPendingSupervisor,
            Self::JustificationPendingFinance,
            Self::Completed,
            Self::Denied,
            Self::JustificationRejected,
        ]
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::PendingSupervisor => "pending_supervisor",
            Self::PendingFinance => "pending_finance",
            Self::Disbursed => "disbursed",
            Self::JustificationPendingSupervisor => "justification_pending_supervisor",
            Self::JustificationPendingFinance => "justification_pending_finance",
            Self::Completed => "completed",
            Self::Denied => "denied",
            Self::JustificationRejected => "justification_rejected",
        }
    }

    fn badge(self) -> StatusBadge {
        match self {
            Self::PendingSupervisor => {
                StatusBadge::new("Pending Supervisor", Tone::Warning, "clock-circle")
            }
            Self::PendingFinance => StatusBadge::new("Pending Finance", Tone::Warning, "bank"),
            Self::Disbursed => StatusBadge::new("Disbursed", Tone::Processing, "dollar"),
            Self::JustificationPendingSupervisor => {
                StatusBadge::new("Justification: Supervisor", Tone::Processing, "file-search")
            }
            Self::JustificationPendingFinance => {
                StatusBadge::new("Justification: Finance", Tone::Processing, "audit")
            }
            Self::Completed => StatusBadge::new("Completed", Tone::Success, "check-circle"),
            Self::Denied => StatusBadge::new("Denied", Tone::Danger, "close-circle"),
            Self::JustificationRejected => {
                StatusBadge::new("Justification Rejected", Tone::Danger, "exclamation-circle")
            }
        }
    }

    fn is_terminal_rejected(self) -> bool {
        matches!(self, Self::Denied | Self::JustificationRejected)
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Denied | Self::JustificationRejected)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItTicketStatus {
    PendingItReview,
    ItAssigned,
    InProgress,
    Resolved,
    Closed,
    Denied,
}

impl WorkflowStatus for ItTicketStatus {
    const KIND: RequestKind = RequestKind::ItTicket;

    fn all() -> &'static [Self] {
        &[
            Self::PendingItReview,
            Self::ItAssigned,
            Self::InProgress,
            Self::Resolved,
            Self::Closed,
            Self::Denied,
        ]
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::PendingItReview => "pending_it_review",
            Self::ItAssigned => "it_assigned",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
            Self::Denied => "denied",
        }
    }

    fn badge(self) -> StatusBadge {
        match self {
            Self::PendingItReview => StatusBadge::new("Pending IT Review", Tone::Warning, "eye"),
            Self::ItAssigned => StatusBadge::new("Assigned", Tone::Processing, "user"),
            Self::InProgress => StatusBadge::new("In Progress", Tone::Processing, "sync"),
            Self::Resolved => StatusBadge::new("Resolved", Tone::Success, "check-circle"),
            Self::Closed => StatusBadge::new("Closed", Tone::Neutral, "lock"),
            Self::Denied => StatusBadge::new("Denied", Tone::Danger, "close-circle"),
        }
    }

    fn is_terminal_rejected(self) -> bool {
        matches!(self, Self::Denied)
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed | Self::Denied)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialRequestStatus {
    PendingSupervisor,
    PendingSupplyChain,
    Approved,
    Fulfilled,
    Denied,
}

impl WorkflowStatus for MaterialRequestStatus {
    const KIND: RequestKind = RequestKind::MaterialRequest;

    fn all() -> &'static [Self] {
        &[
            Self::PendingSupervisor,
            Self::PendingSupplyChain,
            Self::Approved,
            Self::Fulfilled,
            Self::Denied,
        ]
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::PendingSupervisor => "pending_supervisor",
            Self::PendingSupplyChain => "pending_supply_chain",
            Self::Approved => "approved",
            Self::Fulfilled => "fulfilled",
            Self::Denied => "denied",
        }
    }

    fn badge(self) -> StatusBadge {
        match self {
            Self::PendingSupervisor => {
                StatusBadge::new("Pending Supervisor", Tone::Warning, "clock-circle")
            }
            Self::PendingSupplyChain => {
                StatusBadge::new("Pending Supply Chain", Tone::Warning, "shopping-cart")
            }
            Self::Approved => StatusBadge::new("Approved", Tone::Processing, "like"),
            Self::Fulfilled => StatusBadge::new("Fulfilled", Tone::Success, "check-circle"),
            Self::Denied => StatusBadge::new("Denied", Tone::Danger, "close-circle"),
        }
    }

    fn is_terminal_rejected(self) -> bool {
        matches!(self, Self::Denied)
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Fulfilled | Self::Denied)
    }
}

/// Any workflow status, for code that handles several request kinds at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnyStatus {
    Cash(CashRequestStatus),
    It(ItTicketStatus),
    Material(MaterialRequestStatus),
}

impl AnyStatus {
    pub fn parse(kind: RequestKind, raw: &str) -> Option<Self> {
        match kind {
            RequestKind::CashRequest => CashRequestStatus::parse(raw).map(Self::Cash),
            RequestKind::ItTicket => ItTicketStatus::parse(raw).map(Self::It),
            RequestKind::MaterialRequest => MaterialRequestStatus::parse(raw).map(Self::Material),
        }
    }

    pub fn kind(self) -> RequestKind {
        match self {
            Self::Cash(_) => RequestKind::CashRequest,
            Self::It(_) => RequestKind::ItTicket,
            Self::Material(_) => RequestKind::MaterialRequest,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash(status) => status.as_str(),
            Self::It(status) => status.as_str(),
            Self::Material(status) => status.as_str(),
        }
    }

    pub fn badge(self) -> StatusBadge {
        match self {
            Self::Cash(status) => status.badge(),
            Self::It(status) => status.badge(),
            Self::Material(status) => status.badge(),
        }
    }

    pub fn is_terminal_rejected(self) -> bool {
        match self {
            Self::Cash(status) => status.is_terminal_rejected(),
            Self::It(status) => status.is_terminal_rejected(),
            Self::Material(status) => status.is_terminal_rejected(),
        }
    }
}

impl From<CashRequestStatus> for AnyStatus {
    fn from(value: CashRequestStatus) -> Self {
        Self::Cash(value)
    }
}

impl From<ItTicketStatus> for AnyStatus {
    fn from(value: ItTicketStatus) -> Self {
        Self::It(value)
    }
}

impl From<MaterialRequestStatus> for AnyStatus {
    fn from(value: MaterialRequestStatus) -> Self {
        Self::Material(value)
    }
}

/// IT ticket urgency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High, Self::Critical]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim().to_ascii_lowercase();
        Self::all().iter().copied().find(|priority| priority.as_str() == needle)
    }

    pub fn badge(self) -> StatusBadge {
        match self {
            Self::Low => StatusBadge::new("Low", Tone::Neutral, "arrow-down"),
            Self::Medium => StatusBadge::new("Medium", Tone::Processing, "minus"),
            Self::High => StatusBadge::new("High", Tone::Warning, "arrow-up"),
            Self::Critical => StatusBadge::new("Critical", Tone::Danger, "fire"),
        }
    }
}
