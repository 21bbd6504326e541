//! Row-level action gating for request lists.
//!
//! The table mirrors the server's workflow so the list can offer the right
//! buttons. The server stays authoritative: any 4xx it returns wins.

use serde::{Deserialize, Serialize};

use crate::domain::request::RecordFacts;
use crate::domain::status::{
    AnyStatus, CashRequestStatus, ItTicketStatus, MaterialRequestStatus, RequestKind,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employee,
    Supervisor,
    Finance,
    ItSupport,
    SupplyChain,
    HrAdmin,
    Admin,
}

impl Role {
    pub fn all() -> &'static [Self] {
        &[
            Self::Employee,
            Self::Supervisor,
            Self::Finance,
            Self::ItSupport,
            Self::SupplyChain,
            Self::HrAdmin,
            Self::Admin,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Supervisor => "supervisor",
            Self::Finance => "finance",
            Self::ItSupport => "it_support",
            Self::SupplyChain => "supply_chain",
            Self::HrAdmin => "hr_admin",
            Self::Admin => "admin",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let key = normalize_key(raw);
        Self::all().iter().copied().find(|role| role.as_str() == key)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    View,
    Edit,
    Delete,
    Approve,
    Reject,
    Assign,
    StartWork,
    Resolve,
    Fulfill,
}

impl RowAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Assign => "assign",
            Self::StartWork => "start_work",
            Self::Resolve => "resolve",
            Self::Fulfill => "fulfill",
        }
    }

    /// Actions a list of `kind` records can offer, in display order.
    pub fn offered_for(kind: RequestKind) -> &'static [Self] {
        match kind {
            RequestKind::CashRequest => {
                &[Self::View, Self::Edit, Self::Delete, Self::Approve, Self::Reject]
            }
            RequestKind::ItTicket => &[
                Self::View,
                Self::Edit,
                Self::Delete,
                Self::Assign,
                Self::Reject,
                Self::StartWork,
                Self::Resolve,
            ],
            RequestKind::MaterialRequest => {
                &[Self::View, Self::Edit, Self::Delete, Self::Approve, Self::Reject, Self::Fulfill]
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Availability {
    Enabled,
    Disabled { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionAffordance {
    pub action: RowAction,
    #[serde(flatten)]
    pub availability: Availability,
}

impl ActionAffordance {
    fn enabled(action: RowAction) -> Self {
        Self { action, availability: Availability::Enabled }
    }

    fn disabled(action: RowAction, reason: impl Into<String>) -> Self {
        Self { action, availability: Availability::Disabled { reason: reason.into() } }
    }

    pub fn is_enabled(&self) -> bool {
        self.availability == Availability::Enabled
    }
}

/// Who acts at a workflow stage and what they may do there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct StageGrant {
    role: Role,
    actions: &'static [RowAction],
}

const REVIEW: &[RowAction] = &[RowAction::Approve, RowAction::Reject];

fn grant(role: Role, actions: &'static [RowAction]) -> Option<StageGrant> {
    Some(StageGrant { role, actions })
}

fn stage_grant(status: AnyStatus) -> Option<StageGrant> {
    match status {
        AnyStatus::Cash(status) => match status {
            CashRequestStatus::PendingSupervisor
            | CashRequestStatus::JustificationPendingSupervisor => grant(Role::Supervisor, REVIEW),
            CashRequestStatus::PendingFinance | CashRequestStatus::JustificationPendingFinance => {
                grant(Role::Finance, REVIEW)
            }
            _ => None,
        },
        AnyStatus::It(status) => match status {
            ItTicketStatus::PendingItReview => {
                grant(Role::ItSupport, &[RowAction::Assign, RowAction::Reject])
            }
            ItTicketStatus::ItAssigned => grant(Role::ItSupport, &[RowAction::StartWork]),
            ItTicketStatus::InProgress => grant(Role::ItSupport, &[RowAction::Resolve]),
            _ => None,
        },
        AnyStatus::Material(status) => match status {
            MaterialRequestStatus::PendingSupervisor => grant(Role::Supervisor, REVIEW),
            MaterialRequestStatus::PendingSupplyChain => grant(Role::SupplyChain, REVIEW),
            MaterialRequestStatus::Approved => grant(Role::SupplyChain, &[RowAction::Fulfill]),
            _ => None,
        },
    }
}

/// Pure `(role, record) -> actions` table. Every offered action is returned,
/// ineligible ones carry the reason they are disabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActionPolicy;

impl ActionPolicy {
    pub fn evaluate(role: Role, facts: &RecordFacts) -> Vec<ActionAffordance> {
        RowAction::offered_for(facts.status.kind())
            .iter()
            .map(|action| Self::affordance(role, facts, *action))
            .collect()
    }

    pub fn allows(role: Role, facts: &RecordFacts, action: RowAction) -> bool {
        Self::affordance(role, facts, action).is_enabled()
    }

    fn affordance(role: Role, facts: &RecordFacts, action: RowAction) -> ActionAffordance {
        let label = facts.status.badge().label;
        match action {
            RowAction::View => ActionAffordance::enabled(action),
            RowAction::Edit => {
                if !facts.is_owner {
                    ActionAffordance::disabled(action, "only the requester can edit")
                } else if !facts.status.is_terminal_rejected() {
                    ActionAffordance::disabled(
                        action,
                        format!("only rejected requests can be edited (status is {label})"),
                    )
                } else {
                    ActionAffordance::enabled(action)
                }
            }
            RowAction::Delete => {
                if !facts.is_owner {
                    ActionAffordance::disabled(action, "only the requester can delete")
                } else if !facts.approval_untouched {
                    ActionAffordance::disabled(action, "an approver has already acted")
                } else {
                    ActionAffordance::enabled(action)
                }
            }
            _ => match stage_grant(facts.status) {
                Some(grant) if grant.actions.contains(&action) => {
                    if role == grant.role || role == Role::Admin {
                        ActionAffordance::enabled(action)
                    } else {
                        ActionAffordance::disabled(
                            action,
                            format!("awaiting {} ({label})", grant.role.as_str()),
                        )
                    }
                }
                _ => ActionAffordance::disabled(action, format!("not available while {label}")),
            },
        }
    }
}

fn normalize_key(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

#[cfg(test)]
mod tests {
    use super::{ActionPolicy, Availability, Role, RowAction};
    use crate::domain::request::RecordFacts;
    use crate::domain::status::{
        AnyStatus, CashRequestStatus, ItTicketStatus, MaterialRequestStatus,
    };

    fn facts(status: impl Into<AnyStatus>, is_owner: bool, approval_untouched: bool) -> RecordFacts {
        RecordFacts { status: status.into(), is_owner, approval_untouched }
    }

    fn enabled(role: Role, facts: &RecordFacts) -> Vec<RowAction> {
        ActionPolicy::evaluate(role, facts)
            .into_iter()
            .filter(|affordance| affordance.is_enabled())
            .map(|affordance| affordance.action)
            .collect()
    }

    #[test]
    fn supervisor_reviews_cash_at_both_supervisor_stages() {
        for status in [
            CashRequestStatus::PendingSupervisor,
            CashRequestStatus::JustificationPendingSupervisor,
        ] {
            let record = facts(status, false, false);
            assert_eq!(
                enabled(Role::Supervisor, &record),
                vec![RowAction::View, RowAction::Approve, RowAction::Reject]
            );
            assert_eq!(enabled(Role::Finance, &record), vec![RowAction::View]);
        }
    }

    #[test]
    fn finance_reviews_cash_at_finance_stages() {
        let record = facts(CashRequestStatus::JustificationPendingFinance, false, false);
        assert!(ActionPolicy::allows(Role::Finance, &record, RowAction::Approve));
        assert!(!ActionPolicy::allows(Role::Supervisor, &record, RowAction::Approve));
    }

    #[test]
    fn it_support_walks_ticket_lifecycle() {
        let cases = [
            (ItTicketStatus::PendingItReview, vec![RowAction::View, RowAction::Assign, RowAction::Reject]),
            (ItTicketStatus::ItAssigned, vec![RowAction::View, RowAction::StartWork]),
            (ItTicketStatus::InProgress, vec![RowAction::View, RowAction::Resolve]),
            (ItTicketStatus::Closed, vec![RowAction::View]),
        ];
        for (status, expected) in cases {
            assert_eq!(enabled(Role::ItSupport, &facts(status, false, false)), expected);
        }
    }

    #[test]
    fn supply_chain_fulfills_approved_material() {
        let record = facts(MaterialRequestStatus::Approved, false, false);
        assert_eq!(enabled(Role::SupplyChain, &record), vec![RowAction::View, RowAction::Fulfill]);
        assert_eq!(enabled(Role::Supervisor, &record), vec![RowAction::View]);
    }

    #[test]
    fn edit_requires_owner_and_terminal_rejection() {
        let denied = facts(CashRequestStatus::Denied, true, false);
        assert!(ActionPolicy::allows(Role::Employee, &denied, RowAction::Edit));

        let rejected = facts(CashRequestStatus::JustificationRejected, true, false);
        assert!(ActionPolicy::allows(Role::Employee, &rejected, RowAction::Edit));

        let pending = facts(CashRequestStatus::PendingFinance, true, false);
        let edit = ActionPolicy::evaluate(Role::Employee, &pending)
            .into_iter()
            .find(|affordance| affordance.action == RowAction::Edit)
            .expect("edit is always offered");
        assert!(matches!(edit.availability, Availability::Disabled { ref reason } if reason.contains("rejected")));

        let not_owner = facts(CashRequestStatus::Denied, false, false);
        assert!(!ActionPolicy::allows(Role::Employee, &not_owner, RowAction::Edit));
    }

    #[test]
    fn delete_is_disabled_once_anyone_acted() {
        let untouched = facts(ItTicketStatus::PendingItReview, true, true);
        assert!(ActionPolicy::allows(Role::Employee, &untouched, RowAction::Delete));

        let acted = facts(ItTicketStatus::PendingItReview, true, false);
        assert!(!ActionPolicy::allows(Role::Employee, &acted, RowAction::Delete));
    }

    #[test]
    fn admin_can_act_at_any_stage() {
        let record = facts(MaterialRequestStatus::PendingSupplyChain, false, false);
        assert!(ActionPolicy::allows(Role::Admin, &record, RowAction::Approve));
        assert!(!ActionPolicy::allows(Role::HrAdmin, &record, RowAction::Approve));
    }

    #[test]
    fn affordance_serializes_flat() {
        let record = facts(MaterialRequestStatus::Fulfilled, false, false);
        let json = serde_json::to_value(ActionPolicy::evaluate(Role::Employee, &record))
            .expect("serialize");
        assert_eq!(json[0], serde_json::json!({"action": "view", "state": "enabled"}));
        assert_eq!(json[1]["state"], "disabled");
    }

    #[test]
    fn roles_parse_with_dashes() {
        assert_eq!(Role::parse("it-support"), Some(Role::ItSupport));
        assert_eq!(Role::parse("HR_ADMIN"), Some(Role::HrAdmin));
        assert_eq!(Role::parse("ceo"), None);
    }
}
