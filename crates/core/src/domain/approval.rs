use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Approved,
    Rejected,
}

impl StepStatus {
    pub fn is_decided(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl From<Decision> for StepStatus {
    fn from(value: Decision) -> Self {
        match value {
            Decision::Approve => Self::Approved,
            Decision::Reject => Self::Rejected,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalStep {
    pub level: u32,
    #[serde(default)]
    pub approver: Option<String>,
    pub status: StepStatus,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub action_date: Option<DateTime<Utc>>,
}

impl ApprovalStep {
    pub fn pending(level: u32, approver: Option<String>) -> Self {
        Self { level, approver, status: StepStatus::Pending, comments: None, action_date: None }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApprovalChainError {
    #[error("approval level {level} must be greater than previous level {previous}")]
    LevelNotIncreasing { level: u32, previous: u32 },
    #[error("approval level {0} does not exist in the chain")]
    UnknownLevel(u32),
    #[error("approval level {0} was already decided and cannot re-open")]
    AlreadyDecided(u32),
    #[error("approval level {level} cannot be decided while level {pending_level} is pending")]
    OutOfOrder { level: u32, pending_level: u32 },
    #[error("approval chain was closed by a rejection at level {rejected_level}")]
    Closed { rejected_level: u32 },
}

/// Ordered sign-offs for a request.
///
/// Steps are append-only with strictly increasing levels, decided strictly in
/// order, and a decided step never returns to pending. Chains received from the
/// server are checked against the same rules on deserialization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ApprovalStep>", into = "Vec<ApprovalStep>")]
pub struct ApprovalChain {
    steps: Vec<ApprovalStep>,
}

impl ApprovalChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[ApprovalStep] {
        &self.steps
    }

    pub fn first(&self) -> Option<&ApprovalStep> {
        self.steps.first()
    }

    /// The first step still waiting on an approver.
    pub fn current(&self) -> Option<&ApprovalStep> {
        if self.rejected_level().is_some() {
            return None;
        }
        self.steps.iter().find(|step| step.status == StepStatus::Pending)
    }

    pub fn has_any_action(&self) -> bool {
        self.steps.iter().any(|step| step.status.is_decided())
    }

    /// True while the first step exists, is pending, and nobody has acted.
    pub fn is_untouched(&self) -> bool {
        matches!(self.first(), Some(step) if step.status == StepStatus::Pending)
            && !self.has_any_action()
    }

    pub fn is_complete(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|step| step.status == StepStatus::Approved)
    }

    pub fn append(&mut self, step: ApprovalStep) -> Result<(), ApprovalChainError> {
        if let Some(previous) = self.steps.last() {
            if step.level <= previous.level {
                return Err(ApprovalChainError::LevelNotIncreasing {
                    level: step.level,
                    previous: previous.level,
                });
            }
        }

        if step.status.is_decided() {
            if let Some(rejected_level) = self.rejected_level() {
                return Err(ApprovalChainError::Closed { rejected_level });
            }
            if let Some(pending) = self.steps.iter().find(|step| !step.status.is_decided()) {
                return Err(ApprovalChainError::OutOfOrder {
                    level: step.level,
                    pending_level: pending.level,
                });
            }
        }

        self.steps.push(step);
        Ok(())
    }

    pub fn record_decision(
        &mut self,
        level: u32,
        decision: Decision,
        approver: impl Into<String>,
        comments: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<&ApprovalStep, ApprovalChainError> {
        if let Some(rejected_level) = self.rejected_level() {
            return Err(ApprovalChainError::Closed { rejected_level });
        }

        let index = self
            .steps
            .iter()
            .position(|step| step.level == level)
            .ok_or(ApprovalChainError::UnknownLevel(level))?;

        if self.steps[index].status.is_decided() {
            return Err(ApprovalChainError::AlreadyDecided(level));
        }

        if let Some(pending) = self.steps[..index].iter().find(|step| !step.status.is_decided()) {
            return Err(ApprovalChainError::OutOfOrder { level, pending_level: pending.level });
        }

        let step = &mut self.steps[index];
        step.status = decision.into();
        step.approver = Some(approver.into());
        step.comments = comments;
        step.action_date = Some(at);
        Ok(&self.steps[index])
    }

    fn rejected_level(&self) -> Option<u32> {
        self.steps.iter().find(|step| step.status == StepStatus::Rejected).map(|step| step.level)
    }
}

impl TryFrom<Vec<ApprovalStep>> for ApprovalChain {
    type Error = ApprovalChainError;

    fn try_from(steps: Vec<ApprovalStep>) -> Result<Self, Self::Error> {
        let mut chain = Self::new();
        for step in steps {
            chain.append(step)?;
        }
        Ok(chain)
    }
}

impl From<ApprovalChain> for Vec<ApprovalStep> {
    fn from(value: ApprovalChain) -> Self {
        value.steps
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{ApprovalChain, ApprovalChainError, ApprovalStep, Decision, StepStatus};

    fn two_level_chain() -> ApprovalChain {
        let mut chain = ApprovalChain::new();
        chain.append(ApprovalStep::pending(1, Some("supervisor".to_string()))).expect("level 1");
        chain.append(ApprovalStep::pending(2, Some("finance".to_string()))).expect("level 2");
        chain
    }

    #[test]
    fn fresh_chain_is_untouched() {
        let chain = two_level_chain();
        assert!(chain.is_untouched());
        assert!(!chain.has_any_action());
        assert_eq!(chain.current().map(|step| step.level), Some(1));
    }

    #[test]
    fn empty_chain_is_not_untouched() {
        assert!(!ApprovalChain::new().is_untouched());
    }

    #[test]
    fn decisions_advance_in_order() {
        let mut chain = two_level_chain();
        chain
            .record_decision(1, Decision::Approve, "sup-1", Some("ok".to_string()), Utc::now())
            .expect("level 1 decision");

        assert!(!chain.is_untouched());
        assert_eq!(chain.current().map(|step| step.level), Some(2));

        chain.record_decision(2, Decision::Approve, "fin-1", None, Utc::now()).expect("level 2");
        assert!(chain.is_complete());
        assert!(chain.current().is_none());
    }

    #[test]
    fn decided_step_never_reopens() {
        let mut chain = two_level_chain();
        chain.record_decision(1, Decision::Approve, "sup-1", None, Utc::now()).expect("decide");

        let error = chain
            .record_decision(1, Decision::Reject, "sup-2", None, Utc::now())
            .expect_err("second decision must fail");
        assert_eq!(error, ApprovalChainError::AlreadyDecided(1));
        assert_eq!(chain.steps()[0].status, StepStatus::Approved);
    }

    #[test]
    fn later_level_cannot_jump_the_queue() {
        let mut chain = two_level_chain();
        let error = chain
            .record_decision(2, Decision::Approve, "fin-1", None, Utc::now())
            .expect_err("level 2 before level 1");
        assert_eq!(error, ApprovalChainError::OutOfOrder { level: 2, pending_level: 1 });
    }

    #[test]
    fn rejection_closes_the_chain() {
        let mut chain = two_level_chain();
        chain.record_decision(1, Decision::Reject, "sup-1", None, Utc::now()).expect("reject");

        assert!(chain.current().is_none());
        let error = chain
            .record_decision(2, Decision::Approve, "fin-1", None, Utc::now())
            .expect_err("closed chain");
        assert_eq!(error, ApprovalChainError::Closed { rejected_level: 1 });
        let mut late = ApprovalStep::pending(3, None);
        late.status = StepStatus::Approved;
        let append_error = chain.append(late).expect_err("closed chain append");
        assert_eq!(append_error, ApprovalChainError::Closed { rejected_level: 1 });
        chain.append(ApprovalStep::pending(3, None)).expect("pending tail is still allowed");
    }

    #[test]
    fn levels_must_strictly_increase() {
        let mut chain = two_level_chain();
        let error = chain.append(ApprovalStep::pending(2, None)).expect_err("duplicate level");
        assert_eq!(error, ApprovalChainError::LevelNotIncreasing { level: 2, previous: 2 });
    }

    #[test]
    fn deserialization_rejects_decided_step_after_pending() {
        let raw = r#"[
            {"level": 1, "approver": "sup", "status": "pending"},
            {"level": 2, "approver": "fin", "status": "approved", "actionDate": "2026-01-05T10:00:00Z"}
        ]"#;

        let parsed = serde_json::from_str::<ApprovalChain>(raw);
        assert!(parsed.is_err());
    }

    #[test]
    fn deserialization_accepts_server_chain() {
        let raw = r#"[
            {"level": 1, "approver": "sup", "status": "approved", "comments": "fine",
             "actionDate": "2026-01-05T10:00:00Z"},
            {"level": 2, "approver": null, "status": "pending"}
        ]"#;

        let chain = serde_json::from_str::<ApprovalChain>(raw).expect("valid chain");
        assert_eq!(chain.steps().len(), 2);
        assert!(chain.has_any_action());
        assert_eq!(chain.steps()[0].comments.as_deref(), Some("fine"));
    }
}
