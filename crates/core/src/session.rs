use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::request::{RecordFacts, Request};
use crate::domain::status::{AnyStatus, WorkflowStatus};
use crate::policy::{ActionAffordance, ActionPolicy, Role};

/// The signed-in user as returned by `GET /users/me`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub department: Option<String>,
}

/// Explicit user context handed to everything that needs to know who is
/// acting. Nothing reads the current user from global state.
#[derive(Clone, Debug)]
pub struct Session {
    user: AuthenticatedUser,
    token: Option<SecretString>,
}

impl Session {
    pub fn new(user: AuthenticatedUser, token: Option<SecretString>) -> Self {
        Self { user, token }
    }

    /// Session for a user known only by the configured id and role. Without
    /// an id the user owns nothing, so owner-only actions stay disabled.
    pub fn configured(user_id: Option<String>, role: Role, token: Option<SecretString>) -> Self {
        let user = AuthenticatedUser {
            id: user_id.unwrap_or_default(),
            name: String::new(),
            email: String::new(),
            role,
            department: None,
        };
        Self::new(user, token)
    }

    pub fn user(&self) -> &AuthenticatedUser {
        &self.user
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref().filter(|token| !token.expose_secret().trim().is_empty())
    }

    pub fn facts_for<S>(&self, record: &Request<S>) -> RecordFacts
    where
        S: WorkflowStatus + Into<AnyStatus>,
    {
        record.facts_for(&self.user.id)
    }

    /// Row actions this user sees for `record`.
    pub fn actions_for<S>(&self, record: &Request<S>) -> Vec<ActionAffordance>
    where
        S: WorkflowStatus + Into<AnyStatus>,
    {
        ActionPolicy::evaluate(self.role(), &self.facts_for(record))
    }
}
