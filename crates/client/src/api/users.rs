use opsdesk_core::{AuthenticatedUser, ListQuery, Page};

use crate::api::owned_pairs;
use crate::client::ApiClient;
use crate::error::ClientError;
use crate::transport::Transport;

pub struct UsersApi<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> UsersApi<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    /// The user behind the bearer token.
    pub async fn me(&self) -> Result<AuthenticatedUser, ClientError> {
        Ok(self.client.get::<AuthenticatedUser>("/users/me", Vec::new()).await?.data)
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Page<AuthenticatedUser>, ClientError> {
        self.client.list("/users", owned_pairs(query)).await
    }
}
