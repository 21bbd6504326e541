use std::future::Future;

use opsdesk_core::{FetchOutcome, ListQuery, ListView, Page};
use tracing::warn;

use crate::error::ClientError;

/// Runs one fetch for `view` and applies the result. A failed fetch keeps the
/// previous rows and records the server message for display.
pub async fn refresh<R, F, Fut>(view: &mut ListView<R>, fetch: F) -> Result<FetchOutcome, ClientError>
where
    F: FnOnce(ListQuery) -> Fut,
    Fut: Future<Output = Result<Page<R>, ClientError>>,
{
    let ticket = view.begin_fetch();
    match fetch(ticket.query.clone()).await {
        Ok(page) => Ok(view.apply(&ticket, page)),
        Err(error) => {
            warn!(event_name = "listing.fetch_failed", seq = ticket.seq, error = %error, "list fetch failed");
            view.fail(&ticket, error.server_message());
            Err(error)
        }
    }
}
