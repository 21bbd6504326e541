//! Filter, pagination and fetch bookkeeping for request lists.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::status::Priority;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilters {
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<Priority>,
    #[serde(default)]
    pub date_range: DateRange,
}

impl ListFilters {
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.date_range.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

/// Server pagination block. Backends disagree on naming, so the common
/// spellings are all accepted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(alias = "page", alias = "current_page", default = "first_page")]
    pub current_page: u32,
    #[serde(alias = "pages", alias = "total_pages", default)]
    pub total_pages: u32,
    #[serde(alias = "total", alias = "totalItems", alias = "total_items", alias = "count", default)]
    pub total_count: u64,
    #[serde(alias = "limit", alias = "page_size", alias = "pageSize", default)]
    pub per_page: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page<R> {
    pub rows: Vec<R>,
    pub pagination: Option<Pagination>,
}

/// Parameters of one list fetch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    pub filters: ListFilters,
    pub page: PageRequest,
}

impl ListQuery {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.page.to_string()),
            ("limit", self.page.page_size.to_string()),
        ];
        if let Some(search) = &self.filters.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(status) = &self.filters.status {
            pairs.push(("status", status.clone()));
        }
        if let Some(priority) = self.filters.priority {
            pairs.push(("priority", priority.as_str().to_string()));
        }
        if let Some(from) = self.filters.date_range.from {
            pairs.push(("startDate", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.filters.date_range.to {
            pairs.push(("endDate", to.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

/// Handed out by [`ListView::begin_fetch`]; the result must be applied with
/// the same ticket so out-of-order responses can be recognised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub query: ListQuery,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer fetch was issued after this one; the response was dropped.
    Stale,
}

#[derive(Clone, Debug)]
pub struct ListView<R> {
    filters: ListFilters,
    page: PageRequest,
    rows: Vec<R>,
    pagination: Option<Pagination>,
    issued_seq: u64,
    needs_fetch: bool,
    loading: bool,
    last_error: Option<String>,
}

impl<R> ListView<R> {
    pub fn new(page_size: u32) -> Self {
        Self {
            filters: ListFilters::default(),
            page: PageRequest { page: 1, page_size: page_size.max(1) },
            rows: Vec::new(),
            pagination: None,
            issued_seq: 0,
            needs_fetch: true,
            loading: false,
            last_error: None,
        }
    }

    pub fn filters(&self) -> &ListFilters {
        &self.filters
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub fn needs_fetch(&self) -> bool {
        self.needs_fetch
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_search(&mut self, search: Option<String>) -> bool {
        let search = search.map(|value| value.trim().to_string()).filter(|value| !value.is_empty());
        self.update_filters(|filters| filters.search = search)
    }

    pub fn set_status(&mut self, status: Option<String>) -> bool {
        self.update_filters(|filters| filters.status = status)
    }

    pub fn set_priority(&mut self, priority: Option<Priority>) -> bool {
        self.update_filters(|filters| filters.priority = priority)
    }

    pub fn set_date_range(&mut self, date_range: DateRange) -> bool {
        self.update_filters(|filters| filters.date_range = date_range)
    }

    pub fn clear_filters(&mut self) -> bool {
        self.update_filters(|filters| *filters = ListFilters::default())
    }

    /// Any filter change returns to page 1. Unchanged filters are a no-op.
    fn update_filters(&mut self, change: impl FnOnce(&mut ListFilters)) -> bool {
        let mut filters = self.filters.clone();
        change(&mut filters);
        if filters == self.filters {
            return false;
        }

        self.filters = filters;
        self.page.page = 1;
        self.needs_fetch = true;
        true
    }

    /// Moves to `page`, keeping filters. Pages past the known last page are
    /// clamped to it.
    pub fn set_page(&mut self, page: u32) -> bool {
        let mut page = page.max(1);
        if let Some(total) = self.pagination.map(|pagination| pagination.total_pages) {
            if total > 0 {
                page = page.min(total);
            }
        }
        if page == self.page.page {
            return false;
        }

        self.page.page = page;
        self.needs_fetch = true;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.page.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> bool {
        self.set_page(self.page.page.saturating_sub(1))
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued_seq += 1;
        self.needs_fetch = false;
        self.loading = true;
        FetchTicket {
            seq: self.issued_seq,
            query: ListQuery { filters: self.filters.clone(), page: self.page },
        }
    }

    pub fn apply(&mut self, ticket: &FetchTicket, page: Page<R>) -> FetchOutcome {
        if ticket.seq < self.issued_seq {
            debug!(
                event_name = "listing.stale_response_dropped",
                seq = ticket.seq,
                latest = self.issued_seq,
                "dropping out-of-order list response"
            );
            return FetchOutcome::Stale;
        }

        self.rows = page.rows;
        self.pagination = page.pagination;
        self.loading = false;
        self.last_error = None;
        FetchOutcome::Applied
    }

    /// The fetch failed: rows from the previous successful fetch are kept.
    pub fn fail(&mut self, ticket: &FetchTicket, message: impl Into<String>) -> FetchOutcome {
        if ticket.seq < self.issued_seq {
            return FetchOutcome::Stale;
        }

        self.loading = false;
        self.last_error = Some(message.into());
        FetchOutcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{DateRange, FetchOutcome, ListView, Page, Pagination};
    use crate::domain::status::Priority;

    fn page(rows: &[&str], current_page: u32, total_pages: u32) -> Page<String> {
        Page {
            rows: rows.iter().map(|row| row.to_string()).collect(),
            pagination: Some(Pagination {
                current_page,
                total_pages,
                total_count: u64::from(total_pages) * 10,
                per_page: 10,
            }),
        }
    }

    #[test]
    fn filter_change_resets_to_first_page() {
        let mut view = ListView::<String>::new(10);
        let ticket = view.begin_fetch();
        view.apply(&ticket, page(&["a"], 1, 5));
        view.set_page(3);
        assert_eq!(view.page().page, 3);

        assert!(view.set_priority(Some(Priority::High)));
        assert_eq!(view.page().page, 1);
        assert!(view.needs_fetch());
    }

    #[test]
    fn unchanged_filter_is_a_no_op() {
        let mut view = ListView::<String>::new(10);
        view.set_search(Some("printer".to_string()));
        view.begin_fetch();
        assert!(!view.set_search(Some("  printer ".to_string())));
        assert!(!view.needs_fetch());
    }

    #[test]
    fn page_change_keeps_filters() {
        let mut view = ListView::<String>::new(10);
        view.set_status(Some("pending_it_review".to_string()));
        let ticket = view.begin_fetch();
        view.apply(&ticket, page(&["a"], 1, 4));

        assert!(view.next_page());
        assert_eq!(view.page().page, 2);
        assert_eq!(view.filters().status.as_deref(), Some("pending_it_review"));

        assert!(view.set_page(9));
        assert_eq!(view.page().page, 4);
    }

    #[test]
    fn stale_response_is_dropped() {
        let mut view = ListView::<String>::new(10);
        let slow = view.begin_fetch();
        view.set_search(Some("vpn".to_string()));
        let fast = view.begin_fetch();

        assert_eq!(view.apply(&fast, page(&["vpn ticket"], 1, 1)), FetchOutcome::Applied);
        assert_eq!(view.apply(&slow, page(&["old"], 1, 1)), FetchOutcome::Stale);
        assert_eq!(view.rows(), ["vpn ticket".to_string()]);
    }

    #[test]
    fn failure_keeps_previous_rows() {
        let mut view = ListView::<String>::new(10);
        let first = view.begin_fetch();
        view.apply(&first, page(&["a", "b"], 1, 1));
        let second = view.begin_fetch();
        view.fail(&second, "Server unavailable");

        assert_eq!(view.rows().len(), 2);
        assert_eq!(view.last_error(), Some("Server unavailable"));
        assert!(!view.is_loading());
    }

    #[test]
    fn query_pairs_include_active_filters() {
        let mut view = ListView::<String>::new(25);
        view.set_search(Some("laptop".to_string()));
        view.set_date_range(DateRange {
            from: NaiveDate::from_ymd_opt(2026, 1, 1),
            to: NaiveDate::from_ymd_opt(2026, 1, 31),
        });
        let pairs = view.begin_fetch().query.to_query_pairs();

        assert_eq!(
            pairs,
            vec![
                ("page", "1".to_string()),
                ("limit", "25".to_string()),
                ("search", "laptop".to_string()),
                ("startDate", "2026-01-01".to_string()),
                ("endDate", "2026-01-31".to_string()),
            ]
        );
    }

    #[test]
    fn pagination_accepts_common_spellings() {
        let camel: Pagination = serde_json::from_value(serde_json::json!({
            "currentPage": 2, "totalPages": 7, "totalItems": 64, "limit": 10
        }))
        .expect("camel case");
        let short: Pagination = serde_json::from_value(serde_json::json!({
            "page": 2, "pages": 7, "total": 64, "limit": 10
        }))
        .expect("short names");

        assert_eq!(camel, short);
        assert_eq!(camel.total_count, 64);
    }
}
