//! Per-entity endpoint modules for the Capsule API.

pub mod milestones;
pub mod opportunities;
pub mod parties;
pub mod tasks;

pub use milestones::MilestonesApi;
pub use opportunities::OpportunitiesApi;
pub use parties::PartiesApi;
pub use tasks::TasksApi;

use capsule_core::query::PageParams;

/// Pagination query parameters in the wire naming (`page`, `perPage`).
fn page_query(page: PageParams) -> Vec<(&'static str, String)> {
    vec![
        ("page", page.page.to_string()),
        ("perPage", page.per_page.to_string()),
    ]
}

/// Pagination plus free-text/embed parameters for the search endpoints.
fn search_query(q: &str, page: PageParams, embed: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = vec![("q", q.to_string())];
    query.extend(page_query(page));
    if let Some(embed) = embed {
        query.push(("embed", embed.to_string()));
    }
    query
}

/// Pagination plus embed parameters for the filter endpoints.
fn filter_query(page: PageParams, embed: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = page_query(page);
    if let Some(embed) = embed {
        query.push(("embed", embed.to_string()));
    }
    query
}
