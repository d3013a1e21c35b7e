//! Query resolution for the `find_*` tools.
//!
//! Given a free-form input map, pick the retrieval strategy: a structured
//! filter query when any filterable field is present, a free-text search when
//! a `q` key is present, and a plain paginated listing otherwise.

use serde_json::{Map, Value};

use crate::filter::{build_filter, Filter};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Pagination parameters, defaulted when not supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u32,
    pub per_page: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// The retrieval strategy resolved from user input.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryStrategy {
    /// Structured filter retrieval.
    Filtered(Filter),
    /// Free-text search.
    Search(String),
    /// Plain paginated listing.
    List,
}

/// A resolved query: strategy plus pagination and embed passthrough.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub strategy: QueryStrategy,
    pub page: PageParams,
    pub embed: Option<String>,
}

fn page_value(user_input: &Map<String, Value>, key: &str, default: u32) -> u32 {
    user_input
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(default)
}

/// Resolve user input into a [`QueryPlan`]. Pure and total: empty input
/// resolves to a plain listing with default pagination.
pub fn resolve(user_input: &Map<String, Value>, filterable_fields: &[&str]) -> QueryPlan {
    let page = PageParams {
        page: page_value(user_input, "page", DEFAULT_PAGE),
        per_page: page_value(user_input, "per_page", DEFAULT_PER_PAGE),
    };
    let embed = user_input
        .get("embed")
        .and_then(Value::as_str)
        .map(str::to_owned);

    let strategy = if let Some(filter) = build_filter(user_input, filterable_fields) {
        QueryStrategy::Filtered(filter)
    } else if let Some(q) = user_input.get("q").and_then(Value::as_str) {
        QueryStrategy::Search(q.to_owned())
    } else {
        QueryStrategy::List
    };

    QueryPlan {
        strategy,
        page,
        embed,
    }
}
