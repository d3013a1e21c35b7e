//! Core domain types and logic for the Capsule CRM MCP adapter.
//!
//! Everything in this crate is pure: entity schemas, the filter-condition
//! builder, query resolution and opportunity value normalization. All I/O
//! lives in `capsule-sdk`.

pub mod error;
pub mod filter;
pub mod milestone;
pub mod opportunity;
pub mod party;
pub mod query;
pub mod task;

pub use error::{CoreError, CoreResult};
