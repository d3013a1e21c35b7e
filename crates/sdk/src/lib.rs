//! # Capsule SDK
//!
//! Rust client for the Capsule CRM v2 REST API.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use capsule_sdk::{CapsuleClient, CapsuleResult};
//! use capsule_sdk::PageParams;
//!
//! #[tokio::main]
//! async fn main() -> CapsuleResult<()> {
//!     // Reads CAPSULECRM_ACCESS_TOKEN from the environment.
//!     let client = CapsuleClient::from_env()?;
//!
//!     // List pipeline milestones
//!     let milestones = client.milestones().list(PageParams::default()).await?;
//!     println!("Found {} milestones", milestones.len());
//!
//!     // Find open vip opportunities; current_value is computed per item.
//!     let input = serde_json::json!({"status": "open", "tag": "vip"});
//!     if let serde_json::Value::Object(input) = input {
//!         let opportunities = client.opportunities().find(&input).await?;
//!         for opportunity in opportunities {
//!             println!("{}: {:?}", opportunity.name, opportunity.current_value);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;

// Re-export main client
pub use client::{CapsuleClient, CapsuleClientBuilder};
pub use config::{ClientConfig, ACCESS_TOKEN_ENV, DEFAULT_BASE_URL};
pub use error::{CapsuleError, CapsuleResult};

// Re-export core types for convenience
pub use capsule_core::{
    filter::{Condition, Filter, OrderBy},
    milestone::{Milestone, Pipeline},
    opportunity::{
        derive, normalize_for_write, DerivedValue, DurationBasis, Opportunity, OpportunityDraft,
        OpportunityValue, RecordRef, ValueType,
    },
    party::{Address, EmailAddress, Organisation, Party, Person, PhoneNumber, Website},
    query::{PageParams, QueryPlan, QueryStrategy},
    task::{Category, NestedUser, Repeat, RepeatFrequency, Task, TaskStatus},
};
