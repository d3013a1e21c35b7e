//! Milestones API endpoints. Milestones are read-only reference data.

use crate::api::page_query;
use crate::client::CapsuleClient;
use crate::error::CapsuleResult;
use capsule_core::milestone::Milestone;
use capsule_core::query::PageParams;
use serde::Deserialize;

/// Milestones API.
pub struct MilestonesApi<'a> {
    client: &'a CapsuleClient,
}

impl<'a> MilestonesApi<'a> {
    pub(crate) fn new(client: &'a CapsuleClient) -> Self {
        Self { client }
    }

    /// List pipeline milestones with pagination.
    pub async fn list(&self, page: PageParams) -> CapsuleResult<Vec<Milestone>> {
        let envelope: MilestonesEnvelope = self
            .client
            .http
            .get_with_query("/milestones", &page_query(page))
            .await?;
        Ok(envelope.milestones)
    }
}

#[derive(Debug, Deserialize)]
struct MilestonesEnvelope {
    #[serde(default)]
    milestones: Vec<Milestone>,
}
