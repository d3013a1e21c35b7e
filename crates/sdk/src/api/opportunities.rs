//! Opportunities API endpoints.
//!
//! Every decoded opportunity gets its derived `total_value`/`current_value`
//! attached before it is returned; create and update send the normalized
//! wire payload (per-unit amount, no `value_type`).

use crate::api::{filter_query, page_query, search_query};
use crate::client::CapsuleClient;
use crate::error::CapsuleResult;
use capsule_core::filter::{Filter, OPPORTUNITY_FILTER_FIELDS};
use capsule_core::opportunity::{Opportunity, OpportunityDraft};
use capsule_core::query::{resolve, PageParams, QueryStrategy};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Opportunities API for sales opportunities.
pub struct OpportunitiesApi<'a> {
    client: &'a CapsuleClient,
}

impl<'a> OpportunitiesApi<'a> {
    pub(crate) fn new(client: &'a CapsuleClient) -> Self {
        Self { client }
    }

    /// List opportunities with pagination.
    pub async fn list(&self, page: PageParams) -> CapsuleResult<Vec<Opportunity>> {
        let envelope: OpportunitiesEnvelope = self
            .client
            .http
            .get_with_query("/opportunities", &page_query(page))
            .await?;
        Ok(with_derived(envelope.opportunities))
    }

    /// Search opportunities by name, description or associated party details.
    pub async fn search(
        &self,
        q: &str,
        page: PageParams,
        embed: Option<&str>,
    ) -> CapsuleResult<Vec<Opportunity>> {
        let envelope: OpportunitiesEnvelope = self
            .client
            .http
            .get_with_query("/opportunities/search", &search_query(q, page, embed))
            .await?;
        Ok(with_derived(envelope.opportunities))
    }

    /// Get a specific opportunity by id.
    pub async fn get(&self, opportunity_id: u64) -> CapsuleResult<Opportunity> {
        let envelope: OpportunityEnvelope = self
            .client
            .http
            .get(&format!("/opportunities/{opportunity_id}"))
            .await?;
        Ok(envelope.opportunity.with_derived())
    }

    /// Create a new opportunity.
    pub async fn create(&self, draft: &OpportunityDraft) -> CapsuleResult<Opportunity> {
        let envelope: OpportunityEnvelope = self
            .client
            .http
            .post("/opportunities", &json!({ "opportunity": draft.to_wire()? }))
            .await?;
        Ok(envelope.opportunity.with_derived())
    }

    /// Update an existing opportunity by id.
    pub async fn update(
        &self,
        opportunity_id: u64,
        draft: &OpportunityDraft,
    ) -> CapsuleResult<Opportunity> {
        let envelope: OpportunityEnvelope = self
            .client
            .http
            .put(
                &format!("/opportunities/{opportunity_id}"),
                &json!({ "opportunity": draft.to_wire()? }),
            )
            .await?;
        Ok(envelope.opportunity.with_derived())
    }

    /// Retrieve opportunities matching a structured filter.
    pub async fn filter(
        &self,
        filter: &Filter,
        page: PageParams,
        embed: Option<&str>,
    ) -> CapsuleResult<Vec<Opportunity>> {
        let envelope: OpportunitiesEnvelope = self
            .client
            .http
            .post_with_query(
                "/opportunities/filters/results",
                &filter_query(page, embed),
                &json!({ "filter": filter }),
            )
            .await?;
        Ok(with_derived(envelope.opportunities))
    }

    /// Find opportunities with structured filters or free-text search; falls
    /// back to a plain listing when the input carries neither.
    pub async fn find(&self, user_input: &Map<String, Value>) -> CapsuleResult<Vec<Opportunity>> {
        let plan = resolve(user_input, OPPORTUNITY_FILTER_FIELDS);
        match plan.strategy {
            QueryStrategy::Filtered(filter) => {
                self.filter(&filter, plan.page, plan.embed.as_deref()).await
            }
            QueryStrategy::Search(q) => self.search(&q, plan.page, plan.embed.as_deref()).await,
            QueryStrategy::List => self.list(plan.page).await,
        }
    }
}

fn with_derived(opportunities: Vec<Opportunity>) -> Vec<Opportunity> {
    opportunities
        .into_iter()
        .map(Opportunity::with_derived)
        .collect()
}

#[derive(Debug, Deserialize)]
struct OpportunitiesEnvelope {
    #[serde(default)]
    opportunities: Vec<Opportunity>,
}

#[derive(Debug, Deserialize)]
struct OpportunityEnvelope {
    opportunity: Opportunity,
}

#[cfg(test)]
mod tests {
    use super::*;
    use capsule_core::opportunity::{DurationBasis, OpportunityValue, RecordRef, ValueType};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> CapsuleClient {
        CapsuleClient::builder()
            .base_url(server.uri())
            .access_token("test-token")
            .build()
            .unwrap()
    }

    fn input(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[tokio::test]
    async fn find_with_two_fields_posts_both_conditions_and_derives_values() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/opportunities/filters/results"))
            .and(query_param("page", "1"))
            .and(query_param("perPage", "50"))
            .and(body_json(json!({
                "filter": {
                    "conditions": [
                        {"field": "status", "operator": "is", "value": "open"},
                        {"field": "tag", "operator": "is", "value": "vip"},
                    ]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "opportunities": [{
                    "id": 7,
                    "name": "Renewal",
                    "value": {"amount": 20.0, "currency": "EUR"},
                    "durationBasis": "MONTH",
                    "duration": 6,
                    "probability": 50,
                }]
            })))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let opportunities = client
            .opportunities()
            .find(&input(json!({"status": "open", "tag": "vip"})))
            .await
            .unwrap();

        assert_eq!(opportunities.len(), 1);
        assert_eq!(opportunities[0].total_value, Some(120.0));
        assert_eq!(opportunities[0].current_value, Some(60.0));
    }

    #[tokio::test]
    async fn find_without_input_lists_with_defaults() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/opportunities"))
            .and(query_param("page", "1"))
            .and(query_param("perPage", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "opportunities": []
            })))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let opportunities = client.opportunities().find(&Map::new()).await.unwrap();
        assert!(opportunities.is_empty());
    }

    #[tokio::test]
    async fn create_sends_normalized_wire_payload() {
        let server = MockServer::start().await;

        // A total of 120 over 6 months goes to the API as 20 per month, and
        // value_type never reaches the wire.
        Mock::given(method("POST"))
            .and(path("/opportunities"))
            .and(body_json(json!({
                "opportunity": {
                    "name": "Renewal",
                    "party": {"id": 11},
                    "milestone": {"id": 5},
                    "value": {"amount": 20.0, "currency": "EUR"},
                    "durationBasis": "MONTH",
                    "duration": 6,
                    "probability": 50,
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "opportunity": {
                    "id": 99,
                    "name": "Renewal",
                    "value": {"amount": 20.0, "currency": "EUR"},
                    "durationBasis": "MONTH",
                    "duration": 6,
                    "probability": 50,
                }
            })))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let draft = OpportunityDraft {
            name: "Renewal".to_string(),
            party: RecordRef { id: 11 },
            milestone: RecordRef { id: 5 },
            value: OpportunityValue {
                amount: 120.0,
                currency: "EUR".to_string(),
            },
            value_type: ValueType::Total,
            description: None,
            expected_close_on: None,
            probability: Some(50),
            duration_basis: Some(DurationBasis::Month),
            duration: Some(6),
        };
        let created = client.opportunities().create(&draft).await.unwrap();

        assert_eq!(created.id, 99);
        assert_eq!(created.current_value, Some(60.0));
    }

    #[tokio::test]
    async fn search_forwards_embed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/opportunities/search"))
            .and(query_param("q", "renewal"))
            .and(query_param("embed", "tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "opportunities": []
            })))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let opportunities = client
            .opportunities()
            .find(&input(json!({"q": "renewal", "embed": "tags"})))
            .await
            .unwrap();
        assert!(opportunities.is_empty());
    }
}
