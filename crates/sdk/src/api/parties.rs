//! Parties API endpoints.

use crate::api::{filter_query, page_query, search_query};
use crate::client::CapsuleClient;
use crate::error::{CapsuleError, CapsuleResult};
use capsule_core::filter::{Filter, PARTY_FILTER_FIELDS};
use capsule_core::party::Party;
use capsule_core::query::{resolve, PageParams, QueryStrategy};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Parties API for people and organisations.
pub struct PartiesApi<'a> {
    client: &'a CapsuleClient,
}

impl<'a> PartiesApi<'a> {
    pub(crate) fn new(client: &'a CapsuleClient) -> Self {
        Self { client }
    }

    /// List parties with pagination.
    pub async fn list(&self, page: PageParams) -> CapsuleResult<Vec<Party>> {
        let envelope: PartiesEnvelope = self
            .client
            .http
            .get_with_query("/parties", &page_query(page))
            .await?;
        decode_parties(envelope.parties)
    }

    /// Search parties by name, address, phone number or email address.
    pub async fn search(
        &self,
        q: &str,
        page: PageParams,
        embed: Option<&str>,
    ) -> CapsuleResult<Vec<Party>> {
        let envelope: PartiesEnvelope = self
            .client
            .http
            .get_with_query("/parties/search", &search_query(q, page, embed))
            .await?;
        decode_parties(envelope.parties)
    }

    /// Get a specific party by id.
    pub async fn get(&self, party_id: u64) -> CapsuleResult<Party> {
        let envelope: PartyEnvelope = self
            .client
            .http
            .get(&format!("/parties/{party_id}"))
            .await?;
        Ok(Party::from_value(envelope.party)?)
    }

    /// Create a new party.
    pub async fn create(&self, party: &Party) -> CapsuleResult<Party> {
        let envelope: PartyEnvelope = self
            .client
            .http
            .post("/parties", &json!({ "party": party }))
            .await?;
        Ok(Party::from_value(envelope.party)?)
    }

    /// Update an existing party by id.
    pub async fn update(&self, party_id: u64, party: &Party) -> CapsuleResult<Party> {
        let envelope: PartyEnvelope = self
            .client
            .http
            .put(&format!("/parties/{party_id}"), &json!({ "party": party }))
            .await?;
        Ok(Party::from_value(envelope.party)?)
    }

    /// Retrieve parties matching a structured filter.
    pub async fn filter(
        &self,
        filter: &Filter,
        page: PageParams,
        embed: Option<&str>,
    ) -> CapsuleResult<Vec<Party>> {
        let envelope: PartiesEnvelope = self
            .client
            .http
            .post_with_query(
                "/parties/filters/results",
                &filter_query(page, embed),
                &json!({ "filter": filter }),
            )
            .await?;
        decode_parties(envelope.parties)
    }

    /// Find parties with structured filters or free-text search; falls back
    /// to a plain listing when the input carries neither.
    pub async fn find(&self, user_input: &Map<String, Value>) -> CapsuleResult<Vec<Party>> {
        let plan = resolve(user_input, PARTY_FILTER_FIELDS);
        match plan.strategy {
            QueryStrategy::Filtered(filter) => {
                self.filter(&filter, plan.page, plan.embed.as_deref()).await
            }
            QueryStrategy::Search(q) => self.search(&q, plan.page, plan.embed.as_deref()).await,
            QueryStrategy::List => self.list(plan.page).await,
        }
    }
}

fn decode_parties(parties: Vec<Value>) -> CapsuleResult<Vec<Party>> {
    parties
        .into_iter()
        .map(|party| Party::from_value(party).map_err(CapsuleError::from))
        .collect()
}

#[derive(Debug, Deserialize)]
struct PartiesEnvelope {
    #[serde(default)]
    parties: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct PartyEnvelope {
    party: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CapsuleError;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> CapsuleClient {
        CapsuleClient::builder()
            .base_url(server.uri())
            .access_token("test-token")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn list_decodes_mixed_party_types() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/parties"))
            .and(query_param("page", "1"))
            .and(query_param("perPage", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "parties": [
                    {"id": 1, "type": "person", "firstName": "Ada"},
                    {"id": 2, "type": "organisation", "name": "Acme Ltd"},
                ]
            })))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let parties = client.parties().list(PageParams::default()).await.unwrap();

        assert_eq!(parties.len(), 2);
        assert!(matches!(parties[0], Party::Person(_)));
        assert!(matches!(parties[1], Party::Organisation(_)));
    }

    #[tokio::test]
    async fn unknown_party_type_is_a_typed_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/parties/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "party": {"id": 7, "type": "robot"}
            })))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let err = client.parties().get(7).await.unwrap_err();

        match err {
            CapsuleError::UnknownPartyType(kind) => assert_eq!(kind, "robot"),
            other => panic!("expected UnknownPartyType, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn find_with_filterable_field_posts_filter() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/parties/filters/results"))
            .and(query_param("page", "1"))
            .and(query_param("perPage", "50"))
            .and(body_json(json!({
                "filter": {
                    "conditions": [
                        {"field": "tag", "operator": "is", "value": "vip"},
                    ]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "parties": [{"id": 1, "type": "person", "firstName": "Ada"}]
            })))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let input = match json!({"tag": "vip"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let parties = client.parties().find(&input).await.unwrap();
        assert_eq!(parties.len(), 1);
    }

    #[tokio::test]
    async fn find_with_free_text_hits_search() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/parties/search"))
            .and(query_param("q", "acme"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "parties": [{"id": 2, "type": "organisation", "name": "Acme Ltd"}]
            })))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let input = match json!({"q": "acme"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let parties = client.parties().find(&input).await.unwrap();
        assert_eq!(parties.len(), 1);
    }

    #[tokio::test]
    async fn create_wraps_party_in_envelope() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/parties"))
            .and(body_json(json!({
                "party": {"type": "organisation", "name": "Acme Ltd"}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "party": {"id": 9, "type": "organisation", "name": "Acme Ltd"}
            })))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let party = Party::from_value(json!({"type": "organisation", "name": "Acme Ltd"})).unwrap();
        let created = client.parties().create(&party).await.unwrap();
        assert_eq!(created.id(), Some(9));
    }
}
