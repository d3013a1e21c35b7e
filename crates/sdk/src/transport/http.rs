//! HTTP transport layer for the Capsule SDK.

use crate::config::ClientConfig;
use crate::error::{CapsuleError, CapsuleResult};
use reqwest::{header, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::debug;

/// HTTP transport for making authenticated API requests.
///
/// Performs exactly one outbound call per request; failures are classified
/// into the error taxonomy and never retried here.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>) -> CapsuleResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", config.access_token))
                .map_err(|_| CapsuleError::Config("invalid access token format".to_string()))?,
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .user_agent(concat!("capsule-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    /// The base URL carries the `/api/v2` prefix, so paths are concatenated
    /// onto it (`Url::join` would resolve an absolute path against the host
    /// root and drop the prefix).
    fn build_url(&self, path: &str) -> String {
        format!(
            "{}{}",
            self.config.base_url.as_str().trim_end_matches('/'),
            path
        )
    }

    async fn execute(&self, request: RequestBuilder) -> CapsuleResult<Response> {
        let response = request.send().await.map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CapsuleError::from_response(status.as_u16(), &body));
        }
        Ok(response)
    }

    /// Execute a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> CapsuleResult<T> {
        let url = self.build_url(path);
        debug!(url = %url, "GET request");

        let response = self.execute(self.client.get(url)).await?;
        Ok(response.json().await?)
    }

    /// Execute a GET request with query parameters.
    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize>(
        &self,
        path: &str,
        query: &Q,
    ) -> CapsuleResult<T> {
        let url = self.build_url(path);
        debug!(url = %url, "GET request with query");

        let response = self.execute(self.client.get(url).query(query)).await?;
        Ok(response.json().await?)
    }

    /// Execute a POST request with a JSON body.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> CapsuleResult<T> {
        let url = self.build_url(path);
        debug!(url = %url, "POST request");

        let response = self.execute(self.client.post(url).json(body)).await?;
        Ok(response.json().await?)
    }

    /// Execute a POST request with query parameters and a JSON body.
    pub async fn post_with_query<T: DeserializeOwned, Q: Serialize, B: Serialize>(
        &self,
        path: &str,
        query: &Q,
        body: &B,
    ) -> CapsuleResult<T> {
        let url = self.build_url(path);
        debug!(url = %url, "POST request with query");

        let response = self
            .execute(self.client.post(url).query(query).json(body))
            .await?;
        Ok(response.json().await?)
    }

    /// Execute a PUT request with a JSON body.
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> CapsuleResult<T> {
        let url = self.build_url(path);
        debug!(url = %url, "PUT request");

        let response = self.execute(self.client.put(url).json(body)).await?;
        Ok(response.json().await?)
    }
}

fn classify(err: reqwest::Error) -> CapsuleError {
    if err.is_timeout() {
        CapsuleError::Timeout
    } else if err.is_connect() {
        CapsuleError::Connect(err.to_string())
    } else {
        CapsuleError::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestResponse {
        message: String,
        value: i32,
    }

    #[derive(Debug, Serialize)]
    struct TestRequest {
        name: String,
    }

    fn create_config(base_url: &str) -> Arc<ClientConfig> {
        Arc::new(ClientConfig {
            base_url: Url::parse(base_url).unwrap(),
            access_token: "test-token".to_string(),
            timeout: Duration::from_secs(5),
        })
    }

    #[tokio::test]
    async fn get_request_decodes_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/parties"))
            .respond_with(ResponseTemplate::new(200).set_body_json(TestResponse {
                message: "success".to_string(),
                value: 42,
            }))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri())).unwrap();

        let result: TestResponse = transport.get("/parties").await.unwrap();
        assert_eq!(result.message, "success");
        assert_eq!(result.value, 42);
    }

    #[tokio::test]
    async fn bearer_header_is_sent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/parties"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(TestResponse {
                message: "authorized".to_string(),
                value: 1,
            }))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri())).unwrap();

        let result: TestResponse = transport.get("/parties").await.unwrap();
        assert_eq!(result.message, "authorized");
    }

    #[tokio::test]
    async fn query_parameters_are_forwarded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tasks"))
            .and(query_param("page", "2"))
            .and(query_param("perPage", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(TestResponse {
                message: "paged".to_string(),
                value: 2,
            }))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri())).unwrap();

        let query = [("page", "2".to_string()), ("perPage", "25".to_string())];
        let result: TestResponse = transport.get_with_query("/tasks", &query).await.unwrap();
        assert_eq!(result.value, 2);
    }

    #[tokio::test]
    async fn post_sends_json_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/parties"))
            .and(body_json(serde_json::json!({"name": "Acme"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(TestResponse {
                message: "created".to_string(),
                value: 1,
            }))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri())).unwrap();

        let request = TestRequest {
            name: "Acme".to_string(),
        };
        let result: TestResponse = transport.post("/parties", &request).await.unwrap();
        assert_eq!(result.message, "created");
    }

    #[tokio::test]
    async fn error_message_is_extracted_from_json() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/opportunities/1"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"message": "no such opportunity"})),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri())).unwrap();

        let result: CapsuleResult<TestResponse> = transport.get("/opportunities/1").await;
        match result {
            Err(CapsuleError::Api { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "no such opportunity");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_keeps_raw_body_when_not_json() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/parties"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri())).unwrap();

        let result: CapsuleResult<TestResponse> = transport.get("/parties").await;
        match result {
            Err(CapsuleError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_response_fails_fast_with_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/parties"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(TestResponse {
                        message: "late".to_string(),
                        value: 0,
                    })
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let config = Arc::new(ClientConfig {
            base_url: Url::parse(&server.uri()).unwrap(),
            access_token: "test-token".to_string(),
            timeout: Duration::from_millis(200),
        });
        let transport = HttpTransport::new(config).unwrap();

        let result: CapsuleResult<TestResponse> = transport.get("/parties").await;
        assert!(matches!(result, Err(CapsuleError::Timeout)));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_connect_error() {
        // Nothing listens on this port.
        let transport = HttpTransport::new(create_config("http://127.0.0.1:9")).unwrap();

        let result: CapsuleResult<TestResponse> = transport.get("/parties").await;
        assert!(matches!(result, Err(CapsuleError::Connect(_))));
    }

    #[tokio::test]
    async fn url_is_concatenated_onto_versioned_base() {
        let config = create_config("http://localhost:8080/api/v2");
        let transport = HttpTransport::new(config).unwrap();

        assert_eq!(
            transport.build_url("/parties/1"),
            "http://localhost:8080/api/v2/parties/1"
        );
    }
}
