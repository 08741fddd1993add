use super::models::WorkflowRequest;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

/// Dify hosted workflow endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.dify.ai/v1/workflows/run";

#[derive(Debug, Error)]
pub enum DifyError {
    #[error("No Dify API key configured. Run 'codedock --setup' or set DIFY_API_KEY.")]
    MissingApiKey,
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("response was not JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl DifyError {
    /// Short message for a toast
    pub fn user_message(&self) -> String {
        match self {
            DifyError::MissingApiKey => "No API key. Run 'codedock --setup'.".to_string(),
            DifyError::Http { status: 401, .. } => {
                "Workflow request failed: invalid API key (401)".to_string()
            }
            DifyError::Http { status, .. } => format!("Workflow request failed: HTTP {}", status),
            DifyError::Transport(_) => "Workflow request failed: network error".to_string(),
            DifyError::Decode(_) => "Workflow request failed: response was not JSON".to_string(),
        }
    }
}

/// Runs a workflow and hands back the raw JSON response
#[async_trait]
pub trait WorkflowRunner: Send + Sync {
    async fn run(&self, request: &WorkflowRequest) -> Result<serde_json::Value, DifyError>;
}

/// HTTP runner for the Dify workflow API
#[derive(Clone)]
pub struct DifyClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl DifyClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl WorkflowRunner for DifyClient {
    async fn run(&self, request: &WorkflowRequest) -> Result<serde_json::Value, DifyError> {
        let api_key = self.api_key.as_deref().ok_or(DifyError::MissingApiKey)?;

        debug!(endpoint = %self.endpoint, task = %request.inputs.task_type, "running workflow");
        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "workflow request rejected");
            return Err(DifyError::Http {
                status: status.as_u16(),
                body: truncate_str(&text, 200).to_string(),
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

/// Truncate a string for display (Unicode-safe)
fn truncate_str(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dify::models::TaskType;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn request() -> WorkflowRequest {
        WorkflowRequest::single_file(
            "main.rs",
            "fn main() {}",
            TaskType::AddComments,
            "",
            "tui-test".into(),
        )
        .unwrap()
    }

    /// Mounts a workflow endpoint that only answers a correctly signed request.
    async fn workflow_server(response: ResponseTemplate) -> (MockServer, DifyClient) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/workflows/run"))
            .and(header("Authorization", "Bearer app-test"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(serde_json::to_value(request()).unwrap()))
            .respond_with(response)
            .expect(1)
            .mount(&server)
            .await;
        let client = DifyClient::new(
            format!("{}/v1/workflows/run", server.uri()),
            Some("app-test".into()),
        );
        (server, client)
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let client = DifyClient::new("http://127.0.0.1:9/unused", None);
        let request =
            WorkflowRequest::single_file("a.rs", "", TaskType::FixErrors, "", "u".into()).unwrap();
        let err = client.run(&request).await.unwrap_err();
        assert!(matches!(err, DifyError::MissingApiKey));
    }

    #[test]
    fn test_user_messages() {
        let unauthorized = DifyError::Http {
            status: 401,
            body: String::new(),
        };
        assert!(unauthorized.user_message().contains("invalid API key"));
        let server = DifyError::Http {
            status: 503,
            body: String::new(),
        };
        assert!(server.user_message().contains("503"));
    }

    #[test]
    fn test_truncate_str_unicode() {
        assert_eq!(truncate_str("ééé", 2), "éé");
        assert_eq!(truncate_str("ab", 5), "ab");
    }

    #[tokio::test]
    async fn test_run_returns_the_json_body() {
        let body = json!({ "data": { "status": "succeeded", "outputs": { "summary": "ok" } } });
        let (_server, client) =
            workflow_server(ResponseTemplate::new(200).set_body_json(body.clone())).await;

        assert_eq!(client.run(&request()).await.unwrap(), body);
    }

    #[tokio::test]
    async fn test_run_reports_unauthorized_with_truncated_body() {
        let (_server, client) =
            workflow_server(ResponseTemplate::new(401).set_body_string("x".repeat(300))).await;

        match client.run(&request()).await.unwrap_err() {
            DifyError::Http { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "x".repeat(200));
            }
            other => panic!("expected HTTP error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_reports_server_errors() {
        let (_server, client) =
            workflow_server(ResponseTemplate::new(500).set_body_string("upstream down")).await;

        let err = client.run(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            DifyError::Http { status: 500, ref body } if body == "upstream down"
        ));
    }

    #[tokio::test]
    async fn test_run_rejects_non_json_success() {
        let (_server, client) =
            workflow_server(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
                .await;

        let err = client.run(&request()).await.unwrap_err();
        assert!(matches!(err, DifyError::Decode(_)));
    }
}
