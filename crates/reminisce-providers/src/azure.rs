//! Azure OpenAI question-generation provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use reminisce_core::error::GeneratorError;
use reminisce_core::model::QuestionDraft;
use reminisce_core::traits::{
    parse_draft_response, DraftRequest, QuestionGenerator, DRAFT_SYSTEM_PROMPT,
};

pub const DEFAULT_API_VERSION: &str = "2024-02-01";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const TEMPERATURE: f64 = 0.2;
const MAX_TOKENS: u32 = 1200;

/// Azure OpenAI chat-completions provider. The deployment name selects
/// the model.
pub struct AzureOpenAiGenerator {
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
    client: reqwest::Client,
}

impl AzureOpenAiGenerator {
    pub fn new(
        endpoint: &str,
        api_key: &str,
        deployment: &str,
        api_version: Option<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            deployment: deployment.to_string(),
            api_version: api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            client,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    temperature: f64,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl QuestionGenerator for AzureOpenAiGenerator {
    fn name(&self) -> &str {
        "azure-openai"
    }

    #[instrument(skip(self, request), fields(deployment = %self.deployment))]
    async fn draft(&self, request: &DraftRequest) -> anyhow::Result<Vec<QuestionDraft>> {
        let body = ChatRequest {
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: DRAFT_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: serde_json::to_string(request)?,
                },
            ],
        };

        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        );
        let response = self
            .client
            .post(url)
            .header("api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeneratorError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    GeneratorError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(GeneratorError::RateLimited {
                retry_after_ms: retry_after,
            }
            .into());
        }
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(GeneratorError::AuthenticationFailed(body).into());
        }
        if status == 404 {
            return Err(GeneratorError::ModelNotFound(self.deployment.clone()).into());
        }
        if status >= 400 {
            let message = response.text().await.unwrap_or_default();
            return Err(GeneratorError::ApiError { status, message }.into());
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::Malformed(format!("failed to parse response: {e}")))?;

        let content = api_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(parse_draft_response(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reminisce_core::model::QuestionType;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn draft_request() -> DraftRequest {
        DraftRequest {
            patient_name: "Alice".into(),
            family: vec![],
            knowledge: vec![],
            due: vec![],
            selected: vec![],
            n: 3,
        }
    }

    #[tokio::test]
    async fn successful_drafting() {
        let server = MockServer::start().await;

        let content = r#"{"questions":[{"question_type":"recall",
            "prompt":"What is favorite color?","correct_answer":"blue",
            "item_type":"knowledge","item_id":"4b4d6a3e-9a87-4f5f-9e3c-2f6a1f0c8d11",
            "difficulty":1,"acceptable_answers":["blue"]}]}"#;
        let response_body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        });

        Mock::given(method("POST"))
            .and(path("/openai/deployments/quizgen/chat/completions"))
            .and(query_param("api-version", DEFAULT_API_VERSION))
            .and(header("api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let generator = AzureOpenAiGenerator::new(&server.uri(), "test-key", "quizgen", None);
        let drafts = generator.draft(&draft_request()).await.unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].question_type, QuestionType::Recall);
    }

    #[tokio::test]
    async fn markdown_fenced_output_is_accepted() {
        let server = MockServer::start().await;

        let content = "```json\n{\"questions\":[]}\n```";
        let response_body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        });

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let generator = AzureOpenAiGenerator::new(&server.uri(), "test-key", "quizgen", None);
        let drafts = generator.draft(&draft_request()).await.unwrap();
        assert!(drafts.is_empty());
    }

    #[tokio::test]
    async fn malformed_output_is_classified() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "no json here"}}]
        });

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let generator = AzureOpenAiGenerator::new(&server.uri(), "test-key", "quizgen", None);
        let err = generator.draft(&draft_request()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GeneratorError>(),
            Some(GeneratorError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let generator = AzureOpenAiGenerator::new(&server.uri(), "bad-key", "quizgen", None);
        let err = generator.draft(&draft_request()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GeneratorError>(),
            Some(GeneratorError::AuthenticationFailed(_))
        ));
    }

    #[tokio::test]
    async fn rate_limiting() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "5"))
            .mount(&server)
            .await;

        let generator = AzureOpenAiGenerator::new(&server.uri(), "test-key", "quizgen", None);
        let err = generator.draft(&draft_request()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GeneratorError>(),
            Some(GeneratorError::RateLimited {
                retry_after_ms: 5000
            })
        ));
    }

    #[tokio::test]
    async fn unknown_deployment_is_model_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let generator = AzureOpenAiGenerator::new(&server.uri(), "test-key", "missing", None);
        let err = generator.draft(&draft_request()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GeneratorError>(),
            Some(GeneratorError::ModelNotFound(_))
        ));
    }
}
