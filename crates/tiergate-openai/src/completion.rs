// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`CompletionModel`] over the Chat Completions API.

use async_trait::async_trait;
use tiergate_core::{CompletionModel, CompletionRequest, HealthStatus, PluginAdapter, TiergateError};

use crate::client::OpenAiClient;
use crate::types::{ChatCompletionRequest, ChatMessage};

/// Single-shot chat completion, used by the delegated classifier.
pub struct OpenAiCompletionModel {
    client: OpenAiClient,
}

impl OpenAiCompletionModel {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiCompletionModel {
    fn name(&self) -> &str {
        "openai-chat"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, TiergateError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl CompletionModel for OpenAiCompletionModel {
    async fn complete(&self, request: CompletionRequest) -> Result<String, TiergateError> {
        let body = ChatCompletionRequest {
            model: request.model,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: Some(request.system),
                },
                ChatMessage {
                    role: "user".into(),
                    content: Some(request.user),
                },
            ],
            temperature: request.temperature,
            max_completion_tokens: request.max_tokens,
        };

        let response = self.client.chat_completion(&body).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| TiergateError::Transport {
                status: None,
                message: "completion returned no text".into(),
                source: None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn model(server: &MockServer) -> OpenAiCompletionModel {
        let client = OpenAiClient::new("sk-test", &server.uri(), Duration::from_secs(5), 0).unwrap();
        OpenAiCompletionModel::new(client)
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o-mini".into(),
            system: "Answer base, mid, or high.".into(),
            user: "Compare the bills".into(),
            temperature: 0.0,
            max_tokens: 5,
        }
    }

    #[tokio::test]
    async fn returns_first_choice_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "temperature": 0.0,
                "max_completion_tokens": 5,
                "messages": [
                    {"role": "system", "content": "Answer base, mid, or high."},
                    {"role": "user", "content": "Compare the bills"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "high"}}]
            })))
            .mount(&server)
            .await;

        assert_eq!(model(&server).complete(request()).await.unwrap(), "high");
    }

    #[tokio::test]
    async fn empty_choices_are_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        assert!(model(&server).complete(request()).await.is_err());
    }

    #[tokio::test]
    async fn upstream_500_is_a_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let err = model(&server).complete(request()).await.unwrap_err();
        assert_eq!(err.tag(), "transport_error");
        assert_eq!(err.http_status(), 500);
    }
}
