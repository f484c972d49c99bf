// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI Assistants and Chat Completions APIs.
//!
//! Provides [`OpenAiClient`] which handles request construction,
//! authentication, and transient error retry for read-only calls.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tiergate_core::TiergateError;
use tracing::{debug, warn};

use crate::types::{
    ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse, CreateMessageRequest,
    CreateRunRequest, MessageList, MessageObject, RunObject, ThreadObject,
};

/// Delay between retries of a transient failure.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// HTTP client for OpenAI API communication.
///
/// Mutating calls (create thread, append message, create run) are sent once.
/// Read-only calls (retrieve run, list messages) are retried on 429, 500 and 503.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl OpenAiClient {
    /// Creates a new client.
    ///
    /// # Arguments
    /// * `api_key` - OpenAI API key, sent as a bearer token
    /// * `base_url` - API root such as `https://api.openai.com/v1`
    /// * `request_timeout` - per-request HTTP timeout
    /// * `max_retries` - retries for read-only calls on transient errors
    pub fn new(
        api_key: &str,
        base_url: &str,
        request_timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, TiergateError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| TiergateError::Internal(format!("invalid API key header value: {e}")))?,
        );
        headers.insert("openai-beta", HeaderValue::from_static("assistants=v2"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(request_timeout)
            .build()
            .map_err(|e| TiergateError::Transport {
                status: None,
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            retry_delay: RETRY_DELAY,
        })
    }

    /// Shortens the retry delay (for testing with wiremock).
    #[cfg(test)]
    pub(crate) fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `POST /threads`
    pub async fn create_thread(&self) -> Result<ThreadObject, TiergateError> {
        let request = self
            .client
            .post(self.url("/threads"))
            .json(&serde_json::json!({}));
        self.send_once(request).await
    }

    /// `POST /threads/{thread_id}/messages`
    pub async fn create_message(
        &self,
        thread_id: &str,
        message: &CreateMessageRequest,
    ) -> Result<MessageObject, TiergateError> {
        let request = self
            .client
            .post(self.url(&format!("/threads/{thread_id}/messages")))
            .json(message);
        self.send_once(request).await
    }

    /// `POST /threads/{thread_id}/runs`
    pub async fn create_run(
        &self,
        thread_id: &str,
        run: &CreateRunRequest,
    ) -> Result<RunObject, TiergateError> {
        let request = self
            .client
            .post(self.url(&format!("/threads/{thread_id}/runs")))
            .json(run);
        self.send_once(request).await
    }

    /// `GET /threads/{thread_id}/runs/{run_id}`
    pub async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<RunObject, TiergateError> {
        let url = self.url(&format!("/threads/{thread_id}/runs/{run_id}"));
        self.send_with_retry(|| self.client.get(&url)).await
    }

    /// `POST /threads/{thread_id}/runs/{run_id}/cancel`
    pub async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<RunObject, TiergateError> {
        let request = self
            .client
            .post(self.url(&format!("/threads/{thread_id}/runs/{run_id}/cancel")));
        self.send_once(request).await
    }

    /// `GET /threads/{thread_id}/messages`, newest first.
    pub async fn list_messages(&self, thread_id: &str, limit: u32) -> Result<MessageList, TiergateError> {
        let url = self.url(&format!("/threads/{thread_id}/messages"));
        let limit = limit.to_string();
        self.send_with_retry(|| {
            self.client
                .get(&url)
                .query(&[("limit", limit.as_str()), ("order", "desc")])
        })
        .await
    }

    /// `POST /chat/completions`
    pub async fn chat_completion(
        &self,
        completion: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, TiergateError> {
        let request = self.client.post(self.url("/chat/completions")).json(completion);
        self.send_once(request).await
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, TiergateError> {
        let response = request.send().await.map_err(request_failed)?;
        let status = response.status();
        debug!(status = %status, "response received");

        if status.is_success() {
            return parse_body(response).await;
        }
        Err(api_error(status, response).await)
    }

    /// Sends a read-only request, retrying transient failures up to `max_retries` times.
    async fn send_with_retry<T, F>(&self, build: F) -> Result<T, TiergateError>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying request after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = build().send().await.map_err(request_failed)?;
            let status = response.status();
            debug!(status = %status, attempt, "response received");

            if status.is_success() {
                return parse_body(response).await;
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let err = api_error(status, response).await;
                warn!(status = %status, error = %err, "transient error, will retry");
                last_error = Some(err);
                continue;
            }

            return Err(api_error(status, response).await);
        }

        Err(last_error.unwrap_or_else(|| TiergateError::transport("request failed after retries")))
    }
}

fn request_failed(e: reqwest::Error) -> TiergateError {
    TiergateError::Transport {
        status: None,
        message: format!("HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

async fn parse_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, TiergateError> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(|e| TiergateError::Transport {
        status: Some(status),
        message: format!("failed to read response body: {e}"),
        source: Some(Box::new(e)),
    })?;
    serde_json::from_str(&body).map_err(|e| TiergateError::Transport {
        status: Some(status),
        message: format!("failed to parse API response: {e}"),
        source: Some(Box::new(e)),
    })
}

async fn api_error(status: reqwest::StatusCode, response: reqwest::Response) -> TiergateError {
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(api_err) => match api_err.error.type_ {
            Some(kind) => format!("OpenAI API error ({kind}): {}", api_err.error.message),
            None => format!("OpenAI API error: {}", api_err.error.message),
        },
        Err(_) => format!("API returned {status}: {body}"),
    };
    TiergateError::Transport {
        status: Some(status.as_u16()),
        message,
        source: None,
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}
