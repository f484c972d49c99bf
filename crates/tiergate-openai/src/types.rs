// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI Assistants and Chat Completions request/response types.
//!
//! Only the fields tiergate reads or writes are modelled; unknown response
//! fields are ignored.

use serde::{Deserialize, Serialize};

// --- Threads and messages ---

/// A conversation thread.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadObject {
    pub id: String,
}

/// Body of `POST /threads/{id}/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMessageRequest {
    /// `user` or `assistant`.
    pub role: String,
    pub content: String,
}

/// A message stored on a thread.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageObject {
    pub id: String,
    pub role: String,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

impl MessageObject {
    /// All text parts joined with newlines, trimmed.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                MessageContent::Text { text } => Some(text.value.as_str()),
                MessageContent::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}

/// One content part of a message.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextBody },
    /// Images, file references and future part types.
    #[serde(other)]
    Other,
}

/// Text payload of a content part.
#[derive(Debug, Clone, Deserialize)]
pub struct TextBody {
    pub value: String,
}

/// Response of `GET /threads/{id}/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageList {
    #[serde(default)]
    pub data: Vec<MessageObject>,
}

// --- Runs ---

/// Body of `POST /threads/{id}/runs`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRunRequest {
    pub assistant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_resources: Option<ToolResources>,
}

/// Requested output format for a run.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    pub fn text() -> Self {
        Self {
            format_type: "text".to_string(),
        }
    }
}

/// Retrieval resources attached to a run.
#[derive(Debug, Clone, Serialize)]
pub struct ToolResources {
    pub file_search: FileSearchResources,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileSearchResources {
    pub vector_store_ids: Vec<String>,
}

impl ToolResources {
    pub fn vector_store(id: impl Into<String>) -> Self {
        Self {
            file_search: FileSearchResources {
                vector_store_ids: vec![id.into()],
            },
        }
    }
}

/// Lifecycle state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Whether the run will not change state on its own anymore.
    ///
    /// `requires_action` counts as terminal: no tool outputs are ever submitted.
    pub fn is_terminal(self) -> bool {
        !matches!(
            self,
            RunStatus::Queued | RunStatus::InProgress | RunStatus::Cancelling | RunStatus::Unknown
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Unknown => "unknown",
        }
    }
}

/// A run of an assistant on a thread.
#[derive(Debug, Clone, Deserialize)]
pub struct RunObject {
    pub id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub last_error: Option<RunError>,
    #[serde(default)]
    pub incomplete_details: Option<IncompleteDetails>,
}

impl RunObject {
    /// Best available explanation for a non-successful terminal state.
    pub fn failure_reason(&self) -> String {
        if let Some(err) = &self.last_error {
            return format!("{}: {}", err.code, err.message);
        }
        if let Some(reason) = self.incomplete_details.as_ref().and_then(|d| d.reason.as_ref()) {
            return reason.clone();
        }
        format!("run ended with status {}", self.status.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncompleteDetails {
    #[serde(default)]
    pub reason: Option<String>,
}

// --- Chat completions ---

/// Body of `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_completion_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

// --- Errors ---

/// Error envelope returned by the OpenAI API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_text_parts_are_joined() {
        let msg: MessageObject = serde_json::from_value(serde_json::json!({
            "id": "msg_1",
            "role": "assistant",
            "content": [
                {"type": "text", "text": {"value": " First part", "annotations": []}},
                {"type": "image_file", "image_file": {"file_id": "file_1"}},
                {"type": "text", "text": {"value": "Second part \n", "annotations": []}}
            ]
        }))
        .unwrap();
        assert_eq!(msg.joined_text(), "First part\nSecond part");
    }

    #[test]
    fn run_request_omits_unset_fields() {
        let req = CreateRunRequest {
            assistant_id: "asst_1".into(),
            additional_instructions: None,
            temperature: None,
            max_completion_tokens: None,
            response_format: None,
            tool_resources: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"assistant_id": "asst_1"}));
    }

    #[test]
    fn run_request_serializes_resources() {
        let req = CreateRunRequest {
            assistant_id: "asst_1".into(),
            additional_instructions: Some("rules".into()),
            temperature: Some(0.5),
            max_completion_tokens: Some(700),
            response_format: Some(ResponseFormat::text()),
            tool_resources: Some(ToolResources::vector_store("vs_1")),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["response_format"]["type"], "text");
        assert_eq!(json["tool_resources"]["file_search"]["vector_store_ids"][0], "vs_1");
        assert_eq!(json["max_completion_tokens"], 700);
    }

    #[test]
    fn run_status_terminality() {
        assert!(!RunStatus::Queued.is_terminal());
        assert!(!RunStatus::InProgress.is_terminal());
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Expired.is_terminal());
        assert!(RunStatus::RequiresAction.is_terminal());

        let status: RunStatus = serde_json::from_str("\"something_new\"").unwrap();
        assert_eq!(status, RunStatus::Unknown);
    }

    #[test]
    fn failure_reason_prefers_last_error() {
        let run: RunObject = serde_json::from_value(serde_json::json!({
            "id": "run_1",
            "status": "failed",
            "last_error": {"code": "server_error", "message": "boom"}
        }))
        .unwrap();
        assert_eq!(run.failure_reason(), "server_error: boom");

        let run: RunObject = serde_json::from_value(serde_json::json!({
            "id": "run_2",
            "status": "incomplete",
            "incomplete_details": {"reason": "max_completion_tokens"}
        }))
        .unwrap();
        assert_eq!(run.failure_reason(), "max_completion_tokens");
    }
}
