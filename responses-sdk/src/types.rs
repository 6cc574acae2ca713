//! Wire types for the stateful Responses API.
//!
//! These mirror the request/response bodies described by the API's own
//! reference: a response is created asynchronously and must be polled by
//! id until it reaches a terminal status.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Role carried by a free-text input item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the `input` array sent to `POST /responses`.
///
/// The host never sends `FunctionCall`/`FunctionCallOutput` items itself
/// (see the adapter's message translator); they exist here so the type is
/// a faithful model of the wire format, and so a future structured
/// translator (spec.md §9) has somewhere to target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputItem {
    Message { role: Role, content: String },
    FunctionCall {
        call_id: String,
        name: String,
        arguments: String,
    },
    FunctionCallOutput { call_id: String, output: String },
}

impl InputItem {
    pub fn message(role: Role, content: impl Into<String>) -> Self {
        InputItem::Message {
            role,
            content: content.into(),
        }
    }
}

/// Flat wire representation of a tool definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: JsonValue,
}

/// Reasoning-effort hint attached to requests for reasoning-class models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    pub effort: String,
}

/// Body of `POST /responses`.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseCreateParams {
    pub model: String,
    pub input: Vec<InputItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub stream: bool,
}

impl ResponseCreateParams {
    pub fn new(model: impl Into<String>, input: Vec<InputItem>) -> Self {
        Self {
            model: model.into(),
            input,
            instructions: None,
            max_output_tokens: None,
            tools: None,
            previous_response_id: None,
            reasoning: None,
            temperature: None,
            stream: false,
        }
    }
}

/// Lifecycle status of a response object. `Cancelled` is distinct from
/// `Failed` on the wire but, per the adapter's design notes, is handled
/// identically by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl ResponseStatus {
    pub fn is_in_flight(self) -> bool {
        matches!(self, ResponseStatus::Queued | ResponseStatus::InProgress)
    }
}

/// A single fragment of assistant text within a `message` output item.
/// The API may split text into several fragments of type `output_text`;
/// any other fragment type is preserved as `Other` so nothing is silently
/// dropped, but only `OutputText` contributes to the translated content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputContent {
    OutputText { text: String },
    #[serde(other)]
    Other,
}

/// One entry of the `output` array on a completed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    Message {
        id: Option<String>,
        role: String,
        content: Vec<OutputContent>,
    },
    FunctionCall {
        id: Option<String>,
        call_id: String,
        name: String,
        arguments: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<String>,
    pub message: String,
}

/// Body returned by both `POST /responses` and `GET /responses/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: String,
    pub object: String,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub model: Option<String>,
    pub status: ResponseStatus,
    #[serde(default)]
    pub output: Vec<OutputItem>,
    #[serde(default)]
    pub usage: Option<Usage>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}
