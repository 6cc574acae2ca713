//! Host-side content model: the shape the adapter accepts from and hands
//! back to the agent loop, independent of the wire format spoken by the
//! remote API.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map as JsonMap;
use serde_json::Value as JsonValue;

/// One piece of a message's content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Image {
        source: ImageSource,
        media_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    /// An intent to invoke a named tool. Only ever appears in assistant
    /// turns replayed back as history; the adapter never invents these.
    ToolInvocation {
        id: String,
        name: String,
        input: JsonMap<String, JsonValue>,
    },
    /// The host-executed result of a prior invocation, back-referenced
    /// by `invocation_id` (invariant I1: the referenced id must appear
    /// earlier in the conversation).
    ToolResult {
        invocation_id: String,
        content: ToolResultContent,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    Base64,
    Url,
}

/// A tool result's content is either a plain string or a nested sequence
/// of content blocks (e.g. a tool that returns an image alongside text).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResultContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A message's content is either a plain string (the common case for
/// simple turns) or a sequence of content blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl MessageContent {
    pub fn blocks(&self) -> Vec<ContentBlock> {
        match self {
            MessageContent::Text(text) => vec![ContentBlock::Text { text: text.clone() }],
            MessageContent::Blocks(blocks) => blocks.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }
}

/// Stop reason surfaced to the host, always one of these four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Stop,
    ToolUse,
    EndTurn,
    MaxTokens,
}

/// Token usage reported back to the host. Cache fields are always zero —
/// this API surface has no prompt-cache concept (see `getModel`'s
/// `supportsPromptCache: false`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_write_tokens: u64,
}

impl From<responses_sdk::Usage> for Usage {
    fn from(usage: responses_sdk::Usage) -> Self {
        Self {
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            cache_read_tokens: 0,
            cache_write_tokens: 0,
        }
    }
}

/// Normalized response handed back to the host after one pipeline run.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub content: Vec<ContentBlock>,
    pub stop_reason: StopReason,
    pub usage: Option<Usage>,
}

/// One event of the host-facing lazy output sequence (spec §5: a finite
/// burst of text events followed by an optional usage event, not
/// mid-response streaming).
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Text { text: String },
    Usage(Usage),
}

/// A host-provided tool definition, mapped into the wire's flat tool
/// shape when (rarely) the host opts into structured tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: Option<String>,
    pub parameters: JsonValue,
}

impl ToolSpec {
    pub fn to_wire(&self) -> responses_sdk::ToolDefinition {
        responses_sdk::ToolDefinition {
            kind: "function".to_string(),
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
        }
    }
}
