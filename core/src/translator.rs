//! Bidirectional mapping between host content blocks and wire input/output
//! items (C4).
//!
//! Outbound translation is deliberately lossy on structure but lossless
//! on content: every host block becomes inline text within a wire
//! `message` item. Mapping the host's prompt-based tool calls into the
//! wire's structured `function_call`/`function_call_output` items would
//! require inventing call ids that don't exist on the host side, and a
//! pairing failure there would corrupt the server-side chain. Keeping
//! everything as message text sacrifices the remote-side tool UI but
//! keeps the translation always correct.

use crate::message::ContentBlock;
use crate::message::Message;
use crate::message::MessageContent;
use crate::message::Role;
use crate::message::StopReason;
use crate::message::ToolResultContent;
use responses_sdk::InputItem;
use responses_sdk::OutputContent;
use responses_sdk::OutputItem;
use responses_sdk::Role as WireRole;

const IMAGE_MARKER: &str = "[Image provided by user]";

/// The host's fixed tool-name registry. Any opening tag from this list
/// appearing in assistant text marks the turn as `tool_use`.
pub const KNOWN_TOOL_NAMES: &[&str] = &[
    "execute_command",
    "read_file",
    "write_to_file",
    "replace_in_file",
    "search_files",
    "list_files",
    "list_code_definition_names",
    "browser_action",
    "use_mcp_tool",
    "access_mcp_resource",
    "ask_followup_question",
    "plan_mode_respond",
    "load_mcp_documentation",
    "attempt_completion",
    "new_task",
    "condense",
    "summarize_task",
    "report_bug",
    "new_rule",
    "web_fetch",
];

fn json_value_to_inline(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn render_tool_invocation(name: &str, input: &serde_json::Map<String, serde_json::Value>) -> String {
    let mut body = format!("<{name}>\n");
    for (key, value) in input {
        body.push_str(&format!("<{key}>{}</{key}>\n", json_value_to_inline(value)));
    }
    body.push_str(&format!("</{name}>"));
    body
}

fn render_tool_result_content(content: &ToolResultContent) -> String {
    match content {
        ToolResultContent::Text(text) => text.clone(),
        ToolResultContent::Blocks(blocks) => {
            serde_json::to_string(blocks).unwrap_or_default()
        }
    }
}

fn render_block(block: &ContentBlock) -> String {
    match block {
        ContentBlock::Text { text } => text.clone(),
        ContentBlock::Image { .. } => IMAGE_MARKER.to_string(),
        ContentBlock::ToolInvocation { name, input, .. } => render_tool_invocation(name, input),
        ContentBlock::ToolResult { content, .. } => {
            format!("\n[Tool Result]\n{}\n", render_tool_result_content(content))
        }
    }
}

fn message_text(message: &Message) -> String {
    let blocks = message.content.blocks();
    blocks.iter().map(render_block).collect::<Vec<_>>().join("").trim().to_string()
}

/// Outbound translation (host -> wire). System-role messages are not
/// emitted as input items: system context is carried separately via the
/// request's top-level `instructions` field (spec §4.5 step 4), so
/// translating it again here would duplicate it on the wire.
pub fn translate_outbound(messages: &[Message]) -> Vec<InputItem> {
    messages
        .iter()
        .filter_map(|message| {
            let wire_role = match message.role {
                Role::User => WireRole::User,
                Role::Assistant => WireRole::Assistant,
                Role::System => return None,
            };
            let text = message_text(message);
            if text.is_empty() {
                return None;
            }
            Some(InputItem::message(wire_role, text))
        })
        .collect()
}

/// Inbound translation (wire -> host). Returns the translated content
/// blocks and the classified stop reason.
pub fn translate_inbound(output: &[OutputItem]) -> (Vec<ContentBlock>, StopReason) {
    let mut content = Vec::new();
    let mut saw_tool_use = false;

    for item in output {
        match item {
            OutputItem::Message { content: fragments, .. } => {
                let text = fragments
                    .iter()
                    .filter_map(|fragment| match fragment {
                        OutputContent::OutputText { text } => Some(text.as_str()),
                        OutputContent::Other => None,
                    })
                    .collect::<Vec<_>>()
                    .join("");
                if contains_known_tool_tag(&text) {
                    saw_tool_use = true;
                }
                content.push(ContentBlock::Text { text });
            }
            OutputItem::FunctionCall { name, arguments, .. } => {
                tracing::warn!(
                    tool = name.as_str(),
                    "unexpected structured function_call in responses API output; \
                     converting to inline XML"
                );
                let input: serde_json::Map<String, serde_json::Value> =
                    serde_json::from_str(arguments).unwrap_or_default();
                content.push(ContentBlock::Text {
                    text: render_tool_invocation(name, &input),
                });
                saw_tool_use = true;
            }
            OutputItem::Other => {
                tracing::debug!("ignoring unrecognized output item type");
            }
        }
    }

    let stop_reason = if saw_tool_use { StopReason::ToolUse } else { StopReason::Stop };
    (content, stop_reason)
}

fn contains_known_tool_tag(text: &str) -> bool {
    KNOWN_TOOL_NAMES
        .iter()
        .any(|name| text.contains(&format!("<{name}>")))
}

/// True if the translated content is empty, or is a single empty text
/// block (spec §4.5 step 12) — both signal model confusion downstream.
pub fn is_empty_content(content: &[ContentBlock]) -> bool {
    match content {
        [] => true,
        [ContentBlock::Text { text }] => text.is_empty(),
        _ => false,
    }
}
