//! Bounds-only token counting (C1).
//!
//! The estimate is deliberately cheap: a lower bound good enough to drive
//! threshold decisions, not an exact tokenizer. Coupling the adapter to a
//! model-specific tokenizer would defeat the point of a provider-agnostic
//! budget check.

use crate::message::ContentBlock;
use crate::message::Message;
use crate::message::ToolResultContent;

const CHARS_PER_TOKEN: f64 = 4.0;
const IMAGE_TOKENS: u64 = 85;

fn estimate_text(text: &str) -> u64 {
    (text.chars().count() as f64 / CHARS_PER_TOKEN).ceil() as u64
}

fn estimate_block(block: &ContentBlock) -> u64 {
    match block {
        ContentBlock::Text { text } => estimate_text(text),
        ContentBlock::Image { .. } => IMAGE_TOKENS,
        ContentBlock::ToolInvocation { input, .. } => {
            let serialized = serde_json::to_string(input).unwrap_or_default();
            estimate_text(&serialized)
        }
        ContentBlock::ToolResult { content, .. } => match content {
            ToolResultContent::Text(text) => estimate_text(text),
            ToolResultContent::Blocks(blocks) => blocks.iter().map(estimate_block).sum(),
        },
    }
}

fn estimate_message(message: &Message) -> u64 {
    message.content.blocks().iter().map(estimate_block).sum()
}

/// Total estimated tokens across every message.
pub fn count_total_tokens(messages: &[Message]) -> u64 {
    messages.iter().map(estimate_message).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn text_uses_four_chars_per_token_ceiling() {
        assert_eq!(estimate_text("abcd"), 1);
        assert_eq!(estimate_text("abcde"), 2);
        assert_eq!(estimate_text(""), 0);
    }

    #[test]
    fn image_block_is_flat_85() {
        let block = ContentBlock::Image {
            source: crate::message::ImageSource::Base64,
            media_type: "image/png".to_string(),
            data: Some("...".to_string()),
            url: None,
        };
        assert_eq!(estimate_block(&block), IMAGE_TOKENS);
    }

    #[test]
    fn tool_invocation_estimates_over_serialized_input() {
        let mut input = serde_json::Map::new();
        input.insert("path".to_string(), json!("src/main.rs"));
        let block = ContentBlock::ToolInvocation {
            id: "call_1".to_string(),
            name: "read_file".to_string(),
            input,
        };
        assert!(estimate_block(&block) > 0);
    }

    #[test]
    fn tool_result_recurses_into_nested_blocks() {
        let block = ContentBlock::ToolResult {
            invocation_id: "call_1".to_string(),
            content: ToolResultContent::Blocks(vec![ContentBlock::Text {
                text: "file contents here".to_string(),
            }]),
            is_error: None,
        };
        assert_eq!(estimate_block(&block), estimate_text("file contents here"));
    }

    #[test]
    fn sums_across_every_message() {
        let messages = vec![Message::user("hello"), Message::assistant("world!!")];
        let expected = estimate_text("hello") + estimate_text("world!!");
        assert_eq!(count_total_tokens(&messages), expected);
    }

    #[test]
    fn system_role_messages_still_count() {
        let messages = vec![Message {
            role: Role::System,
            content: crate::message::MessageContent::Text("you are a helper".to_string()),
        }];
        assert_eq!(count_total_tokens(&messages), estimate_text("you are a helper"));
    }
}
