//! Compressor orchestration (C3): the glue between the pipeline's
//! compression branch and a [`CompactStrategy`](crate::compact_strategy::CompactStrategy).
//!
//! The actual model call is made by the caller (the response pipeline),
//! since invoking it requires re-entering the pipeline itself (spec §4.3
//! step 2). This module only knows how to build the request messages and
//! assemble the final compacted sequence from a strategy's output.

use crate::compact_strategy::get_strategy;
use crate::message::Message;
use crate::token_estimator::count_total_tokens;

pub const DEFAULT_PRESERVE_FIRST: bool = true;
pub const DEFAULT_LAST_N: usize = 3;

#[derive(Debug, Clone)]
pub struct CompressionStats {
    pub messages_before: usize,
    pub messages_after: usize,
    pub tokens_before: u64,
    pub tokens_after: u64,
    pub tokens_saved: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct CompressionOutcome {
    pub summary: String,
    pub messages: Vec<Message>,
    pub stats: CompressionStats,
}

/// Appends the strategy's fixed instruction message to the conversation,
/// ready to be sent through the response pipeline with tools disabled.
pub fn build_summary_request(strategy_name: &str, messages: &[Message]) -> Vec<Message> {
    let strategy = get_strategy(strategy_name);
    let mut request = messages.to_vec();
    request.push(Message::user(strategy.generate_prompt()));
    request
}

/// Extracts the text portion of a translated response (spec §4.3 step 3):
/// the concatenation of every `Text` block.
pub fn extract_summary_text(content: &[crate::message::ContentBlock]) -> String {
    content
        .iter()
        .filter_map(|block| match block {
            crate::message::ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("")
}

/// Assembles the compressed sequence and stats from a strategy's output
/// (spec §4.3 steps 4-6).
pub fn finish_compression(
    strategy_name: &str,
    original: &[Message],
    summary_text: String,
    now: chrono::DateTime<chrono::Utc>,
) -> CompressionOutcome {
    let strategy = get_strategy(strategy_name);
    let messages = strategy.build_compacted_history(
        original,
        &summary_text,
        DEFAULT_PRESERVE_FIRST,
        DEFAULT_LAST_N,
    );

    let tokens_before = count_total_tokens(original);
    let tokens_after = count_total_tokens(&messages);
    CompressionOutcome {
        summary: summary_text,
        stats: CompressionStats {
            messages_before: original.len(),
            messages_after: messages.len(),
            tokens_before,
            tokens_after,
            tokens_saved: tokens_before.saturating_sub(tokens_after),
            timestamp: now,
        },
        messages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ContentBlock;

    #[test]
    fn build_summary_request_appends_one_instruction_message() {
        let messages = vec![Message::user("hi"), Message::assistant("hello")];
        let request = build_summary_request("simple", &messages);
        assert_eq!(request.len(), messages.len() + 1);
    }

    #[test]
    fn extract_summary_text_concatenates_text_blocks_only() {
        let content = vec![
            ContentBlock::Text { text: "part one ".to_string() },
            ContentBlock::Image {
                source: crate::message::ImageSource::Base64,
                media_type: "image/png".to_string(),
                data: None,
                url: None,
            },
            ContentBlock::Text { text: "part two".to_string() },
        ];
        assert_eq!(extract_summary_text(&content), "part one part two");
    }

    #[test]
    fn finish_compression_resets_chain_eligible_stats() {
        let original: Vec<Message> = (0..20).map(|i| Message::user(format!("m{i}"))).collect();
        let outcome = finish_compression("simple", &original, "a summary".to_string(), chrono::Utc::now());
        assert!(outcome.stats.messages_after <= outcome.stats.messages_before);
        assert_eq!(outcome.stats.messages_before, 20);
    }
}
