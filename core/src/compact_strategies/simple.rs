use crate::compact_strategy::CompactStrategy;
use crate::message::ContentBlock;
use crate::message::Message;
use crate::message::MessageContent;
use crate::token_estimator::count_total_tokens;

/// The fixed multi-section summary contract (spec §4.3 step 1). The
/// section set is part of the contract: the downstream agent that reads
/// this summary back is trained against exactly this shape.
pub const SUMMARIZATION_PROMPT: &str = "\
Your task is to create a detailed summary of the conversation so far, paying close \
attention to the user's explicit requests and your previous actions.
This summary should be thorough in capturing technical details, code patterns, and \
architectural decisions that would be essential for continuing development work \
without losing context.

Structure your response using these sections:

1. Initial Request and Intent
2. Key Technical Concepts
3. Files and Code Sections
4. Errors and Fixes
5. Problem Solving
6. All User Messages (verbatim)
7. Pending Tasks
8. Current Work
9. Optional Next Step

Do not ask for confirmation to continue; proceed directly from this summary.";

/// Strategy matching spec §4.3's protocol exactly: preserves recent user
/// messages via the `last_n` window, does not attempt any file-content
/// recovery.
pub struct SimpleStrategy;

impl CompactStrategy for SimpleStrategy {
    fn name(&self) -> &str {
        "simple"
    }

    fn generate_prompt(&self) -> &str {
        SUMMARIZATION_PROMPT
    }

    fn build_compacted_history(
        &self,
        original: &[Message],
        summary_text: &str,
        preserve_first: bool,
        last_n: usize,
    ) -> Vec<Message> {
        let messages_before = original.len();
        let tokens_before = count_total_tokens(original);

        // The summary message always costs one slot; the first message and
        // the last-N window share whatever is left, so the assembled
        // sequence never exceeds the original length (spec §8: "for every
        // compression, len(compressed) <= len(original)") even for a short
        // but token-heavy conversation that still crosses the critical
        // threshold.
        let budget_after_summary = original.len().saturating_sub(1);
        let include_first = preserve_first && budget_after_summary > 0;
        let prefix_len = usize::from(include_first);
        let max_last_n = budget_after_summary.saturating_sub(prefix_len);
        let effective_last_n = last_n.min(max_last_n);
        let last_n_start = original.len().saturating_sub(effective_last_n);
        let last_n_messages: Vec<Message> = original[last_n_start..].to_vec();

        // Estimate post-compaction size before the notice block is
        // embedded, so the notice can report a number; the pipeline's
        // own stats are computed from the final sequence and are
        // authoritative (spec: token accounting is heuristic, not exact).
        let provisional_tokens_after =
            count_total_tokens(&last_n_messages) + count_total_tokens(&[Message::user(summary_text)]);
        let tokens_saved = tokens_before.saturating_sub(provisional_tokens_after);
        let after_count = prefix_len + 1 + last_n_messages.len();

        let notice = format!(
            "[Conversation compacted: {messages_before} messages \u{2192} \
             {after_count} messages, {tokens_before} \u{2192} {provisional_tokens_after} tokens \
             (~{tokens_saved} saved)]\n\n{summary_text}\n\n\
             Continue the task from this summary without asking for confirmation."
        );

        let mut compacted = Vec::with_capacity(2 + last_n_messages.len());
        if include_first {
            if let Some(first) = original.first() {
                compacted.push(first.clone());
            }
        }
        compacted.push(Message {
            role: crate::message::Role::User,
            content: MessageContent::Blocks(vec![ContentBlock::Text { text: notice }]),
        });
        compacted.extend(last_n_messages);
        compacted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn conversation(n: usize) -> Vec<Message> {
        (0..n).map(|i| Message::user(format!("message {i}"))).collect()
    }

    #[test]
    fn preserves_first_and_last_n_when_requested() {
        let strategy = SimpleStrategy;
        let original = conversation(10);
        let compacted = strategy.build_compacted_history(&original, "summary", true, 3);

        // first + summary + last 3
        assert_eq!(compacted.len(), 5);
        assert!(matches!(&compacted[0].content, MessageContent::Text(t) if t == "message 0"));
    }

    #[test]
    fn omits_first_when_preserve_first_is_false() {
        let strategy = SimpleStrategy;
        let original = conversation(10);
        let compacted = strategy.build_compacted_history(&original, "summary", false, 3);

        // summary + last 3, no first message
        assert_eq!(compacted.len(), 4);
    }

    #[test]
    fn never_produces_more_messages_than_the_original() {
        let strategy = SimpleStrategy;
        let original = conversation(20);
        let compacted = strategy.build_compacted_history(&original, "summary", true, 3);
        assert!(compacted.len() <= original.len());
    }

    #[test]
    fn bounds_hold_for_a_short_but_token_heavy_conversation() {
        // A conversation short enough that preserveFirst + 1 + lastN would
        // otherwise exceed it; the strategy must shrink lastN rather than
        // overshoot the original length.
        let strategy = SimpleStrategy;
        let original = conversation(2);
        let compacted = strategy.build_compacted_history(&original, "summary", true, 3);
        assert!(compacted.len() <= original.len());
        assert_eq!(compacted.len(), 2);
    }

    #[test]
    fn bounds_hold_for_a_single_message_conversation() {
        let strategy = SimpleStrategy;
        let original = conversation(1);
        let compacted = strategy.build_compacted_history(&original, "summary", true, 3);
        assert!(compacted.len() <= original.len());
    }

    #[test]
    fn summary_message_contains_the_raw_summary_text() {
        let strategy = SimpleStrategy;
        let original = conversation(5);
        let compacted =
            strategy.build_compacted_history(&original, "a distinctive summary body", true, 2);
        let summary_message = &compacted[1];
        let MessageContent::Blocks(blocks) = &summary_message.content else {
            panic!("expected blocks");
        };
        let ContentBlock::Text { text } = &blocks[0] else {
            panic!("expected text block");
        };
        assert!(text.contains("a distinctive summary body"));
    }
}
