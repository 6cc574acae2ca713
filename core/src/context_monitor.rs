//! Context window tracking and compression-trigger classification (C2).

use crate::message::Message;
use crate::token_estimator::count_total_tokens;

pub const DEFAULT_COMPRESSION_THRESHOLD: f64 = 0.95;
pub const DEFAULT_WARNING_THRESHOLD: f64 = 0.80;

const COMPRESSION_THRESHOLD_RANGE: std::ops::RangeInclusive<f64> = 0.5..=0.99;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Safe,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy)]
pub struct ContextStats {
    pub tokens: u64,
    pub limit: u64,
    pub percentage: f64,
    pub remaining: u64,
    pub zone: Zone,
    pub should_compress: bool,
}

/// Tracks token usage against a per-model context window.
#[derive(Debug, Clone)]
pub struct ContextMonitor {
    context_window: u64,
    compression_threshold: f64,
    warning_threshold: f64,
}

impl ContextMonitor {
    pub fn new(context_window: u64) -> Self {
        Self {
            context_window,
            compression_threshold: DEFAULT_COMPRESSION_THRESHOLD,
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
        }
    }

    pub fn context_window(&self) -> u64 {
        self.context_window
    }

    /// Update the window, e.g. when the host switches models.
    pub fn set_context_window(&mut self, context_window: u64) {
        self.context_window = context_window;
    }

    pub fn compression_threshold(&self) -> f64 {
        self.compression_threshold
    }

    /// `compressionThreshold` must be in `[0.5, 0.99]`; a caller passing
    /// anything outside that range has a bug, not a recoverable runtime
    /// condition, so this panics rather than returning a `Result`.
    pub fn set_compression_threshold(&mut self, threshold: f64) {
        assert!(
            COMPRESSION_THRESHOLD_RANGE.contains(&threshold),
            "compressionThreshold must be in [0.5, 0.99], got {threshold}"
        );
        self.compression_threshold = threshold;
    }

    pub fn warning_threshold(&self) -> f64 {
        self.warning_threshold
    }

    pub fn set_warning_threshold(&mut self, threshold: f64) {
        self.warning_threshold = threshold;
    }

    pub fn stats(&self, messages: &[Message]) -> ContextStats {
        let tokens = count_total_tokens(messages);
        let limit = self.context_window;
        let percentage = if limit == 0 {
            1.0
        } else {
            tokens as f64 / limit as f64
        };
        let remaining = limit.saturating_sub(tokens);
        let zone = if percentage >= self.compression_threshold {
            Zone::Critical
        } else if percentage >= self.warning_threshold {
            Zone::Warning
        } else {
            Zone::Safe
        };
        ContextStats {
            tokens,
            limit,
            percentage,
            remaining,
            zone,
            should_compress: zone == Zone::Critical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    #[test]
    fn zone_boundaries() {
        let monitor = ContextMonitor::new(100);
        // 79 tokens of 'a' -> ~20 tokens estimate at 4 chars/token; use an
        // exact window instead of text length to keep the test legible.
        let stats_safe = monitor.stats(&[]);
        assert_eq!(stats_safe.zone, Zone::Safe);
        assert!(!stats_safe.should_compress);
    }

    #[test]
    fn should_compress_iff_critical() {
        let monitor = ContextMonitor::new(10);
        let messages = vec![Message::user("a".repeat(100))]; // ~25 tokens > window
        let stats = monitor.stats(&messages);
        assert_eq!(stats.zone, Zone::Critical);
        assert!(stats.should_compress);
    }

    #[test]
    #[should_panic(expected = "compressionThreshold")]
    fn rejects_out_of_range_threshold_low() {
        let mut monitor = ContextMonitor::new(100);
        monitor.set_compression_threshold(0.4);
    }

    #[test]
    #[should_panic(expected = "compressionThreshold")]
    fn rejects_out_of_range_threshold_high() {
        let mut monitor = ContextMonitor::new(100);
        monitor.set_compression_threshold(1.0);
    }

    #[test]
    fn in_range_threshold_is_observable_via_getter() {
        let mut monitor = ContextMonitor::new(100);
        monitor.set_compression_threshold(0.75);
        assert_eq!(monitor.compression_threshold(), 0.75);
    }

    #[test]
    fn stats_tokens_matches_count_total_tokens() {
        let monitor = ContextMonitor::new(1_000_000);
        let messages = vec![Message::user("hello"), Message::assistant("world")];
        let stats = monitor.stats(&messages);
        assert_eq!(stats.tokens, count_total_tokens(&messages));
    }
}
