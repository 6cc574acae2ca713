//! Pluggable compaction strategies (C3's extensibility seam).
//!
//! The shipped [`crate::compact_strategies::SimpleStrategy`] implements
//! spec §4.3's protocol exactly. A host embedding a different downstream
//! summary contract can register an alternative strategy without the
//! response pipeline knowing the difference.

use crate::message::Message;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Trait for implementing conversation compaction strategies.
pub trait CompactStrategy: Send + Sync {
    /// Unique identifier for this strategy.
    fn name(&self) -> &str;

    /// The fixed instruction message appended to the conversation to
    /// request a summary from the model.
    fn generate_prompt(&self) -> &str;

    /// Assemble the compacted history from the original messages and the
    /// model-produced summary text.
    fn build_compacted_history(
        &self,
        original: &[Message],
        summary_text: &str,
        preserve_first: bool,
        last_n: usize,
    ) -> Vec<Message>;
}

pub struct CompactStrategyRegistry {
    strategies: HashMap<String, Box<dyn CompactStrategy>>,
}

impl CompactStrategyRegistry {
    fn new() -> Self {
        let mut registry = Self {
            strategies: HashMap::new(),
        };
        registry.register(Box::new(crate::compact_strategies::SimpleStrategy));
        registry
    }

    fn register(&mut self, strategy: Box<dyn CompactStrategy>) {
        self.strategies
            .insert(strategy.name().to_string(), strategy);
    }

    pub fn get(&self, name: &str) -> Option<&dyn CompactStrategy> {
        self.strategies.get(name).map(std::convert::AsRef::as_ref)
    }
}

static COMPACT_REGISTRY: LazyLock<CompactStrategyRegistry> =
    LazyLock::new(CompactStrategyRegistry::new);

/// Look up a strategy by name, falling back to `"simple"` if not found.
pub fn get_strategy(name: &str) -> &'static dyn CompactStrategy {
    match COMPACT_REGISTRY.get(name).or_else(|| COMPACT_REGISTRY.get("simple")) {
        Some(strategy) => strategy,
        None => unreachable!("simple strategy must be registered"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_strategy_name_falls_back_to_simple() {
        let strategy = get_strategy("does-not-exist");
        assert_eq!(strategy.name(), "simple");
    }

    #[test]
    fn simple_strategy_is_registered() {
        let strategy = get_strategy("simple");
        assert_eq!(strategy.name(), "simple");
    }
}
