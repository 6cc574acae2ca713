//! Static model-profile registry (spec §6 "Model profiles").

use std::collections::HashMap;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy)]
pub struct ModelProfile {
    pub context_window: u64,
    pub max_output_tokens: u32,
    pub is_reasoning: bool,
    pub supports_images: bool,
    pub input_price_per_million: f64,
    pub output_price_per_million: f64,
    pub description: &'static str,
}

/// Conservative fallback for any model id not in the table below.
pub const UNKNOWN_MODEL_PROFILE: ModelProfile = ModelProfile {
    context_window: 128_000,
    max_output_tokens: 16_000,
    is_reasoning: false,
    supports_images: false,
    input_price_per_million: 0.0,
    output_price_per_million: 0.0,
    description: "Unrecognized model; using conservative defaults",
};

static PROFILES: LazyLock<HashMap<&'static str, ModelProfile>> = LazyLock::new(|| {
    HashMap::from([
        (
            "gpt-5-codex",
            ModelProfile {
                context_window: 272_000,
                max_output_tokens: 128_000,
                is_reasoning: true,
                supports_images: true,
                input_price_per_million: 1.25,
                output_price_per_million: 10.0,
                description: "Reasoning-optimized coding model",
            },
        ),
        (
            "gpt-5",
            ModelProfile {
                context_window: 272_000,
                max_output_tokens: 128_000,
                is_reasoning: true,
                supports_images: true,
                input_price_per_million: 1.25,
                output_price_per_million: 10.0,
                description: "General-purpose reasoning model",
            },
        ),
        (
            "gpt-4o",
            ModelProfile {
                context_window: 128_000,
                max_output_tokens: 16_384,
                is_reasoning: false,
                supports_images: true,
                input_price_per_million: 2.5,
                output_price_per_million: 10.0,
                description: "Non-reasoning multimodal model",
            },
        ),
        (
            "gpt-4o-mini",
            ModelProfile {
                context_window: 128_000,
                max_output_tokens: 16_384,
                is_reasoning: false,
                supports_images: true,
                input_price_per_million: 0.15,
                output_price_per_million: 0.6,
                description: "Small, fast non-reasoning model",
            },
        ),
        (
            "o3",
            ModelProfile {
                context_window: 200_000,
                max_output_tokens: 100_000,
                is_reasoning: true,
                supports_images: true,
                input_price_per_million: 15.0,
                output_price_per_million: 60.0,
                description: "High-effort reasoning model",
            },
        ),
        (
            "o4-mini",
            ModelProfile {
                context_window: 200_000,
                max_output_tokens: 100_000,
                is_reasoning: true,
                supports_images: true,
                input_price_per_million: 1.1,
                output_price_per_million: 4.4,
                description: "Small reasoning model",
            },
        ),
    ])
});

/// Looks up a model's profile, falling back to conservative defaults for
/// unrecognized ids rather than erroring.
pub fn lookup(model: &str) -> ModelProfile {
    PROFILES.get(model).copied().unwrap_or(UNKNOWN_MODEL_PROFILE)
}
