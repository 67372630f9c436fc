//! Hosted model providers and the model-id prefix dispatch between them.

use crate::config::provider_for_model;

/// Provider family behind a model id, keyed by the prefix before `/`.
///
/// The payload shape differs per family: OpenAI and Google take a flat
/// user string, Anthropic takes typed content blocks that can carry an
/// ephemeral cache hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Google,
}

impl Provider {
    /// Resolve the provider from a model id like `"openai/gpt-4o-mini"`.
    pub fn from_model_id(model_id: &str) -> Option<Provider> {
        match provider_for_model(model_id) {
            "openai" => Some(Provider::OpenAi),
            "anthropic" => Some(Provider::Anthropic),
            "google" => Some(Provider::Google),
            _ => None,
        }
    }

    /// Provider name as used in model-id prefixes and config keys.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Google => "google",
        }
    }
}

/// Bare model name for the provider API: the part after the prefix.
pub fn model_name(model_id: &str) -> &str {
    match model_id.split_once('/') {
        Some((_, name)) => name,
        None => model_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_model_id() {
        assert_eq!(
            Provider::from_model_id("openai/gpt-4o"),
            Some(Provider::OpenAi)
        );
        assert_eq!(
            Provider::from_model_id("anthropic/claude-sonnet-4-20250514"),
            Some(Provider::Anthropic)
        );
        assert_eq!(
            Provider::from_model_id("google/gemini-2.5-flash"),
            Some(Provider::Google)
        );
        assert_eq!(Provider::from_model_id("ollama/llama3.1"), None);
    }

    #[test]
    fn test_model_name_strips_prefix() {
        assert_eq!(model_name("openai/gpt-4o-mini"), "gpt-4o-mini");
        assert_eq!(model_name("gpt-4o-mini"), "gpt-4o-mini");
    }
}
