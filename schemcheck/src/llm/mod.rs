//! Structured-output LLM clients for netlist review.
//!
//! [`LlmOperations`] binds one model id and API key, builds the analysis
//! prompt, issues a single blocking completion per call, and parses the
//! response into [`AnalysisResult`]. There are no retries and no partial
//! results: a failed call yields an error, not a truncated findings list.

pub mod anthropic;
pub mod google;
pub mod openai;
pub mod prompts;
pub mod provider;

pub use provider::Provider;

use std::time::Instant;

use thiserror::Error;

use crate::findings::{AnalysisResult, Findings};
use prompts::AnalysisPrompt;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("failed to parse model response: {0}")]
    ParseError(String),
    #[error("empty response from model")]
    EmptyResponse,
    #[error("unknown provider in model id '{0}'")]
    UnknownProvider(String),
    #[error("missing API key for provider '{0}'")]
    MissingApiKey(String),
}

/// One model bound to one API key, issuing structured completions.
#[derive(Debug)]
pub struct LlmOperations {
    provider: Provider,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl LlmOperations {
    /// Bind a client to `model_id` (e.g. `"openai/gpt-4o-mini"`).
    pub fn new(model_id: &str, api_key: &str) -> Result<Self, LlmError> {
        let provider = Provider::from_model_id(model_id)
            .ok_or_else(|| LlmError::UnknownProvider(model_id.to_string()))?;
        if api_key.is_empty() {
            return Err(LlmError::MissingApiKey(provider.name().to_string()));
        }
        Ok(Self {
            provider,
            model: provider::model_name(model_id).to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Review a netlist and return the model's findings with token usage.
    pub async fn analyze_netlist(&self, netlist: &str) -> Result<AnalysisResult, LlmError> {
        self.run(prompts::netlist_prompt(netlist)).await
    }

    /// Review a netlist with schematic source for extra context. An empty
    /// or blank schematic falls back to [`Self::analyze_netlist`].
    pub async fn analyze_schematic_and_netlist(
        &self,
        netlist: &str,
        schematic: &str,
    ) -> Result<AnalysisResult, LlmError> {
        if schematic.trim().is_empty() {
            return self.analyze_netlist(netlist).await;
        }
        self.run(prompts::schematic_and_netlist_prompt(netlist, schematic))
            .await
    }

    async fn run(&self, prompt: AnalysisPrompt) -> Result<AnalysisResult, LlmError> {
        tracing::debug!(
            "sending analysis request to {} model {}",
            self.provider.name(),
            self.model
        );
        let started = Instant::now();
        let (findings, mut usage) = match self.provider {
            Provider::OpenAi => {
                openai::complete(&self.client, &self.model, &self.api_key, &prompt).await?
            }
            Provider::Anthropic => {
                anthropic::complete(&self.client, &self.model, &self.api_key, &prompt).await?
            }
            Provider::Google => {
                google::complete(&self.client, &self.model, &self.api_key, &prompt).await?
            }
        };
        usage.response_time_seconds = started.elapsed().as_secs_f64();
        tracing::info!(
            "{} returned {} findings ({})",
            self.model,
            findings.findings.len(),
            usage.breakdown_text()
        );
        Ok(AnalysisResult {
            findings: findings.findings,
            token_usage: usage,
        })
    }
}

/// Parse a completion into the findings schema, tolerating markdown fences
/// and surrounding prose around the JSON object.
pub(crate) fn parse_findings(text: &str) -> Result<Findings, LlmError> {
    let json_text = extract_json_from_text(text);
    serde_json::from_str(&json_text)
        .map_err(|e| LlmError::ParseError(format!("response did not match findings schema: {}", e)))
}

fn extract_json_from_text(text: &str) -> String {
    let text = text.trim();

    if let Some(start) = text.find("```json") {
        if let Some(end) = text.rfind("```") {
            if end > start + 7 {
                return text[start + 7..end].trim().to_string();
            }
        }
    }

    if let Some(start) = text.find("```") {
        if let Some(end) = text.rfind("```") {
            if end > start + 3 {
                let content = &text[start + 3..end];
                if content.trim_start().starts_with('{') {
                    return content.trim().to_string();
                }
            }
        }
    }

    if let Some(start) = text.find('{') {
        if let Some(end) = text.rfind('}') {
            if end > start {
                return text[start..=end].to_string();
            }
        }
    }

    // No JSON found; let the schema parse report the failure.
    text.to_string()
}
