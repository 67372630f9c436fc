//! Anthropic messages client.
//!
//! This family takes typed content blocks instead of a flat string. The
//! design context block carries an ephemeral cache hint so a follow-up call
//! over the same netlist bills the repeated context at the cached rate.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::prompts::AnalysisPrompt;
use super::{parse_findings, LlmError};
use crate::findings::{Findings, TokenUsage};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: &'static str,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_control: Option<CacheControl>,
}

#[derive(Debug, Serialize)]
struct CacheControl {
    #[serde(rename = "type")]
    control_type: &'static str,
}

impl CacheControl {
    fn ephemeral() -> Self {
        Self {
            control_type: "ephemeral",
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseContent>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    text: Option<String>,
}

// No total in this family's metadata; the total is derived from the parts.
#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
    cache_creation_input_tokens: Option<u64>,
    cache_read_input_tokens: Option<u64>,
}

pub(crate) async fn complete(
    client: &Client,
    model: &str,
    api_key: &str,
    prompt: &AnalysisPrompt,
) -> Result<(Findings, TokenUsage), LlmError> {
    let request = MessagesRequest {
        model: model.to_string(),
        max_tokens: MAX_TOKENS,
        system: prompt.system.to_string(),
        messages: vec![Message {
            role: "user",
            content: vec![
                ContentBlock {
                    block_type: "text",
                    text: prompt.instruction.to_string(),
                    cache_control: None,
                },
                ContentBlock {
                    block_type: "text",
                    text: prompt.context.clone(),
                    cache_control: Some(CacheControl::ephemeral()),
                },
            ],
        }],
    };

    let response = client
        .post(ANTHROPIC_API_URL)
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_API_VERSION)
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(LlmError::ApiError {
            status: status.as_u16(),
            message,
        });
    }

    let body: MessagesResponse = response
        .json()
        .await
        .map_err(|e| LlmError::ParseError(format!("invalid messages body: {}", e)))?;

    let text = body
        .content
        .iter()
        .find_map(|c| c.text.clone())
        .ok_or(LlmError::EmptyResponse)?;
    let findings = parse_findings(&text)?;
    let usage = token_usage(body.usage);
    Ok((findings, usage))
}

fn token_usage(usage: Option<Usage>) -> TokenUsage {
    let Some(usage) = usage else {
        return TokenUsage::default();
    };
    let input = usage.input_tokens.unwrap_or(0);
    let output = usage.output_tokens.unwrap_or(0);
    let cache_creation = usage.cache_creation_input_tokens.unwrap_or(0);
    let cache_read = usage.cache_read_input_tokens.unwrap_or(0);
    TokenUsage {
        input_tokens: input,
        output_tokens: output,
        cache_creation_input_tokens: cache_creation,
        cache_read_input_tokens: cache_read,
        total_tokens: input + output + cache_creation + cache_read,
        response_time_seconds: 0.0,
    }
}
