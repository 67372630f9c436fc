//! OpenAI chat-completions client.
//!
//! This family takes a flat string per message; the response is constrained
//! to JSON via `response_format`.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::prompts::AnalysisPrompt;
use super::{parse_findings, LlmError};
use crate::findings::{Findings, TokenUsage};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

// Usage fields are read defensively: older deployments omit the cached
// prompt breakdown entirely.
#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
    total_tokens: Option<u64>,
    prompt_tokens_details: Option<PromptTokensDetails>,
}

#[derive(Debug, Deserialize)]
struct PromptTokensDetails {
    cached_tokens: Option<u64>,
}

pub(crate) async fn complete(
    client: &Client,
    model: &str,
    api_key: &str,
    prompt: &AnalysisPrompt,
) -> Result<(Findings, TokenUsage), LlmError> {
    let request = ChatRequest {
        model: model.to_string(),
        messages: vec![
            Message {
                role: "system",
                content: prompt.system.to_string(),
            },
            Message {
                role: "user",
                content: prompt.user_text(),
            },
        ],
        response_format: ResponseFormat {
            format_type: "json_object",
        },
    };

    let response = client
        .post(OPENAI_API_URL)
        .bearer_auth(api_key)
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

    let body: ChatResponse = response
        .json()
        .await
        .map_err(|e| LlmError::ParseError(format!("invalid completion body: {}", e)))?;

    let text = body
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .ok_or(LlmError::EmptyResponse)?;
    let findings = parse_findings(&text)?;
    let usage = token_usage(body.usage);
    Ok((findings, usage))
}

fn token_usage(usage: Option<Usage>) -> TokenUsage {
    let Some(usage) = usage else {
        return TokenUsage::default();
    };
    TokenUsage {
        input_tokens: usage.prompt_tokens.unwrap_or(0),
        output_tokens: usage.completion_tokens.unwrap_or(0),
        cache_creation_input_tokens: 0,
        cache_read_input_tokens: usage
            .prompt_tokens_details
            .and_then(|d| d.cached_tokens)
            .unwrap_or(0),
        total_tokens: usage.total_tokens.unwrap_or(0),
        response_time_seconds: 0.0,
    }
}
