//! Google Gemini generateContent client.
//!
//! Flat text parts per content; JSON output is requested through
//! `generationConfig.responseMimeType`.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::prompts::AnalysisPrompt;
use super::{parse_findings, LlmError};
use crate::findings::{Findings, TokenUsage};

const GOOGLE_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u64>,
    candidates_token_count: Option<u64>,
    total_token_count: Option<u64>,
    cached_content_token_count: Option<u64>,
}

pub(crate) async fn complete(
    client: &Client,
    model: &str,
    api_key: &str,
    prompt: &AnalysisPrompt,
) -> Result<(Findings, TokenUsage), LlmError> {
    let request = GenerateRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: Some(prompt.system.to_string()),
            }],
        },
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(prompt.user_text()),
            }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
        },
    };

    let url = format!("{}/{}:generateContent", GOOGLE_API_BASE, model);
    let response = client
        .post(&url)
        .header("x-goog-api-key", api_key)
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

    let body: GenerateResponse = response
        .json()
        .await
        .map_err(|e| LlmError::ParseError(format!("invalid generateContent body: {}", e)))?;

    let text = body
        .candidates
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(|c| c.content.as_ref())
        .flat_map(|c| c.parts.iter())
        .find_map(|p| p.text.clone())
        .ok_or(LlmError::EmptyResponse)?;
    let findings = parse_findings(&text)?;
    let usage = token_usage(body.usage_metadata);
    Ok((findings, usage))
}

fn token_usage(metadata: Option<UsageMetadata>) -> TokenUsage {
    let Some(metadata) = metadata else {
        return TokenUsage::default();
    };
    TokenUsage {
        input_tokens: metadata.prompt_token_count.unwrap_or(0),
        output_tokens: metadata.candidates_token_count.unwrap_or(0),
        cache_creation_input_tokens: 0,
        cache_read_input_tokens: metadata.cached_content_token_count.unwrap_or(0),
        total_tokens: metadata.total_token_count.unwrap_or(0),
        response_time_seconds: 0.0,
    }
}
