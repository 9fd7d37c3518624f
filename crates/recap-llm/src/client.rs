// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible chat-completions endpoints.
//!
//! Provides [`LlmClient`], which implements [`TopicSummarizer`]: a
//! transcript that fits the input budget is summarized in one call,
//! anything larger goes through the chunked incremental loop in which
//! each call sees the accumulated "previous topics" block and the merge
//! in [`crate::merge`] is the authoritative combiner.
//!
//! Errors are not retried here; the scheduler owns retry policy.

use std::time::Duration;

use async_trait::async_trait;
use recap_core::{ChatMessage, RecapError, SummaryResult, TopicSummarizer};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, info};

use crate::chunk::{messages_to_prompt_text, split_messages_into_chunks};
use crate::merge::{format_topics_for_context, merge_topics};
use crate::tokens::estimate_tokens;
use crate::types::{
    ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse, ChatRequestMessage,
};

/// Wall-clock budget for a single completion call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Output cap for each completion call.
const MAX_OUTPUT_TOKENS: u32 = 4000;

const TEMPERATURE: f32 = 0.3;

/// Tokens reserved out of the context window for the system prompt and
/// the model's output.
const INPUT_TOKEN_RESERVE: usize = 2000;

/// Lower bound on the input budget regardless of the configured window.
const MIN_INPUT_TOKENS: usize = 6000;

const SYSTEM_PROMPT: &str = "\
You are an assistant that summarizes group chat discussions. Group the \
provided messages by discussion topic and output strict JSON.

Each input line has the form \"[sender_name|message_id] text\".

Output schema:
{
  \"topics\": [
    {
      \"title\": \"concise topic title\",
      \"items\": [
        {
          \"sender_name\": \"speaker name\",
          \"description\": \"what this speaker contributed to the topic\",
          \"message_ids\": [representative message ids]
        }
      ]
    }
  ]
}

Rules:
1. Group by discussion topic, 2-4 items per topic.
2. sender_name must match the input exactly.
3. message_ids lists the 1-3 most representative message ids for that speaker within the topic.
4. description states the speaker's concrete point or contribution.
5. Keep 5-15 topics, ordered by importance.
6. Output JSON only, nothing else.";

/// Client for an OpenAI-compatible chat-completions endpoint.
///
/// Holds a pooled `reqwest::Client` and is safe to share across tasks.
#[derive(Debug, Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_input_tokens: usize,
}

impl LlmClient {
    /// Creates a new client.
    ///
    /// # Arguments
    /// * `base_url` - endpoint root, e.g. `https://api.example.com/v1`
    /// * `api_key` - bearer token for authentication
    /// * `model` - model identifier sent with each request
    /// * `context_window` - the model's context window in tokens; the
    ///   input budget is `context_window - 2000`, floored at 6000
    /// * `proxy_url` - optional SOCKS5 proxy for outbound traffic
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        context_window: usize,
        proxy_url: Option<String>,
    ) -> Result<Self, RecapError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                RecapError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT);
        if let Some(url) = proxy_url {
            let proxy = reqwest::Proxy::all(&url).map_err(|e| {
                RecapError::Config(format!("invalid proxy url `{url}`: {e}"))
            })?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build().map_err(|e| RecapError::Provider {
            message: format!("failed to build HTTP client: {e}"),
            source: Some(Box::new(e)),
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            max_input_tokens: context_window
                .saturating_sub(INPUT_TOKEN_RESERVE)
                .max(MIN_INPUT_TOKENS),
        })
    }

    /// The input token budget a single call may carry.
    pub fn max_input_tokens(&self) -> usize {
        self.max_input_tokens
    }

    /// Overrides the input budget (for exercising the chunked path in tests).
    #[cfg(test)]
    fn with_max_input_tokens(mut self, max: usize) -> Self {
        self.max_input_tokens = max;
        self
    }

    /// Executes one completion call and returns the fence-stripped reply.
    async fn summarize_once(
        &self,
        transcript: &str,
        previous_topics: Option<&str>,
    ) -> Result<String, RecapError> {
        let user_prompt = match previous_topics {
            Some(prev) => format!(
                "A previous round already produced the topic summary below. \
                 Merge the new messages into it and output the complete updated JSON.\n\n\
                 Previous topics:\n{prev}\n\n\
                 New messages:\n{transcript}\n\n\
                 Output the complete updated topics JSON (merge into existing topics \
                 or add new ones; keep all message_ids)."
            ),
            None => format!("Chat transcript:\n{transcript}\n\nOutput the JSON."),
        };

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatRequestMessage::system(SYSTEM_PROMPT),
                ChatRequestMessage::user(user_prompt),
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_OUTPUT_TOKENS,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| RecapError::Provider {
                message: format!("LLM call failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, "completion response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!(
                    "LLM API error ({}): {}",
                    api_err.error.type_, api_err.error.message
                )
            } else {
                format!("LLM API returned {status}: {body}")
            };
            return Err(RecapError::Provider {
                message,
                source: None,
            });
        }

        let body: ChatCompletionResponse =
            response.json().await.map_err(|e| RecapError::Provider {
                message: format!("failed to read LLM response body: {e}"),
                source: Some(Box::new(e)),
            })?;

        let choice = body.choices.first().ok_or_else(|| RecapError::Provider {
            message: "LLM returned an empty response".to_string(),
            source: None,
        })?;

        Ok(strip_code_fence(&choice.message.content).to_string())
    }
}

#[async_trait]
impl TopicSummarizer for LlmClient {
    async fn summarize_chat(
        &self,
        messages: &[ChatMessage],
    ) -> Result<SummaryResult, RecapError> {
        if messages.is_empty() {
            return Ok(SummaryResult::default());
        }

        let transcript = messages_to_prompt_text(messages);
        let tokens = estimate_tokens(&transcript);

        if tokens <= self.max_input_tokens {
            let raw = self.summarize_once(&transcript, None).await?;
            return parse_summary(&raw, None);
        }

        info!(
            tokens,
            budget = self.max_input_tokens,
            "transcript exceeds input budget, summarizing in chunks"
        );
        let chunks = split_messages_into_chunks(messages, self.max_input_tokens);

        let mut accumulated = SummaryResult::default();
        for (i, chunk_msgs) in chunks.iter().enumerate() {
            debug!(chunk = i + 1, total = chunks.len(), "summarizing chunk");
            let chunk_text = messages_to_prompt_text(chunk_msgs);
            let previous = if accumulated.is_empty() {
                None
            } else {
                Some(format_topics_for_context(&accumulated))
            };

            let raw = self.summarize_once(&chunk_text, previous.as_deref()).await?;
            let partial = parse_summary(&raw, Some(i + 1))?;

            accumulated = merge_topics(&accumulated, &partial);
        }

        Ok(accumulated)
    }
}

/// Strips a leading ```` ```json ````/```` ``` ```` fence and a trailing
/// ```` ``` ```` from a model reply.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim()
}

/// Parses a fence-stripped reply into a [`SummaryResult`].
fn parse_summary(raw: &str, chunk: Option<usize>) -> Result<SummaryResult, RecapError> {
    serde_json::from_str(raw).map_err(|e| RecapError::Provider {
        message: match chunk {
            Some(i) => format!("failed to parse summary JSON for chunk {i}: {e}"),
            None => format!("failed to parse summary JSON: {e}"),
        },
        source: Some(Box::new(e)),
    })
}
