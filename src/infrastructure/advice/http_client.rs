use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ports::{AdviceClient, AdviceClientError};
use crate::domain::{Advice, AnalysisResult};

const SYSTEM_PROMPT: &str = "You are an experienced public speaking coach. You receive the \
metrics of an analyzed recording and reply with specific, friendly advice. Respond with a \
single JSON object with the fields: summary (string), strengths (array of strings), \
improvements (array of strings), recommendations (array of strings). No other text.";

/// OpenAI-compatible chat-completions adapter for the advisory stage.
pub struct HttpAdviceClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct AdvicePayload {
    summary: String,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    improvements: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
}

impl HttpAdviceClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_tokens: usize,
        temperature: f32,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens,
            temperature,
        }
    }

    fn build_messages(&self, result: &AnalysisResult) -> Vec<ChatMessage> {
        let top_fillers = result
            .filler_words
            .by_lexeme
            .iter()
            .map(|(lexeme, count)| format!("\"{lexeme}\" x{count}"))
            .collect::<Vec<_>>()
            .join(", ");

        let user_content = format!(
            "Recording: {:.1}s total, {:.1}s of speech (ratio {:.2}), language {}.\n\
             Words: {} at {:.1} per minute.\n\
             Fillers: {} total ({:.1} per 100 words){}.\n\
             Pauses: {} (avg {:.1}s, max {:.1}s).\n\
             Phrases: {} averaging {:.1} words.",
            result.duration_sec,
            result.speaking_time_sec,
            result.speaking_ratio,
            result.language,
            result.words_total,
            result.words_per_minute,
            result.filler_words.total,
            result.filler_words.per_100_words,
            if top_fillers.is_empty() {
                String::new()
            } else {
                format!(": {top_fillers}")
            },
            result.pauses.count,
            result.pauses.avg_sec,
            result.pauses.max_sec,
            result.phrases.count,
            result.phrases.avg_words,
        );

        vec![
            ChatMessage {
                role: "system".to_string(),
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: user_content,
            },
        ]
    }
}

#[async_trait]
impl AdviceClient for HttpAdviceClient {
    async fn request_advice(&self, result: &AnalysisResult) -> Result<Advice, AdviceClientError> {
        let request_body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: self.build_messages(result),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AdviceClientError::ApiRequestFailed(e.to_string()))?;

        match response.status() {
            reqwest::StatusCode::TOO_MANY_REQUESTS => return Err(AdviceClientError::RateLimited),
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                return Err(AdviceClientError::Unauthorized);
            }
            reqwest::StatusCode::BAD_REQUEST => {
                let body = response.text().await.unwrap_or_default();
                return Err(AdviceClientError::BadRequest(body));
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(AdviceClientError::ApiRequestFailed(format!(
                    "HTTP {status}: {body}"
                )));
            }
            _ => {}
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AdviceClientError::InvalidResponse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AdviceClientError::InvalidResponse("empty choices".to_string()))?;

        let payload = parse_advice_payload(&content)?;
        debug!(model = %self.model, "advisory response parsed");
        Ok(Advice {
            summary: payload.summary,
            strengths: payload.strengths,
            improvements: payload.improvements,
            recommendations: payload.recommendations,
            degraded: false,
        })
    }
}

/// Models often wrap their JSON in prose or a markdown fence; extract the
/// outermost object before parsing.
fn parse_advice_payload(content: &str) -> Result<AdvicePayload, AdviceClientError> {
    if let Ok(payload) = serde_json::from_str(content) {
        return Ok(payload);
    }

    let stripped = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    if let Ok(payload) = serde_json::from_str(stripped) {
        return Ok(payload);
    }

    let start = stripped.find('{');
    let end = stripped.rfind('}');
    if let (Some(start), Some(end)) = (start, end) {
        if start < end {
            if let Ok(payload) = serde_json::from_str(&stripped[start..=end]) {
                return Ok(payload);
            }
        }
    }
    Err(AdviceClientError::InvalidResponse(
        "response does not contain an advice object".to_string(),
    ))
}
