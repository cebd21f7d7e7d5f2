use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::CompletionConfig;
use crate::error::GenerationError;
use crate::generator::ScriptGenerator;
use crate::models::GenerationRequest;

const HTTP_REFERER: &str = "HTTP-Referer";
const X_TITLE: &str = "X-Title";

// Keep log lines short when echoing prompts and bodies
fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...[{} chars]", &text[..idx], text.chars().count()),
        None => text.to_string(),
    }
}

/// Chat-completion client for OpenRouter. One request per call, no retries.
pub struct OpenRouterClient {
    client: Client,
    config: CompletionConfig,
}

impl std::fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterClient").field("config", &self.config).finish()
    }
}

impl OpenRouterClient {
    pub fn new(config: CompletionConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| GenerationError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    pub async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self.config.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;

        let url = self.endpoint();
        info!("🔗 Requesting completion from {} (model={})", url, self.config.model);
        debug!("📤 Prompt: {}", preview(prompt, 200));

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
        };

        let response = self.client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .header(CONTENT_TYPE, "application/json")
            .header(HTTP_REFERER, &self.config.site_origin)
            .header(X_TITLE, &self.config.app_title)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("❌ Completion request failed: {}", e);
                GenerationError::Network(e.to_string())
            })?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        let body_text = response.text().await.map_err(|e| GenerationError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("❌ API Error response: {}", preview(&body_text, 500));
            let message = extract_error_message(&body_text).unwrap_or_else(|| {
                if body_text.trim().is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    body_text.clone()
                }
            });
            return Err(GenerationError::Api { message, status: status.as_u16(), body: body_text });
        }

        let content = extract_content(&body_text)?;
        info!("✅ Completion received ({} chars)", content.len());
        Ok(content)
    }
}

#[async_trait]
impl ScriptGenerator for OpenRouterClient {
    async fn generate(&self, prompt: &str, _request: &GenerationRequest) -> Result<String, GenerationError> {
        self.complete(prompt).await
    }

    fn name(&self) -> &'static str {
        "openrouter"
    }
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn extract_content(body: &str) -> Result<String, GenerationError> {
    let parsed: ChatResponse = serde_json::from_str(body).map_err(|e| {
        error!("❌ Unparseable completion envelope: {}", e);
        GenerationError::MalformedResponse
    })?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| {
            error!("⚠️ Completion envelope has no choice content");
            GenerationError::MalformedResponse
        })
}

fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok()?;

    if let Some(msg) = parsed
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(|message| message.as_str())
    {
        return Some(msg.to_string());
    }

    parsed.get("message").and_then(|message| message.as_str()).map(ToOwned::to_owned)
}
