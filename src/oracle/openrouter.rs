use super::traits::Oracle;
use crate::error::OracleError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Chat-completions oracle over the OpenAI wire format.
///
/// OpenRouter is the primary backend; any compatible endpoint (Cerebras, a
/// self-hosted gateway, a mock server in tests) works through
/// [`OpenRouterOracle::with_base_url`]. One configured client is reused
/// across calls; model and temperature are fixed at construction so every
/// core operation sees the same oracle settings.
pub struct OpenRouterOracle {
    provider: String,
    /// Pre-computed `"Bearer <key>"` header value (avoids `format!` per request).
    cached_auth_header: Option<String>,
    client: Client,
    base_url: String,
    model: String,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenRouterOracle {
    pub fn new(api_key: Option<&str>, model: &str, temperature: f64) -> Self {
        Self::with_base_url("openrouter", OPENROUTER_BASE_URL, api_key, model, temperature)
    }

    /// Point the client at any OpenAI-compatible endpoint.
    pub fn with_base_url(
        provider: &str,
        base_url: &str,
        api_key: Option<&str>,
        model: &str,
        temperature: f64,
    ) -> Self {
        Self {
            provider: provider.to_string(),
            cached_auth_header: api_key.map(|k| format!("Bearer {k}")),
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .connect_timeout(std::time::Duration::from_secs(10))
                .pool_max_idle_per_host(10)
                .pool_idle_timeout(std::time::Duration::from_secs(90))
                .tcp_keepalive(std::time::Duration::from_secs(60))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature,
        }
    }

    fn build_request(&self, system_prompt: Option<&str>, prompt: &str) -> ChatRequest {
        let capacity = if system_prompt.is_some() { 2 } else { 1 };
        let mut messages = Vec::with_capacity(capacity);

        if let Some(sys) = system_prompt {
            messages.push(Message {
                role: "system",
                content: sys.to_string(),
            });
        }

        messages.push(Message {
            role: "user",
            content: prompt.to_string(),
        });

        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
        }
    }

    fn unavailable(&self, message: impl Into<String>) -> anyhow::Error {
        OracleError::Unavailable {
            provider: self.provider.clone(),
            message: message.into(),
        }
        .into()
    }

    async fn call_api(
        &self,
        system_prompt: Option<&str>,
        prompt: &str,
    ) -> anyhow::Result<ChatResponse> {
        let auth_header = self.cached_auth_header.as_ref().ok_or_else(|| {
            anyhow::Error::from(OracleError::MissingApiKey {
                provider: self.provider.clone(),
            })
        })?;

        let request = self.build_request(system_prompt, prompt);
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", auth_header)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.trim().chars().take(200).collect();
            return Err(self.unavailable(format!("status {status}: {snippet}")));
        }

        response
            .json()
            .await
            .map_err(|e| self.unavailable(format!("invalid completion envelope: {e}")))
    }

    fn extract_text(&self, chat_response: ChatResponse) -> anyhow::Result<String> {
        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| self.unavailable("empty completion response"))
    }
}

impl Oracle for OpenRouterOracle {
    fn name(&self) -> &str {
        &self.provider
    }

    fn complete_with_system<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let chat_response = self.call_api(system_prompt, prompt).await?;
            self.extract_text(chat_response)
        })
    }

    fn warmup(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        // Establish TLS + HTTP/2 before the first real completion so a cold
        // start does not eat into the request timeout.
        Box::pin(async move {
            if let Some(auth_header) = self.cached_auth_header.as_ref() {
                self.client
                    .get(format!("{}/models", self.base_url))
                    .header("Authorization", auth_header)
                    .send()
                    .await?
                    .error_for_status()?;
            }
            Ok(())
        })
    }
}
