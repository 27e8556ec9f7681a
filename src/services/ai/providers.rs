//! Concrete completion backends.
//!
//! Two wire formats cover every provider we talk to: the OpenAI-style
//! `chat/completions` shape (Groq, OpenRouter, DeepSeek) and Google's
//! `generateContent`. Keys are looked up from the environment on every call so
//! rotating a credential does not need a restart.

use std::{env, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{AiRouter, CompletionProvider, ProviderError};
use crate::models::chat::{ChatRole, CompletionRequest};

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_GENERAL_ORDER: &str = "groq,gemini,openrouter";
const DEFAULT_REASONING_ORDER: &str = "deepseek,gemini-pro";
const TEMPERATURE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAiCompatible,
    Gemini,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub name: String,
    pub kind: ProviderKind,
    pub endpoint: String,
    pub model: String,
    pub api_key_env: String,
}

impl ProviderConfig {
    /// Known provider presets. Model names can be overridden per provider.
    pub fn preset(name: &str) -> Option<Self> {
        let (kind, endpoint, model_env, default_model, api_key_env) = match name {
            "groq" => (
                ProviderKind::OpenAiCompatible,
                "https://api.groq.com/openai/v1/chat/completions",
                "GROQ_MODEL",
                "llama-3.3-70b-versatile",
                "GROQ_API_KEY",
            ),
            "openrouter" => (
                ProviderKind::OpenAiCompatible,
                "https://openrouter.ai/api/v1/chat/completions",
                "OPENROUTER_MODEL",
                "meta-llama/llama-3.3-70b-instruct",
                "OPENROUTER_API_KEY",
            ),
            "deepseek" => (
                ProviderKind::OpenAiCompatible,
                "https://api.deepseek.com/chat/completions",
                "DEEPSEEK_MODEL",
                "deepseek-reasoner",
                "DEEPSEEK_API_KEY",
            ),
            "gemini" => (
                ProviderKind::Gemini,
                "https://generativelanguage.googleapis.com/v1beta/models",
                "GEMINI_MODEL",
                "gemini-2.0-flash",
                "GEMINI_API_KEY",
            ),
            "gemini-pro" => (
                ProviderKind::Gemini,
                "https://generativelanguage.googleapis.com/v1beta/models",
                "GEMINI_PRO_MODEL",
                "gemini-2.5-pro",
                "GEMINI_API_KEY",
            ),
            _ => return None,
        };

        Some(Self {
            name: name.to_string(),
            kind,
            endpoint: endpoint.to_string(),
            model: env::var(model_env).unwrap_or_else(|_| default_model.to_string()),
            api_key_env: api_key_env.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub general: Vec<ProviderConfig>,
    pub reasoning: Vec<ProviderConfig>,
    pub timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            general: parse_order(DEFAULT_GENERAL_ORDER),
            reasoning: parse_order(DEFAULT_REASONING_ORDER),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AiConfig {
    /// Provider order from `AI_GENERAL_PROVIDERS` / `AI_REASONING_PROVIDERS`
    /// (comma separated preset names), falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            general: env::var("AI_GENERAL_PROVIDERS")
                .ok()
                .map(|s| parse_order(&s))
                .filter(|list| !list.is_empty())
                .unwrap_or(defaults.general),
            reasoning: env::var("AI_REASONING_PROVIDERS")
                .ok()
                .map(|s| parse_order(&s))
                .filter(|list| !list.is_empty())
                .unwrap_or(defaults.reasoning),
            timeout: env::var("AI_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

fn parse_order(order: &str) -> Vec<ProviderConfig> {
    order
        .split(',')
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .filter_map(|name| {
            let preset = ProviderConfig::preset(&name);
            if preset.is_none() {
                log::warn!("Ignoring unknown AI provider '{}'", name);
            }
            preset
        })
        .collect()
}

/// Build the general and reasoning-first routers from configuration.
pub fn build_routers(config: &AiConfig) -> Result<(AiRouter, AiRouter), reqwest::Error> {
    let http = reqwest::Client::builder().timeout(config.timeout).build()?;
    let build = |configs: &[ProviderConfig]| {
        AiRouter::new(
            configs
                .iter()
                .map(|c| HttpCompletionProvider::new(http.clone(), c.clone()))
                .map(|p| Arc::new(p) as Arc<dyn CompletionProvider>)
                .collect(),
        )
    };
    Ok((build(&config.general), build(&config.reasoning)))
}

pub struct HttpCompletionProvider {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl HttpCompletionProvider {
    pub fn new(http: reqwest::Client, config: ProviderConfig) -> Self {
        Self { http, config }
    }

    fn api_key(&self) -> Result<String, ProviderError> {
        env::var(&self.config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ProviderError::MissingCredential(self.config.api_key_env.clone()))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, ProviderError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate(&body, 300),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| ProviderError::Provider(format!("unreadable response body: {}", e)))
    }
}

#[async_trait]
impl CompletionProvider for HttpCompletionProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;

        match self.config.kind {
            ProviderKind::OpenAiCompatible => {
                let body = openai_body(&self.config.model, request);
                let builder = self
                    .http
                    .post(&self.config.endpoint)
                    .bearer_auth(api_key)
                    .json(&body);
                let value = self.send(builder).await?;
                openai_text(&value)
            }
            ProviderKind::Gemini => {
                let url = format!(
                    "{}/{}:generateContent",
                    self.config.endpoint.trim_end_matches('/'),
                    self.config.model
                );
                let body = gemini_body(request);
                let builder = self
                    .http
                    .post(url)
                    .query(&[("key", api_key)])
                    .json(&body);
                let value = self.send(builder).await?;
                gemini_text(&value)
            }
        }
    }
}

/// System instruction with the traveller context appended, if any.
pub fn system_text(request: &CompletionRequest) -> Option<String> {
    let context = request
        .context
        .as_ref()
        .and_then(|c| serde_json::to_string(c).ok());

    match (&request.system_instruction, context) {
        (Some(instruction), Some(context)) => {
            Some(format!("{}\n\nTraveller context: {}", instruction, context))
        }
        (Some(instruction), None) => Some(instruction.clone()),
        (None, Some(context)) => Some(format!("Traveller context: {}", context)),
        (None, None) => None,
    }
}

pub fn openai_body(model: &str, request: &CompletionRequest) -> Value {
    let mut messages = Vec::with_capacity(request.history.len() + 2);
    if let Some(system) = system_text(request) {
        messages.push(json!({ "role": "system", "content": system }));
    }
    for message in &request.history {
        messages.push(json!({ "role": message.role.as_str(), "content": message.content }));
    }
    messages.push(json!({ "role": "user", "content": request.prompt }));

    json!({
        "model": model,
        "messages": messages,
        "temperature": TEMPERATURE,
    })
}

pub fn openai_text(value: &Value) -> Result<String, ProviderError> {
    if let Some(error) = value.get("error") {
        return Err(ProviderError::Provider(error_message(error)));
    }

    value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or(ProviderError::EmptyResponse)
}

pub fn gemini_body(request: &CompletionRequest) -> Value {
    let mut contents = Vec::with_capacity(request.history.len() + 1);
    for message in &request.history {
        let role = match message.role {
            ChatRole::Assistant => "model",
            // Gemini only knows user/model turns; system notes ride as user text.
            ChatRole::User | ChatRole::System => "user",
        };
        contents.push(json!({ "role": role, "parts": [{ "text": message.content }] }));
    }
    contents.push(json!({ "role": "user", "parts": [{ "text": request.prompt }] }));

    let mut body = json!({
        "contents": contents,
        "generationConfig": { "temperature": TEMPERATURE },
    });
    if let Some(system) = system_text(request) {
        body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }
    body
}

pub fn gemini_text(value: &Value) -> Result<String, ProviderError> {
    if let Some(error) = value.get("error") {
        return Err(ProviderError::Provider(error_message(error)));
    }

    let text = value
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(text.to_string())
}

fn error_message(error: &Value) -> String {
    error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}
