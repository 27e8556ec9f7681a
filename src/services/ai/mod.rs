//! AI completion routing
//!
//! Wraps several interchangeable generative-AI backends behind one
//! [`AiRouter`]. Providers are tried strictly in the order they were given;
//! the first one that answers wins and the rest are never contacted.

pub mod extract;
pub mod prompts;
pub mod providers;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::chat::CompletionRequest;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("missing credential: {0} is not set")]
    MissingCredential(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("provider error: {0}")]
    Provider(String),
    #[error("provider returned no content")]
    EmptyResponse,
}

/// One failed attempt inside the chain.
#[derive(Debug)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: ProviderError,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.error)
    }
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("all AI services unavailable ({} attempted)", .0.len())]
    AllProvidersFailed(Vec<ProviderFailure>),
    #[error("no AI providers configured")]
    NoProviders,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}

#[derive(Clone)]
pub struct AiRouter {
    providers: Vec<Arc<dyn CompletionProvider>>,
}

impl AiRouter {
    pub fn new(providers: Vec<Arc<dyn CompletionProvider>>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub async fn complete_prompt(&self, prompt: &str) -> Result<String, AiError> {
        self.complete(&CompletionRequest::new(prompt)).await
    }

    /// Try each provider once, in order. No retries, no backoff.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError> {
        if self.providers.is_empty() {
            return Err(AiError::NoProviders);
        }

        let mut failures = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            match provider.complete(request).await {
                Ok(text) => {
                    if !failures.is_empty() {
                        log::info!(
                            "AI completion served by {} after {} failed provider(s)",
                            provider.name(),
                            failures.len()
                        );
                    }
                    return Ok(text);
                }
                Err(error) => {
                    log::warn!("AI provider {} failed: {}", provider.name(), error);
                    failures.push(ProviderFailure {
                        provider: provider.name().to_string(),
                        error,
                    });
                }
            }
        }

        log::error!(
            "All AI providers failed: {}",
            failures
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        );
        Err(AiError::AllProvidersFailed(failures))
    }

    /// Run this chain, then `fallback` only if every provider here failed.
    pub async fn complete_with_fallback(
        &self,
        request: &CompletionRequest,
        fallback: &AiRouter,
    ) -> Result<String, AiError> {
        match self.complete(request).await {
            Ok(text) => Ok(text),
            Err(primary) => {
                log::warn!("Primary AI chain exhausted ({}), using fallback chain", primary);
                match fallback.complete(request).await {
                    Ok(text) => Ok(text),
                    Err(AiError::AllProvidersFailed(mut later)) => {
                        let mut failures = match primary {
                            AiError::AllProvidersFailed(earlier) => earlier,
                            AiError::NoProviders => Vec::new(),
                        };
                        failures.append(&mut later);
                        Err(AiError::AllProvidersFailed(failures))
                    }
                    Err(AiError::NoProviders) => Err(primary),
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedProvider;
    use super::*;
    use std::sync::Mutex;

    #[actix_rt::test]
    async fn test_all_failing_providers_are_tried_in_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let router = AiRouter::new(vec![
            ScriptedProvider::failing("a", &calls),
            ScriptedProvider::failing("b", &calls),
            ScriptedProvider::failing("c", &calls),
        ]);

        let result = router.complete_prompt("hello").await;

        match result {
            Err(AiError::AllProvidersFailed(failures)) => {
                let names: Vec<_> = failures.iter().map(|f| f.provider.as_str()).collect();
                assert_eq!(names, vec!["a", "b", "c"]);
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
        assert_eq!(*calls.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[actix_rt::test]
    async fn test_first_success_stops_the_chain() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let router = AiRouter::new(vec![
            ScriptedProvider::failing("a", &calls),
            ScriptedProvider::ok("b", "from b", &calls),
            ScriptedProvider::ok("c", "from c", &calls),
        ]);

        let text = router.complete_prompt("hello").await.unwrap();

        assert_eq!(text, "from b");
        assert_eq!(*calls.lock().unwrap(), vec!["a", "b"]);
    }

    #[actix_rt::test]
    async fn test_empty_router_reports_no_providers() {
        let router = AiRouter::new(Vec::new());
        assert!(matches!(
            router.complete_prompt("hello").await,
            Err(AiError::NoProviders)
        ));
    }

    #[actix_rt::test]
    async fn test_fallback_chain_runs_only_after_primary_exhausted() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let primary = AiRouter::new(vec![
            ScriptedProvider::failing("deep", &calls),
            ScriptedProvider::failing("pro", &calls),
        ]);
        let general = AiRouter::new(vec![ScriptedProvider::ok("fast", "ok", &calls)]);

        let text = primary
            .complete_with_fallback(&CompletionRequest::new("plan"), &general)
            .await
            .unwrap();

        assert_eq!(text, "ok");
        assert_eq!(*calls.lock().unwrap(), vec!["deep", "pro", "fast"]);
    }

    #[actix_rt::test]
    async fn test_fallback_exhaustion_reports_every_attempt() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let primary = AiRouter::new(vec![ScriptedProvider::failing("deep", &calls)]);
        let general = AiRouter::new(vec![ScriptedProvider::failing("fast", &calls)]);

        let err = primary
            .complete_with_fallback(&CompletionRequest::new("plan"), &general)
            .await
            .unwrap_err();

        match err {
            AiError::AllProvidersFailed(failures) => assert_eq!(failures.len(), 2),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
