//! Flight offers from the Amadeus self-service API.
//!
//! ## Setup
//! Set `AMADEUS_CLIENT_ID` and `AMADEUS_CLIENT_SECRET`. `AMADEUS_BASE_URL`
//! defaults to the test environment.

use std::{
    env,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::flight::{FlightOffer, FlightQuery};

const DEFAULT_BASE_URL: &str = "https://test.api.amadeus.com";
const DEFAULT_MAX_RESULTS: u32 = 20;
const DEFAULT_CURRENCY: &str = "USD";
// Refresh a little before the token actually expires.
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum FlightSearchError {
    #[error("missing credential: {0} is not set")]
    MissingCredential(String),
    #[error("flight request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("flight provider returned status {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("unexpected flight response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait FlightSearchProvider: Send + Sync {
    async fn search(&self, query: &FlightQuery) -> Result<Vec<FlightOffer>, FlightSearchError>;
}

#[derive(Debug, Clone)]
pub struct AmadeusConfig {
    pub base_url: String,
    pub max_results: u32,
    pub currency: String,
    pub timeout: Duration,
}

impl Default for AmadeusConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            currency: DEFAULT_CURRENCY.to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

impl AmadeusConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("AMADEUS_BASE_URL").unwrap_or(defaults.base_url),
            max_results: env::var("AMADEUS_MAX_RESULTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_results),
            currency: env::var("AMADEUS_CURRENCY").unwrap_or(defaults.currency),
            timeout: defaults.timeout,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

pub struct AmadeusClient {
    http: reqwest::Client,
    config: AmadeusConfig,
    token: Mutex<Option<AccessToken>>,
}

impl AmadeusClient {
    pub fn new(config: AmadeusConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            config,
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String, FlightSearchError> {
        let mut token = self.token.lock().await;
        if let Some(current) = token.as_ref() {
            if current.expires_at > Instant::now() {
                return Ok(current.value.clone());
            }
        }

        let client_id = require_env("AMADEUS_CLIENT_ID")?;
        let client_secret = require_env("AMADEUS_CLIENT_SECRET")?;

        let response = self
            .http
            .post(format!("{}/v1/security/oauth2/token", self.config.base_url))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FlightSearchError::Status {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        let fresh: TokenResponse = response.json().await?;
        let lifetime = fresh.expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS);
        let value = fresh.access_token.clone();
        *token = Some(AccessToken {
            value: fresh.access_token,
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });

        Ok(value)
    }
}

#[async_trait]
impl FlightSearchProvider for AmadeusClient {
    async fn search(&self, query: &FlightQuery) -> Result<Vec<FlightOffer>, FlightSearchError> {
        let token = self.access_token().await?;

        let mut params = vec![
            ("originLocationCode", query.origin.clone()),
            ("destinationLocationCode", query.destination.clone()),
            ("departureDate", query.departure_date.format("%Y-%m-%d").to_string()),
            ("adults", query.adults.to_string()),
            ("travelClass", query.cabin_class.as_str().to_string()),
            ("currencyCode", self.config.currency.clone()),
            ("max", self.config.max_results.to_string()),
        ];
        if let Some(return_date) = query.return_date {
            params.push(("returnDate", return_date.format("%Y-%m-%d").to_string()));
        }
        if query.children > 0 {
            params.push(("children", query.children.to_string()));
        }
        if query.infants > 0 {
            params.push(("infants", query.infants.to_string()));
        }

        let response = self
            .http
            .get(format!("{}/v2/shopping/flight-offers", self.config.base_url))
            .bearer_auth(token)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FlightSearchError::Status {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| FlightSearchError::InvalidResponse(e.to_string()))?;
        Ok(parse_offers(&value))
    }
}

fn require_env(name: &str) -> Result<String, FlightSearchError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| FlightSearchError::MissingCredential(name.to_string()))
}

/// Offers from a `{"data": [...]}` body. Entries that don't match the offer
/// shape are skipped rather than failing the whole page.
pub fn parse_offers(body: &Value) -> Vec<FlightOffer> {
    body.get("data")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match serde_json::from_value::<FlightOffer>(item.clone()) {
                    Ok(offer) => Some(offer),
                    Err(e) => {
                        log::debug!("Skipping unreadable flight offer: {}", e);
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

fn error_detail(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/errors/0/detail")
                .or_else(|| v.get("error_description"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}
