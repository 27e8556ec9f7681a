//! Visa requirement lookups with a 24h cache per (passport, destination).
//!
//! Lookups are enrichment: a provider failure yields `None`, never an error.
//! Cache read failures are logged separately from misses and fall through to
//! a live fetch.

use std::{collections::HashMap, env, sync::Arc, time::Duration as StdDuration};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime as BsonDateTime},
    Client, Collection,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::visa::{VisaRequirement, VisaStatus};

const DEFAULT_CACHE_TTL_HOURS: i64 = 24;
const DEFAULT_VISA_API_URL: &str = "https://visa-requirement.p.rapidapi.com/v2/visa/check";
const DEFAULT_VISA_API_HOST: &str = "visa-requirement.p.rapidapi.com";

#[derive(Debug, Error)]
pub enum VisaError {
    #[error("missing credential: {0} is not set")]
    MissingCredential(String),
    #[error("visa request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("visa provider returned status {0}")]
    Status(u16),
    #[error("unexpected visa response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache storage error: {0}")]
    Storage(#[from] mongodb::error::Error),
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait VisaProvider: Send + Sync {
    async fn fetch(&self, passport: &str, destination: &str)
        -> Result<VisaRequirement, VisaError>;
}

#[async_trait]
pub trait VisaCacheStore: Send + Sync {
    async fn get(
        &self,
        passport: &str,
        destination: &str,
    ) -> Result<Option<VisaRequirement>, CacheError>;

    async fn put(
        &self,
        passport: &str,
        destination: &str,
        requirement: &VisaRequirement,
    ) -> Result<(), CacheError>;
}

#[derive(Debug, Clone)]
pub struct VisaConfig {
    pub api_url: String,
    pub api_host: String,
    pub api_key_env: String,
    pub cache_ttl: Duration,
    pub timeout: StdDuration,
}

impl Default for VisaConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_VISA_API_URL.to_string(),
            api_host: DEFAULT_VISA_API_HOST.to_string(),
            api_key_env: "VISA_API_KEY".to_string(),
            cache_ttl: Duration::hours(DEFAULT_CACHE_TTL_HOURS),
            timeout: StdDuration::from_secs(10),
        }
    }
}

impl VisaConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: env::var("VISA_API_URL").unwrap_or(defaults.api_url),
            api_host: env::var("VISA_API_HOST").unwrap_or(defaults.api_host),
            api_key_env: defaults.api_key_env,
            cache_ttl: env::var("VISA_CACHE_TTL_HOURS")
                .ok()
                .and_then(|s| s.trim().parse::<i64>().ok())
                .filter(|hours| *hours > 0)
                .and_then(Duration::try_hours)
                .unwrap_or(defaults.cache_ttl),
            timeout: defaults.timeout,
        }
    }
}

pub struct HttpVisaProvider {
    http: reqwest::Client,
    config: VisaConfig,
}

impl HttpVisaProvider {
    pub fn new(config: VisaConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl VisaProvider for HttpVisaProvider {
    async fn fetch(
        &self,
        passport: &str,
        destination: &str,
    ) -> Result<VisaRequirement, VisaError> {
        let api_key = env::var(&self.config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| VisaError::MissingCredential(self.config.api_key_env.clone()))?;

        let response = self
            .http
            .post(&self.config.api_url)
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", &self.config.api_host)
            .json(&json!({ "passport": passport, "destination": destination }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(VisaError::Status(status.as_u16()));
        }

        let body: Value = response.json().await?;
        parse_visa_response(destination, &body)
    }
}

/// Understands the nested `data.visa_rules` shape as well as a flat
/// `{status|category, duration, description}` body.
pub fn parse_visa_response(destination: &str, body: &Value) -> Result<VisaRequirement, VisaError> {
    let root = body.get("data").unwrap_or(body);

    if let Some(rules) = root.get("visa_rules") {
        let primary = rules
            .get("primary_rule")
            .ok_or_else(|| VisaError::InvalidResponse("missing primary_rule".to_string()))?;
        let name = primary.get("name").and_then(Value::as_str).unwrap_or("");
        let secondary = rules
            .pointer("/secondary_rule/name")
            .and_then(Value::as_str);

        let description = match secondary {
            Some(other) if !name.is_empty() => Some(format!("{} / {}", name, other)),
            Some(other) => Some(other.to_string()),
            None if !name.is_empty() => Some(name.to_string()),
            None => None,
        };

        return Ok(VisaRequirement {
            destination: destination.to_string(),
            status: VisaStatus::classify(name),
            validity_days: primary.get("duration").and_then(validity_days),
            description,
        });
    }

    let category = root
        .get("status")
        .or_else(|| root.get("category"))
        .and_then(Value::as_str)
        .ok_or_else(|| VisaError::InvalidResponse("no visa category".to_string()))?;

    Ok(VisaRequirement {
        destination: destination.to_string(),
        status: VisaStatus::classify(category),
        validity_days: root.get("duration").and_then(validity_days),
        description: root
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// `90`, `"90"` and `"90 days"` all read as 90.
fn validity_days(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s
            .split(|c: char| !c.is_ascii_digit())
            .find(|part| !part.is_empty())
            .and_then(|digits| digits.parse().ok()),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedVisa {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub passport: String,
    pub destination: String,
    pub requirement: VisaRequirement,
    pub cached_at: BsonDateTime,
    pub expires_at: BsonDateTime,
}

pub struct MongoVisaCache {
    client: Arc<Client>,
    ttl: Duration,
}

impl MongoVisaCache {
    pub fn new(client: Arc<Client>, ttl: Duration) -> Self {
        Self { client, ttl }
    }

    fn collection(&self) -> Collection<CachedVisa> {
        self.client.database("Travel").collection("VisaCache")
    }
}

#[async_trait]
impl VisaCacheStore for MongoVisaCache {
    async fn get(
        &self,
        passport: &str,
        destination: &str,
    ) -> Result<Option<VisaRequirement>, CacheError> {
        let filter = doc! {
            "passport": passport,
            "destination": destination,
            "expires_at": { "$gt": BsonDateTime::now() },
        };
        let cached = self.collection().find_one(filter).await?;
        Ok(cached.map(|entry| entry.requirement))
    }

    async fn put(
        &self,
        passport: &str,
        destination: &str,
        requirement: &VisaRequirement,
    ) -> Result<(), CacheError> {
        let now = BsonDateTime::now();
        let expires_at = BsonDateTime::from_millis(
            now.timestamp_millis()
                .saturating_add(self.ttl.num_milliseconds()),
        );
        let entry = CachedVisa {
            id: None,
            passport: passport.to_string(),
            destination: destination.to_string(),
            requirement: requirement.clone(),
            cached_at: now,
            expires_at,
        };

        self.collection()
            .replace_one(
                doc! { "passport": passport, "destination": destination },
                entry,
            )
            .upsert(true)
            .await?;
        Ok(())
    }
}

fn expiry_from_now(ttl: Duration) -> DateTime<Utc> {
    Utc::now()
        .checked_add_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// In-process cache, used when no database is configured.
pub struct MemoryVisaCache {
    ttl: Duration,
    entries: RwLock<HashMap<(String, String), (VisaRequirement, DateTime<Utc>)>>,
}

impl MemoryVisaCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl VisaCacheStore for MemoryVisaCache {
    async fn get(
        &self,
        passport: &str,
        destination: &str,
    ) -> Result<Option<VisaRequirement>, CacheError> {
        let key = (passport.to_string(), destination.to_string());
        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some((requirement, expires_at)) if *expires_at > Utc::now() => {
                    return Ok(Some(requirement.clone()));
                }
                None => return Ok(None),
                Some(_) => {}
            }
        }

        // Expired entries are removed on read.
        let mut entries = self.entries.write().await;
        if matches!(entries.get(&key), Some((_, expires_at)) if *expires_at <= Utc::now()) {
            entries.remove(&key);
        }
        Ok(None)
    }

    async fn put(
        &self,
        passport: &str,
        destination: &str,
        requirement: &VisaRequirement,
    ) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            (passport.to_string(), destination.to_string()),
            (requirement.clone(), expiry_from_now(self.ttl)),
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct VisaService {
    provider: Arc<dyn VisaProvider>,
    cache: Arc<dyn VisaCacheStore>,
}

impl VisaService {
    pub fn new(provider: Arc<dyn VisaProvider>, cache: Arc<dyn VisaCacheStore>) -> Self {
        Self { provider, cache }
    }

    pub async fn lookup(&self, passport: &str, destination: &str) -> Option<VisaRequirement> {
        let passport = passport.trim().to_uppercase();
        let destination = destination.trim().to_uppercase();
        if passport.is_empty() || destination.is_empty() {
            return None;
        }

        if passport == destination {
            return Some(VisaRequirement {
                destination,
                status: VisaStatus::VisaFree,
                validity_days: None,
                description: Some("Domestic travel".to_string()),
            });
        }

        match self.cache.get(&passport, &destination).await {
            Ok(Some(requirement)) => return Some(requirement),
            Ok(None) => log::debug!("Visa cache miss for {} -> {}", passport, destination),
            Err(e) => log::warn!(
                "Visa cache read error for {} -> {}, fetching live: {}",
                passport,
                destination,
                e
            ),
        }

        match self.provider.fetch(&passport, &destination).await {
            Ok(requirement) => {
                if let Err(e) = self.cache.put(&passport, &destination, &requirement).await {
                    log::warn!("Failed to cache visa requirement: {}", e);
                }
                Some(requirement)
            }
            Err(e) => {
                log::warn!(
                    "Visa lookup failed for {} -> {}: {}",
                    passport,
                    destination,
                    e
                );
                None
            }
        }
    }
}
