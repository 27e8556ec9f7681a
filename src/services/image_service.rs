use std::{env, sync::Arc, time::Duration};

use mongodb::{
    bson::{doc, DateTime as BsonDateTime},
    Client, Collection,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::travel_info::DestinationImage;

const UNSPLASH_SEARCH_URL: &str = "https://api.unsplash.com/search/photos";

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("missing credential: {0} is not set")]
    MissingCredential(String),
    #[error("image request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("no photo found for {0}")]
    NotFound(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedImage {
    #[serde(rename = "_id")]
    query: String,
    image: DestinationImage,
    cached_at: BsonDateTime,
}

#[derive(Clone)]
pub struct ImageService {
    http: reqwest::Client,
    client: Option<Arc<Client>>,
}

impl ImageService {
    /// Without a database client every lookup goes straight to the API.
    pub fn new(timeout: Duration, client: Option<Arc<Client>>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, client })
    }

    fn collection(&self) -> Option<Collection<CachedImage>> {
        self.client
            .as_ref()
            .map(|client| client.database("Travel").collection("ImageCache"))
    }

    pub async fn destination_image(&self, query: &str) -> Option<DestinationImage> {
        let key = normalize_query(query);
        if key.is_empty() {
            return None;
        }

        if let Some(collection) = self.collection() {
            match collection.find_one(doc! { "_id": key.as_str() }).await {
                Ok(Some(cached)) => return Some(cached.image),
                Ok(None) => log::debug!("Image cache miss for '{}'", key),
                Err(e) => log::warn!("Image cache read error for '{}': {}", key, e),
            }
        }

        let image = match self.search(&key).await {
            Ok(image) => image,
            Err(e) => {
                log::warn!("Image lookup failed for '{}': {}", key, e);
                return None;
            }
        };

        if let Some(collection) = self.collection() {
            let entry = CachedImage {
                query: key.clone(),
                image: image.clone(),
                cached_at: BsonDateTime::now(),
            };
            if let Err(e) = collection
                .replace_one(doc! { "_id": key.as_str() }, entry)
                .upsert(true)
                .await
            {
                log::warn!("Failed to cache image for '{}': {}", key, e);
            }
        }

        Some(image)
    }

    async fn search(&self, query: &str) -> Result<DestinationImage, ImageError> {
        let access_key = env::var("UNSPLASH_ACCESS_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ImageError::MissingCredential("UNSPLASH_ACCESS_KEY".to_string()))?;

        let body: Value = self
            .http
            .get(UNSPLASH_SEARCH_URL)
            .header("Authorization", format!("Client-ID {}", access_key))
            .query(&[
                ("query", query),
                ("per_page", "1"),
                ("orientation", "landscape"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_photo(query, &body).ok_or_else(|| ImageError::NotFound(query.to_string()))
    }
}

fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn parse_photo(query: &str, body: &Value) -> Option<DestinationImage> {
    let photo = body.pointer("/results/0")?;
    let url = photo
        .pointer("/urls/regular")
        .or_else(|| photo.pointer("/urls/full"))
        .and_then(Value::as_str)?;

    Some(DestinationImage {
        query: query.to_string(),
        url: url.to_string(),
        photographer: photo
            .pointer("/user/name")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_photo() {
        let body = json!({
            "total": 1,
            "results": [{
                "urls": {"full": "https://images.example/full.jpg", "regular": "https://images.example/regular.jpg"},
                "user": {"name": "Ana"}
            }]
        });

        let image = parse_photo("lisbon", &body).unwrap();
        assert_eq!(image.url, "https://images.example/regular.jpg");
        assert_eq!(image.photographer.as_deref(), Some("Ana"));
        assert!(parse_photo("lisbon", &json!({"total": 0, "results": []})).is_none());
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  Kyoto   Japan "), "kyoto japan");
    }
}
