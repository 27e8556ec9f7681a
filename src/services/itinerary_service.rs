use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Client, Collection,
};
use thiserror::Error;

use crate::models::itinerary::SavedItinerary;
use crate::models::user::UserProfile;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("invalid id: {0}")]
    InvalidId(String),
}

/// Saved itineraries. Every read and delete is scoped to the owner.
#[async_trait]
pub trait ItineraryStore: Send + Sync {
    async fn save(&self, itinerary: SavedItinerary) -> Result<SavedItinerary, StoreError>;
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<SavedItinerary>, StoreError>;
    async fn get(&self, user_id: &str, id: &str) -> Result<Option<SavedItinerary>, StoreError>;
    /// `false` when nothing owned by `user_id` had that id.
    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;
    async fn upsert(&self, profile: UserProfile) -> Result<UserProfile, StoreError>;
}

fn parse_object_id(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))
}

pub struct MongoItineraryStore {
    client: Arc<Client>,
}

impl MongoItineraryStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    fn collection(&self) -> Collection<SavedItinerary> {
        self.client.database("Travel").collection("Itineraries")
    }
}

#[async_trait]
impl ItineraryStore for MongoItineraryStore {
    async fn save(&self, mut itinerary: SavedItinerary) -> Result<SavedItinerary, StoreError> {
        let result = self.collection().insert_one(&itinerary).await?;
        itinerary.id = result.inserted_id.as_object_id();
        Ok(itinerary)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<SavedItinerary>, StoreError> {
        let cursor = self
            .collection()
            .find(doc! { "user_id": user_id })
            .sort(doc! { "created_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn get(&self, user_id: &str, id: &str) -> Result<Option<SavedItinerary>, StoreError> {
        let oid = parse_object_id(id)?;
        Ok(self
            .collection()
            .find_one(doc! { "_id": oid, "user_id": user_id })
            .await?)
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, StoreError> {
        let oid = parse_object_id(id)?;
        let result = self
            .collection()
            .delete_one(doc! { "_id": oid, "user_id": user_id })
            .await?;
        Ok(result.deleted_count > 0)
    }
}

pub struct MongoProfileStore {
    client: Arc<Client>,
}

impl MongoProfileStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    fn collection(&self) -> Collection<UserProfile> {
        self.client.database("Travel").collection("Profiles")
    }
}

#[async_trait]
impl ProfileStore for MongoProfileStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.collection().find_one(doc! { "_id": user_id }).await?)
    }

    async fn upsert(&self, profile: UserProfile) -> Result<UserProfile, StoreError> {
        self.collection()
            .replace_one(doc! { "_id": profile.user_id.as_str() }, &profile)
            .upsert(true)
            .await?;
        Ok(profile)
    }
}
