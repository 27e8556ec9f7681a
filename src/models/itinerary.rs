use chrono::{DateTime, NaiveDate, Utc};
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::trip::ItineraryPlan;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SavedItinerary {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub title: String,
    pub destination: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub plan: ItineraryPlan,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /api/itineraries`. The owner comes from the token, never
/// from the payload.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ItinerarySubmission {
    pub title: Option<String>,
    pub destination: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub plan: ItineraryPlan,
}

impl ItinerarySubmission {
    pub fn into_saved(self, user_id: &str) -> SavedItinerary {
        let now = Utc::now();
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| format!("Trip to {}", self.destination));

        SavedItinerary {
            id: None,
            user_id: user_id.to_string(),
            title,
            destination: self.destination,
            start_date: self.start_date,
            end_date: self.end_date,
            plan: self.plan,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}
