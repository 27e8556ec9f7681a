use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Traveller profile keyed by the auth provider's subject id.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub user_id: String,
    pub display_name: Option<String>,
    pub home_airport: Option<String>,
    pub passport_country: Option<String>,
    pub preferred_currency: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub home_airport: Option<String>,
    pub passport_country: Option<String>,
    pub preferred_currency: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl ProfileUpdate {
    pub fn into_profile(self, user_id: &str) -> UserProfile {
        UserProfile {
            user_id: user_id.to_string(),
            display_name: self.display_name,
            home_airport: self.home_airport.map(|code| code.trim().to_uppercase()),
            passport_country: self.passport_country.map(|code| code.trim().to_uppercase()),
            preferred_currency: self.preferred_currency.map(|code| code.trim().to_uppercase()),
            interests: self.interests,
            updated_at: Some(Utc::now()),
        }
    }
}
