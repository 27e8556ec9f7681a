#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use mongodb::bson::oid::ObjectId;

use wayfinder_api::middleware::auth::Claims;
use wayfinder_api::models::chat::CompletionRequest;
use wayfinder_api::models::flight::{
    FlightEndpoint, FlightItinerary, FlightOffer, FlightPrice, FlightQuery, FlightSegment,
};
use wayfinder_api::models::itinerary::SavedItinerary;
use wayfinder_api::models::user::UserProfile;
use wayfinder_api::models::visa::{VisaRequirement, VisaStatus};
use wayfinder_api::services::ai::{AiRouter, CompletionProvider, ProviderError};
use wayfinder_api::services::flight_service::{FlightSearchError, FlightSearchProvider};
use wayfinder_api::services::image_service::ImageService;
use wayfinder_api::services::itinerary_service::{ItineraryStore, ProfileStore, StoreError};
use wayfinder_api::services::smart_layover_service::{LayoverConfig, SmartLayoverSearch};
use wayfinder_api::services::travel_info_service::TravelInfoService;
use wayfinder_api::services::trip_planner_service::TripPlanner;
use wayfinder_api::services::visa_service::{
    MemoryVisaCache, VisaError, VisaProvider, VisaService,
};
use wayfinder_api::state::AppState;

pub const JWT_SECRET: &str = "test-secret";

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/* AI */

pub struct StubCompletion {
    name: String,
    reply: Option<String>,
    log: CallLog,
}

impl StubCompletion {
    pub fn ok(name: &str, reply: &str, log: &CallLog) -> Arc<dyn CompletionProvider> {
        Arc::new(Self {
            name: name.to_string(),
            reply: Some(reply.to_string()),
            log: log.clone(),
        })
    }

    pub fn failing(name: &str, log: &CallLog) -> Arc<dyn CompletionProvider> {
        Arc::new(Self {
            name: name.to_string(),
            reply: None,
            log: log.clone(),
        })
    }
}

#[async_trait]
impl CompletionProvider for StubCompletion {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<String, ProviderError> {
        self.log.lock().unwrap().push(self.name.clone());
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(ProviderError::Status {
                status: 429,
                body: "rate limited".to_string(),
            }),
        }
    }
}

/* Flights */

/// Offers keyed by "ORIGIN-DEST". Routes not listed return no offers; routes
/// in `failing` return an upstream error. Every query is logged as
/// "ORIGIN-DEST@YYYY-MM-DD".
#[derive(Default)]
pub struct StubFlights {
    pub routes: HashMap<String, Vec<FlightOffer>>,
    pub failing: Vec<String>,
    pub log: CallLog,
}

impl StubFlights {
    pub fn route(mut self, key: &str, offers: Vec<FlightOffer>) -> Self {
        self.routes.insert(key.to_string(), offers);
        self
    }

    pub fn failing(mut self, key: &str) -> Self {
        self.failing.push(key.to_string());
        self
    }
}

#[async_trait]
impl FlightSearchProvider for StubFlights {
    async fn search(&self, query: &FlightQuery) -> Result<Vec<FlightOffer>, FlightSearchError> {
        let key = format!("{}-{}", query.origin, query.destination);
        self.log
            .lock()
            .unwrap()
            .push(format!("{}@{}", key, query.departure_date));

        if self.failing.contains(&key) {
            return Err(FlightSearchError::Status {
                status: 500,
                detail: "upstream exploded".to_string(),
            });
        }
        Ok(self.routes.get(&key).cloned().unwrap_or_default())
    }
}

pub fn offer(id: &str, from: &str, to: &str, depart: &str, arrive: &str, price: &str) -> FlightOffer {
    FlightOffer {
        id: id.to_string(),
        price: FlightPrice {
            total: price.to_string(),
            currency: "USD".to_string(),
        },
        itineraries: vec![FlightItinerary {
            duration: None,
            segments: vec![FlightSegment {
                departure: FlightEndpoint {
                    iata_code: from.to_string(),
                    at: depart.to_string(),
                },
                arrival: FlightEndpoint {
                    iata_code: to.to_string(),
                    at: arrive.to_string(),
                },
                carrier_code: "XX".to_string(),
                number: "100".to_string(),
                duration: None,
            }],
        }],
        is_smart_layover: false,
        layover_city: None,
        layover_duration: None,
        layover_visa: None,
    }
}

/* Visa */

pub struct StubVisa {
    pub log: CallLog,
}

#[async_trait]
impl VisaProvider for StubVisa {
    async fn fetch(
        &self,
        passport: &str,
        destination: &str,
    ) -> Result<VisaRequirement, VisaError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}->{}", passport, destination));
        if destination == "ZZ" {
            return Err(VisaError::Status(503));
        }
        Ok(VisaRequirement {
            destination: destination.to_string(),
            status: VisaStatus::VisaFree,
            validity_days: Some(30),
            description: None,
        })
    }
}

/* Persistence */

#[derive(Default)]
pub struct MemoryItineraries {
    items: Mutex<Vec<SavedItinerary>>,
}

#[async_trait]
impl ItineraryStore for MemoryItineraries {
    async fn save(&self, mut itinerary: SavedItinerary) -> Result<SavedItinerary, StoreError> {
        itinerary.id = Some(ObjectId::new());
        self.items.lock().unwrap().push(itinerary.clone());
        Ok(itinerary)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<SavedItinerary>, StoreError> {
        let mut mine: Vec<_> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }

    async fn get(&self, user_id: &str, id: &str) -> Result<Option<SavedItinerary>, StoreError> {
        let oid = ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))?;
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == Some(oid) && i.user_id == user_id)
            .cloned())
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, StoreError> {
        let oid = ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))?;
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|i| !(i.id == Some(oid) && i.user_id == user_id));
        Ok(items.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryProfiles {
    profiles: Mutex<HashMap<String, UserProfile>>,
}

#[async_trait]
impl ProfileStore for MemoryProfiles {
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.profiles.lock().unwrap().get(user_id).cloned())
    }

    async fn upsert(&self, profile: UserProfile) -> Result<UserProfile, StoreError> {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.user_id.clone(), profile.clone());
        Ok(profile)
    }
}

/* App */

pub struct TestState {
    pub general: Vec<Arc<dyn CompletionProvider>>,
    pub reasoning: Vec<Arc<dyn CompletionProvider>>,
    pub flights: StubFlights,
    pub hubs: Vec<&'static str>,
    pub visa_log: CallLog,
    pub with_stores: bool,
}

impl Default for TestState {
    fn default() -> Self {
        Self {
            general: Vec::new(),
            reasoning: Vec::new(),
            flights: StubFlights::default(),
            hubs: vec!["DXB", "DOH"],
            visa_log: call_log(),
            with_stores: true,
        }
    }
}

impl TestState {
    pub fn build(self) -> AppState {
        let visa = VisaService::new(
            Arc::new(StubVisa { log: self.visa_log }),
            Arc::new(MemoryVisaCache::new(chrono::Duration::hours(24))),
        );
        let layover = LayoverConfig {
            hubs: self.hubs.iter().map(|h| h.to_string()).collect(),
            ..LayoverConfig::default()
        };
        let timeout = Duration::from_secs(1);

        AppState {
            planner: TripPlanner::new(AiRouter::new(self.general), AiRouter::new(self.reasoning)),
            flights: SmartLayoverSearch::new(Arc::new(self.flights), Some(visa.clone()), layover),
            visa,
            travel_info: TravelInfoService::new(timeout).unwrap(),
            images: ImageService::new(timeout, None).unwrap(),
            itineraries: self
                .with_stores
                .then(|| Arc::new(MemoryItineraries::default()) as Arc<dyn ItineraryStore>),
            profiles: self
                .with_stores
                .then(|| Arc::new(MemoryProfiles::default()) as Arc<dyn ProfileStore>),
            mongo: None,
        }
    }
}

pub fn bearer(user_id: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
        email: None,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {}", token)
}
