use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::visa::VisaRequirement;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CabinClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CabinClass::Economy => "ECONOMY",
            CabinClass::PremiumEconomy => "PREMIUM_ECONOMY",
            CabinClass::Business => "BUSINESS",
            CabinClass::First => "FIRST",
        }
    }
}

/// Incoming search from the client.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchRequest {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    #[serde(default = "default_adults")]
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub infants: u32,
    #[serde(default)]
    pub cabin_class: CabinClass,
    pub passport_country: Option<String>,
}

fn default_adults() -> u32 {
    1
}

/// One call against the upstream flight search.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
    pub cabin_class: CabinClass,
}

impl FlightQuery {
    pub fn from_request(request: &FlightSearchRequest) -> Self {
        Self {
            origin: request.origin.trim().to_uppercase(),
            destination: request.destination.trim().to_uppercase(),
            departure_date: request.departure_date,
            return_date: request.return_date,
            adults: request.adults.max(1),
            children: request.children,
            infants: request.infants,
            cabin_class: request.cabin_class,
        }
    }

    /// Same travellers and cabin, different one-way leg.
    pub fn leg(&self, origin: &str, destination: &str, date: NaiveDate) -> Self {
        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure_date: date,
            return_date: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FlightPrice {
    pub total: String,
    pub currency: String,
}

impl FlightPrice {
    pub fn amount(&self) -> Option<f64> {
        self.total.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightEndpoint {
    pub iata_code: String,
    /// Local time as returned upstream, `YYYY-MM-DDTHH:MM:SS`.
    pub at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightSegment {
    pub departure: FlightEndpoint,
    pub arrival: FlightEndpoint,
    pub carrier_code: String,
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FlightItinerary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub segments: Vec<FlightSegment>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    pub id: String,
    pub price: FlightPrice,
    pub itineraries: Vec<FlightItinerary>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_smart_layover: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layover_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layover_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layover_visa: Option<VisaRequirement>,
}

impl FlightOffer {
    pub fn first_departure(&self) -> Option<&FlightEndpoint> {
        self.itineraries
            .first()
            .and_then(|it| it.segments.first())
            .map(|s| &s.departure)
    }

    pub fn last_arrival(&self) -> Option<&FlightEndpoint> {
        self.itineraries
            .first()
            .and_then(|it| it.segments.last())
            .map(|s| &s.arrival)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FlightSearchResponse {
    pub offers: Vec<FlightOffer>,
    pub count: usize,
}
