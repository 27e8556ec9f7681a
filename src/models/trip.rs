use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::chat::ChatContext;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TripPace {
    Relaxed,
    #[default]
    Moderate,
    Adventure,
}

impl TripPace {
    /// Typical number of scheduled activities per day for this pace
    pub fn typical_activities_per_day(&self) -> usize {
        match self {
            TripPace::Relaxed => 2,
            TripPace::Moderate => 3,
            TripPace::Adventure => 5,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            TripPace::Relaxed => "relaxed, with plenty of downtime",
            TripPace::Moderate => "balanced",
            TripPace::Adventure => "packed and active",
        }
    }
}

/// What the traveller told us about the trip they want.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TripPreferences {
    pub origin: Option<String>,
    pub budget: Option<f64>,
    pub currency: Option<String>,
    pub travel_month: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub duration_days: Option<u32>,
    pub travelers: Option<u32>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub pace: TripPace,
    pub notes: Option<String>,
}

impl TripPreferences {
    /// Trip length from explicit duration, else from the date range.
    pub fn trip_days(&self) -> Option<u32> {
        if let Some(days) = self.duration_days {
            return Some(days);
        }
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end >= start => {
                Some((end - start).num_days() as u32 + 1)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DestinationSuggestion {
    pub name: String,
    pub country: String,
    pub summary: String,
    pub best_time_to_visit: Option<String>,
    pub estimated_budget: Option<Value>,
    pub highlights: Vec<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ItineraryRequest {
    pub destination: String,
    #[serde(flatten)]
    pub preferences: TripPreferences,
    #[serde(default)]
    pub context: ChatContext,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PlannedActivity {
    pub time: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub estimated_cost: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DayPlan {
    pub day: u32,
    pub title: Option<String>,
    pub date: Option<String>,
    pub activities: Vec<PlannedActivity>,
}

/// Day-by-day plan as returned by the model. Every field is optional on the
/// wire; an empty `days` list means the model produced nothing usable.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ItineraryPlan {
    pub destination: Option<String>,
    pub summary: Option<String>,
    pub days: Vec<DayPlan>,
    pub tips: Vec<String>,
}

impl ItineraryPlan {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
