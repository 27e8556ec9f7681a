use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyForecast {
    pub date: String,
    pub temperature_max: Option<f64>,
    pub temperature_min: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub weather_code: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WeatherForecast {
    pub city: String,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub days: Vec<DailyForecast>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExchangeRates {
    pub base: String,
    pub rates: HashMap<String, f64>,
    pub updated_at: Option<String>,
}

impl ExchangeRates {
    pub fn convert(&self, amount: f64, target: &str) -> Option<f64> {
        let target = target.to_uppercase();
        if target == self.base {
            return Some(amount);
        }
        self.rates.get(&target).map(|rate| amount * rate)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Conversion {
    pub base: String,
    pub target: String,
    pub amount: f64,
    pub converted: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicHoliday {
    pub date: String,
    pub local_name: String,
    pub name: String,
    pub country_code: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Place {
    pub name: String,
    pub categories: Vec<String>,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DestinationImage {
    pub query: String,
    pub url: String,
    pub photographer: Option<String>,
}
