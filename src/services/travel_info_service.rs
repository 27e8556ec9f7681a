//! Weather, currency, public holidays and points of interest.
//!
//! Every public method is best effort: failures are logged and come back as
//! `None` so a missing integration never blocks trip planning.

use std::{env, time::Duration};

use serde_json::Value;
use thiserror::Error;

use crate::models::travel_info::{
    DailyForecast, ExchangeRates, Place, PublicHoliday, WeatherForecast,
};

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const RATES_URL: &str = "https://open.er-api.com/v6/latest";
const HOLIDAYS_URL: &str = "https://date.nager.at/api/v3/PublicHolidays";
const PLACES_URL: &str = "https://api.geoapify.com/v2/places";
const MAX_FORECAST_DAYS: u32 = 16;
const PLACES_RADIUS_METERS: u32 = 5000;

#[derive(Debug, Error)]
pub enum InfoError {
    #[error("missing credential: {0} is not set")]
    MissingCredential(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

fn is_alpha_code(code: &str, len: usize) -> bool {
    code.len() == len && code.chars().all(|c| c.is_ascii_alphabetic())
}

/// ISO 4217 shape: three ASCII letters.
pub fn is_currency_code(code: &str) -> bool {
    is_alpha_code(code.trim(), 3)
}

/// ISO 3166-1 alpha-2 shape: two ASCII letters.
pub fn is_country_code(code: &str) -> bool {
    is_alpha_code(code.trim(), 2)
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub name: String,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Clone)]
pub struct TravelInfoService {
    http: reqwest::Client,
}

impl TravelInfoService {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    pub async fn forecast(&self, city: &str, days: u32) -> Option<WeatherForecast> {
        best_effort("weather", self.try_forecast(city, days).await)
    }

    pub async fn exchange_rates(&self, base: &str) -> Option<ExchangeRates> {
        best_effort("currency", self.try_exchange_rates(base).await)
    }

    pub async fn public_holidays(&self, country: &str, year: i32) -> Option<Vec<PublicHoliday>> {
        best_effort("holidays", self.try_public_holidays(country, year).await)
    }

    pub async fn places(&self, city: &str, limit: u32) -> Option<Vec<Place>> {
        best_effort("places", self.try_places(city, limit).await)
    }

    async fn geocode(&self, city: &str) -> Result<GeoPoint, InfoError> {
        let body: Value = self
            .http
            .get(GEOCODING_URL)
            .query(&[("name", city), ("count", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_geocode(&body).ok_or_else(|| InfoError::InvalidResponse(format!("unknown city {}", city)))
    }

    async fn try_forecast(&self, city: &str, days: u32) -> Result<WeatherForecast, InfoError> {
        let point = self.geocode(city).await?;
        let days = days.clamp(1, MAX_FORECAST_DAYS);

        let body: Value = self
            .http
            .get(FORECAST_URL)
            .query(&[
                ("latitude", point.latitude.to_string()),
                ("longitude", point.longitude.to_string()),
                (
                    "daily",
                    "temperature_2m_max,temperature_2m_min,precipitation_probability_max,weathercode"
                        .to_string(),
                ),
                ("forecast_days", days.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(WeatherForecast {
            city: point.name,
            country: point.country,
            latitude: point.latitude,
            longitude: point.longitude,
            days: parse_daily_forecast(&body),
        })
    }

    async fn try_exchange_rates(&self, base: &str) -> Result<ExchangeRates, InfoError> {
        if !is_currency_code(base) {
            return Err(InfoError::InvalidInput(format!("currency code {:?}", base)));
        }
        let base = base.trim().to_uppercase();
        let body: Value = self
            .http
            .get(format!("{}/{}", RATES_URL, base))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_rates(&body)
    }

    async fn try_public_holidays(
        &self,
        country: &str,
        year: i32,
    ) -> Result<Vec<PublicHoliday>, InfoError> {
        if !is_country_code(country) {
            return Err(InfoError::InvalidInput(format!("country code {:?}", country)));
        }
        let holidays = self
            .http
            .get(format!("{}/{}/{}", HOLIDAYS_URL, year, country.trim().to_uppercase()))
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<PublicHoliday>>()
            .await?;
        Ok(holidays)
    }

    async fn try_places(&self, city: &str, limit: u32) -> Result<Vec<Place>, InfoError> {
        let api_key = env::var("GEOAPIFY_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| InfoError::MissingCredential("GEOAPIFY_API_KEY".to_string()))?;
        let point = self.geocode(city).await?;

        let body: Value = self
            .http
            .get(PLACES_URL)
            .query(&[
                ("categories", "tourism.sights,tourism.attraction".to_string()),
                (
                    "filter",
                    format!(
                        "circle:{},{},{}",
                        point.longitude, point.latitude, PLACES_RADIUS_METERS
                    ),
                ),
                ("limit", limit.clamp(1, 50).to_string()),
                ("apiKey", api_key),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(parse_places(&body))
    }
}

fn best_effort<T>(what: &str, result: Result<T, InfoError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("{} lookup failed: {}", what, e);
            None
        }
    }
}

pub fn parse_geocode(body: &Value) -> Option<GeoPoint> {
    let first = body.pointer("/results/0")?;
    Some(GeoPoint {
        name: first.get("name")?.as_str()?.to_string(),
        country: first
            .get("country")
            .and_then(Value::as_str)
            .map(str::to_string),
        latitude: first.get("latitude")?.as_f64()?,
        longitude: first.get("longitude")?.as_f64()?,
    })
}

pub fn parse_daily_forecast(body: &Value) -> Vec<DailyForecast> {
    let Some(daily) = body.get("daily") else {
        return Vec::new();
    };
    let column = |name: &str, index: usize| daily.get(name).and_then(|c| c.get(index)).cloned();

    daily
        .get("time")
        .and_then(Value::as_array)
        .map(|dates| {
            dates
                .iter()
                .enumerate()
                .filter_map(|(i, date)| {
                    Some(DailyForecast {
                        date: date.as_str()?.to_string(),
                        temperature_max: column("temperature_2m_max", i).and_then(|v| v.as_f64()),
                        temperature_min: column("temperature_2m_min", i).and_then(|v| v.as_f64()),
                        precipitation_probability: column("precipitation_probability_max", i)
                            .and_then(|v| v.as_f64()),
                        weather_code: column("weathercode", i)
                            .and_then(|v| v.as_i64())
                            .and_then(|c| i32::try_from(c).ok()),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

pub fn parse_rates(body: &Value) -> Result<ExchangeRates, InfoError> {
    if body.get("result").and_then(Value::as_str) == Some("error") {
        let kind = body
            .get("error-type")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        return Err(InfoError::InvalidResponse(kind.to_string()));
    }

    let base = body
        .get("base_code")
        .and_then(Value::as_str)
        .ok_or_else(|| InfoError::InvalidResponse("missing base_code".to_string()))?;
    let rates = body
        .get("rates")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(code, rate)| rate.as_f64().map(|r| (code.clone(), r)))
                .collect()
        })
        .unwrap_or_default();

    Ok(ExchangeRates {
        base: base.to_string(),
        rates,
        updated_at: body
            .get("time_last_update_utc")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

pub fn parse_places(body: &Value) -> Vec<Place> {
    body.get("features")
        .and_then(Value::as_array)
        .map(|features| {
            features
                .iter()
                .filter_map(|feature| {
                    let props = feature.get("properties")?;
                    Some(Place {
                        name: props.get("name")?.as_str()?.to_string(),
                        categories: props
                            .get("categories")
                            .and_then(Value::as_array)
                            .map(|c| {
                                c.iter()
                                    .filter_map(|v| v.as_str().map(str::to_string))
                                    .collect()
                            })
                            .unwrap_or_default(),
                        address: props
                            .get("formatted")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        latitude: props.get("lat")?.as_f64()?,
                        longitude: props.get("lon")?.as_f64()?,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_code_shapes() {
        assert!(is_currency_code("usd"));
        assert!(is_currency_code(" EUR "));
        assert!(!is_currency_code("../x"));
        assert!(!is_currency_code("US"));
        assert!(!is_currency_code("ÄBC"));

        assert!(is_country_code("pt"));
        assert!(!is_country_code("U1"));
        assert!(!is_country_code("PRT"));
        assert!(!is_country_code("U/"));
    }

    #[test]
    fn test_bad_codes_never_reach_the_network() {
        let service = TravelInfoService::new(Duration::from_millis(1)).unwrap();
        tokio_test::block_on(async {
            assert!(matches!(
                service.try_exchange_rates("../../x").await,
                Err(InfoError::InvalidInput(_))
            ));
            assert!(matches!(
                service.try_public_holidays("U1", 2025).await,
                Err(InfoError::InvalidInput(_))
            ));
            assert!(service.exchange_rates("a?b").await.is_none());
        });
    }

    #[test]
    fn test_parse_geocode() {
        let body = json!({"results": [{"name": "Lisbon", "country": "Portugal", "latitude": 38.72, "longitude": -9.14}]});
        let point = parse_geocode(&body).unwrap();
        assert_eq!(point.name, "Lisbon");
        assert_eq!(point.country.as_deref(), Some("Portugal"));

        assert!(parse_geocode(&json!({"generationtime_ms": 0.5})).is_none());
    }

    #[test]
    fn test_parse_daily_forecast_zips_columns() {
        let body = json!({
            "daily": {
                "time": ["2025-06-01", "2025-06-02"],
                "temperature_2m_max": [24.1, 26.0],
                "temperature_2m_min": [15.2, null],
                "weathercode": [3, 61]
            }
        });

        let days = parse_daily_forecast(&body);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].temperature_max, Some(24.1));
        assert_eq!(days[1].temperature_min, None);
        assert_eq!(days[1].weather_code, Some(61));
        assert_eq!(days[0].precipitation_probability, None);
    }

    #[test]
    fn test_parse_rates() {
        let body = json!({
            "result": "success",
            "base_code": "EUR",
            "time_last_update_utc": "Sun, 01 Jun 2025 00:00:01 +0000",
            "rates": {"EUR": 1, "USD": 1.08}
        });
        let rates = parse_rates(&body).unwrap();
        assert_eq!(rates.base, "EUR");
        assert_eq!(rates.rates.get("USD"), Some(&1.08));

        let error = json!({"result": "error", "error-type": "unsupported-code"});
        assert!(parse_rates(&error).is_err());
    }

    #[test]
    fn test_parse_places_skips_unnamed() {
        let body = json!({
            "features": [
                {"properties": {"name": "Belém Tower", "categories": ["tourism.sights"], "lat": 38.69, "lon": -9.21}},
                {"properties": {"categories": ["tourism.sights"], "lat": 1.0, "lon": 2.0}}
            ]
        });
        let places = parse_places(&body);
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Belém Tower");
        assert!(places[0].address.is_none());
    }
}
