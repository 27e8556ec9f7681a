use actix_web::{web, HttpResponse, Responder};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::models::travel_info::Conversion;
use crate::routes::error_body;
use crate::services::travel_info_service::{is_country_code, is_currency_code};
use crate::state::AppState;

const DEFAULT_FORECAST_DAYS: u32 = 7;
const DEFAULT_PLACES_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub city: String,
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CurrencyQuery {
    #[serde(default = "default_base")]
    pub base: String,
    pub target: Option<String>,
    pub amount: Option<f64>,
}

fn default_base() -> String {
    "USD".to_string()
}

#[derive(Debug, Deserialize)]
pub struct HolidayQuery {
    pub country: String,
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct PlacesQuery {
    pub city: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub query: String,
}

fn unavailable(what: &str) -> HttpResponse {
    HttpResponse::BadGateway().json(error_body(format!("{} is unavailable right now", what)))
}

/*
    /api/weather?city=Lisbon&days=5
*/
pub async fn weather(state: web::Data<AppState>, query: web::Query<WeatherQuery>) -> impl Responder {
    let days = query.days.unwrap_or(DEFAULT_FORECAST_DAYS);
    match state.travel_info.forecast(&query.city, days).await {
        Some(forecast) => HttpResponse::Ok().json(forecast),
        None => unavailable("Weather"),
    }
}

/*
    /api/currency?base=USD&target=EUR&amount=100
*/
pub async fn currency(
    state: web::Data<AppState>,
    query: web::Query<CurrencyQuery>,
) -> impl Responder {
    let target_ok = query.target.as_deref().map_or(true, is_currency_code);
    if !is_currency_code(&query.base) || !target_ok {
        return HttpResponse::BadRequest()
            .json(error_body("base and target must be 3-letter currency codes"));
    }

    let Some(rates) = state.travel_info.exchange_rates(&query.base).await else {
        return unavailable("Currency data");
    };

    let Some(target) = query.target.as_deref() else {
        return HttpResponse::Ok().json(rates);
    };

    let amount = query.amount.unwrap_or(1.0);
    match rates.convert(amount, target) {
        Some(converted) => HttpResponse::Ok().json(Conversion {
            base: rates.base.clone(),
            target: target.to_uppercase(),
            amount,
            converted,
        }),
        None => HttpResponse::NotFound().json(error_body(format!("Unknown currency {}", target))),
    }
}

/*
    /api/holidays?country=PT&year=2025
*/
pub async fn holidays(
    state: web::Data<AppState>,
    query: web::Query<HolidayQuery>,
) -> impl Responder {
    if !is_country_code(&query.country) {
        return HttpResponse::BadRequest().json(error_body("country must be a 2-letter ISO code"));
    }

    let year = query.year.unwrap_or_else(|| Utc::now().year());
    match state.travel_info.public_holidays(&query.country, year).await {
        Some(holidays) => HttpResponse::Ok().json(holidays),
        None => unavailable("Holiday data"),
    }
}

/*
    /api/places?city=Lisbon&limit=10
*/
pub async fn places(state: web::Data<AppState>, query: web::Query<PlacesQuery>) -> impl Responder {
    let limit = query.limit.unwrap_or(DEFAULT_PLACES_LIMIT);
    match state.travel_info.places(&query.city, limit).await {
        Some(places) => HttpResponse::Ok().json(places),
        None => unavailable("Places data"),
    }
}

/*
    /api/images?query=Lisbon
*/
pub async fn image(state: web::Data<AppState>, query: web::Query<ImageQuery>) -> impl Responder {
    if query.query.trim().is_empty() {
        return HttpResponse::BadRequest().json(error_body("query is required"));
    }

    match state.images.destination_image(&query.query).await {
        Some(image) => HttpResponse::Ok().json(image),
        None => HttpResponse::NotFound().json(error_body("No image found")),
    }
}
