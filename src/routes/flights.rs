use std::ops::RangeInclusive;

use actix_web::{web, HttpResponse, Responder};
use chrono::{Datelike, NaiveDate};

use crate::models::flight::{FlightSearchRequest, FlightSearchResponse};
use crate::routes::error_body;
use crate::state::AppState;

const SEARCHABLE_YEARS: RangeInclusive<i32> = 1900..=9999;

fn is_searchable_date(date: NaiveDate) -> bool {
    SEARCHABLE_YEARS.contains(&date.year())
}

fn is_airport_code(code: &str) -> bool {
    let code = code.trim();
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

/// `Some(message)` when the request can't be searched as given.
pub fn validate(request: &FlightSearchRequest) -> Option<&'static str> {
    if !is_airport_code(&request.origin) || !is_airport_code(&request.destination) {
        return Some("origin and destination must be 3-letter IATA codes");
    }
    if request.origin.trim().eq_ignore_ascii_case(request.destination.trim()) {
        return Some("origin and destination must differ");
    }
    if !is_searchable_date(request.departure_date)
        || matches!(request.return_date, Some(ret) if !is_searchable_date(ret))
    {
        return Some("dates must fall between the years 1900 and 9999");
    }
    if matches!(request.return_date, Some(ret) if ret < request.departure_date) {
        return Some("returnDate must not be before departureDate");
    }
    None
}

/*
    /api/flights/search
*/
pub async fn search(
    state: web::Data<AppState>,
    body: web::Json<FlightSearchRequest>,
) -> impl Responder {
    if let Some(message) = validate(&body) {
        return HttpResponse::BadRequest().json(error_body(message));
    }

    match state.flights.search(&body).await {
        Ok(offers) => HttpResponse::Ok().json(FlightSearchResponse {
            count: offers.len(),
            offers,
        }),
        Err(err) => {
            log::error!("Flight search failed: {}", err);
            HttpResponse::BadGateway().json(error_body("Flight search is unavailable right now"))
        }
    }
}
