use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};

use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::itinerary::ItinerarySubmission;
use crate::routes::error_body;
use crate::services::itinerary_service::{ItineraryStore, StoreError};
use crate::state::AppState;

fn store(state: &AppState) -> Result<Arc<dyn ItineraryStore>, HttpResponse> {
    state.itineraries.clone().ok_or_else(|| {
        HttpResponse::ServiceUnavailable().json(error_body("Saved itineraries are unavailable"))
    })
}

fn store_failure(err: StoreError) -> HttpResponse {
    match err {
        StoreError::InvalidId(_) => HttpResponse::BadRequest().json(error_body("Invalid ID")),
        StoreError::Database(e) => {
            log::error!("Itinerary store error: {}", e);
            HttpResponse::InternalServerError().json(error_body("Failed to access itineraries"))
        }
    }
}

/*
    GET /api/itineraries
*/
pub async fn list(state: web::Data<AppState>, user: AuthenticatedUser) -> impl Responder {
    let store = match store(&state) {
        Ok(store) => store,
        Err(response) => return response,
    };

    match store.list_for_user(&user.user_id).await {
        Ok(itineraries) => HttpResponse::Ok().json(itineraries),
        Err(err) => store_failure(err),
    }
}

/*
    POST /api/itineraries
*/
pub async fn save(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<ItinerarySubmission>,
) -> impl Responder {
    let store = match store(&state) {
        Ok(store) => store,
        Err(response) => return response,
    };

    let submission = body.into_inner();
    if submission.destination.trim().is_empty() {
        return HttpResponse::BadRequest().json(error_body("destination is required"));
    }

    match store.save(submission.into_saved(&user.user_id)).await {
        Ok(saved) => HttpResponse::Created().json(saved),
        Err(err) => store_failure(err),
    }
}

/*
    GET /api/itineraries/{id}
*/
pub async fn get_by_id(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> impl Responder {
    let store = match store(&state) {
        Ok(store) => store,
        Err(response) => return response,
    };

    match store.get(&user.user_id, &path.into_inner()).await {
        Ok(Some(itinerary)) => HttpResponse::Ok().json(itinerary),
        Ok(None) => HttpResponse::NotFound().json(error_body("Itinerary not found")),
        Err(err) => store_failure(err),
    }
}

/*
    DELETE /api/itineraries/{id}
*/
pub async fn delete(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> impl Responder {
    let store = match store(&state) {
        Ok(store) => store,
        Err(response) => return response,
    };

    match store.delete(&user.user_id, &path.into_inner()).await {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => HttpResponse::NotFound().json(error_body("Itinerary not found")),
        Err(err) => store_failure(err),
    }
}
