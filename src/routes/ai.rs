use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::models::chat::ChatTurnRequest;
use crate::models::trip::{ItineraryRequest, TripPreferences};
use crate::routes::error_body;
use crate::services::ai::AiError;
use crate::state::AppState;

const AI_UNAVAILABLE: &str = "AI services are temporarily unavailable. Please try again shortly.";

fn ai_unavailable(err: AiError) -> HttpResponse {
    log::error!("AI request failed: {}", err);
    if let AiError::AllProvidersFailed(failures) = &err {
        for failure in failures {
            log::debug!("  {}", failure);
        }
    }
    HttpResponse::ServiceUnavailable().json(error_body(AI_UNAVAILABLE))
}

/*
    /api/ai/destinations
*/
pub async fn suggest_destinations(
    state: web::Data<AppState>,
    body: web::Json<TripPreferences>,
) -> impl Responder {
    match state.planner.suggest_destinations(&body).await {
        Ok(destinations) => HttpResponse::Ok().json(json!({ "destinations": destinations })),
        Err(err) => ai_unavailable(err),
    }
}

/*
    /api/ai/itinerary
*/
pub async fn generate_itinerary(
    state: web::Data<AppState>,
    body: web::Json<ItineraryRequest>,
) -> impl Responder {
    if body.destination.trim().is_empty() {
        return HttpResponse::BadRequest().json(error_body("destination is required"));
    }

    match state.planner.generate_itinerary(&body).await {
        Ok(plan) if plan.is_empty() => HttpResponse::BadGateway()
            .json(error_body("Could not generate an itinerary. Please try again.")),
        Ok(plan) => HttpResponse::Ok().json(plan),
        Err(err) => ai_unavailable(err),
    }
}

/*
    /api/ai/chat
*/
pub async fn chat(state: web::Data<AppState>, body: web::Json<ChatTurnRequest>) -> impl Responder {
    if body.message.trim().is_empty() {
        return HttpResponse::BadRequest().json(error_body("message is required"));
    }

    match state.planner.chat(&body).await {
        Ok(reply) => HttpResponse::Ok().json(reply),
        Err(err) => ai_unavailable(err),
    }
}
