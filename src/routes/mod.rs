pub mod ai;
pub mod flights;
pub mod health;
pub mod itinerary;
pub mod profile;
pub mod travel_info;
pub mod visa;

use actix_web::web;
use serde_json::{json, Value};

use crate::middleware::auth::AuthMiddleware;

pub(crate) fn error_body(message: impl Into<String>) -> Value {
    json!({ "error": message.into() })
}

/// Every route under one tree; the persistence scopes sit behind the JWT check.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/ai")
                        .route("/destinations", web::post().to(ai::suggest_destinations))
                        .route("/itinerary", web::post().to(ai::generate_itinerary))
                        .route("/chat", web::post().to(ai::chat)),
                )
                .route("/flights/search", web::post().to(flights::search))
                .route("/visa", web::get().to(visa::get_requirement))
                .route("/weather", web::get().to(travel_info::weather))
                .route("/currency", web::get().to(travel_info::currency))
                .route("/holidays", web::get().to(travel_info::holidays))
                .route("/places", web::get().to(travel_info::places))
                .route("/images", web::get().to(travel_info::image))
                .service(
                    web::scope("/itineraries")
                        .wrap(AuthMiddleware)
                        .route("", web::get().to(itinerary::list))
                        .route("", web::post().to(itinerary::save))
                        .route("/{id}", web::get().to(itinerary::get_by_id))
                        .route("/{id}", web::delete().to(itinerary::delete)),
                )
                .service(
                    web::scope("/profile")
                        .wrap(AuthMiddleware)
                        .route("", web::get().to(profile::get))
                        .route("", web::put().to(profile::update)),
                ),
        );
}
