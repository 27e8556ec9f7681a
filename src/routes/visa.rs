use actix_web::{web, HttpResponse, Responder};

use crate::models::visa::VisaQuery;
use crate::routes::error_body;
use crate::state::AppState;

/*
    /api/visa?passport=US&destination=AE
*/
pub async fn get_requirement(
    state: web::Data<AppState>,
    query: web::Query<VisaQuery>,
) -> impl Responder {
    match state.visa.lookup(&query.passport, &query.destination).await {
        Some(requirement) => HttpResponse::Ok().json(requirement),
        None => HttpResponse::NotFound().json(error_body("No visa information available")),
    }
}
