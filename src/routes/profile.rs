use actix_web::{web, HttpResponse, Responder};

use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::user::ProfileUpdate;
use crate::routes::error_body;
use crate::state::AppState;

/*
    GET /api/profile
*/
pub async fn get(state: web::Data<AppState>, user: AuthenticatedUser) -> impl Responder {
    let Some(profiles) = state.profiles.clone() else {
        return HttpResponse::ServiceUnavailable().json(error_body("Profiles are unavailable"));
    };

    match profiles.get(&user.user_id).await {
        Ok(Some(profile)) => HttpResponse::Ok().json(profile),
        Ok(None) => HttpResponse::NotFound().json(error_body("Profile not found")),
        Err(err) => {
            log::error!("Failed to load profile {}: {}", user.user_id, err);
            HttpResponse::InternalServerError().json(error_body("Failed to load profile"))
        }
    }
}

/*
    PUT /api/profile
*/
pub async fn update(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<ProfileUpdate>,
) -> impl Responder {
    let Some(profiles) = state.profiles.clone() else {
        return HttpResponse::ServiceUnavailable().json(error_body("Profiles are unavailable"));
    };

    match profiles.upsert(body.into_inner().into_profile(&user.user_id)).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(err) => {
            log::error!("Failed to save profile {}: {}", user.user_id, err);
            HttpResponse::InternalServerError().json(error_body("Failed to save profile"))
        }
    }
}
