use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::HashMap;
use std::env;

use crate::db::mongo;
use crate::state::AppState;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

impl ServiceStatus {
    fn ok(details: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            details: Some(details.into()),
        }
    }

    fn error(details: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            details: Some(details.into()),
        }
    }
}

pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let mut services = HashMap::new();
    services.insert("mongodb".to_string(), check_mongodb(&state).await);
    services.insert("ai".to_string(), check_ai(&state));
    services.insert(
        "flights".to_string(),
        check_credentials(&["AMADEUS_CLIENT_ID", "AMADEUS_CLIENT_SECRET"]),
    );
    services.insert("visa".to_string(), check_credentials(&["VISA_API_KEY"]));

    let status = if services.values().all(|s| s.status == "ok") {
        "ok"
    } else {
        "degraded"
    };

    HttpResponse::Ok().json(HealthStatus {
        status: status.to_string(),
        services,
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn check_mongodb(state: &AppState) -> ServiceStatus {
    let Some(client) = state.mongo.as_ref() else {
        return ServiceStatus::error("MONGODB_URI not configured; using in-memory caches");
    };

    match mongo::ping(client).await {
        Ok(()) => ServiceStatus::ok("Connected successfully to MongoDB"),
        Err(e) => {
            log::warn!("MongoDB health check failed: {}", e);
            ServiceStatus::error(format!("Failed to connect: {}", e))
        }
    }
}

fn check_ai(state: &AppState) -> ServiceStatus {
    let general = state.planner.general_providers();
    let reasoning = state.planner.reasoning_providers();
    if general.is_empty() && reasoning.is_empty() {
        return ServiceStatus::error("No AI providers configured");
    }
    ServiceStatus::ok(format!(
        "general: [{}], reasoning: [{}]",
        general.join(", "),
        reasoning.join(", ")
    ))
}

fn check_credentials(names: &[&str]) -> ServiceStatus {
    let missing: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| env::var(name).map(|v| v.trim().is_empty()).unwrap_or(true))
        .collect();

    if missing.is_empty() {
        ServiceStatus::ok("Credentials configured")
    } else {
        ServiceStatus::error(format!("Missing configuration: {}", missing.join(", ")))
    }
}
