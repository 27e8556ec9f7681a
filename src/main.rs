use std::{io, sync::Arc};

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use wayfinder_api::{
    config::ServerConfig,
    db,
    routes,
    services::{
        ai::providers::{build_routers, AiConfig},
        flight_service::{AmadeusClient, AmadeusConfig},
        image_service::ImageService,
        itinerary_service::{
            ItineraryStore, MongoItineraryStore, MongoProfileStore, ProfileStore,
        },
        smart_layover_service::{LayoverConfig, SmartLayoverSearch},
        travel_info_service::TravelInfoService,
        trip_planner_service::TripPlanner,
        visa_service::{
            HttpVisaProvider, MemoryVisaCache, MongoVisaCache, VisaCacheStore, VisaConfig,
            VisaService,
        },
    },
    state::AppState,
};

async fn build_state(config: &ServerConfig) -> io::Result<AppState> {
    let mongo = match config.mongodb_uri.as_deref() {
        Some(uri) => match db::mongo::create_mongo_client(uri).await {
            Ok(client) => Some(client),
            Err(e) => {
                log::error!("MongoDB unavailable, continuing without persistence: {}", e);
                None
            }
        },
        None => {
            log::warn!("MONGODB_URI not set; saved trips disabled and caches in memory");
            None
        }
    };

    let ai_config = AiConfig::from_env();
    let (general, reasoning) = build_routers(&ai_config).map_err(io::Error::other)?;
    log::info!(
        "AI providers: general {:?}, reasoning {:?}",
        general.provider_names(),
        reasoning.provider_names()
    );
    let planner = TripPlanner::new(general, reasoning);

    let visa_config = VisaConfig::from_env();
    let visa_cache: Arc<dyn VisaCacheStore> = match &mongo {
        Some(client) => Arc::new(MongoVisaCache::new(client.clone(), visa_config.cache_ttl)),
        None => Arc::new(MemoryVisaCache::new(visa_config.cache_ttl)),
    };
    let visa_provider = HttpVisaProvider::new(visa_config).map_err(io::Error::other)?;
    let visa = VisaService::new(Arc::new(visa_provider), visa_cache);

    let amadeus = AmadeusClient::new(AmadeusConfig::from_env()).map_err(io::Error::other)?;
    let flights = SmartLayoverSearch::new(
        Arc::new(amadeus),
        Some(visa.clone()),
        LayoverConfig::from_env(),
    );

    let travel_info = TravelInfoService::new(config.http_timeout).map_err(io::Error::other)?;
    let images = ImageService::new(config.http_timeout, mongo.clone()).map_err(io::Error::other)?;

    let itineraries = mongo
        .clone()
        .map(|client| Arc::new(MongoItineraryStore::new(client)) as Arc<dyn ItineraryStore>);
    let profiles = mongo
        .clone()
        .map(|client| Arc::new(MongoProfileStore::new(client)) as Arc<dyn ProfileStore>);

    Ok(AppState {
        planner,
        flights,
        visa,
        travel_info,
        images,
        itineraries,
        profiles,
        mongo,
    })
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = ServerConfig::from_env().map_err(io::Error::other)?;
    let state = web::Data::new(build_state(&config).await?);

    log::info!("Starting HTTP server on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind((config.host.clone(), config.port))?
    .run()
    .await
}
