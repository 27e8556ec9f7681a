use std::sync::Arc;

use mongodb::Client;

use crate::services::image_service::ImageService;
use crate::services::itinerary_service::{ItineraryStore, ProfileStore};
use crate::services::smart_layover_service::SmartLayoverSearch;
use crate::services::travel_info_service::TravelInfoService;
use crate::services::trip_planner_service::TripPlanner;
use crate::services::visa_service::VisaService;

/// Everything the handlers need, cloned into each worker.
#[derive(Clone)]
pub struct AppState {
    pub planner: TripPlanner,
    pub flights: SmartLayoverSearch,
    pub visa: VisaService,
    pub travel_info: TravelInfoService,
    pub images: ImageService,
    /// `None` when the server runs without a database.
    pub itineraries: Option<Arc<dyn ItineraryStore>>,
    pub profiles: Option<Arc<dyn ProfileStore>>,
    pub mongo: Option<Arc<Client>>,
}
