pub mod ai;
pub mod airports;
pub mod flight_service;
pub mod image_service;
pub mod itinerary_service;
pub mod smart_layover_service;
pub mod travel_info_service;
pub mod trip_planner_service;
pub mod visa_service;
