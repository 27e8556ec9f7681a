pub mod chat;
pub mod flight;
pub mod itinerary;
pub mod travel_info;
pub mod trip;
pub mod user;
pub mod visa;
