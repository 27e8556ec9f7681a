use crate::models::chat::ChatContext;
use crate::models::trip::{ItineraryRequest, TripPreferences};

pub const PLANNER_SYSTEM: &str = "You are an experienced travel planner. \
Answer with valid JSON only, no commentary, unless the user asks otherwise.";

pub const AGENT_SYSTEM: &str = "You are a friendly travel assistant helping a user plan trips. \
Keep answers short and practical. When the user clearly wants to act on something \
(generate an itinerary, search flights, save a trip), append one tag of the form \
<<<ACTION: label | {json payload}>>> at the end of your reply. \
Valid labels: generate_itinerary, search_flights, save_trip.";

fn describe_preferences(prefs: &TripPreferences) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(origin) = &prefs.origin {
        lines.push(format!("Travelling from: {}", origin));
    }
    if let Some(budget) = prefs.budget {
        let currency = prefs.currency.as_deref().unwrap_or("USD");
        lines.push(format!("Total budget: {:.0} {}", budget, currency));
    }
    if let Some(month) = &prefs.travel_month {
        lines.push(format!("Travel month: {}", month));
    }
    if let (Some(start), Some(end)) = (prefs.start_date, prefs.end_date) {
        lines.push(format!("Dates: {} to {}", start, end));
    }
    if let Some(days) = prefs.trip_days() {
        lines.push(format!("Trip length: {} days", days));
    }
    if let Some(travelers) = prefs.travelers {
        lines.push(format!("Travellers: {}", travelers));
    }
    if !prefs.interests.is_empty() {
        lines.push(format!("Interests: {}", prefs.interests.join(", ")));
    }
    lines.push(format!(
        "Pace: {} (about {} activities a day)",
        prefs.pace.describe(),
        prefs.pace.typical_activities_per_day()
    ));
    if let Some(notes) = &prefs.notes {
        lines.push(format!("Notes: {}", notes));
    }

    lines
}

pub fn destination_prompt(prefs: &TripPreferences, count: usize) -> String {
    format!(
        "Suggest {count} travel destinations for this traveller.\n{details}\n\n\
Return a JSON array where each element has: \"name\", \"country\", \"summary\", \
\"best_time_to_visit\", \"estimated_budget\", \"highlights\" (array of strings).",
        count = count,
        details = describe_preferences(prefs).join("\n"),
    )
}

pub fn itinerary_prompt(request: &ItineraryRequest) -> String {
    let days = request.preferences.trip_days().unwrap_or(3);
    let mut details = describe_preferences(&request.preferences);
    if !request.context.saved_trips.is_empty() {
        details.push(format!(
            "Previously saved trips: {}",
            request.context.saved_trips.join(", ")
        ));
    }

    format!(
        "Create a {days}-day itinerary for {destination}.\n{details}\n\n\
Return a JSON object: {{\"destination\": string, \"summary\": string, \
\"days\": [{{\"day\": number, \"title\": string, \"date\": string or null, \
\"activities\": [{{\"time\": string, \"title\": string, \"description\": string, \
\"location\": string, \"estimated_cost\": string}}]}}], \"tips\": [string]}}",
        days = days,
        destination = request.destination,
        details = details.join("\n"),
    )
}

pub fn agent_instruction(context: &ChatContext) -> String {
    match &context.user_name {
        Some(name) if !name.trim().is_empty() => {
            format!("{}\nThe user's name is {}.", AGENT_SYSTEM, name.trim())
        }
        _ => AGENT_SYSTEM.to_string(),
    }
}
