use serde_json::Value;

use crate::models::chat::{ChatReply, ChatTurnRequest, CompletionRequest};
use crate::models::trip::{DestinationSuggestion, ItineraryPlan, ItineraryRequest, TripPreferences};
use crate::services::ai::{extract, prompts, AiError, AiRouter};

const DEFAULT_SUGGESTION_COUNT: usize = 5;
const MAX_HISTORY_MESSAGES: usize = 20;

/// Destination ideas, itineraries and the chat agent, all on top of the
/// provider chains.
#[derive(Clone)]
pub struct TripPlanner {
    general: AiRouter,
    reasoning: AiRouter,
    suggestion_count: usize,
}

impl TripPlanner {
    pub fn new(general: AiRouter, reasoning: AiRouter) -> Self {
        Self {
            general,
            reasoning,
            suggestion_count: DEFAULT_SUGGESTION_COUNT,
        }
    }

    pub fn with_suggestion_count(mut self, count: usize) -> Self {
        self.suggestion_count = count.max(1);
        self
    }

    pub fn general_providers(&self) -> Vec<String> {
        self.general.provider_names()
    }

    pub fn reasoning_providers(&self) -> Vec<String> {
        self.reasoning.provider_names()
    }

    /// Empty list when the model answered with something we can't read.
    pub async fn suggest_destinations(
        &self,
        preferences: &TripPreferences,
    ) -> Result<Vec<DestinationSuggestion>, AiError> {
        let request = CompletionRequest::new(prompts::destination_prompt(
            preferences,
            self.suggestion_count,
        ))
        .with_system_instruction(prompts::PLANNER_SYSTEM);

        let raw = self.general.complete(&request).await?;
        Ok(suggestions_from(extract::extract_json(&raw)))
    }

    /// Reasoning-first chain, then the general chain as a last resort.
    pub async fn generate_itinerary(
        &self,
        itinerary: &ItineraryRequest,
    ) -> Result<ItineraryPlan, AiError> {
        let request = CompletionRequest::new(prompts::itinerary_prompt(itinerary))
            .with_system_instruction(prompts::PLANNER_SYSTEM);

        let raw = if self.reasoning.is_empty() {
            self.general.complete(&request).await?
        } else {
            self.reasoning
                .complete_with_fallback(&request, &self.general)
                .await?
        };

        let mut plan = plan_from(extract::extract_json(&raw));
        if plan.destination.is_none() && !plan.is_empty() {
            plan.destination = Some(itinerary.destination.clone());
        }
        Ok(plan)
    }

    pub async fn chat(&self, turn: &ChatTurnRequest) -> Result<ChatReply, AiError> {
        let skip = turn.history.len().saturating_sub(MAX_HISTORY_MESSAGES);
        let request = CompletionRequest::new(turn.message.clone())
            .with_system_instruction(prompts::agent_instruction(&turn.context))
            .with_history(turn.history[skip..].to_vec())
            .with_context(turn.context.clone());

        let raw = self.general.complete(&request).await?;

        Ok(ChatReply {
            message: extract::strip_action(&raw),
            action: extract::parse_action(&raw),
        })
    }
}

fn suggestions_from(value: Value) -> Vec<DestinationSuggestion> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("destinations") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<DestinationSuggestion>(item).ok())
        .filter(|s| !s.name.trim().is_empty())
        .collect()
}

fn plan_from(value: Value) -> ItineraryPlan {
    match value {
        Value::Object(_) => serde_json::from_value(value).unwrap_or_else(|e| {
            log::warn!("Itinerary JSON did not match the expected shape: {}", e);
            ItineraryPlan::default()
        }),
        // Some models answer with the bare list of days.
        Value::Array(days) => serde_json::from_value(serde_json::json!({ "days": days }))
            .unwrap_or_default(),
        _ => ItineraryPlan::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::{ChatContext, ChatMessage};
    use crate::services::ai::testing::ScriptedProvider;
    use std::sync::{Arc, Mutex};

    fn planner(general_reply: &str, calls: &Arc<Mutex<Vec<String>>>) -> TripPlanner {
        TripPlanner::new(
            AiRouter::new(vec![ScriptedProvider::ok("fast", general_reply, calls)]),
            AiRouter::new(vec![ScriptedProvider::failing("deep", calls)]),
        )
    }

    #[actix_rt::test]
    async fn test_suggestions_from_wrapped_array() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let reply = "Here you go:\n```json\n{\"destinations\": [{\"name\": \"Porto\", \"country\": \"Portugal\"}, {\"country\": \"nameless\"}]}\n```";
        let planner = planner(reply, &calls);

        let suggestions = planner
            .suggest_destinations(&TripPreferences::default())
            .await
            .unwrap();

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].name, "Porto");
        assert_eq!(*calls.lock().unwrap(), vec!["fast"]);
    }

    #[actix_rt::test]
    async fn test_unreadable_suggestions_become_empty() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let planner = planner("Sorry, I can't help with that.", &calls);

        let suggestions = planner
            .suggest_destinations(&TripPreferences::default())
            .await
            .unwrap();
        assert!(suggestions.is_empty());
    }

    #[actix_rt::test]
    async fn test_itinerary_falls_back_to_general_chain() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let reply = "```json\n{\"days\": [{\"day\": 1, \"title\": \"Arrival\"}]}\n```";
        let planner = planner(reply, &calls);

        let request = ItineraryRequest {
            destination: "Seville".to_string(),
            preferences: TripPreferences::default(),
            context: ChatContext::default(),
        };
        let plan = planner.generate_itinerary(&request).await.unwrap();

        assert_eq!(plan.days.len(), 1);
        assert_eq!(plan.destination.as_deref(), Some("Seville"));
        assert_eq!(*calls.lock().unwrap(), vec!["deep", "fast"]);
    }

    #[actix_rt::test]
    async fn test_itinerary_accepts_bare_day_list() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let planner = planner("[{\"day\": 1}, {\"day\": 2}]", &calls);
        let request = ItineraryRequest {
            destination: "Quito".to_string(),
            preferences: TripPreferences::default(),
            context: ChatContext::default(),
        };

        let plan = planner.generate_itinerary(&request).await.unwrap();
        assert_eq!(plan.days.len(), 2);
    }

    #[actix_rt::test]
    async fn test_chat_splits_action_from_message() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let planner = planner(
            "Great choice! <<<ACTION: search_flights | {\"to\": \"NRT\"}>>>",
            &calls,
        );

        let reply = planner
            .chat(&ChatTurnRequest {
                message: "Find me flights to Tokyo".to_string(),
                history: vec![ChatMessage::user("hi")],
                context: ChatContext::default(),
            })
            .await
            .unwrap();

        assert_eq!(reply.message, "Great choice!");
        let action = reply.action.unwrap();
        assert_eq!(action.label, "search_flights");
        assert_eq!(action.payload["to"], "NRT");
    }
}
