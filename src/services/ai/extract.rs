//! Best-effort scraping of structured data out of model text.
//!
//! Nothing in here returns an error: callers get `{}` (or `None`) and treat it
//! as "no structured result".

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::models::chat::AgentAction;

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Pull the first JSON object or array out of free-form text.
///
/// Starts at whichever of `{` / `[` appears first and walks to its matching
/// closer, skipping brackets inside string literals. If that candidate does
/// not parse, the first-opener to last-closer slice is tried. Anything else
/// yields an empty object.
pub fn extract_json(raw: &str) -> Value {
    let Some(start) = raw.find(|c: char| c == '{' || c == '[') else {
        return empty_object();
    };

    if let Some(end) = matching_close(raw, start) {
        if let Ok(value) = serde_json::from_str::<Value>(&raw[start..=end]) {
            return value;
        }
    }

    let closer = if raw.as_bytes()[start] == b'{' { '}' } else { ']' };
    match raw.rfind(closer) {
        Some(end) if end > start => {
            serde_json::from_str::<Value>(&raw[start..=end]).unwrap_or_else(|_| empty_object())
        }
        _ => empty_object(),
    }
}

/// Byte index of the bracket closing the one at `start`, if the text balances.
fn matching_close(text: &str, start: usize) -> Option<usize> {
    let mut stack: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => stack.push(b'}'),
            b'[' => stack.push(b']'),
            b'}' | b']' => {
                if stack.pop() != Some(*byte) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn action_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)<<<\s*ACTION:\s*(?P<label>[^|>]*?)\s*\|\s*(?P<payload>.*?)\s*>>>")
            .expect("action pattern is valid")
    })
}

/// Find an embedded `<<<ACTION: label | json>>>` tag. Malformed JSON in the
/// tag becomes an empty object.
pub fn parse_action(text: &str) -> Option<AgentAction> {
    let captures = action_pattern().captures(text)?;
    let label = captures.name("label")?.as_str().trim().to_string();
    let payload = captures
        .name("payload")
        .map(|m| serde_json::from_str::<Value>(m.as_str()).unwrap_or_else(|_| empty_object()))
        .unwrap_or_else(empty_object);

    Some(AgentAction { label, payload })
}

/// The reply with any action tags removed, for display.
pub fn strip_action(text: &str) -> String {
    action_pattern().replace_all(text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_fenced_json_from_prose() {
        let raw = "Here is your plan:\n```json\n{\"days\":[]}\n```\nEnjoy the trip!";
        assert_eq!(extract_json(raw), json!({"days": []}));
    }

    #[test]
    fn test_array_before_object_wins() {
        let raw = "Options: [{\"name\":\"Kyoto\"},{\"name\":\"Porto\"}] and {\"ignored\":true}";
        assert_eq!(
            extract_json(raw),
            json!([{"name": "Kyoto"}, {"name": "Porto"}])
        );
    }

    #[test]
    fn test_trailing_prose_with_braces_is_ignored() {
        // A plain first/last slice would swallow the "{sic}" and fail to parse.
        let raw = "{\"city\":\"Rome\"} note: prices vary {sic}";
        assert_eq!(extract_json(raw), json!({"city": "Rome"}));
    }

    #[test]
    fn test_brackets_inside_strings_do_not_confuse_the_scan() {
        let raw = "```\n{\"tip\":\"bring a jacket } or two\",\"n\":[1,2]}\n```";
        assert_eq!(
            extract_json(raw),
            json!({"tip": "bring a jacket } or two", "n": [1, 2]})
        );
    }

    #[test]
    fn test_unbalanced_input_yields_empty_object() {
        assert_eq!(extract_json("{\"days\": [ {\"day\": 1 "), json!({}));
        assert_eq!(extract_json("}}} {{{"), json!({}));
        assert_eq!(extract_json("no json here"), json!({}));
        assert_eq!(extract_json(""), json!({}));
    }

    #[test]
    fn test_falls_back_to_outer_slice() {
        // Mismatched inner closer breaks the balanced scan; the outer slice
        // still fails to parse, so the result is empty rather than a panic.
        assert_eq!(extract_json("{\"a\": [1}"), json!({}));
    }

    #[test]
    fn test_parse_action_tag() {
        let text = "Sure! <<<ACTION: open_planner | {\"destination\":\"Lima\"}>>> Let me know.";
        let action = parse_action(text).unwrap();
        assert_eq!(action.label, "open_planner");
        assert_eq!(action.payload, json!({"destination": "Lima"}));
        assert_eq!(strip_action(text), "Sure!  Let me know.");
    }

    #[test]
    fn test_parse_action_with_bad_json() {
        let action = parse_action("<<<ACTION: save | {not json}>>>").unwrap();
        assert_eq!(action.label, "save");
        assert_eq!(action.payload, json!({}));
    }

    #[test]
    fn test_no_action_tag() {
        assert!(parse_action("just chatting").is_none());
        assert_eq!(strip_action("  just chatting "), "just chatting");
    }
}
