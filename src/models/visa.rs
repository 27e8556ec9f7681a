use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisaStatus {
    VisaFree,
    VisaOnArrival,
    EVisa,
    VisaRequired,
    Unknown,
}

impl VisaStatus {
    /// Maps a provider's free-text category onto a status.
    pub fn classify(category: &str) -> Self {
        let normalized = category
            .to_lowercase()
            .replace(|c: char| c == '-' || c == '_', " ");
        let normalized = normalized.trim();

        if normalized.is_empty() {
            return VisaStatus::Unknown;
        }
        if normalized.contains("on arrival") {
            return VisaStatus::VisaOnArrival;
        }
        if normalized.contains("evisa")
            || normalized.contains("e visa")
            || normalized.split_whitespace().any(|word| word == "eta")
            || normalized.contains("electronic")
        {
            return VisaStatus::EVisa;
        }
        if normalized.contains("free")
            || normalized.contains("not required")
            || normalized.contains("freedom of movement")
        {
            return VisaStatus::VisaFree;
        }
        if normalized.contains("required") {
            return VisaStatus::VisaRequired;
        }
        VisaStatus::Unknown
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VisaRequirement {
    pub destination: String,
    pub status: VisaStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VisaQuery {
    pub passport: String,
    pub destination: String,
}
