/// Major international hubs, in the order we try them as layover points.
pub const DEFAULT_HUBS: &[&str] = &[
    "DXB", "DOH", "IST", "FRA", "AMS", "LHR", "CDG", "SIN", "HKG", "ICN", "NRT", "LAX",
];

/// ISO 3166 alpha-2 country of an airport, for the airports we know about.
pub fn country_for_airport(code: &str) -> Option<&'static str> {
    let country = match code.trim().to_uppercase().as_str() {
        "DXB" | "AUH" => "AE",
        "DOH" => "QA",
        "IST" | "SAW" => "TR",
        "FRA" | "MUC" | "BER" => "DE",
        "AMS" => "NL",
        "LHR" | "LGW" | "MAN" => "GB",
        "CDG" | "ORY" | "NCE" => "FR",
        "MAD" | "BCN" => "ES",
        "FCO" | "MXP" => "IT",
        "LIS" => "PT",
        "ZRH" | "GVA" => "CH",
        "VIE" => "AT",
        "CPH" => "DK",
        "HEL" => "FI",
        "SIN" => "SG",
        "HKG" => "HK",
        "ICN" => "KR",
        "NRT" | "HND" | "KIX" => "JP",
        "PEK" | "PVG" | "CAN" => "CN",
        "BKK" => "TH",
        "KUL" => "MY",
        "DEL" | "BOM" => "IN",
        "SYD" | "MEL" => "AU",
        "AKL" => "NZ",
        "JFK" | "EWR" | "LAX" | "SFO" | "ORD" | "ATL" | "MIA" | "SEA" | "DFW" => "US",
        "YYZ" | "YVR" | "YUL" => "CA",
        "MEX" | "CUN" => "MX",
        "GRU" => "BR",
        "EZE" => "AR",
        "BOG" => "CO",
        "LIM" => "PE",
        "JNB" | "CPT" => "ZA",
        "CAI" => "EG",
        "ADD" => "ET",
        "NBO" => "KE",
        _ => return None,
    };
    Some(country)
}

/// Hubs to try for a one-way trip: list order, minus the trip's own
/// endpoints, capped at `max`.
pub fn hub_candidates(hubs: &[String], origin: &str, destination: &str, max: usize) -> Vec<String> {
    hubs.iter()
        .filter(|hub| !hub.eq_ignore_ascii_case(origin) && !hub.eq_ignore_ascii_case(destination))
        .take(max)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Vec<String> {
        DEFAULT_HUBS.iter().map(|h| h.to_string()).collect()
    }

    #[test]
    fn test_candidates_skip_trip_endpoints() {
        let hubs = hub_candidates(&defaults(), "JFK", "DOH", 5);
        assert_eq!(hubs, vec!["DXB", "IST", "FRA", "AMS", "LHR"]);
    }

    #[test]
    fn test_candidates_are_capped() {
        assert_eq!(hub_candidates(&defaults(), "JFK", "CDG", 2), vec!["DXB", "DOH"]);
        assert!(hub_candidates(&defaults(), "JFK", "CDG", 0).is_empty());
    }

    #[test]
    fn test_country_lookup() {
        assert_eq!(country_for_airport("dxb"), Some("AE"));
        assert_eq!(country_for_airport("JFK"), Some("US"));
        assert_eq!(country_for_airport("XXX"), None);
    }
}
