//! Smart layover search
//!
//! Runs the direct search alongside synthetic two-leg searches through a few
//! hub airports, then ranks everything by price. The direct search is the
//! baseline: its failure fails the request. Hub searches are best effort and
//! silently drop out on any error or empty leg.

use std::{cmp::Ordering, env, sync::Arc};

use chrono::{Duration, NaiveDateTime};
use futures::future::join_all;

use crate::models::flight::{FlightOffer, FlightPrice, FlightQuery, FlightSearchRequest};
use crate::models::visa::VisaRequirement;
use crate::services::airports::{country_for_airport, hub_candidates, DEFAULT_HUBS};
use crate::services::flight_service::{FlightSearchError, FlightSearchProvider};
use crate::services::visa_service::VisaService;

const DEFAULT_MAX_HUBS: usize = 5;
const DEFAULT_LAYOVER_DAYS: i64 = 1;
const FALLBACK_LAYOVER_LABEL: &str = "24h+";

#[derive(Debug, Clone)]
pub struct LayoverConfig {
    pub hubs: Vec<String>,
    pub max_hubs: usize,
    /// Days between the first and second leg's departure dates.
    pub layover_days: i64,
}

impl Default for LayoverConfig {
    fn default() -> Self {
        Self {
            hubs: DEFAULT_HUBS.iter().map(|h| h.to_string()).collect(),
            max_hubs: DEFAULT_MAX_HUBS,
            layover_days: DEFAULT_LAYOVER_DAYS,
        }
    }
}

impl LayoverConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            hubs: env::var("SMART_LAYOVER_HUBS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|h| h.trim().to_uppercase())
                        .filter(|h| !h.is_empty())
                        .collect::<Vec<_>>()
                })
                .filter(|hubs| !hubs.is_empty())
                .unwrap_or(defaults.hubs),
            max_hubs: env::var("SMART_LAYOVER_MAX_HUBS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_hubs),
            layover_days: defaults.layover_days,
        }
    }
}

#[derive(Clone)]
pub struct SmartLayoverSearch {
    provider: Arc<dyn FlightSearchProvider>,
    visa: Option<VisaService>,
    config: LayoverConfig,
}

impl SmartLayoverSearch {
    pub fn new(
        provider: Arc<dyn FlightSearchProvider>,
        visa: Option<VisaService>,
        config: LayoverConfig,
    ) -> Self {
        Self {
            provider,
            visa,
            config,
        }
    }

    pub async fn search(
        &self,
        request: &FlightSearchRequest,
    ) -> Result<Vec<FlightOffer>, FlightSearchError> {
        let query = FlightQuery::from_request(request);
        let passport = request
            .passport_country
            .as_deref()
            .map(|p| p.trim().to_uppercase())
            .filter(|p| !p.is_empty());

        let hubs = if query.return_date.is_none() {
            hub_candidates(
                &self.config.hubs,
                &query.origin,
                &query.destination,
                self.config.max_hubs,
            )
        } else {
            Vec::new()
        };

        let hub_searches = hubs
            .iter()
            .map(|hub| self.search_via_hub(&query, hub, passport.as_deref()));

        let (direct, hub_offers) =
            futures::join!(self.provider.search(&query), join_all(hub_searches));

        let direct = direct?;
        let mut offers: Vec<FlightOffer> = hub_offers.into_iter().flatten().collect();
        log::info!(
            "Flight search {} -> {}: {} direct, {} smart layover offer(s) from {} hub(s)",
            query.origin,
            query.destination,
            direct.len(),
            offers.len(),
            hubs.len()
        );
        offers.extend(direct);
        sort_by_price(&mut offers);

        Ok(offers)
    }

    /// `None` for any hub that can't produce a complete two-leg offer.
    async fn search_via_hub(
        &self,
        query: &FlightQuery,
        hub: &str,
        passport: Option<&str>,
    ) -> Option<FlightOffer> {
        match self.try_hub(query, hub, passport).await {
            Ok(offer) => offer,
            Err(e) => {
                log::warn!("Smart layover via {} dropped: {}", hub, e);
                None
            }
        }
    }

    async fn try_hub(
        &self,
        query: &FlightQuery,
        hub: &str,
        passport: Option<&str>,
    ) -> Result<Option<FlightOffer>, FlightSearchError> {
        let visa_lookup = async {
            match (&self.visa, passport, country_for_airport(hub)) {
                (Some(visa), Some(passport), Some(country)) => visa.lookup(passport, country).await,
                _ => None,
            }
        };
        let first_leg_query = query.leg(&query.origin, hub, query.departure_date);

        let (visa, first_leg) =
            futures::join!(visa_lookup, self.provider.search(&first_leg_query));

        let Some(first) = first_leg?.into_iter().next() else {
            return Ok(None);
        };

        let Some(second_date) = Duration::try_days(self.config.layover_days)
            .and_then(|gap| query.departure_date.checked_add_signed(gap))
        else {
            log::debug!(
                "Skipping hub {}: second leg date out of range after {}",
                hub,
                query.departure_date
            );
            return Ok(None);
        };
        let second_leg_query = query.leg(hub, &query.destination, second_date);
        let Some(second) = self
            .provider
            .search(&second_leg_query)
            .await?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };

        combine_legs(&first, &second, hub, visa).map(Some)
    }
}

/// Stitch two one-way offers into one synthetic offer priced as their sum.
pub fn combine_legs(
    first: &FlightOffer,
    second: &FlightOffer,
    hub: &str,
    visa: Option<VisaRequirement>,
) -> Result<FlightOffer, FlightSearchError> {
    let (Some(first_price), Some(second_price)) = (first.price.amount(), second.price.amount())
    else {
        return Err(FlightSearchError::InvalidResponse(format!(
            "unreadable leg price ({} / {})",
            first.price.total, second.price.total
        )));
    };

    let mut itineraries = first.itineraries.clone();
    itineraries.extend(second.itineraries.iter().cloned());

    Ok(FlightOffer {
        id: format!("smart-{}-{}-{}", hub, first.id, second.id),
        price: FlightPrice {
            total: format!("{:.2}", first_price + second_price),
            currency: first.price.currency.clone(),
        },
        itineraries,
        is_smart_layover: true,
        layover_city: Some(hub.to_string()),
        layover_duration: Some(layover_label(first, second)),
        layover_visa: visa,
    })
}

/// Time on the ground at the hub as `"{h}h {m}m"`, from the first leg's last
/// arrival to the second leg's first departure (both hub local time).
fn layover_label(first: &FlightOffer, second: &FlightOffer) -> String {
    let arrival = first.last_arrival().and_then(|e| parse_local(&e.at));
    let departure = second.first_departure().and_then(|e| parse_local(&e.at));

    match (arrival, departure) {
        (Some(arrival), Some(departure)) if departure >= arrival => {
            let minutes = (departure - arrival).num_minutes();
            format!("{}h {}m", minutes / 60, minutes % 60)
        }
        _ => FALLBACK_LAYOVER_LABEL.to_string(),
    }
}

fn parse_local(at: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(at, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(at, "%Y-%m-%dT%H:%M"))
        .ok()
}

/// Cheapest first. Offers with unreadable prices go last; ties keep order.
pub fn sort_by_price(offers: &mut [FlightOffer]) {
    offers.sort_by(|a, b| match (a.price.amount(), b.price.amount()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
