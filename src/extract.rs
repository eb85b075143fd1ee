//! Trip deduplication and incident extraction.
//!
//! Each unique trip in a fetch yields at most one [`Observation`], built from
//! the first stop-time update listed for it.

use std::collections::HashSet;

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::mapping::IdentifierMapper;
use crate::parser::{RawStopTimeUpdate, RawTripUpdate};

/// One active train, as seen in a single fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub trip_id: String,
    pub branch: String,
    pub station: String,
    pub departure: DateTime<Tz>,
}

/// Counters describing what the extractor kept and dropped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    pub trip_updates: usize,
    pub duplicates: usize,
    pub empty_updates: usize,
    pub invalid_times: usize,
    pub observations: usize,
}

/// Departure time when a departure event is present, arrival time otherwise.
/// A present event without a time counts as zero.
fn resolve_instant(update: &RawStopTimeUpdate) -> i64 {
    match (&update.departure, &update.arrival) {
        (Some(departure), _) => departure.time.unwrap_or(0),
        (None, Some(arrival)) => arrival.time.unwrap_or(0),
        (None, None) => 0,
    }
}

pub struct IncidentExtractor<'a> {
    mapper: &'a IdentifierMapper,
    tz: Tz,
}

impl<'a> IncidentExtractor<'a> {
    pub fn new(mapper: &'a IdentifierMapper, tz: Tz) -> Self {
        Self { mapper, tz }
    }

    /// Consumes trip updates in feed order and emits one observation per
    /// unseen trip id with a usable first stop-time update.
    pub fn extract(&self, updates: &[RawTripUpdate]) -> (Vec<Observation>, ExtractionStats) {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut stats = ExtractionStats {
            trip_updates: updates.len(),
            ..Default::default()
        };
        let mut observations = Vec::new();

        for update in updates {
            if seen.contains(update.trip_id.as_str()) {
                stats.duplicates += 1;
                continue;
            }

            let Some(first) = update.stop_time_updates.first() else {
                stats.empty_updates += 1;
                continue;
            };

            seen.insert(update.trip_id.as_str());

            let timestamp = resolve_instant(first);
            let departure = match self.tz.timestamp_opt(timestamp, 0).single() {
                Some(dt) if timestamp > 0 => dt,
                _ => {
                    debug!(trip_id = %update.trip_id, timestamp, "Skipping trip without a valid time");
                    stats.invalid_times += 1;
                    continue;
                }
            };

            observations.push(Observation {
                trip_id: update.trip_id.clone(),
                branch: self.mapper.map_route(&update.route_id).to_string(),
                station: self.mapper.map_stop(&first.stop_id).to_string(),
                departure,
            });
        }

        stats.observations = observations.len();
        (observations, stats)
    }
}
