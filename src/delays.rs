//! Live delay listing: every stop where the feed reports a late arrival.

use serde::Serialize;

use crate::mapping::IdentifierMapper;
use crate::parser::RawTripUpdate;

pub const NO_DELAYS: &str = "No significant delays reported at this moment.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelayNotice {
    pub trip_id: String,
    pub route_id: String,
    pub branch: String,
    pub stop_id: String,
    pub minutes: i64,
}

/// Whole minutes, rounding halves to even. Returns 0 for anything under
/// 30 seconds.
pub fn delay_minutes(delay_seconds: i32) -> i64 {
    (delay_seconds as f64 / 60.0).round_ties_even() as i64
}

/// One notice per stop-time update whose arrival delay rounds to at least a
/// minute. Trips are not deduplicated.
pub fn collect_delays(updates: &[RawTripUpdate], mapper: &IdentifierMapper) -> Vec<DelayNotice> {
    updates
        .iter()
        .flat_map(move |trip| {
            trip.stop_time_updates.iter().filter_map(move |stu| {
                let delay = stu.arrival.as_ref()?.delay.filter(|d| *d > 0)?;
                let minutes = delay_minutes(delay);
                (minutes > 0).then(|| DelayNotice {
                    trip_id: trip.trip_id.clone(),
                    route_id: trip.route_id.clone(),
                    branch: mapper.map_route(&trip.route_id).to_string(),
                    stop_id: stu.stop_id.clone(),
                    minutes,
                })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{RawStopEvent, RawStopTimeUpdate};
    use crate::static_data::StaticData;

    fn stop(stop_id: &str, arrival_delay: Option<i32>) -> RawStopTimeUpdate {
        RawStopTimeUpdate {
            stop_id: stop_id.to_string(),
            arrival: arrival_delay.map(|d| RawStopEvent {
                time: Some(1720095300),
                delay: Some(d),
            }),
            departure: None,
        }
    }

    #[test]
    fn test_delay_minutes_rounding() {
        assert_eq!(delay_minutes(29), 0);
        assert_eq!(delay_minutes(31), 1);
        assert_eq!(delay_minutes(90), 2);
        assert_eq!(delay_minutes(150), 2);
        assert_eq!(delay_minutes(600), 10);
    }

    #[test]
    fn test_collect_delays() {
        let mapper = IdentifierMapper::from_static(&StaticData::lirr());
        let updates = vec![RawTripUpdate {
            trip_id: "T1".to_string(),
            route_id: "2".to_string(),
            stop_time_updates: vec![
                stop("125", Some(300)),
                stop("119", Some(20)),
                stop("53", Some(-120)),
                stop("61", None),
            ],
        }];

        let delays = collect_delays(&updates, &mapper);

        assert_eq!(
            delays,
            vec![DelayNotice {
                trip_id: "T1".to_string(),
                route_id: "2".to_string(),
                branch: "Ronkonkoma".to_string(),
                stop_id: "125".to_string(),
                minutes: 5,
            }]
        );
    }

    #[test]
    fn test_no_delays() {
        let mapper = IdentifierMapper::from_static(&StaticData::lirr());
        assert!(collect_delays(&[], &mapper).is_empty());
    }
}
