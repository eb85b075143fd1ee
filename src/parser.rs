//! Protobuf parser for GTFS Realtime feeds.
//!
//! [`parse_feed`] exposes the generated [`FeedMessage`]; [`decode_trip_updates`]
//! flattens it into the [`RawTripUpdate`] records the extractor consumes.

use prost::{DecodeError, Message};

use crate::gtfs_rt::trip_update::{StopTimeEvent, StopTimeUpdate};
use crate::gtfs_rt::{FeedMessage, TripUpdate};

/// Decodes a protobuf-encoded GTFS-RT [`FeedMessage`] from raw bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid protobuf for a `FeedMessage`.
pub fn parse_feed(bytes: &[u8]) -> Result<FeedMessage, DecodeError> {
    FeedMessage::decode(bytes)
}

/// Arrival or departure timing at one stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawStopEvent {
    /// POSIX seconds. Absent values decode as `None`, not as zero.
    pub time: Option<i64>,
    pub delay: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawStopTimeUpdate {
    pub stop_id: String,
    pub arrival: Option<RawStopEvent>,
    pub departure: Option<RawStopEvent>,
}

/// One decoded trip update, in feed order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTripUpdate {
    pub trip_id: String,
    pub route_id: String,
    pub stop_time_updates: Vec<RawStopTimeUpdate>,
}

impl From<&StopTimeEvent> for RawStopEvent {
    fn from(event: &StopTimeEvent) -> Self {
        Self {
            time: event.time,
            delay: event.delay,
        }
    }
}

impl From<&StopTimeUpdate> for RawStopTimeUpdate {
    fn from(update: &StopTimeUpdate) -> Self {
        Self {
            stop_id: update.stop_id.clone().unwrap_or_default(),
            arrival: update.arrival.as_ref().map(RawStopEvent::from),
            departure: update.departure.as_ref().map(RawStopEvent::from),
        }
    }
}

impl From<&TripUpdate> for RawTripUpdate {
    fn from(update: &TripUpdate) -> Self {
        Self {
            trip_id: update.trip.trip_id.clone().unwrap_or_default(),
            route_id: update.trip.route_id.clone().unwrap_or_default(),
            stop_time_updates: update
                .stop_time_update
                .iter()
                .map(RawStopTimeUpdate::from)
                .collect(),
        }
    }
}

/// Decodes a feed snapshot into its trip updates. Entities that carry no
/// trip update (alerts, vehicle positions, deletions without payload) are
/// skipped.
pub fn decode_trip_updates(bytes: &[u8]) -> Result<Vec<RawTripUpdate>, DecodeError> {
    let feed = parse_feed(bytes)?;
    Ok(trip_updates(&feed))
}

pub fn trip_updates(feed: &FeedMessage) -> Vec<RawTripUpdate> {
    feed.entity
        .iter()
        .filter_map(|e| e.trip_update.as_ref())
        .map(RawTripUpdate::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs_rt::{FeedEntity, FeedHeader, TripDescriptor};

    fn header() -> FeedHeader {
        FeedHeader {
            gtfs_realtime_version: "2.0".to_string(),
            timestamp: Some(1234567890),
            incrementality: None,
            feed_version: None,
        }
    }

    #[test]
    fn test_parse_empty_bytes_returns_default_feed() {
        // An empty byte array decodes to a FeedMessage with default values
        let feed = parse_feed(&[]).unwrap();
        assert_eq!(feed.header.gtfs_realtime_version, "");
        assert!(feed.entity.is_empty());
    }

    #[test]
    fn test_parse_invalid_bytes() {
        let invalid_bytes = vec![0xFF, 0xFE, 0x00, 0x01];
        assert!(parse_feed(&invalid_bytes).is_err());
        assert!(decode_trip_updates(&invalid_bytes).is_err());
    }

    #[test]
    fn test_parse_valid_minimal_feed() {
        let feed = FeedMessage {
            header: header(),
            entity: vec![],
        };
        let parsed = parse_feed(&feed.encode_to_vec()).unwrap();

        assert_eq!(parsed.header.gtfs_realtime_version, "2.0");
        assert_eq!(parsed.header.timestamp, Some(1234567890));
    }

    #[test]
    fn test_decode_skips_entities_without_trip_update() {
        let feed = FeedMessage {
            header: header(),
            entity: vec![
                FeedEntity {
                    id: "alert-only".to_string(),
                    ..Default::default()
                },
                FeedEntity {
                    id: "e1".to_string(),
                    trip_update: Some(TripUpdate {
                        trip: TripDescriptor {
                            trip_id: Some("T1".to_string()),
                            route_id: Some("1".to_string()),
                            ..Default::default()
                        },
                        stop_time_update: vec![StopTimeUpdate {
                            stop_id: Some("8".to_string()),
                            departure: Some(StopTimeEvent {
                                time: Some(1720095300),
                                delay: Some(60),
                                ..Default::default()
                            }),
                            ..Default::default()
                        }],
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            ],
        };

        let updates = decode_trip_updates(&feed.encode_to_vec()).unwrap();

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].trip_id, "T1");
        assert_eq!(updates[0].route_id, "1");
        let stu = &updates[0].stop_time_updates[0];
        assert_eq!(stu.stop_id, "8");
        assert_eq!(stu.arrival, None);
        assert_eq!(
            stu.departure,
            Some(RawStopEvent {
                time: Some(1720095300),
                delay: Some(60),
            })
        );
    }
}
