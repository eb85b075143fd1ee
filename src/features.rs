//! Feature derivation for the delay-cause classifier.

use std::collections::HashSet;
use std::fmt;

use chrono::{Datelike, Timelike};
use serde::Serialize;

use crate::extract::Observation;
use crate::holidays::HolidayCalendar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RushHour {
    #[serde(rename = "AM_Rush")]
    AmRush,
    #[serde(rename = "PM_Rush")]
    PmRush,
    #[serde(rename = "Off_Peak")]
    OffPeak,
}

impl RushHour {
    /// 06–09 is the morning rush and 16–19 the evening rush, both inclusive.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=9 => RushHour::AmRush,
            16..=19 => RushHour::PmRush,
            _ => RushHour::OffPeak,
        }
    }

    /// Category label used by the trained column names.
    pub fn as_str(&self) -> &'static str {
        match self {
            RushHour::AmRush => "AM_Rush",
            RushHour::PmRush => "PM_Rush",
            RushHour::OffPeak => "Off_Peak",
        }
    }
}

impl fmt::Display for RushHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureRow {
    pub branch: String,
    pub rush_hour: RushHour,
    pub is_holiday: u8,
    pub is_hub_station: u8,
    /// Monday = 0.
    pub day_of_week: u32,
    pub hour: u32,
}

/// Builds [`FeatureRow`]s against the process-wide holiday calendar and
/// hub-station set.
pub struct FeatureBuilder<'a> {
    holidays: &'a HolidayCalendar,
    hub_stations: &'a HashSet<String>,
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(holidays: &'a HolidayCalendar, hub_stations: &'a HashSet<String>) -> Self {
        Self {
            holidays,
            hub_stations,
        }
    }

    pub fn build(&self, observation: &Observation) -> FeatureRow {
        let local = &observation.departure;
        let hour = local.hour();

        FeatureRow {
            branch: observation.branch.clone(),
            rush_hour: RushHour::from_hour(hour),
            is_holiday: self.holidays.is_holiday(local.date_naive()) as u8,
            is_hub_station: self.hub_stations.contains(&observation.station) as u8,
            day_of_week: local.weekday().num_days_from_monday(),
            hour,
        }
    }

    pub fn build_batch(&self, observations: &[Observation]) -> Vec<FeatureRow> {
        observations.iter().map(|o| self.build(o)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::static_data::StaticData;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    fn observation(station: &str, y: i32, m: u32, d: u32, h: u32, min: u32) -> Observation {
        Observation {
            trip_id: "T1".to_string(),
            branch: "Babylon".to_string(),
            station: station.to_string(),
            departure: New_York.with_ymd_and_hms(y, m, d, h, min, 0).unwrap(),
        }
    }

    #[test]
    fn test_rush_hour_boundaries() {
        assert_eq!(RushHour::from_hour(5), RushHour::OffPeak);
        assert_eq!(RushHour::from_hour(6), RushHour::AmRush);
        assert_eq!(RushHour::from_hour(9), RushHour::AmRush);
        assert_eq!(RushHour::from_hour(10), RushHour::OffPeak);
        assert_eq!(RushHour::from_hour(15), RushHour::OffPeak);
        assert_eq!(RushHour::from_hour(16), RushHour::PmRush);
        assert_eq!(RushHour::from_hour(19), RushHour::PmRush);
        assert_eq!(RushHour::from_hour(20), RushHour::OffPeak);
        assert_eq!(RushHour::from_hour(0), RushHour::OffPeak);
    }

    #[test]
    fn test_independence_day_babylon() {
        let data = StaticData::lirr();
        let cal = HolidayCalendar::default();
        let builder = FeatureBuilder::new(&cal, &data.hub_stations);

        let row = builder.build(&observation("Babylon", 2024, 7, 4, 8, 15));

        assert_eq!(row.branch, "Babylon");
        assert_eq!(row.rush_hour, RushHour::AmRush);
        assert_eq!(row.is_holiday, 1);
        assert_eq!(row.is_hub_station, 0);
        assert_eq!(row.day_of_week, 3);
        assert_eq!(row.hour, 8);
    }

    #[test]
    fn test_hub_flag_follows_configured_set() {
        let cal = HolidayCalendar::default();
        let hubs: HashSet<String> = ["Jamaica".to_string()].into_iter().collect();
        let builder = FeatureBuilder::new(&cal, &hubs);

        assert_eq!(builder.build(&observation("Jamaica", 2024, 7, 8, 17, 0)).is_hub_station, 1);
        assert_eq!(builder.build(&observation("Babylon", 2024, 7, 8, 17, 0)).is_hub_station, 0);
    }

    #[test]
    fn test_holiday_uses_local_date() {
        // 2024-07-04 23:30 in New York is already July 5 in UTC
        let data = StaticData::lirr();
        let cal = HolidayCalendar::default();
        let builder = FeatureBuilder::new(&cal, &data.hub_stations);

        let row = builder.build(&observation("Babylon", 2024, 7, 4, 23, 30));
        assert_eq!(row.is_holiday, 1);
        assert_eq!(row.rush_hour, RushHour::OffPeak);

        let row = builder.build(&observation("Babylon", 2024, 7, 5, 0, 30));
        assert_eq!(row.is_holiday, 0);
        assert_eq!(row.day_of_week, 4);
    }
}
