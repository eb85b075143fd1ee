//! Route/stop identifier resolution.

use std::collections::HashMap;

use crate::static_data::StaticData;

/// Sentinel name for identifiers missing from the static tables.
pub const UNKNOWN: &str = "Unknown";

/// Resolves feed identifiers to human-readable names. Both lookups are total:
/// an unmapped identifier resolves to [`UNKNOWN`].
#[derive(Debug, Clone)]
pub struct IdentifierMapper {
    routes: HashMap<String, String>,
    stops: HashMap<String, String>,
}

impl IdentifierMapper {
    pub fn new(routes: HashMap<String, String>, stops: HashMap<String, String>) -> Self {
        Self { routes, stops }
    }

    pub fn from_static(data: &StaticData) -> Self {
        Self::new(data.routes.clone(), data.stops.clone())
    }

    /// Branch name for a route id.
    pub fn map_route(&self, route_id: &str) -> &str {
        self.routes.get(route_id).map_or(UNKNOWN, String::as_str)
    }

    /// Station name for a stop id.
    pub fn map_stop(&self, stop_id: &str) -> &str {
        self.stops.get(stop_id).map_or(UNKNOWN, String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> IdentifierMapper {
        IdentifierMapper::from_static(&StaticData::lirr())
    }

    #[test]
    fn test_known_identifiers() {
        let m = mapper();
        assert_eq!(m.map_route("1"), "Babylon");
        assert_eq!(m.map_route("10"), "Far Rockaway");
        assert_eq!(m.map_stop("8"), "Babylon");
        assert_eq!(m.map_stop("701"), "Grand Central Madison");
    }

    #[test]
    fn test_unmapped_identifiers_resolve_to_unknown() {
        let m = mapper();
        assert_eq!(m.map_route("999"), UNKNOWN);
        assert_eq!(m.map_stop("999999"), UNKNOWN);
        assert_eq!(m.map_route(""), UNKNOWN);
    }

    #[test]
    fn test_route_and_stop_tables_are_separate() {
        // "7" is the Montauk branch but the Amityville stop
        let m = mapper();
        assert_eq!(m.map_route("7"), "Montauk");
        assert_eq!(m.map_stop("7"), "Amityville");
    }
}
