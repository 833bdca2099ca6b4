//! Real Hong Kong and Macau locations for realistic test fixtures.
//!
//! Coordinates are MTR station exits and shopping streets taken from
//! OpenStreetMap.

use stocktake_planner::model::Region;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub district: &'static str,
    pub region: Region,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, district: &'static str, region: Region, lat: f64, lng: f64) -> Self {
        Self {
            name,
            district,
            region,
            lat,
            lng,
        }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

// ============================================================================
// Hong Kong Island
// ============================================================================

pub const HONG_KONG_ISLAND: &[Location] = &[
    Location::new("Central", "Central and Western", Region::HongKongIsland, 22.2819, 114.1581),
    Location::new("Admiralty", "Central and Western", Region::HongKongIsland, 22.2799, 114.1653),
    Location::new("Wan Chai", "Wan Chai", Region::HongKongIsland, 22.2776, 114.1730),
    Location::new("Causeway Bay", "Wan Chai", Region::HongKongIsland, 22.2802, 114.1849),
    Location::new("North Point", "Eastern", Region::HongKongIsland, 22.2912, 114.2005),
    Location::new("Quarry Bay", "Eastern", Region::HongKongIsland, 22.2880, 114.2096),
];

// ============================================================================
// Kowloon
// ============================================================================

pub const KOWLOON: &[Location] = &[
    Location::new("Tsim Sha Tsui", "Yau Tsim Mong", Region::Kowloon, 22.2976, 114.1722),
    Location::new("Jordan", "Yau Tsim Mong", Region::Kowloon, 22.3049, 114.1717),
    Location::new("Mong Kok", "Yau Tsim Mong", Region::Kowloon, 22.3193, 114.1694),
    Location::new("Sham Shui Po", "Sham Shui Po", Region::Kowloon, 22.3307, 114.1622),
    Location::new("Kowloon Tong", "Kowloon City", Region::Kowloon, 22.3370, 114.1760),
    Location::new("Kwun Tong", "Kwun Tong", Region::Kowloon, 22.3124, 114.2260),
    Location::new("Diamond Hill", "Wong Tai Sin", Region::Kowloon, 22.3400, 114.2016),
];

// ============================================================================
// New Territories
// ============================================================================

pub const NEW_TERRITORIES: &[Location] = &[
    Location::new("Sha Tin", "Sha Tin", Region::NewTerritories, 22.3823, 114.1878),
    Location::new("Tai Po Market", "Tai Po", Region::NewTerritories, 22.4445, 114.1704),
    Location::new("Tsuen Wan", "Tsuen Wan", Region::NewTerritories, 22.3736, 114.1177),
    Location::new("Tuen Mun", "Tuen Mun", Region::NewTerritories, 22.3950, 113.9731),
    Location::new("Yuen Long", "Yuen Long", Region::NewTerritories, 22.4460, 114.0347),
];

// ============================================================================
// Islands
// ============================================================================

pub const ISLANDS: &[Location] = &[
    Location::new("Tung Chung", "Islands", Region::Islands, 22.2892, 113.9414),
    Location::new("Mui Wo", "Islands", Region::Islands, 22.2647, 113.9991),
];

// ============================================================================
// Macau
// ============================================================================

pub const MACAU: &[Location] = &[
    Location::new("Senado Square", "Se", Region::Macau, 22.1933, 113.5397),
    Location::new("Rua do Cunha", "Taipa", Region::Macau, 22.1537, 113.5562),
    Location::new("Red Market", "Nossa Senhora de Fatima", Region::Macau, 22.2048, 113.5469),
];
