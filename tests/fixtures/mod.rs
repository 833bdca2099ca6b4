//! Test fixtures for stocktake-planner.
//!
//! Provides:
//! - Real Hong Kong / Macau shop locations
//! - A builder for test shops

#![allow(dead_code)]

pub mod hk_locations;

pub use hk_locations::*;

use stocktake_planner::model::{Region, Shop, ShopStatus};

/// Builder for test shops with sensible defaults.
#[derive(Clone, Debug)]
pub struct TestShop {
    id: String,
    region: Region,
    location: Option<(f64, f64)>,
    district: String,
    brand: String,
    mtr: bool,
    status: ShopStatus,
    active: bool,
}

impl TestShop {
    pub fn new(id: &str, region: Region) -> Self {
        Self {
            id: id.to_string(),
            region,
            location: None,
            district: String::new(),
            brand: "Mannings".to_string(),
            mtr: true,
            status: ShopStatus::Unscheduled,
            active: true,
        }
    }

    pub fn at(id: &str, location: &Location) -> Self {
        Self::new(id, location.region)
            .location(location.lat, location.lng)
            .district(location.district)
    }

    pub fn location(mut self, lat: f64, lng: f64) -> Self {
        self.location = Some((lat, lng));
        self
    }

    pub fn district(mut self, district: &str) -> Self {
        self.district = district.to_string();
        self
    }

    pub fn brand(mut self, brand: &str) -> Self {
        self.brand = brand.to_string();
        self
    }

    pub fn no_mtr(mut self) -> Self {
        self.mtr = false;
        self
    }

    pub fn status(mut self, status: ShopStatus) -> Self {
        self.status = status;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn build(self) -> Shop {
        let mut shop = Shop::new(self.id, self.region)
            .with_district(self.district)
            .with_brand(self.brand)
            .with_mtr(self.mtr)
            .with_status(self.status);
        if let Some((lat, lng)) = self.location {
            shop = shop.with_location(lat, lng);
        }
        if !self.active {
            shop = shop.inactive();
        }
        shop
    }
}

/// One test shop per fixture location, ids `S0`, `S1`, ...
pub fn shops_at(locations: &[Location]) -> Vec<Shop> {
    locations
        .iter()
        .enumerate()
        .map(|(i, location)| TestShop::at(&format!("S{i}"), location).build())
        .collect()
}

/// Every fixture location across all regions.
pub fn all_locations() -> Vec<Location> {
    [HONG_KONG_ISLAND, KOWLOON, NEW_TERRITORIES, ISLANDS, MACAU]
        .iter()
        .flat_map(|set| set.iter().cloned())
        .collect()
}
