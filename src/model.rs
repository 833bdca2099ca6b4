//! Domain types shared by the pool, engine, sequencer and store.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// Unique shop identifier as it appears in the shop master list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShopId(String);

impl ShopId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShopId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Top-level territory grouping.
///
/// Variant order matches the alphabetical order of the region codes, so the
/// derived `Ord` is the tie-break order used by the assignment engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "HK")]
    HongKongIsland,
    #[serde(rename = "IS")]
    Islands,
    #[serde(rename = "KN")]
    Kowloon,
    #[serde(rename = "MO")]
    Macau,
    #[serde(rename = "NT")]
    NewTerritories,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::HongKongIsland,
        Region::Islands,
        Region::Kowloon,
        Region::Macau,
        Region::NewTerritories,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Region::HongKongIsland => "HK",
            Region::Islands => "IS",
            Region::Kowloon => "KN",
            Region::Macau => "MO",
            Region::NewTerritories => "NT",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HK" | "HONG KONG" | "HONG KONG ISLAND" => Ok(Region::HongKongIsland),
            "IS" | "ISLANDS" | "OUTLYING ISLANDS" => Ok(Region::Islands),
            "KN" | "KLN" | "KOWLOON" => Ok(Region::Kowloon),
            "MO" | "MACAU" | "MACAO" => Ok(Region::Macau),
            "NT" | "NEW TERRITORIES" => Ok(Region::NewTerritories),
            other => Err(PlannerError::UnknownRegion(other.to_string())),
        }
    }
}

/// Stock-take status of a shop, also carried on schedule entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ShopStatus {
    #[default]
    Unscheduled,
    Planned,
    Done,
    Closed,
    Rescheduled,
}

impl ShopStatus {
    /// Whether a shop in this status may be pulled into a new generation run.
    pub fn is_schedulable(self) -> bool {
        match self {
            ShopStatus::Unscheduled | ShopStatus::Rescheduled => true,
            ShopStatus::Planned | ShopStatus::Done | ShopStatus::Closed => false,
        }
    }

    pub fn can_transition_to(self, next: ShopStatus) -> bool {
        use ShopStatus::*;
        match (self, next) {
            (Unscheduled, Planned) => true,
            (Planned, Done) | (Planned, Closed) | (Planned, Rescheduled) => true,
            (Rescheduled, Planned) | (Rescheduled, Closed) => true,
            (Unscheduled, _) | (Planned, _) | (Rescheduled, _) => false,
            (Done, _) | (Closed, _) => false,
        }
    }
}

impl fmt::Display for ShopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ShopStatus::Unscheduled => "Unscheduled",
            ShopStatus::Planned => "Planned",
            ShopStatus::Done => "Done",
            ShopStatus::Closed => "Closed",
            ShopStatus::Rescheduled => "Rescheduled",
        };
        f.write_str(label)
    }
}

impl FromStr for ShopStatus {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "unscheduled" => Ok(ShopStatus::Unscheduled),
            "planned" => Ok(ShopStatus::Planned),
            "done" => Ok(ShopStatus::Done),
            "closed" => Ok(ShopStatus::Closed),
            "rescheduled" => Ok(ShopStatus::Rescheduled),
            other => Err(PlannerError::UnknownStatus(other.to_string())),
        }
    }
}

/// Whether MTR-accessible shops are required, excluded, or not filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MtrFilter {
    Require,
    Exclude,
    #[default]
    None,
}

impl MtrFilter {
    pub fn admits(self, mtr_accessible: bool) -> bool {
        match self {
            MtrFilter::Require => mtr_accessible,
            MtrFilter::Exclude => !mtr_accessible,
            MtrFilter::None => true,
        }
    }
}

/// Geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub region: Region,
    pub district: String,
    pub brand: String,
    pub location: Option<GeoPoint>,
    pub mtr_accessible: bool,
    pub active: bool,
    pub status: ShopStatus,
    /// Position of the shop in the master snapshot it was imported from.
    pub import_rank: usize,
}

impl Shop {
    pub fn new(id: impl Into<String>, region: Region) -> Self {
        Self {
            id: ShopId::new(id),
            region,
            district: String::new(),
            brand: String::new(),
            location: None,
            mtr_accessible: false,
            active: true,
            status: ShopStatus::Unscheduled,
            import_rank: 0,
        }
    }

    pub fn with_location(mut self, lat: f64, lng: f64) -> Self {
        self.location = Some(GeoPoint::new(lat, lng));
        self
    }

    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district = district.into();
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn with_mtr(mut self, mtr_accessible: bool) -> Self {
        self.mtr_accessible = mtr_accessible;
        self
    }

    pub fn with_status(mut self, status: ShopStatus) -> Self {
        self.status = status;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Accumulated travel estimate for a day's route.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TravelCost {
    pub distance_km: f64,
    pub duration_min: f64,
}

impl TravelCost {
    pub fn add(&mut self, leg: TravelEstimate) {
        self.distance_km += leg.distance_km;
        self.duration_min += leg.duration_min;
    }
}

/// Distance/duration estimate for a single leg between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TravelEstimate {
    pub distance_km: f64,
    pub duration_min: f64,
}

/// Which kind of estimates a route ordering was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DistanceSource {
    /// Not sequenced yet, or no leg needed an estimate.
    #[default]
    NotRouted,
    Live,
    Fallback,
    Mixed,
}

impl DistanceSource {
    pub fn from_counts(live: usize, fallback: usize) -> Self {
        match (live, fallback) {
            (0, 0) => DistanceSource::NotRouted,
            (_, 0) => DistanceSource::Live,
            (0, _) => DistanceSource::Fallback,
            _ => DistanceSource::Mixed,
        }
    }

    pub fn is_degraded(self) -> bool {
        matches!(self, DistanceSource::Fallback | DistanceSource::Mixed)
    }
}

/// One shop visit within a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub shop: Shop,
    /// Team number within the day, starting at 1.
    pub group: u32,
}

/// The set and order of shops assigned to one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub stops: Vec<Stop>,
    pub cost: Option<TravelCost>,
    pub distance_source: DistanceSource,
}

impl DayPlan {
    pub fn new(date: NaiveDate, shops: Vec<Shop>) -> Self {
        Self {
            date,
            stops: shops.into_iter().map(|shop| Stop { shop, group: 1 }).collect(),
            cost: None,
            distance_source: DistanceSource::NotRouted,
        }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn shop_ids(&self) -> impl Iterator<Item = &ShopId> {
        self.stops.iter().map(|stop| &stop.shop.id)
    }

    pub fn regions(&self) -> BTreeSet<Region> {
        self.stops.iter().map(|stop| stop.shop.region).collect()
    }

    pub fn is_degraded(&self) -> bool {
        self.distance_source.is_degraded()
    }

    /// Split the visit order into `groups_per_day` contiguous teams.
    pub fn assign_groups(&mut self, groups_per_day: usize) {
        let groups = groups_per_day.max(1);
        let per_group = self.stops.len().div_ceil(groups).max(1);
        for (position, stop) in self.stops.iter_mut().enumerate() {
            stop.group = ((position / per_group).min(groups - 1) + 1) as u32;
        }
    }
}

/// A persisted schedule row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub date: NaiveDate,
    pub shop_id: ShopId,
    /// Position within the day, starting at 1.
    pub sequence: u32,
    pub group: u32,
    pub status: ShopStatus,
    pub status_reason: Option<String>,
}

impl ScheduleEntry {
    /// Rescheduled entries are history; every other status blocks a new entry.
    pub fn is_active(&self) -> bool {
        self.status != ShopStatus::Rescheduled
    }
}
