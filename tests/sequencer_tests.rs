//! Route sequencer tests over real Hong Kong / Macau coordinates.

mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;

use fixtures::*;
use stocktake_planner::error::DistanceUnavailable;
use stocktake_planner::haversine::{haversine_km, NoRouting, StraightLine};
use stocktake_planner::model::{DayPlan, DistanceSource, GeoPoint, Region, Shop, TravelEstimate};
use stocktake_planner::sequencer::{RouteSequencer, SequencerOptions};
use stocktake_planner::traits::DistanceProvider;

// ============================================================================
// Test Providers
// ============================================================================

/// Answers only for points east of 114.0 (Hong Kong proper), like a routing
/// service without Macau coverage.
struct HongKongOnly {
    calls: AtomicUsize,
}

impl HongKongOnly {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl DistanceProvider for HongKongOnly {
    fn estimate(&self, from: GeoPoint, to: GeoPoint) -> Result<TravelEstimate, DistanceUnavailable> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if from.lng < 114.0 || to.lng < 114.0 {
            return Err(DistanceUnavailable::new("outside coverage"));
        }
        let km = haversine_km(from, to) * 1.4;
        Ok(TravelEstimate {
            distance_km: km,
            duration_min: km * 2.0,
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn plan_on(day: u32, shops: Vec<Shop>) -> DayPlan {
    let shops = shops
        .into_iter()
        .enumerate()
        .map(|(rank, mut shop)| {
            shop.import_rank = rank;
            shop
        })
        .collect();
    DayPlan::new(NaiveDate::from_ymd_opt(2025, 3, day).unwrap(), shops)
}

fn ids(plan: &DayPlan) -> Vec<String> {
    plan.shop_ids().map(|id| id.to_string()).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_orders_island_line_west_to_east() {
    // Shuffled stations along the Island line, starting from Central.
    let shops = vec![
        TestShop::at("central", &HONG_KONG_ISLAND[0]).build(),
        TestShop::at("north-point", &HONG_KONG_ISLAND[4]).build(),
        TestShop::at("admiralty", &HONG_KONG_ISLAND[1]).build(),
        TestShop::at("causeway-bay", &HONG_KONG_ISLAND[3]).build(),
        TestShop::at("wan-chai", &HONG_KONG_ISLAND[2]).build(),
    ];
    let sequencer = RouteSequencer::new(StraightLine::default(), &SequencerOptions::default());
    let out = sequencer.order(plan_on(3, shops));

    assert_eq!(
        ids(&out),
        vec!["central", "admiralty", "wan-chai", "causeway-bay", "north-point"]
    );
    assert_eq!(out.distance_source, DistanceSource::Live);
    assert!(!out.is_degraded());
}

#[test]
fn test_sequencing_is_idempotent() {
    let sequencer = RouteSequencer::new(StraightLine::default(), &SequencerOptions::default());
    let once = sequencer.order(plan_on(3, shops_at(KOWLOON)));
    let twice = sequencer.order(once.clone());
    assert_eq!(ids(&once), ids(&twice));
    assert_eq!(once.cost, twice.cost);
}

#[test]
fn test_all_unavailable_still_orders_and_flags_degraded() {
    let shops = vec![
        TestShop::at("A", &KOWLOON[0]).build(),
        TestShop::at("B", &KOWLOON[2]).build(),
        TestShop::at("C", &KOWLOON[1]).build(),
    ];
    let sequencer = RouteSequencer::new(NoRouting, &SequencerOptions::default());
    let out = sequencer.order(plan_on(3, shops));

    assert_eq!(ids(&out), vec!["A", "C", "B"]);
    assert_eq!(out.distance_source, DistanceSource::Fallback);
    assert!(out.is_degraded());
    let cost = out.cost.unwrap();
    assert!(cost.distance_km > 0.0);
    assert!(cost.duration_min > 0.0);
}

#[test]
fn test_partial_coverage_is_mixed() {
    let shops = vec![
        TestShop::at("hk1", &HONG_KONG_ISLAND[0]).build(),
        TestShop::at("hk2", &HONG_KONG_ISLAND[1]).build(),
        TestShop::at("mo1", &MACAU[0]).build(),
    ];
    let provider = HongKongOnly::new();
    let sequencer = RouteSequencer::new(&provider, &SequencerOptions::default());
    let out = sequencer.order(plan_on(3, shops));

    assert_eq!(ids(&out), vec!["hk1", "hk2", "mo1"]);
    assert_eq!(out.distance_source, DistanceSource::Mixed);
    assert!(provider.calls.load(Ordering::Relaxed) >= 2);
}

#[test]
fn test_shops_without_coordinates_go_last() {
    let shops = vec![
        TestShop::new("no-geo-1", Region::Kowloon).build(),
        TestShop::at("A", &KOWLOON[0]).build(),
        TestShop::new("no-geo-2", Region::Kowloon).build(),
        TestShop::at("B", &KOWLOON[1]).build(),
    ];
    let sequencer = RouteSequencer::new(StraightLine::default(), &SequencerOptions::default());
    let out = sequencer.order(plan_on(3, shops));
    assert_eq!(ids(&out), vec!["A", "B", "no-geo-1", "no-geo-2"]);
}

#[test]
fn test_order_all_keeps_day_order() {
    let plans: Vec<DayPlan> = (3..8)
        .map(|day| plan_on(day, shops_at(NEW_TERRITORIES)))
        .collect();
    let provider = HongKongOnly::new();
    let sequencer = RouteSequencer::new(&provider, &SequencerOptions::default());
    let out = sequencer.order_all(plans);

    let days: Vec<u32> = out.iter().map(|plan| chrono::Datelike::day(&plan.date)).collect();
    assert_eq!(days, vec![3, 4, 5, 6, 7]);
    assert!(out.iter().all(|plan| plan.cost.is_some() && plan.len() == NEW_TERRITORIES.len()));
    let first = ids(&out[0]);
    assert!(out.iter().all(|plan| ids(plan) == first));
}
