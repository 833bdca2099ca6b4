//! Route sequencing: nearest-neighbour ordering of one day's visits.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::haversine::{StraightLine, DEFAULT_SPEED_KMH};
use crate::model::{DayPlan, DistanceSource, GeoPoint, Stop, TravelCost, TravelEstimate};
use crate::traits::DistanceProvider;

/// Which component of an estimate the ordering minimises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CostMetric {
    #[default]
    Duration,
    Distance,
}

impl CostMetric {
    fn of(self, leg: &TravelEstimate) -> f64 {
        match self {
            CostMetric::Duration => leg.duration_min,
            CostMetric::Distance => leg.distance_km,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerOptions {
    pub metric: CostMetric,
    /// Speed assumed when a leg falls back to straight-line distance.
    pub fallback_speed_kmh: f64,
}

impl Default for SequencerOptions {
    fn default() -> Self {
        Self {
            metric: CostMetric::Duration,
            fallback_speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteSequencer<D> {
    provider: D,
    fallback: StraightLine,
    metric: CostMetric,
}

#[derive(Default)]
struct LegCounts {
    live: usize,
    fallback: usize,
}

impl<D: DistanceProvider> RouteSequencer<D> {
    pub fn new(provider: D, options: &SequencerOptions) -> Self {
        Self {
            provider,
            fallback: StraightLine::new(options.fallback_speed_kmh),
            metric: options.metric,
        }
    }

    /// Reorder `plan` by nearest neighbour from its first located shop and
    /// populate its travel cost.
    ///
    /// Shops without coordinates keep their relative order after the located
    /// ones. Ties are broken by import rank. A plan with fewer than two
    /// located shops is returned in its original order.
    pub fn order(&self, mut plan: DayPlan) -> DayPlan {
        let located_count = plan.stops.iter().filter(|stop| stop.shop.location.is_some()).count();
        if located_count < 2 {
            plan.cost = Some(TravelCost::default());
            plan.distance_source = DistanceSource::NotRouted;
            return plan;
        }

        let (mut located, unlocated): (Vec<(GeoPoint, Stop)>, Vec<Stop>) = split_located(plan.stops);

        let mut counts = LegCounts::default();
        let mut cost = TravelCost::default();
        let mut route = Vec::with_capacity(located.len() + unlocated.len());

        let (mut current, first) = located.remove(0);
        route.push(first);

        while !located.is_empty() {
            let legs: Vec<TravelEstimate> = located
                .iter()
                .map(|(point, _)| self.leg(current, *point, &mut counts))
                .collect();

            let mut best = 0;
            for candidate in 1..located.len() {
                let by_cost = self
                    .metric
                    .of(&legs[candidate])
                    .total_cmp(&self.metric.of(&legs[best]));
                let by_rank = located[candidate]
                    .1
                    .shop
                    .import_rank
                    .cmp(&located[best].1.shop.import_rank);
                if by_cost.then(by_rank).is_lt() {
                    best = candidate;
                }
            }

            cost.add(legs[best]);
            let (point, stop) = located.remove(best);
            current = point;
            route.push(stop);
        }

        route.extend(unlocated);
        plan.stops = route;
        plan.cost = Some(cost);
        plan.distance_source = DistanceSource::from_counts(counts.live, counts.fallback);

        debug!(
            date = %plan.date,
            stops = plan.stops.len(),
            distance_km = cost.distance_km,
            degraded = plan.is_degraded(),
            "sequenced day"
        );
        plan
    }

    fn leg(&self, from: GeoPoint, to: GeoPoint, counts: &mut LegCounts) -> TravelEstimate {
        match self.provider.estimate(from, to) {
            Ok(leg) if is_usable(&leg) => {
                counts.live += 1;
                leg
            }
            Ok(_) => {
                counts.fallback += 1;
                self.fallback.leg(from, to)
            }
            Err(err) => {
                debug!(reason = %err.reason, "falling back to straight-line distance");
                counts.fallback += 1;
                self.fallback.leg(from, to)
            }
        }
    }
}

impl<D: DistanceProvider + Sync> RouteSequencer<D> {
    /// Sequence every plan, days in parallel, preserving day order.
    pub fn order_all(&self, plans: Vec<DayPlan>) -> Vec<DayPlan> {
        plans.into_par_iter().map(|plan| self.order(plan)).collect()
    }
}

fn is_usable(leg: &TravelEstimate) -> bool {
    leg.distance_km.is_finite()
        && leg.duration_min.is_finite()
        && leg.distance_km >= 0.0
        && leg.duration_min >= 0.0
}

fn split_located(stops: Vec<Stop>) -> (Vec<(GeoPoint, Stop)>, Vec<Stop>) {
    let mut located = Vec::with_capacity(stops.len());
    let mut unlocated = Vec::new();
    for stop in stops {
        match stop.shop.location {
            Some(point) => located.push((point, stop)),
            None => unlocated.push(stop),
        }
    }
    (located, unlocated)
}
