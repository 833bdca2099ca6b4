//! Capability interfaces at the edges of the planner.
//!
//! The engine and sequencer only see these traits; concrete routing services
//! and persistence layers implement them.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::{DistanceUnavailable, PlannerError};
use crate::model::{DayPlan, GeoPoint, ScheduleEntry, ShopId, ShopStatus, TravelEstimate};

/// Estimates travel between two points.
///
/// Implementations must be side-effect free from the caller's point of view;
/// the sequencer may call them from several threads for different days.
pub trait DistanceProvider {
    fn estimate(&self, from: GeoPoint, to: GeoPoint) -> Result<TravelEstimate, DistanceUnavailable>;
}

impl<T: DistanceProvider + ?Sized> DistanceProvider for &T {
    fn estimate(&self, from: GeoPoint, to: GeoPoint) -> Result<TravelEstimate, DistanceUnavailable> {
        (**self).estimate(from, to)
    }
}

/// Entry counts by status for one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub planned: usize,
    pub done: usize,
    pub closed: usize,
    pub rescheduled: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: ShopStatus) {
        match status {
            ShopStatus::Planned => self.planned += 1,
            ShopStatus::Done => self.done += 1,
            ShopStatus::Closed => self.closed += 1,
            ShopStatus::Rescheduled => self.rescheduled += 1,
            ShopStatus::Unscheduled => {}
        }
    }

    pub fn total(&self) -> usize {
        self.planned + self.done + self.closed + self.rescheduled
    }
}

/// Persists generated schedules and the status of each visit.
pub trait ScheduleStore {
    /// Save every plan of a run, or nothing if any shop conflicts.
    fn save_schedule(&self, plans: &[DayPlan]) -> Result<(), PlannerError>;

    fn schedule_for_date(&self, date: NaiveDate) -> Option<DayPlan>;

    /// Apply a status change to the shop's active entry.
    fn update_status(
        &self,
        shop_id: &ShopId,
        status: ShopStatus,
        reason: Option<String>,
    ) -> Result<ScheduleEntry, PlannerError>;

    /// Mark the active entry Rescheduled and plan the shop on `new_date`.
    fn move_to_date(&self, shop_id: &ShopId, new_date: NaiveDate) -> Result<ScheduleEntry, PlannerError>;

    fn active_shop_ids(&self) -> HashSet<ShopId>;

    fn entries_for_shop(&self, shop_id: &ShopId) -> Vec<ScheduleEntry>;

    fn month_summary(&self, year: i32, month: u32) -> StatusCounts;
}
