//! Generation runs across pool, engine, sequencer and store.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::calendar::{estimate_required_business_days, CalendarResolver};
use crate::capacity::CapacityPolicy;
use crate::config::PlannerSettings;
use crate::engine::{self, GenerateRequest, Generation};
use crate::error::PlannerError;
use crate::model::{DayPlan, Region, ScheduleEntry, ShopId, ShopStatus};
use crate::pool::{ShopPool, ShopRecord};
use crate::sequencer::RouteSequencer;
use crate::traits::{DistanceProvider, ScheduleStore, StatusCounts};

/// Summary of one generation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    pub total_pooled: usize,
    pub scheduled: usize,
    pub unscheduled: Vec<ShopId>,
    pub business_days: usize,
    pub start_date: Option<NaiveDate>,
    pub finish_date: Option<NaiveDate>,
    pub region_counts: BTreeMap<Region, usize>,
    pub degraded_days: Vec<NaiveDate>,
    pub skipped_dates: Vec<NaiveDate>,
    pub total_distance_km: f64,
    pub total_duration_min: f64,
    pub avg_daily_distance_km: f64,
    pub avg_daily_duration_min: f64,
}

impl GenerationReport {
    fn new(generation: &Generation, plans: &[DayPlan]) -> Self {
        let mut region_counts = BTreeMap::new();
        let mut total_distance_km = 0.0;
        let mut total_duration_min = 0.0;
        for plan in plans {
            for stop in &plan.stops {
                *region_counts.entry(stop.shop.region).or_insert(0) += 1;
            }
            if let Some(cost) = plan.cost {
                total_distance_km += cost.distance_km;
                total_duration_min += cost.duration_min;
            }
        }

        let days = plans.len();
        let average = |total: f64| if days == 0 { 0.0 } else { total / days as f64 };

        Self {
            total_pooled: generation.pooled,
            scheduled: plans.iter().map(DayPlan::len).sum(),
            unscheduled: generation.unscheduled.clone(),
            business_days: days,
            start_date: plans.first().map(|plan| plan.date),
            finish_date: plans.last().map(|plan| plan.date),
            region_counts,
            degraded_days: plans.iter().filter(|plan| plan.is_degraded()).map(|plan| plan.date).collect(),
            skipped_dates: generation.skipped_dates.clone(),
            total_distance_km,
            total_duration_min,
            avg_daily_distance_km: average(total_distance_km),
            avg_daily_duration_min: average(total_duration_min),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.unscheduled.is_empty()
    }
}

/// Persisted outcome of a generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedSchedule {
    pub plans: Vec<DayPlan>,
    pub report: GenerationReport,
}

/// Capacity estimate for a date window, computed without touching the pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulePreview {
    pub business_days: usize,
    pub estimated_capacity: usize,
    pub active_shops: usize,
    pub coverage_percent: f64,
    pub required_business_days: usize,
    pub estimated_finish_date: Option<NaiveDate>,
}

pub struct StockTakePlanner<S> {
    pool: ShopPool,
    store: S,
    settings: PlannerSettings,
}

impl<S: ScheduleStore> StockTakePlanner<S> {
    pub fn new(pool: ShopPool, store: S, settings: PlannerSettings) -> Self {
        Self { pool, store, settings }
    }

    pub fn pool(&self) -> &ShopPool {
        &self.pool
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// Request starting at `start_date` bounded by the configured `max_days`.
    pub fn request(&self, start_date: NaiveDate) -> GenerateRequest {
        GenerateRequest::new(start_date, self.settings.max_days)
    }

    /// Assign, sequence and persist a schedule.
    ///
    /// The pool stays locked until the store has accepted the plans. Any
    /// configuration or store error leaves both pool and store unchanged.
    pub fn generate<D>(&self, request: &GenerateRequest, provider: D) -> Result<PlannedSchedule, PlannerError>
    where
        D: DistanceProvider + Sync,
    {
        let calendar = CalendarResolver::new(&self.settings.calendar);
        let capacity = CapacityPolicy::new(self.settings.capacity_for(request));
        capacity.validate()?;
        calendar.validate_from(request.start_date)?;

        let mut run = self.pool.begin_run();
        run.exclude(self.store.active_shop_ids());

        let generation = match engine::generate(request, &mut run, &calendar, &capacity) {
            Ok(generation) => generation,
            Err(err) => {
                run.rollback();
                return Err(err.into());
            }
        };

        let sequencer = RouteSequencer::new(provider, &self.settings.sequencer);
        let mut plans = sequencer.order_all(generation.plans.clone());
        for plan in &mut plans {
            plan.assign_groups(capacity.groups_per_day());
        }

        if let Err(err) = self.store.save_schedule(&plans) {
            warn!(error = %err, "schedule save failed, rolling back pool run");
            run.rollback();
            return Err(err);
        }
        run.commit();

        let report = GenerationReport::new(&generation, &plans);
        info!(
            pooled = report.total_pooled,
            scheduled = report.scheduled,
            unscheduled = report.unscheduled.len(),
            days = report.business_days,
            degraded_days = report.degraded_days.len(),
            distance_km = report.total_distance_km,
            "generated stock-take schedule"
        );

        Ok(PlannedSchedule { plans, report })
    }

    pub fn schedule_for_date(&self, date: NaiveDate) -> Option<DayPlan> {
        self.store.schedule_for_date(date)
    }

    /// Record a visit outcome and mirror it onto the pooled shop.
    pub fn update_status(
        &self,
        shop_id: &ShopId,
        status: ShopStatus,
        reason: Option<String>,
    ) -> Result<ScheduleEntry, PlannerError> {
        let entry = self.store.update_status(shop_id, status, reason)?;
        if let Err(err) = self.pool.set_status(shop_id, status) {
            warn!(shop = %shop_id, error = %err, "status recorded for a shop missing from the pool");
        }
        Ok(entry)
    }

    /// Move a planned shop onto another business day that has capacity.
    pub fn move_to_date(&self, shop_id: &ShopId, new_date: NaiveDate) -> Result<ScheduleEntry, PlannerError> {
        let calendar = CalendarResolver::new(&self.settings.calendar);
        let capacity = CapacityPolicy::new(self.settings.capacity.clone());
        if !calendar.is_eligible(new_date) || capacity.limit_for(new_date) == 0 {
            return Err(PlannerError::IneligibleDate {
                shop_id: shop_id.clone(),
                date: new_date,
            });
        }
        self.store.move_to_date(shop_id, new_date)
    }

    pub fn month_summary(&self, year: i32, month: u32) -> StatusCounts {
        self.store.month_summary(year, month)
    }

    /// Replace the pool's backing set. Waits for any run in progress.
    pub fn rebuild_pool(&self, records: Vec<ShopRecord>) -> Result<usize, PlannerError> {
        let active = self.pool.rebuild(records)?;
        info!(active, "rebuilt shop pool");
        Ok(active)
    }

    pub fn preview(&self, start: NaiveDate, end: NaiveDate) -> Result<SchedulePreview, PlannerError> {
        let calendar = CalendarResolver::new(&self.settings.calendar);
        let shops_per_day = self.settings.capacity.shops_per_day;

        let business_days = calendar.count_eligible_days(start, end);
        let estimated_capacity = business_days * shops_per_day;
        let active_shops = self.pool.count_active();
        let required_business_days = estimate_required_business_days(active_shops, shops_per_day);
        let coverage_percent = if active_shops == 0 {
            100.0
        } else {
            (estimated_capacity as f64 / active_shops as f64 * 100.0).min(100.0)
        };
        let estimated_finish_date = if required_business_days == 0 {
            None
        } else {
            Some(calendar.estimate_finish_date(start, required_business_days)?)
        };

        Ok(SchedulePreview {
            business_days,
            estimated_capacity,
            active_shops,
            coverage_percent,
            required_business_days,
            estimated_finish_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::CapacityConfig;
    use crate::calendar::CalendarConfig;
    use crate::haversine::StraightLine;
    use crate::model::Shop;
    use crate::store::InMemoryScheduleStore;

    fn settings(shops_per_day: usize) -> PlannerSettings {
        PlannerSettings {
            calendar: CalendarConfig::weekdays_only(),
            capacity: CapacityConfig::per_day(shops_per_day),
            ..PlannerSettings::default()
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    #[test]
    fn test_report_totals() {
        let pool = ShopPool::new(vec![
            Shop::new("A", Region::Kowloon).with_location(22.30, 114.17),
            Shop::new("B", Region::Kowloon).with_location(22.31, 114.17),
            Shop::new("C", Region::HongKongIsland).with_location(22.28, 114.15),
        ])
        .unwrap();
        let planner = StockTakePlanner::new(pool, InMemoryScheduleStore::new(), settings(2));
        let schedule = planner.generate(&planner.request(monday()), StraightLine::default()).unwrap();
        let report = &schedule.report;
        assert_eq!(report.total_pooled, 3);
        assert_eq!(report.scheduled, 3);
        assert_eq!(report.business_days, 2);
        assert_eq!(report.start_date, Some(monday()));
        assert_eq!(report.region_counts.get(&Region::Kowloon), Some(&2));
        assert!(report.total_distance_km > 0.0);
        assert!((report.avg_daily_distance_km * 2.0 - report.total_distance_km).abs() < 1e-9);
        assert!(report.is_complete());
    }

    #[test]
    fn test_preview_window() {
        let shops = (0..10).map(|i| Shop::new(format!("S{i}"), Region::Kowloon)).collect();
        let planner = StockTakePlanner::new(ShopPool::new(shops).unwrap(), InMemoryScheduleStore::new(), settings(4));
        // Mon 3rd to Sun 9th: five business days.
        let preview = planner
            .preview(monday(), NaiveDate::from_ymd_opt(2025, 3, 9).unwrap())
            .unwrap();
        assert_eq!(preview.business_days, 5);
        assert_eq!(preview.estimated_capacity, 20);
        assert_eq!(preview.active_shops, 10);
        assert_eq!(preview.coverage_percent, 100.0);
        assert_eq!(preview.required_business_days, 3);
        assert_eq!(preview.estimated_finish_date, NaiveDate::from_ymd_opt(2025, 3, 5));
    }

    #[test]
    fn test_preview_empty_pool() {
        let planner = StockTakePlanner::new(ShopPool::default(), InMemoryScheduleStore::new(), settings(4));
        let preview = planner.preview(monday(), monday()).unwrap();
        assert_eq!(preview.required_business_days, 0);
        assert!(preview.estimated_finish_date.is_none());
    }
}
