//! In-memory schedule store.
//!
//! Reference implementation of [`ScheduleStore`] used by tests and by callers
//! that persist elsewhere after the run.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use parking_lot::RwLock;

use crate::error::{ConflictError, PlannerError};
use crate::model::{DayPlan, DistanceSource, ScheduleEntry, ShopId, ShopStatus, Stop};
use crate::traits::{ScheduleStore, StatusCounts};

#[derive(Debug, Default)]
struct StoreState {
    days: BTreeMap<NaiveDate, DayPlan>,
    entries: Vec<ScheduleEntry>,
}

impl StoreState {
    fn active_entry_mut(&mut self, shop_id: &ShopId) -> Option<&mut ScheduleEntry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.is_active() && &entry.shop_id == shop_id)
    }

    /// Next free sequence number on `date`, counting history entries too.
    fn next_sequence(&self, date: NaiveDate) -> u32 {
        self.entries
            .iter()
            .filter(|entry| entry.date == date)
            .map(|entry| entry.sequence)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Take a shop's stop out of its day, dropping the day once empty.
    fn detach_stop(&mut self, date: NaiveDate, shop_id: &ShopId) -> Option<Stop> {
        let day = self.days.get_mut(&date)?;
        let position = day.stops.iter().position(|stop| &stop.shop.id == shop_id)?;
        let stop = day.stops.remove(position);
        day.cost = None;
        day.distance_source = DistanceSource::NotRouted;
        if day.is_empty() {
            self.days.remove(&date);
        }
        Some(stop)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryScheduleStore {
    state: RwLock<StoreState>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<ScheduleEntry> {
        self.state.read().entries.clone()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.state.read().days.keys().copied().collect()
    }
}

impl ScheduleStore for InMemoryScheduleStore {
    fn save_schedule(&self, plans: &[DayPlan]) -> Result<(), PlannerError> {
        let mut state = self.state.write();

        let mut active: HashMap<&ShopId, NaiveDate> = state
            .entries
            .iter()
            .filter(|entry| entry.is_active())
            .map(|entry| (&entry.shop_id, entry.date))
            .collect();
        for plan in plans {
            for shop_id in plan.shop_ids() {
                if let Some(existing_date) = active.insert(shop_id, plan.date) {
                    return Err(ConflictError {
                        shop_id: shop_id.clone(),
                        existing_date,
                    }
                    .into());
                }
            }
        }
        drop(active);

        for plan in plans {
            let first = state.next_sequence(plan.date);
            for (position, stop) in plan.stops.iter().enumerate() {
                state.entries.push(ScheduleEntry {
                    date: plan.date,
                    shop_id: stop.shop.id.clone(),
                    sequence: first + position as u32,
                    group: stop.group,
                    status: ShopStatus::Planned,
                    status_reason: None,
                });
            }
            state
                .days
                .entry(plan.date)
                .and_modify(|existing| {
                    existing.stops.extend(plan.stops.iter().cloned());
                    existing.cost = None;
                    existing.distance_source = DistanceSource::NotRouted;
                })
                .or_insert_with(|| plan.clone());
        }
        Ok(())
    }

    fn schedule_for_date(&self, date: NaiveDate) -> Option<DayPlan> {
        self.state.read().days.get(&date).cloned()
    }

    fn update_status(
        &self,
        shop_id: &ShopId,
        status: ShopStatus,
        reason: Option<String>,
    ) -> Result<ScheduleEntry, PlannerError> {
        let mut state = self.state.write();
        let entry = state
            .active_entry_mut(shop_id)
            .ok_or_else(|| PlannerError::NotScheduled {
                shop_id: shop_id.clone(),
            })?;
        if !entry.status.can_transition_to(status) {
            return Err(PlannerError::InvalidTransition {
                shop_id: shop_id.clone(),
                from: entry.status,
                to: status,
            });
        }
        entry.status = status;
        entry.status_reason = reason;
        let updated = entry.clone();

        if status == ShopStatus::Rescheduled {
            state.detach_stop(updated.date, shop_id);
        }
        Ok(updated)
    }

    fn move_to_date(&self, shop_id: &ShopId, new_date: NaiveDate) -> Result<ScheduleEntry, PlannerError> {
        let mut state = self.state.write();
        let (old_date, status) = match state.active_entry_mut(shop_id) {
            Some(entry) => (entry.date, entry.status),
            None => {
                return Err(PlannerError::NotScheduled {
                    shop_id: shop_id.clone(),
                });
            }
        };
        if status != ShopStatus::Planned {
            return Err(PlannerError::InvalidTransition {
                shop_id: shop_id.clone(),
                from: status,
                to: ShopStatus::Rescheduled,
            });
        }

        let stop = state
            .detach_stop(old_date, shop_id)
            .ok_or_else(|| PlannerError::NotScheduled {
                shop_id: shop_id.clone(),
            })?;
        if let Some(entry) = state.active_entry_mut(shop_id) {
            entry.status = ShopStatus::Rescheduled;
            entry.status_reason = Some(format!("moved to {}", new_date));
        }

        let group = stop.group;
        let sequence = state.next_sequence(new_date);
        let day = state
            .days
            .entry(new_date)
            .or_insert_with(|| DayPlan::new(new_date, Vec::new()));
        day.stops.push(stop);
        day.cost = None;
        day.distance_source = DistanceSource::NotRouted;

        let entry = ScheduleEntry {
            date: new_date,
            shop_id: shop_id.clone(),
            sequence,
            group,
            status: ShopStatus::Planned,
            status_reason: None,
        };
        state.entries.push(entry.clone());
        Ok(entry)
    }

    fn active_shop_ids(&self) -> HashSet<ShopId> {
        self.state
            .read()
            .entries
            .iter()
            .filter(|entry| entry.is_active())
            .map(|entry| entry.shop_id.clone())
            .collect()
    }

    fn entries_for_shop(&self, shop_id: &ShopId) -> Vec<ScheduleEntry> {
        self.state
            .read()
            .entries
            .iter()
            .filter(|entry| &entry.shop_id == shop_id)
            .cloned()
            .collect()
    }

    fn month_summary(&self, year: i32, month: u32) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for entry in self.state.read().entries.iter() {
            if entry.date.year() == year && entry.date.month() == month {
                counts.record(entry.status);
            }
        }
        counts
    }
}
