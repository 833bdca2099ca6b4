//! Assignment engine: fills eligible dates with pooled shops.

use std::collections::{BTreeMap, VecDeque};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::{next_day, CalendarResolver};
use crate::capacity::CapacityPolicy;
use crate::error::ConfigurationError;
use crate::model::{DayPlan, MtrFilter, Region, Shop, ShopId};
use crate::pool::{PoolFilter, PoolRun};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub start_date: NaiveDate,
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub districts: Vec<String>,
    #[serde(default)]
    pub brands: Vec<String>,
    /// Upper bound on the number of day plans produced.
    pub max_days: usize,
    /// Overrides of the configured capacity defaults.
    #[serde(default)]
    pub shops_per_day: Option<usize>,
    #[serde(default)]
    pub cross_region: Option<bool>,
    #[serde(default)]
    pub mtr: Option<MtrFilter>,
}

impl GenerateRequest {
    pub fn new(start_date: NaiveDate, max_days: usize) -> Self {
        Self {
            start_date,
            regions: Vec::new(),
            districts: Vec::new(),
            brands: Vec::new(),
            max_days,
            shops_per_day: None,
            cross_region: None,
            mtr: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub plans: Vec<DayPlan>,
    /// Shops still pooled when `max_days` was reached.
    pub unscheduled: Vec<ShopId>,
    /// Calendar-eligible dates skipped because their capacity was zero.
    pub skipped_dates: Vec<NaiveDate>,
    /// Eligible shops at the start of the run.
    pub pooled: usize,
}

impl Generation {
    pub fn is_complete(&self) -> bool {
        self.unscheduled.is_empty()
    }

    pub fn scheduled(&self) -> usize {
        self.plans.iter().map(DayPlan::len).sum()
    }
}

/// Remaining shops per region, each queue in import order.
///
/// The round-robin cursor carries over between days, so a day limit smaller
/// than the region count still rotates through every region.
struct RegionQueues {
    queues: BTreeMap<Region, VecDeque<Shop>>,
    regions: Vec<Region>,
    cursor: usize,
}

impl RegionQueues {
    fn new(shops: Vec<Shop>) -> Self {
        let mut queues: BTreeMap<Region, VecDeque<Shop>> = BTreeMap::new();
        for shop in shops {
            queues.entry(shop.region).or_default().push_back(shop);
        }
        let regions = queues.keys().copied().collect();
        Self {
            queues,
            regions,
            cursor: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Region with the most remaining shops; ties go to the lower region code.
    fn largest_region(&self) -> Option<Region> {
        self.queues
            .iter()
            .filter(|(_, queue)| !queue.is_empty())
            .max_by(|(ra, qa), (rb, qb)| qa.len().cmp(&qb.len()).then_with(|| rb.cmp(ra)))
            .map(|(region, _)| *region)
    }

    fn take_single_region(&mut self, limit: usize) -> Vec<Shop> {
        let Some(region) = self.largest_region() else {
            return Vec::new();
        };
        let Some(queue) = self.queues.get_mut(&region) else {
            return Vec::new();
        };
        let count = limit.min(queue.len());
        queue.drain(..count).collect()
    }

    fn take_round_robin(&mut self, limit: usize) -> Vec<Shop> {
        let mut selected = Vec::with_capacity(limit);
        let mut idle = 0;
        while selected.len() < limit && idle < self.regions.len() {
            let region = self.regions[self.cursor];
            self.cursor = (self.cursor + 1) % self.regions.len();
            match self.queues.get_mut(&region).and_then(VecDeque::pop_front) {
                Some(shop) => {
                    selected.push(shop);
                    idle = 0;
                }
                None => idle += 1,
            }
        }
        selected
    }

    /// Leftover shops plus any withheld during the run, in import order.
    fn into_ids(self, withheld: Vec<Shop>) -> Vec<ShopId> {
        let mut leftover: Vec<Shop> = self.queues.into_values().flatten().chain(withheld).collect();
        leftover.sort_by_key(|shop| shop.import_rank);
        leftover.into_iter().map(|shop| shop.id).collect()
    }
}

/// Assign pooled shops to dates starting at `request.start_date`.
///
/// Shops handed out are removed from `pool`; the caller decides whether to
/// commit or roll back the run.
pub fn generate(
    request: &GenerateRequest,
    pool: &mut PoolRun<'_>,
    calendar: &CalendarResolver,
    capacity: &CapacityPolicy,
) -> Result<Generation, ConfigurationError> {
    capacity.validate()?;
    calendar.validate_from(request.start_date)?;

    let filter = PoolFilter {
        regions: request.regions.clone(),
        districts: request.districts.clone(),
        brands: request.brands.clone(),
        mtr: capacity.mtr_filter(),
    };
    let eligible = pool.eligible_shops(&filter);
    let pooled = eligible.len();
    let mut queues = RegionQueues::new(eligible);

    let mut plans: Vec<DayPlan> = Vec::new();
    let mut skipped_dates = Vec::new();
    let mut withheld = Vec::new();
    let mut unusable_since: Option<NaiveDate> = None;
    let mut date = request.start_date;

    while !queues.is_empty() && plans.len() < request.max_days {
        date = calendar.next_eligible_date(date)?;

        let limit = capacity.limit_for(date);
        if limit == 0 {
            let since = *unusable_since.get_or_insert(date);
            if (date - since).num_days() > i64::from(calendar.horizon_days()) {
                return Err(ConfigurationError::new(format!(
                    "no date with capacity within {} days of {}",
                    calendar.horizon_days(),
                    since
                )));
            }
            debug!(%date, "skipping date with zero capacity");
            skipped_dates.push(date);
            date = next_day(date)?;
            continue;
        }
        unusable_since = None;

        let selected = if capacity.cross_region_allowed() {
            queues.take_round_robin(limit)
        } else {
            queues.take_single_region(limit)
        };

        let mut shops = Vec::with_capacity(selected.len());
        for shop in selected {
            if pool.remove(&shop.id) {
                shops.push(shop);
            } else {
                debug!(shop = %shop.id, %date, "pool refused shop, leaving it unscheduled");
                withheld.push(shop);
            }
        }

        debug!(%date, shops = shops.len(), limit, "filled day");
        plans.push(DayPlan::new(date, shops));
        date = next_day(date)?;
    }

    Ok(Generation {
        plans,
        unscheduled: queues.into_ids(withheld),
        skipped_dates,
        pooled,
    })
}
