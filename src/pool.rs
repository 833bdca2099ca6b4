//! Shop pool: the backing set of shops and the per-run lock that consumes them.
//!
//! A generation run holds a [`PoolRun`] for its whole duration. Shops removed
//! during the run are only marked Planned when the run is committed; dropping
//! the run without committing releases them again.

use std::collections::{HashMap, HashSet};

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PlannerError;
use crate::model::{GeoPoint, MtrFilter, Region, Shop, ShopId, ShopStatus};

/// One row of the shop master snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopRecord {
    pub id: String,
    pub region: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default, alias = "lng")]
    pub long: Option<f64>,
    #[serde(default)]
    pub mtr_accessible: String,
    #[serde(default)]
    pub available: String,
    #[serde(default)]
    pub status: String,
}

impl ShopRecord {
    fn into_shop(self, row: usize) -> Result<Shop, PlannerError> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(PlannerError::InvalidRecord {
                row,
                reason: "missing shop id".to_string(),
            });
        }
        let region = self.region.parse::<Region>().map_err(|err| PlannerError::InvalidRecord {
            row,
            reason: err.to_string(),
        })?;
        let status = self.status.parse::<ShopStatus>().map_err(|err| PlannerError::InvalidRecord {
            row,
            reason: err.to_string(),
        })?;
        let location = match (self.lat, self.long) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some(GeoPoint::new(lat, lng)),
            _ => None,
        };

        Ok(Shop {
            id: ShopId::new(id),
            region,
            district: self.district.trim().to_string(),
            brand: self.brand.trim().to_string(),
            location,
            mtr_accessible: is_yes(&self.mtr_accessible),
            active: is_yes(&self.available),
            status,
            import_rank: row,
        })
    }
}

fn is_yes(value: &str) -> bool {
    matches!(value.trim().to_ascii_uppercase().as_str(), "Y" | "YES" | "TRUE" | "1")
}

/// Which pooled shops a run may draw from. Empty lists mean "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolFilter {
    pub regions: Vec<Region>,
    pub districts: Vec<String>,
    pub brands: Vec<String>,
    pub mtr: MtrFilter,
}

impl PoolFilter {
    pub fn admits(&self, shop: &Shop) -> bool {
        (self.regions.is_empty() || self.regions.contains(&shop.region))
            && (self.districts.is_empty() || self.districts.iter().any(|d| d == &shop.district))
            && (self.brands.is_empty() || self.brands.iter().any(|b| b == &shop.brand))
            && self.mtr.admits(shop.mtr_accessible)
    }
}

#[derive(Debug, Default)]
struct PoolState {
    shops: Vec<Shop>,
    index: HashMap<ShopId, usize>,
}

impl PoolState {
    fn build(shops: Vec<Shop>) -> Result<Self, PlannerError> {
        let mut state = PoolState::default();
        for (rank, mut shop) in shops.into_iter().enumerate() {
            if state.index.contains_key(&shop.id) {
                return Err(PlannerError::InvalidRecord {
                    row: rank,
                    reason: format!("duplicate shop id {}", shop.id),
                });
            }
            shop.import_rank = rank;
            state.index.insert(shop.id.clone(), state.shops.len());
            state.shops.push(shop);
        }
        Ok(state)
    }

    fn get_mut(&mut self, shop_id: &ShopId) -> Option<&mut Shop> {
        let position = *self.index.get(shop_id)?;
        self.shops.get_mut(position)
    }
}

#[derive(Debug, Default)]
pub struct ShopPool {
    state: Mutex<PoolState>,
}

impl ShopPool {
    pub fn new(shops: Vec<Shop>) -> Result<Self, PlannerError> {
        Ok(Self {
            state: Mutex::new(PoolState::build(shops)?),
        })
    }

    pub fn from_records(records: Vec<ShopRecord>) -> Result<Self, PlannerError> {
        Self::new(records_to_shops(records)?)
    }

    /// Replace the backing set with a fresh master snapshot.
    ///
    /// Blocks while a run is in progress. Returns the number of active shops.
    pub fn rebuild(&self, records: Vec<ShopRecord>) -> Result<usize, PlannerError> {
        let fresh = PoolState::build(records_to_shops(records)?)?;
        let mut state = self.state.lock();
        *state = fresh;
        Ok(state.shops.iter().filter(|shop| shop.active).count())
    }

    /// Start a generation run, waiting for any other run to finish.
    pub fn begin_run(&self) -> PoolRun<'_> {
        PoolRun::new(self.state.lock())
    }

    pub fn try_begin_run(&self) -> Option<PoolRun<'_>> {
        self.state.try_lock().map(PoolRun::new)
    }

    pub fn shop(&self, shop_id: &ShopId) -> Option<Shop> {
        let state = self.state.lock();
        state.index.get(shop_id).map(|&i| state.shops[i].clone())
    }

    /// Snapshot of every shop in import order.
    pub fn shops(&self) -> Vec<Shop> {
        self.state.lock().shops.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().shops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count_active(&self) -> usize {
        self.state.lock().shops.iter().filter(|shop| shop.active).count()
    }

    pub fn set_status(&self, shop_id: &ShopId, status: ShopStatus) -> Result<(), PlannerError> {
        let mut state = self.state.lock();
        let shop = state
            .get_mut(shop_id)
            .ok_or_else(|| PlannerError::UnknownShop(shop_id.clone()))?;
        shop.status = status;
        if status == ShopStatus::Closed {
            shop.active = false;
        }
        Ok(())
    }
}

fn records_to_shops(records: Vec<ShopRecord>) -> Result<Vec<Shop>, PlannerError> {
    records
        .into_iter()
        .enumerate()
        .map(|(row, record)| record.into_shop(row))
        .collect()
}

/// Exclusive, transactional access to the pool for one generation run.
pub struct PoolRun<'a> {
    state: MutexGuard<'a, PoolState>,
    excluded: HashSet<ShopId>,
    consumed: Vec<ShopId>,
    consumed_set: HashSet<ShopId>,
}

impl<'a> PoolRun<'a> {
    fn new(state: MutexGuard<'a, PoolState>) -> Self {
        Self {
            state,
            excluded: HashSet::new(),
            consumed: Vec::new(),
            consumed_set: HashSet::new(),
        }
    }

    /// Withhold shops that already hold an active schedule entry.
    pub fn exclude(&mut self, shop_ids: impl IntoIterator<Item = ShopId>) {
        self.excluded.extend(shop_ids);
    }

    /// Active, schedulable shops matching `filter`, in import order.
    pub fn eligible_shops(&self, filter: &PoolFilter) -> Vec<Shop> {
        self.state
            .shops
            .iter()
            .filter(|shop| shop.active && shop.status.is_schedulable())
            .filter(|shop| !self.excluded.contains(&shop.id) && !self.consumed_set.contains(&shop.id))
            .filter(|shop| filter.admits(shop))
            .cloned()
            .collect()
    }

    /// Consume a shop for this run. Returns false if it was already consumed
    /// or is not part of the pool.
    pub fn remove(&mut self, shop_id: &ShopId) -> bool {
        if !self.state.index.contains_key(shop_id)
            || self.excluded.contains(shop_id)
            || !self.consumed_set.insert(shop_id.clone())
        {
            return false;
        }
        self.consumed.push(shop_id.clone());
        true
    }

    /// Mark every consumed shop Planned and release the lock.
    pub fn commit(mut self) -> usize {
        let consumed = std::mem::take(&mut self.consumed);
        for shop_id in &consumed {
            if let Some(shop) = self.state.get_mut(shop_id) {
                shop.status = ShopStatus::Planned;
            }
        }
        debug!(planned = consumed.len(), "pool run committed");
        consumed.len()
    }

    /// Release the lock without changing any shop.
    pub fn rollback(self) {
        debug!(released = self.consumed.len(), "pool run rolled back");
    }
}
