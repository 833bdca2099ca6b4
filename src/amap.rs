//! AMap driving-direction adapter for pairwise travel estimates.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Deserialize;
use tracing::warn;

use crate::error::DistanceUnavailable;
use crate::model::{GeoPoint, TravelEstimate};
use crate::traits::DistanceProvider;

#[derive(Debug, Clone)]
pub struct AmapConfig {
    pub base_url: String,
    pub api_key: String,
    /// 0 = fastest, 1 = avoid tolls, 2 = shortest distance.
    pub strategy: u8,
    pub timeout_secs: u64,
    /// Minimum spacing between consecutive requests.
    pub min_interval_ms: u64,
}

impl Default for AmapConfig {
    fn default() -> Self {
        Self {
            base_url: "https://restapi.amap.com/v3/direction/driving".to_string(),
            api_key: String::new(),
            strategy: 0,
            timeout_secs: 10,
            min_interval_ms: 100,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AmapError {
    #[error("AMap API key is not configured")]
    MissingKey,
    #[error("AMap request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("AMap API error: {0}")]
    Api(String),
    #[error("AMap returned no route")]
    NoRoute,
    #[error("AMap returned an unreadable {field}: {value:?}")]
    Malformed { field: &'static str, value: String },
}

#[derive(Debug)]
pub struct AmapClient {
    config: AmapConfig,
    client: reqwest::blocking::Client,
    last_call: Mutex<Option<Instant>>,
}

impl AmapClient {
    pub fn new(config: AmapConfig) -> Result<Self, AmapError> {
        if config.api_key.trim().is_empty() {
            return Err(AmapError::MissingKey);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            client,
            last_call: Mutex::new(None),
        })
    }

    /// Driving estimate between two points.
    pub fn route(&self, from: GeoPoint, to: GeoPoint) -> Result<TravelEstimate, AmapError> {
        self.wait_for_slot();

        let strategy = self.config.strategy.to_string();
        let origin = format_point(from);
        let destination = format_point(to);
        let body = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("origin", origin.as_str()),
                ("destination", destination.as_str()),
                ("extensions", "base"),
                ("strategy", strategy.as_str()),
            ])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<DrivingResponse>())?;

        body.into_estimate()
    }

    /// Whether the configured key can route a short trip in Central.
    pub fn check_key(&self) -> bool {
        let central = GeoPoint::new(22.2783, 114.1694);
        let admiralty = GeoPoint::new(22.2799, 114.1753);
        matches!(
            self.route(central, admiralty),
            Ok(leg) if leg.distance_km > 0.0 || leg.duration_min > 0.0
        )
    }

    fn wait_for_slot(&self) {
        let interval = Duration::from_millis(self.config.min_interval_ms);
        let mut last_call = self.last_call.lock();
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < interval {
                std::thread::sleep(interval - elapsed);
            }
        }
        *last_call = Some(Instant::now());
    }
}

impl DistanceProvider for AmapClient {
    fn estimate(&self, from: GeoPoint, to: GeoPoint) -> Result<TravelEstimate, DistanceUnavailable> {
        self.route(from, to).map_err(|err| {
            warn!(error = %err, "AMap estimate unavailable");
            DistanceUnavailable::new(err.to_string())
        })
    }
}

/// AMap expects "lng,lat".
fn format_point(point: GeoPoint) -> String {
    format!("{:.6},{:.6}", point.lng, point.lat)
}

#[derive(Debug, Deserialize)]
struct DrivingResponse {
    status: String,
    #[serde(default)]
    info: Option<String>,
    #[serde(default)]
    route: Option<DrivingRoute>,
}

#[derive(Debug, Deserialize)]
struct DrivingRoute {
    #[serde(default)]
    paths: Vec<DrivingPath>,
}

#[derive(Debug, Deserialize)]
struct DrivingPath {
    distance: NumberOrText,
    duration: NumberOrText,
}

/// AMap encodes numeric fields as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn value(&self, field: &'static str) -> Result<f64, AmapError> {
        match self {
            NumberOrText::Number(value) => Ok(*value),
            NumberOrText::Text(text) => text.trim().parse().map_err(|_| AmapError::Malformed {
                field,
                value: text.clone(),
            }),
        }
    }
}

impl DrivingResponse {
    fn into_estimate(self) -> Result<TravelEstimate, AmapError> {
        if self.status != "1" {
            return Err(AmapError::Api(self.info.unwrap_or_else(|| "unknown error".to_string())));
        }
        let path = self
            .route
            .and_then(|route| route.paths.into_iter().next())
            .ok_or(AmapError::NoRoute)?;

        let distance_m = path.distance.value("distance")?;
        let duration_s = path.duration.value("duration")?;
        Ok(TravelEstimate {
            distance_km: distance_m / 1000.0,
            duration_min: duration_s / 60.0,
        })
    }
}
