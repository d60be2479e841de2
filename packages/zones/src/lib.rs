#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! In-memory risk zone store.
//!
//! Loads the zone dataset once at startup, validates it, and builds an
//! R-tree of zone bounding envelopes so point-in-zone queries only run the
//! exact haversine test against nearby zones. The store is immutable after
//! construction and is shared read-only by every scoring call.

pub mod ingest;

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use rstar::{AABB, RTree, RTreeObject};
use saferoute_geomath::{Coord, EARTH_RADIUS_KM, haversine_km, lon_lat};
use saferoute_zones_models::RiskZone;

/// Errors that can occur while loading the zone dataset.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The dataset file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The dataset is not a valid JSON array of zone records.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A zone's bounding envelope stored in the R-tree, pointing back into the
/// ordered zone list.
struct ZoneEntry {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for ZoneEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Immutable collection of risk zones plus the normalization denominator
/// used by the risk scorer.
pub struct ZoneStore {
    zones: Vec<RiskZone>,
    max_possible_risk: f64,
    index: RTree<ZoneEntry>,
}

impl ZoneStore {
    /// Builds a store from already-parsed zones.
    ///
    /// Zones with invalid geometry or risk values, and zones whose name
    /// repeats an earlier zone, are dropped with a warning.
    #[must_use]
    pub fn new(zones: Vec<RiskZone>) -> Self {
        let mut seen = BTreeSet::new();
        let mut kept = Vec::with_capacity(zones.len());

        for zone in zones {
            if let Some(reason) = invalid_reason(&zone) {
                log::warn!("Skipping risk zone '{}': {reason}", zone.name);
                continue;
            }
            if !seen.insert(zone.name.clone()) {
                log::warn!("Skipping duplicate risk zone name '{}'", zone.name);
                continue;
            }
            kept.push(zone);
        }

        let max_possible_risk = kept.iter().map(|z| z.base_risk).sum();
        let entries = kept
            .iter()
            .enumerate()
            .map(|(index, zone)| ZoneEntry {
                index,
                envelope: zone_envelope(zone),
            })
            .collect();

        Self {
            zones: kept,
            max_possible_risk,
            index: RTree::bulk_load(entries),
        }
    }

    /// An empty store. Every route scored against it gets the remote
    /// baseline.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Parses a zone dataset from a JSON reader.
    ///
    /// # Errors
    ///
    /// Returns [`DataLoadError`] if reading or JSON parsing fails.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataLoadError> {
        let zones: Vec<RiskZone> = serde_json::from_reader(reader)?;
        Ok(Self::new(zones))
    }

    /// Parses a zone dataset from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`DataLoadError::Json`] if the string is not a valid dataset.
    pub fn from_json_str(json: &str) -> Result<Self, DataLoadError> {
        let zones: Vec<RiskZone> = serde_json::from_str(json)?;
        Ok(Self::new(zones))
    }

    /// Loads the zone dataset from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`DataLoadError`] if the file is missing, unreadable, or
    /// malformed.
    pub fn load(path: &Path) -> Result<Self, DataLoadError> {
        let file = std::fs::File::open(path)?;
        let store = Self::from_reader(std::io::BufReader::new(file))?;
        log::info!(
            "Risk data loaded: {} zones from {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    /// Loads the zone dataset, falling back to an empty store on failure.
    ///
    /// A missing or malformed dataset is logged and never fatal: scoring
    /// continues with the remote baseline for every route.
    #[must_use]
    pub fn load_or_empty(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            log::error!(
                "Failed to load risk zones from {}: {e}; continuing with no zones",
                path.display()
            );
            Self::empty()
        })
    }

    /// All zones in dataset order.
    #[must_use]
    pub fn zones(&self) -> &[RiskZone] {
        &self.zones
    }

    /// Number of zones in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether the store holds no zones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Sum of every zone's base risk (0 for an empty store).
    #[must_use]
    pub const fn max_possible_risk(&self) -> f64 {
        self.max_possible_risk
    }

    /// Returns every zone whose radius contains `point`, in dataset order.
    ///
    /// Each zone is tested independently, so a point may touch several
    /// overlapping zones.
    #[must_use]
    pub fn zones_containing(&self, point: Coord<f64>) -> Vec<&RiskZone> {
        if !point.x.is_finite() || !point.y.is_finite() {
            return Vec::new();
        }

        let mut hits: Vec<usize> = if point.y.abs() > 90.0 {
            // Off the globe: envelopes don't apply, test everything.
            (0..self.zones.len()).collect()
        } else {
            let query = AABB::from_point([normalize_lon(point.x), point.y]);
            self.index
                .locate_in_envelope_intersecting(&query)
                .map(|entry| entry.index)
                .collect()
        };

        hits.retain(|&i| contains(&self.zones[i], point));
        hits.sort_unstable();
        hits.into_iter().map(|i| &self.zones[i]).collect()
    }
}

impl std::fmt::Debug for ZoneStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneStore")
            .field("zones", &self.zones.len())
            .field("max_possible_risk", &self.max_possible_risk)
            .finish_non_exhaustive()
    }
}

/// Center of a zone as a lon/lat coordinate.
#[must_use]
pub const fn zone_center(zone: &RiskZone) -> Coord<f64> {
    lon_lat(zone.longitude, zone.latitude)
}

/// Whether `point` lies within the zone's radius.
#[must_use]
pub fn contains(zone: &RiskZone, point: Coord<f64>) -> bool {
    haversine_km(point, zone_center(zone)) <= zone.radius
}

fn invalid_reason(zone: &RiskZone) -> Option<&'static str> {
    if !zone.latitude.is_finite() || zone.latitude.abs() > 90.0 {
        Some("latitude out of range")
    } else if !zone.longitude.is_finite() {
        Some("longitude is not a number")
    } else if !zone.radius.is_finite() || zone.radius < 0.0 {
        Some("radius must be a non-negative number")
    } else if !zone.base_risk.is_finite() || zone.base_risk < 0.0 {
        Some("baseRisk must be a non-negative number")
    } else {
        None
    }
}

/// Wraps a longitude into `[-180, 180)`.
fn normalize_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Conservative lon/lat bounding box of a zone's circle.
///
/// Latitude extent is exact for a spherical cap. Longitude extent uses the
/// cap's widest point; caps that reach a pole or cross the antimeridian get
/// the full longitude range.
fn zone_envelope(zone: &RiskZone) -> AABB<[f64; 2]> {
    const PAD: f64 = 1e-9;

    let angular = zone.radius / EARTH_RADIUS_KM;
    let d_lat = angular.to_degrees() * (1.0 + 1e-6) + PAD;
    let lat = zone.latitude;
    let lon = normalize_lon(zone.longitude);

    let cos_lat = lat.to_radians().cos();
    let full_range = angular >= std::f64::consts::FRAC_PI_2 || angular.sin() >= cos_lat;

    let (west, east) = if full_range {
        (-180.0, 180.0)
    } else {
        let d_lon = (angular.sin() / cos_lat).asin().to_degrees() * (1.0 + 1e-6) + PAD;
        if lon - d_lon < -180.0 || lon + d_lon > 180.0 {
            (-180.0, 180.0)
        } else {
            (lon - d_lon, lon + d_lon)
        }
    };

    AABB::from_corners([west, lat - d_lat], [east, lat + d_lat])
}
