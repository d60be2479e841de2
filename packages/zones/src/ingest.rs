//! Builds the zone dataset from a raw incident CSV.
//!
//! Each row is one reported incident or hotspot. Rows are normalized into
//! [`RiskZone`]s (category weights, clamped radius and risk, optional
//! bounding-box filter) and then nearby zones are merged so a cluster of
//! reports becomes a single, slightly heavier zone.
//!
//! Column names are matched case-insensitively and several aliases are
//! accepted, so both `lat,lng,category,severity` exports and full
//! `name,latitude,longitude,radius_km,base_risk,category` files work.

use std::collections::BTreeSet;
use std::io::{Read, Write};

use saferoute_geomath::haversine_km;
use saferoute_zones_models::{RiskZone, ZoneCategory};

use crate::zone_center;

const LAT_COLUMNS: &[&str] = &["lat", "latitude"];
const LNG_COLUMNS: &[&str] = &["lng", "longitude", "lon"];
const CATEGORY_COLUMNS: &[&str] = &["category", "type"];
const BASE_RISK_COLUMNS: &[&str] = &["base_risk", "baserisk", "severity"];
const RADIUS_COLUMNS: &[&str] = &["radius_km", "radius", "radiuskm"];
const NAME_COLUMNS: &[&str] = &["name", "area"];

const MIN_RADIUS_KM: f64 = 0.3;
const MAX_RADIUS_KM: f64 = 2.5;
const MIN_BASE_RISK: f64 = 5.0;
const MAX_BASE_RISK: f64 = 50.0;
const CLUSTER_BONUS: f64 = 5.0;
const MAX_NAME_CHARS: usize = 80;

/// Errors that can occur while building a zone dataset.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The CSV input could not be read or parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The output could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required column is missing from the header row.
    #[error("Missing required column: expected one of {expected}")]
    MissingColumn {
        /// The accepted column names.
        expected: String,
    },
}

/// Geographic bounding box used to discard rows outside the covered area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum longitude.
    pub west: f64,
    /// Minimum latitude.
    pub south: f64,
    /// Maximum longitude.
    pub east: f64,
    /// Maximum latitude.
    pub north: f64,
}

impl Bounds {
    /// Whether the point lies inside the box (edges inclusive).
    #[must_use]
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.south..=self.north).contains(&lat) && (self.west..=self.east).contains(&lng)
    }
}

impl std::str::FromStr for Bounds {
    type Err = String;

    /// Parses `"west,south,east,north"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|e| format!("invalid bounds '{s}': {e}"))?;

        match parts.as_slice() {
            &[west, south, east, north] if west <= east && south <= north => Ok(Self {
                west,
                south,
                east,
                north,
            }),
            _ => Err(format!(
                "invalid bounds '{s}': expected west,south,east,north"
            )),
        }
    }
}

/// Options for [`build_zones`].
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Rows outside this box are dropped. `None` keeps everything.
    pub bounds: Option<Bounds>,
    /// Radius used when a row carries none, in kilometers.
    pub default_radius_km: f64,
    /// Zones whose centers are within this distance merge, in kilometers.
    pub cluster_distance_km: f64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            bounds: None,
            default_radius_km: 0.8,
            cluster_distance_km: 0.5,
        }
    }
}

/// Column positions resolved from the header row.
struct Columns {
    lat: usize,
    lng: usize,
    category: Option<usize>,
    base_risk: Option<usize>,
    radius: Option<usize>,
    name: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, IngestError> {
        let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| lowered.iter().position(|h| h == alias))
        };
        let require = |aliases: &[&str]| {
            find(aliases).ok_or_else(|| IngestError::MissingColumn {
                expected: aliases.join(", "),
            })
        };

        Ok(Self {
            lat: require(LAT_COLUMNS)?,
            lng: require(LNG_COLUMNS)?,
            category: find(CATEGORY_COLUMNS),
            base_risk: find(BASE_RISK_COLUMNS),
            radius: find(RADIUS_COLUMNS),
            name: find(NAME_COLUMNS),
        })
    }
}

fn field(record: &csv::StringRecord, column: Option<usize>) -> Option<&str> {
    column
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Parses a non-zero number. Zero and garbage fall back to the caller's
/// default, like an unset column.
fn nonzero_number(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v != 0.0)
}

fn round4(value: f64) -> f64 {
    (value * 1e4).round() / 1e4
}

/// Normalizes a category tag: lowercase, whitespace runs become `_`, and
/// anything outside the known set becomes [`ZoneCategory::Other`].
fn normalize_category(raw: Option<&str>) -> (String, ZoneCategory) {
    let slug = raw
        .unwrap_or("other")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");

    let category = match ZoneCategory::from(slug.clone()) {
        ZoneCategory::Custom(_) => ZoneCategory::Other,
        known => known,
    };
    (slug, category)
}

fn normalize_row(
    record: &csv::StringRecord,
    columns: &Columns,
    options: &BuildOptions,
) -> Option<RiskZone> {
    let raw_lat = field(record, Some(columns.lat))?;
    let raw_lng = field(record, Some(columns.lng))?;
    let lat = raw_lat.parse::<f64>().ok().filter(|v| v.is_finite())?;
    let lng = raw_lng.parse::<f64>().ok().filter(|v| v.is_finite())?;

    if options.bounds.is_some_and(|b| !b.contains(lat, lng)) {
        return None;
    }

    let (slug, category) = normalize_category(field(record, columns.category));

    let base_risk = nonzero_number(field(record, columns.base_risk))
        .unwrap_or_else(|| category.default_base_risk());
    let radius = nonzero_number(field(record, columns.radius)).unwrap_or(options.default_radius_km);

    let name = field(record, columns.name).map_or_else(
        || format!("{slug}_{raw_lat}_{raw_lng}"),
        ToString::to_string,
    );

    Some(RiskZone {
        name: name.chars().take(MAX_NAME_CHARS).collect(),
        latitude: round4(lat),
        longitude: round4(lng),
        radius: radius.clamp(MIN_RADIUS_KM, MAX_RADIUS_KM),
        base_risk: base_risk.clamp(MIN_BASE_RISK, MAX_BASE_RISK),
        category: Some(category),
    })
}

/// Merges zones whose centers lie within `distance_km` of an earlier kept
/// zone.
///
/// The kept zone retains its name, center, radius, and category. Its base
/// risk becomes the rounded mean of the merged group, plus a small bonus
/// when more than one report was merged, capped at the maximum base risk.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn cluster(zones: Vec<RiskZone>, distance_km: f64) -> Vec<RiskZone> {
    let mut used = vec![false; zones.len()];
    let mut out = Vec::new();

    for i in 0..zones.len() {
        if used[i] {
            continue;
        }
        let center = zone_center(&zones[i]);
        let mut count = 1_usize;
        let mut risk_sum = zones[i].base_risk;

        for j in (i + 1)..zones.len() {
            if used[j] {
                continue;
            }
            if haversine_km(center, zone_center(&zones[j])) <= distance_km {
                used[j] = true;
                count += 1;
                risk_sum += zones[j].base_risk;
            }
        }

        let bonus = if count > 1 { CLUSTER_BONUS } else { 0.0 };
        let mut zone = zones[i].clone();
        zone.base_risk = ((risk_sum / count as f64).round() + bonus).min(MAX_BASE_RISK);
        out.push(zone);
    }

    out
}

/// Renames repeated zone names to `<name>_2`, `<name>_3`, ... so every zone
/// survives loading into a [`ZoneStore`](crate::ZoneStore), which keys zones
/// by name. The first occurrence keeps its name; generated names never
/// collide with a name already present in the input.
pub fn make_names_unique(zones: &mut [RiskZone]) {
    let existing: BTreeSet<String> = zones.iter().map(|z| z.name.clone()).collect();
    let mut taken = BTreeSet::new();

    for zone in zones {
        if taken.insert(zone.name.clone()) {
            continue;
        }

        let mut n = 2_usize;
        let renamed = loop {
            let suffix = format!("_{n}");
            let keep = MAX_NAME_CHARS.saturating_sub(suffix.len());
            let candidate: String = zone.name.chars().take(keep).chain(suffix.chars()).collect();
            if !taken.contains(&candidate) && !existing.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };

        log::debug!("Renaming repeated zone '{}' to '{renamed}'", zone.name);
        taken.insert(renamed.clone());
        zone.name = renamed;
    }
}

/// Reads an incident CSV and produces the clustered zone dataset.
///
/// Rows with missing or unparsable coordinates, or outside
/// [`BuildOptions::bounds`], are skipped.
///
/// # Errors
///
/// Returns [`IngestError`] if the CSV cannot be read or lacks latitude or
/// longitude columns.
pub fn build_zones<R: Read>(
    reader: R,
    options: &BuildOptions,
) -> Result<Vec<RiskZone>, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::resolve(csv_reader.headers()?)?;

    let mut zones = Vec::new();
    let mut skipped = 0_u64;
    for record in csv_reader.records() {
        let record = record?;
        match normalize_row(&record, &columns, options) {
            Some(zone) => zones.push(zone),
            None => skipped += 1,
        }
    }

    let parsed = zones.len();
    let mut clustered = cluster(zones, options.cluster_distance_km);
    make_names_unique(&mut clustered);
    log::info!(
        "Built {} zones from {parsed} rows ({skipped} skipped)",
        clustered.len()
    );

    Ok(clustered)
}

/// Writes a zone dataset as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`IngestError`] if serialization or writing fails.
pub fn write_zones<W: Write>(zones: &[RiskZone], mut writer: W) -> Result<(), IngestError> {
    serde_json::to_writer_pretty(&mut writer, zones)?;
    writer.write_all(b"\n")?;
    Ok(())
}
