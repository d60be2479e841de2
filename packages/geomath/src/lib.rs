#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Great-circle distance and polyline interpolation helpers.
//!
//! All coordinates are [`Coord`]s with `x` = longitude and `y` = latitude in
//! WGS84 degrees, matching the `[longitude, latitude]` ordering used by
//! `GeoJSON` and the routing provider. Distances use the haversine formula on
//! a sphere of radius [`EARTH_RADIUS_KM`].
//!
//! Interpolation is linear in lon/lat space rather than geodesic. Route edges
//! are short enough that the difference never matters for zone sampling.

pub use geo::Coord;

/// Mean Earth radius used for every distance computation, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = EARTH_RADIUS_KM * 1000.0;

/// Builds a coordinate from a longitude/latitude pair.
#[must_use]
pub const fn lon_lat(longitude: f64, latitude: f64) -> Coord<f64> {
    Coord {
        x: longitude,
        y: latitude,
    }
}

/// Returns `true` if both components of the coordinate are finite.
#[must_use]
pub const fn is_finite(c: Coord<f64>) -> bool {
    c.x.is_finite() && c.y.is_finite()
}

/// Central angle between two points, in radians.
fn central_angle(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let d_lat = (b.y - a.y).to_radians();
    let d_lon = (b.x - a.x).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.y.to_radians().cos() * b.y.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Great-circle distance between two coordinates, in kilometers.
#[must_use]
pub fn haversine_km(a: Coord<f64>, b: Coord<f64>) -> f64 {
    EARTH_RADIUS_KM * central_angle(a, b)
}

/// Great-circle distance between two coordinates, in meters.
#[must_use]
pub fn haversine_m(a: Coord<f64>, b: Coord<f64>) -> f64 {
    EARTH_RADIUS_M * central_angle(a, b)
}

/// Point at parametric position `t` on the straight segment `a -> b`.
#[must_use]
pub fn lerp(a: Coord<f64>, b: Coord<f64>, t: f64) -> Coord<f64> {
    Coord {
        x: t.mul_add(b.x - a.x, a.x),
        y: t.mul_add(b.y - a.y, a.y),
    }
}

/// Midpoint of the straight segment `a -> b`.
#[must_use]
pub fn midpoint(a: Coord<f64>, b: Coord<f64>) -> Coord<f64> {
    Coord {
        x: (a.x + b.x) / 2.0,
        y: (a.y + b.y) / 2.0,
    }
}

/// Consecutive coordinate pairs of a polyline, skipping any edge with a
/// non-finite endpoint.
pub fn edges(coords: &[Coord<f64>]) -> impl Iterator<Item = (Coord<f64>, Coord<f64>)> + '_ {
    coords
        .windows(2)
        .map(|w| (w[0], w[1]))
        .filter(|(a, b)| is_finite(*a) && is_finite(*b))
}

/// Total haversine length of a polyline, in kilometers.
#[must_use]
pub fn polyline_length_km(coords: &[Coord<f64>]) -> f64 {
    edges(coords).map(|(a, b)| haversine_km(a, b)).sum()
}

/// Interpolates a point along a polyline at fractional position `t` in
/// `[0, 1]`.
///
/// The position is by vertex index, not arc length: `t * (len - 1)` selects
/// an edge and the fractional offset within it. A single-vertex polyline
/// returns that vertex for any `t`. Returns `None` for an empty polyline or
/// when the selected edge has a non-finite endpoint.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn point_at(coords: &[Coord<f64>], t: f64) -> Option<Coord<f64>> {
    match coords {
        [] => None,
        [only] => is_finite(*only).then_some(*only),
        _ => {
            let last_edge = coords.len() - 2;
            let idx = t.clamp(0.0, 1.0) * (coords.len() - 1) as f64;
            let i = (idx.floor() as usize).min(last_edge);
            let frac = idx - i as f64;
            let (a, b) = (coords[i], coords[i + 1]);

            (is_finite(a) && is_finite(b)).then(|| lerp(a, b, frac))
        }
    }
}
