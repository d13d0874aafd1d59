//! Track statistics over an ordered point sequence.
//!
//! Everything here is a pure function of its input: one forward pass over
//! the points, no I/O and no shared state.

use crate::gpx_types::{GeoPoint, TrackSummary};

/// Mean Earth radius used by the spherical model, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Compute a summary for `points` under a freshly generated id.
pub fn analyze(points: Vec<GeoPoint>, name: impl Into<String>) -> TrackSummary {
    analyze_with_id(points, name, new_track_id())
}

/// Compute a summary for `points`, carrying over an existing id.
///
/// Never fails: empty and single-point input produce zero distance, and
/// tracks without any elevation report 0 for every elevation field.
/// Coordinates are not validated, so non-finite values propagate into the
/// result.
pub fn analyze_with_id(
    points: Vec<GeoPoint>,
    name: impl Into<String>,
    id: impl Into<String>,
) -> TrackSummary {
    let mut distance = 0.0;
    let mut gain = 0.0;
    let mut loss = 0.0;
    let mut max_ele = f64::NEG_INFINITY;
    let mut min_ele = f64::INFINITY;

    for (i, point) in points.iter().enumerate() {
        if let Some(ele) = point.ele {
            max_ele = max_ele.max(ele);
            min_ele = min_ele.min(ele);
        }

        if i == 0 {
            continue;
        }
        let prev = &points[i - 1];

        // Only directly adjacent elevation pairs count; a gap is not bridged.
        if let (Some(prev_ele), Some(ele)) = (prev.ele, point.ele) {
            let delta = ele - prev_ele;
            if delta > 0.0 {
                gain += delta;
            } else {
                loss += delta.abs();
            }
        }

        distance += haversine_km(prev, point);
    }

    let start_time = points.first().and_then(|p| p.time.clone());
    let end_time = points.last().and_then(|p| p.time.clone());

    tracing::debug!(
        points = points.len(),
        distance_km = distance,
        gain_m = gain,
        loss_m = loss,
        "analyzed track"
    );

    TrackSummary {
        id: id.into(),
        name: name.into(),
        points,
        distance_km: round_to(distance, 2),
        elevation_gain_m: round_half_up(gain),
        elevation_loss_m: round_half_up(loss),
        max_elevation_m: round_half_up(finite_or_zero(max_ele)),
        min_elevation_m: round_half_up(finite_or_zero(min_ele)),
        start_time,
        end_time,
    }
}

/// Great-circle distance between two points in kilometers (haversine).
#[inline]
pub fn haversine_km(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let delta_lat = (p2.lat - p1.lat).to_radians();
    let delta_lng = (p2.lng - p1.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Index of the point closest to (`lat`, `lng`); the first one wins on ties.
pub fn nearest_point(points: &[GeoPoint], lat: f64, lng: f64) -> Option<usize> {
    let target = GeoPoint::new(lat, lng);
    let mut best: Option<(usize, f64)> = None;

    for (i, point) in points.iter().enumerate() {
        let d = haversine_km(&target, point);
        if d.is_nan() {
            continue;
        }
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((i, d));
        }
    }

    best.map(|(i, _)| i)
}

fn new_track_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// The -inf/+inf seeds mean "no elevation seen".
fn finite_or_zero(v: f64) -> f64 {
    if v.is_infinite() { 0.0 } else { v }
}

/// Halves round toward +infinity, so -2.5 becomes -2.
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (v * factor).round() / factor
}
