use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// A single recorded fix along a track (`<trkpt>`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ele: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            ele: None,
            time: None,
        }
    }

    pub fn with_ele(mut self, ele: f64) -> Self {
        self.ele = Some(ele);
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }
}

/// Name and points extracted from a GPX document, before any statistics.
#[derive(Debug, Clone, Default)]
pub struct ParsedTrack {
    pub name: Option<String>,
    pub points: Vec<GeoPoint>,
}

/// Statistics derived from one track, plus the points they were derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSummary {
    pub id: String,
    pub name: String,
    pub points: Vec<GeoPoint>,
    pub distance_km: f64,
    pub elevation_gain_m: f64,
    pub elevation_loss_m: f64,
    pub max_elevation_m: f64,
    pub min_elevation_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

impl TrackSummary {
    /// Seconds between the first and last timestamp, when both are RFC 3339.
    pub fn duration_seconds(&self) -> Option<i64> {
        let start = DateTime::parse_from_rfc3339(self.start_time.as_deref()?).ok()?;
        let end = DateTime::parse_from_rfc3339(self.end_time.as_deref()?).ok()?;
        Some((end - start).num_seconds())
    }

    /// The summary without its point sequence, as kept in listings.
    pub fn overview(&self) -> TrackOverview {
        TrackOverview {
            id: self.id.clone(),
            name: self.name.clone(),
            point_count: self.points.len(),
            distance_km: self.distance_km,
            elevation_gain_m: self.elevation_gain_m,
            elevation_loss_m: self.elevation_loss_m,
            max_elevation_m: self.max_elevation_m,
            min_elevation_m: self.min_elevation_m,
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
        }
    }
}

/// A `TrackSummary` minus its points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackOverview {
    pub id: String,
    pub name: String,
    pub point_count: usize,
    pub distance_km: f64,
    pub elevation_gain_m: f64,
    pub elevation_loss_m: f64,
    pub max_elevation_m: f64,
    pub min_elevation_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(start: Option<&str>, end: Option<&str>) -> TrackSummary {
        TrackSummary {
            id: "t1".to_string(),
            name: "Ridge".to_string(),
            points: vec![GeoPoint::new(1.0, 2.0), GeoPoint::new(1.5, 2.5)],
            distance_km: 78.5,
            elevation_gain_m: 120.0,
            elevation_loss_m: 30.0,
            max_elevation_m: 900.0,
            min_elevation_m: 780.0,
            start_time: start.map(str::to_string),
            end_time: end.map(str::to_string),
        }
    }

    #[test]
    fn test_duration_seconds() {
        let s = summary(Some("2025-01-01T06:00:00Z"), Some("2025-01-01T07:30:15Z"));
        assert_eq!(s.duration_seconds(), Some(5415));
    }

    #[test]
    fn test_duration_with_offsets() {
        let s = summary(
            Some("2025-01-01T08:00:00+02:00"),
            Some("2025-01-01T06:10:00Z"),
        );
        assert_eq!(s.duration_seconds(), Some(600));
    }

    #[test]
    fn test_duration_missing_or_unparsable() {
        assert_eq!(summary(None, Some("2025-01-01T06:00:00Z")).duration_seconds(), None);
        assert_eq!(summary(Some("yesterday"), Some("today")).duration_seconds(), None);
    }

    #[test]
    fn test_overview_drops_points() {
        let s = summary(Some("2025-01-01T06:00:00Z"), None);
        let o = s.overview();
        assert_eq!(o.id, "t1");
        assert_eq!(o.point_count, 2);
        assert_eq!(o.start_time.as_deref(), Some("2025-01-01T06:00:00Z"));
        assert!(o.end_time.is_none());
    }

    #[test]
    fn test_json_field_names() {
        let mut s = summary(Some("2025-01-01T06:00:00Z"), None);
        s.points[0].ele = Some(12.5);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["distanceKm"], 78.5);
        assert_eq!(json["elevationGainM"], 120.0);
        assert_eq!(json["startTime"], "2025-01-01T06:00:00Z");
        assert!(json.get("endTime").is_none());
        assert_eq!(json["points"][0]["ele"], 12.5);
        assert!(json["points"][1].get("ele").is_none());
        assert!(json["points"][1].get("time").is_none());
    }
}
