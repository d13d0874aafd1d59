use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Value as JsonValue};

use crate::gpx_types::{GeoPoint, TrackSummary};
use crate::options::ConvertOptions;

/// Convert several summaries to one FeatureCollection, in input order.
pub fn to_feature_collection(summaries: &[TrackSummary], opts: &ConvertOptions) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: summaries.iter().map(|s| to_feature(s, opts)).collect(),
        foreign_members: None,
    }
}

/// Convert a summary to a GeoJSON Feature for map display.
///
/// Two or more points become a LineString, a single point a Point, and an
/// empty track a Feature without geometry.
pub fn to_feature(summary: &TrackSummary, opts: &ConvertOptions) -> Feature {
    let geometry = match summary.points.as_slice() {
        [] => None,
        [pt] => Some(Geometry::new(Value::Point(point_coords(pt, opts.include_elevation)))),
        points => Some(Geometry::new(Value::LineString(
            points
                .iter()
                .map(|pt| point_coords(pt, opts.include_elevation))
                .collect(),
        ))),
    };

    let mut props = Map::new();
    props.insert("name".to_string(), JsonValue::String(summary.name.clone()));

    if opts.include_stats {
        insert_stats(&mut props, summary);
    }

    if opts.include_time {
        insert_coordinate_times(&mut props, &summary.points);
    }

    Feature {
        bbox: None,
        geometry,
        id: Some(Id::String(summary.id.clone())),
        properties: Some(props),
        foreign_members: None,
    }
}

/// Build [lng, lat] or [lng, lat, ele] coordinate array.
fn point_coords(pt: &GeoPoint, include_elevation: bool) -> Vec<f64> {
    match (include_elevation, pt.ele) {
        (true, Some(ele)) => vec![pt.lng, pt.lat, ele],
        _ => vec![pt.lng, pt.lat],
    }
}

fn insert_stats(props: &mut Map<String, JsonValue>, summary: &TrackSummary) {
    props.insert("distanceKm".to_string(), JsonValue::from(summary.distance_km));
    props.insert(
        "elevationGainM".to_string(),
        JsonValue::from(summary.elevation_gain_m),
    );
    props.insert(
        "elevationLossM".to_string(),
        JsonValue::from(summary.elevation_loss_m),
    );
    props.insert(
        "maxElevationM".to_string(),
        JsonValue::from(summary.max_elevation_m),
    );
    props.insert(
        "minElevationM".to_string(),
        JsonValue::from(summary.min_elevation_m),
    );
    insert_optional(props, "startTime", &summary.start_time);
    insert_optional(props, "endTime", &summary.end_time);
}

fn insert_optional(props: &mut Map<String, JsonValue>, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        props.insert(key.to_string(), JsonValue::String(v.clone()));
    }
}

fn insert_coordinate_times(props: &mut Map<String, JsonValue>, points: &[GeoPoint]) {
    let times: Vec<JsonValue> = points
        .iter()
        .map(|pt| match &pt.time {
            Some(t) => JsonValue::String(t.clone()),
            None => JsonValue::Null,
        })
        .collect();

    // Only include if at least one time is present
    if times.iter().any(|t| !t.is_null()) {
        let mut coord_props = Map::new();
        coord_props.insert("times".to_string(), JsonValue::Array(times));
        props.insert(
            "coordinateProperties".to_string(),
            JsonValue::Object(coord_props),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_with_id;

    fn summary(points: Vec<GeoPoint>) -> TrackSummary {
        analyze_with_id(points, "Run", "track-1")
    }

    #[test]
    fn test_line_string_with_elevation_and_times() {
        let s = summary(vec![
            GeoPoint::new(35.0, 139.0)
                .with_ele(10.0)
                .with_time("2025-01-01T00:00:00Z"),
            GeoPoint::new(35.001, 139.001),
        ]);
        let f = to_feature(&s, &ConvertOptions::default());

        assert_eq!(f.id, Some(Id::String("track-1".to_string())));
        let geom = f.geometry.as_ref().unwrap();
        if let Value::LineString(coords) = &geom.value {
            assert_eq!(coords.len(), 2);
            // [lng, lat, ele] order
            assert!((coords[0][0] - 139.0).abs() < 1e-10);
            assert!((coords[0][1] - 35.0).abs() < 1e-10);
            assert!((coords[0][2] - 10.0).abs() < 1e-10);
            assert_eq!(coords[1].len(), 2);
        } else {
            panic!("Expected LineString geometry");
        }

        let props = f.properties.as_ref().unwrap();
        assert_eq!(props["name"], "Run");
        assert_eq!(props["distanceKm"], s.distance_km);
        assert_eq!(props["maxElevationM"], 10.0);
        assert_eq!(props["startTime"], "2025-01-01T00:00:00Z");
        assert!(props.get("endTime").is_none());

        let times = props["coordinateProperties"]["times"].as_array().unwrap();
        assert_eq!(times.len(), 2);
        assert_eq!(times[0], "2025-01-01T00:00:00Z");
        assert!(times[1].is_null());
    }

    #[test]
    fn test_single_point_and_empty() {
        let f = to_feature(
            &summary(vec![GeoPoint::new(35.0, 139.0)]),
            &ConvertOptions::default(),
        );
        assert!(matches!(
            f.geometry.as_ref().map(|g| &g.value),
            Some(Value::Point(_))
        ));

        let f = to_feature(&summary(Vec::new()), &ConvertOptions::default());
        assert!(f.geometry.is_none());
        assert_eq!(f.properties.as_ref().unwrap()["distanceKm"], 0.0);
    }

    #[test]
    fn test_options_strip_output() {
        let s = summary(vec![
            GeoPoint::new(35.0, 139.0)
                .with_ele(10.0)
                .with_time("2025-01-01T00:00:00Z"),
            GeoPoint::new(35.001, 139.001).with_ele(11.0),
        ]);
        let opts = ConvertOptions {
            include_elevation: false,
            include_time: false,
            include_stats: false,
        };
        let f = to_feature(&s, &opts);

        if let Value::LineString(coords) = &f.geometry.as_ref().unwrap().value {
            assert!(coords.iter().all(|c| c.len() == 2));
        } else {
            panic!("Expected LineString geometry");
        }
        let props = f.properties.as_ref().unwrap();
        assert!(props.get("coordinateProperties").is_none());
        assert!(props.get("distanceKm").is_none());
        assert_eq!(props["name"], "Run");
    }

    #[test]
    fn test_no_times_no_coordinate_properties() {
        let s = summary(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0)]);
        let f = to_feature(&s, &ConvertOptions::default());
        assert!(f.properties.unwrap().get("coordinateProperties").is_none());
    }

    #[test]
    fn test_feature_collection_keeps_order() {
        let a = analyze_with_id(Vec::new(), "A", "a");
        let b = analyze_with_id(Vec::new(), "B", "b");
        let fc = to_feature_collection(&[a, b], &ConvertOptions::default());
        let names: Vec<&str> = fc
            .features
            .iter()
            .map(|f| f.properties.as_ref().unwrap()["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
