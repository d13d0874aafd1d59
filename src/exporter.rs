use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::Result;
use crate::gpx_types::{GeoPoint, TrackSummary};
use crate::options::ExportOptions;

const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";

/// Write a summary's points back out as a single-track GPX 1.1 document.
///
/// `<ele>` and `<time>` are emitted only for points that carry them.
pub fn to_gpx(summary: &TrackSummary, opts: &ExportOptions) -> Result<String> {
    let name = opts.name.as_deref().unwrap_or(&summary.name);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut gpx = BytesStart::new("gpx");
    gpx.push_attribute(("version", "1.1"));
    gpx.push_attribute(("creator", opts.creator.as_str()));
    gpx.push_attribute(("xmlns", GPX_NAMESPACE));
    writer.write_event(Event::Start(gpx))?;
    writer.write_event(Event::Start(BytesStart::new("trk")))?;
    write_text_element(&mut writer, "name", name)?;
    writer.write_event(Event::Start(BytesStart::new("trkseg")))?;

    for point in &summary.points {
        write_point(&mut writer, point)?;
    }

    writer.write_event(Event::End(BytesEnd::new("trkseg")))?;
    writer.write_event(Event::End(BytesEnd::new("trk")))?;
    writer.write_event(Event::End(BytesEnd::new("gpx")))?;

    tracing::debug!(points = summary.points.len(), "exported GPX");
    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_point(writer: &mut Writer<Vec<u8>>, point: &GeoPoint) -> Result<()> {
    let lat = point.lat.to_string();
    let lon = point.lng.to_string();
    let mut start = BytesStart::new("trkpt");
    start.push_attribute(("lat", lat.as_str()));
    start.push_attribute(("lon", lon.as_str()));

    if point.ele.is_none() && point.time.is_none() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(ele) = point.ele {
        write_text_element(writer, "ele", &ele.to_string())?;
    }
    if let Some(time) = &point.time {
        write_text_element(writer, "time", time)?;
    }
    writer.write_event(Event::End(BytesEnd::new("trkpt")))?;
    Ok(())
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::options::ParseOptions;
    use crate::parser::{parse_and_analyze, parse_gpx};

    fn sample() -> TrackSummary {
        analyze(
            vec![
                GeoPoint::new(35.0, 139.0)
                    .with_ele(10.0)
                    .with_time("2025-01-01T06:00:00Z"),
                GeoPoint::new(35.0012345678, 139.0009876543).with_ele(12.25),
                GeoPoint::new(35.002, 139.002),
            ],
            "Morning Run",
        )
    }

    #[test]
    fn test_document_shape() {
        let xml = to_gpx(&sample(), &ExportOptions::default()).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(
            r#"<gpx version="1.1" creator="TurboTrack" xmlns="http://www.topografix.com/GPX/1/1">"#
        ));
        assert!(xml.contains("<name>Morning Run</name>"));
        assert!(xml.contains(r#"<trkpt lat="35" lon="139">"#));
        assert!(xml.contains("<ele>10</ele>"));
        assert!(xml.contains("<time>2025-01-01T06:00:00Z</time>"));
        assert!(xml.contains(r#"<trkpt lat="35.002" lon="139.002"/>"#));
        assert_eq!(xml.matches("<ele>").count(), 2);
        assert_eq!(xml.matches("<time>").count(), 1);
    }

    #[test]
    fn test_name_override_and_escaping() {
        let opts = ExportOptions {
            name: Some("Tom & Jerry <loop>".to_string()),
            creator: "tests".to_string(),
        };
        let xml = to_gpx(&sample(), &opts).unwrap();
        assert!(xml.contains("<name>Tom &amp; Jerry &lt;loop&gt;</name>"));
        assert!(xml.contains(r#"creator="tests""#));

        let parsed = parse_gpx(&xml, &ParseOptions::default()).unwrap();
        assert_eq!(parsed.name.as_deref(), Some("Tom & Jerry <loop>"));
    }

    #[test]
    fn test_round_trip_preserves_points_and_stats() {
        let original = sample();
        let xml = to_gpx(&original, &ExportOptions::default()).unwrap();
        let reparsed = parse_and_analyze(&xml, &ParseOptions::default()).unwrap();

        assert_eq!(reparsed.points, original.points);
        assert_eq!(reparsed.distance_km, original.distance_km);
        assert_eq!(reparsed.elevation_gain_m, original.elevation_gain_m);
        assert_eq!(reparsed.elevation_loss_m, original.elevation_loss_m);
        assert_eq!(reparsed.name, original.name);
    }

    #[test]
    fn test_empty_track_exports() {
        let empty = analyze(Vec::new(), "Nothing");
        let xml = to_gpx(&empty, &ExportOptions::default()).unwrap();
        let reparsed = parse_gpx(&xml, &ParseOptions::default()).unwrap();
        assert!(reparsed.points.is_empty());
        assert_eq!(reparsed.name.as_deref(), Some("Nothing"));
    }
}
