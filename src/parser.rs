use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::analyzer;
use crate::error::{Result, TrackError};
use crate::gpx_types::{GeoPoint, ParsedTrack, TrackSummary};
use crate::options::ParseOptions;

/// Extract the track name and every `<trkpt>` from a GPX document.
///
/// Points from all tracks and segments are concatenated in document order.
/// Input without a `<gpx>` root, or ending inside an open element, is an error.
pub fn parse_gpx(xml: &str, opts: &ParseOptions) -> Result<ParsedTrack> {
    let mut reader = Reader::from_str(xml);
    let mut track = ParsedTrack::default();
    let mut seen_root = false;
    let mut root_open = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"gpx" => {
                    seen_root = true;
                    root_open = true;
                }
                b"metadata" => parse_metadata(&mut reader, &mut track)?,
                b"trk" => parse_track(&mut reader, &mut track, opts)?,
                b"wpt" | b"rte" => {
                    reader.read_to_end(e.name())?;
                }
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"gpx" => seen_root = true,
            Ok(Event::End(e)) if e.local_name().as_ref() == b"gpx" => root_open = false,
            Ok(Event::Eof) => break,
            Err(e) => return Err(TrackError::XmlParse(e)),
            _ => {}
        }
    }

    if !seen_root {
        return Err(TrackError::NotGpx);
    }
    if root_open {
        return Err(unexpected_eof("gpx"));
    }

    tracing::debug!(
        points = track.points.len(),
        named = track.name.is_some(),
        "extracted GPX track"
    );
    Ok(track)
}

/// Parse a GPX document and compute its summary in one step.
pub fn parse_and_analyze(xml: &str, opts: &ParseOptions) -> Result<TrackSummary> {
    let ParsedTrack { name, points } = parse_gpx(xml, opts)?;
    let name = name.unwrap_or_else(|| opts.fallback_name.clone());
    Ok(match &opts.id {
        Some(id) => analyzer::analyze_with_id(points, name, id.clone()),
        None => analyzer::analyze(points, name),
    })
}

/// Parse lat/lon attributes from a point element's start tag.
fn parse_lat_lon(e: &BytesStart<'_>, opts: &ParseOptions) -> Result<(f64, f64)> {
    let mut lat: Option<String> = None;
    let mut lon: Option<String> = None;

    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| TrackError::XmlParse(e.into()))?;
        let val = std::str::from_utf8(&attr.value).unwrap_or_default().trim();
        match attr.key.local_name().as_ref() {
            b"lat" => lat = Some(val.to_string()),
            b"lon" => lon = Some(val.to_string()),
            _ => {}
        }
    }

    Ok((
        parse_coordinate("lat", lat.as_deref(), opts)?,
        parse_coordinate("lon", lon.as_deref(), opts)?,
    ))
}

/// Missing or empty values read as 0 and unparsable ones as NaN, unless
/// `strict_coordinates` is set. The point is kept either way.
fn parse_coordinate(
    attribute: &'static str,
    value: Option<&str>,
    opts: &ParseOptions,
) -> Result<f64> {
    match value.filter(|v| !v.is_empty()) {
        None if opts.strict_coordinates => Err(TrackError::MissingAttribute {
            element: "trkpt",
            attribute,
        }),
        None => {
            tracing::warn!("Track point without '{attribute}', reading it as 0");
            Ok(0.0)
        }
        Some(v) => match v.parse::<f64>() {
            Ok(n) => Ok(n),
            Err(_) if opts.strict_coordinates => Err(TrackError::InvalidAttribute {
                element: "trkpt",
                attribute,
                value: v.to_string(),
            }),
            Err(_) => {
                tracing::warn!("Track point '{attribute}' is not a number: '{v}'");
                Ok(f64::NAN)
            }
        },
    }
}

/// A present `<ele>` always yields a value: empty reads as 0, garbage as NaN.
fn parse_elevation(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        0.0
    } else {
        text.parse::<f64>().unwrap_or(f64::NAN)
    }
}

/// Parse a `<trkpt>` and its children.
/// Called after receiving Event::Start for the point element.
fn parse_point<'a>(
    start: &BytesStart<'a>,
    reader: &mut Reader<&'a [u8]>,
    opts: &ParseOptions,
) -> Result<GeoPoint> {
    let (lat, lng) = parse_lat_lon(start, opts)?;
    let mut point = GeoPoint::new(lat, lng);
    let end_name = start.name().0.to_vec();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"ele" => {
                    point.ele = Some(parse_elevation(&read_text_owned(reader, &e)?));
                }
                b"time" => {
                    point.time = non_empty(read_text_owned(reader, &e)?);
                }
                _ => {
                    // Skip name/desc/extensions and anything else
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"ele" => point.ele = Some(0.0),
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => return Err(unexpected_eof(String::from_utf8_lossy(&end_name))),
            Err(e) => return Err(TrackError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(point)
}

/// Parse a `<metadata>` element, keeping only its name.
fn parse_metadata<'a>(reader: &mut Reader<&'a [u8]>, track: &mut ParsedTrack) -> Result<()> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => {
                    let name = read_text_owned(reader, &e)?;
                    set_name(track, name);
                }
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"metadata" => break,
            Ok(Event::Eof) => return Err(unexpected_eof("metadata")),
            Err(e) => return Err(TrackError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(())
}

/// Parse a `<trk>` element.
fn parse_track<'a>(
    reader: &mut Reader<&'a [u8]>,
    track: &mut ParsedTrack,
    opts: &ParseOptions,
) -> Result<()> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => {
                    let name = read_text_owned(reader, &e)?;
                    set_name(track, name);
                }
                b"trkseg" => parse_segment(reader, track, opts)?,
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trk" => break,
            Ok(Event::Eof) => return Err(unexpected_eof("trk")),
            Err(e) => return Err(TrackError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(())
}

/// Parse a `<trkseg>` element.
fn parse_segment<'a>(
    reader: &mut Reader<&'a [u8]>,
    track: &mut ParsedTrack,
    opts: &ParseOptions,
) -> Result<()> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkpt" => {
                    let pt = parse_point(&e, reader, opts)?;
                    push_point(track, pt, opts)?;
                }
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"trkpt" {
                    let (lat, lon) = parse_lat_lon(&e, opts)?;
                    push_point(track, GeoPoint::new(lat, lon), opts)?;
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trkseg" => break,
            Ok(Event::Eof) => return Err(unexpected_eof("trkseg")),
            Err(e) => return Err(TrackError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(())
}

fn push_point(track: &mut ParsedTrack, point: GeoPoint, opts: &ParseOptions) -> Result<()> {
    if opts.strict_coordinates && !is_valid_coordinate(&point) {
        return Err(TrackError::InvalidCoordinate {
            index: track.points.len(),
            lat: point.lat,
            lon: point.lng,
        });
    }
    track.points.push(point);
    Ok(())
}

fn is_valid_coordinate(point: &GeoPoint) -> bool {
    point.lat.is_finite()
        && point.lng.is_finite()
        && (-90.0..=90.0).contains(&point.lat)
        && (-180.0..=180.0).contains(&point.lng)
}

fn unexpected_eof(element: impl Into<String>) -> TrackError {
    TrackError::UnexpectedEof {
        element: element.into(),
    }
}

/// The first non-empty name wins.
fn set_name(track: &mut ParsedTrack, name: String) {
    if track.name.is_none() {
        track.name = non_empty(name);
    }
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Read text content of an element as an owned String.
/// Handles regular text, CDATA sections, and entity references (Event::GeneralRef).
fn read_text_owned<'a>(reader: &mut Reader<&'a [u8]>, start: &BytesStart<'_>) -> Result<String> {
    let end_name = start.name().0.to_vec();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => {
                text.push_str(std::str::from_utf8(e.as_ref()).unwrap_or_default());
            }
            Ok(Event::CData(e)) => {
                text.push_str(std::str::from_utf8(e.as_ref()).unwrap_or_default());
            }
            Ok(Event::GeneralRef(e)) => {
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    text.push(ch);
                } else {
                    match std::str::from_utf8(e.as_ref()).unwrap_or_default() {
                        "amp" => text.push('&'),
                        "lt" => text.push('<'),
                        "gt" => text.push('>'),
                        "quot" => text.push('"'),
                        "apos" => text.push('\''),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => return Err(unexpected_eof(String::from_utf8_lossy(&end_name))),
            Err(e) => return Err(TrackError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(text)
}
