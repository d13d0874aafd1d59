pub mod analyzer;
pub mod converter;
pub mod error;
pub mod exporter;
pub mod gpx_types;
pub mod index;
pub mod options;
pub mod parser;

use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

pub use crate::analyzer::{analyze, analyze_with_id, haversine_km, nearest_point};
pub use crate::error::TrackError;
pub use crate::gpx_types::{GeoPoint, ParsedTrack, TrackOverview, TrackSummary};
pub use crate::index::TrackIndex;
pub use crate::options::{ConvertOptions, ExportOptions, ParseOptions};

/// Parse GPX text and return its TrackSummary as a JS object.
#[wasm_bindgen(js_name = parseGpx)]
pub fn parse_gpx(gpx_string: &str, options: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let opts: ParseOptions = parse_options(options)?;
    let summary = parser::parse_and_analyze(gpx_string, &opts)?;
    to_js(&summary)
}

/// Compute a TrackSummary from an array of `{lat, lng, ele?, time?}` objects.
#[wasm_bindgen(js_name = analyzePoints)]
pub fn analyze_points(points: JsValue, name: String) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let points: Vec<GeoPoint> = from_js(points)?;
    to_js(&analyzer::analyze(points, name))
}

/// Regenerate GPX 1.1 text from a TrackSummary object.
#[wasm_bindgen(js_name = exportGpx)]
pub fn export_gpx(summary: JsValue, options: JsValue) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let summary: TrackSummary = from_js(summary)?;
    let opts: ExportOptions = parse_options(options)?;
    Ok(exporter::to_gpx(&summary, &opts)?)
}

/// Convert a TrackSummary object to a GeoJSON Feature, returned as a JS object.
#[wasm_bindgen(js_name = trackToGeoJson)]
pub fn track_to_geojson(summary: JsValue, options: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let summary: TrackSummary = from_js(summary)?;
    let opts: ConvertOptions = parse_options(options)?;
    to_js(&converter::to_feature(&summary, &opts))
}

/// Convert a TrackSummary object to a GeoJSON Feature, returned as a JSON string.
#[wasm_bindgen(js_name = trackToGeoJsonString)]
pub fn track_to_geojson_string(
    summary: JsValue,
    options: JsValue,
) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let summary: TrackSummary = from_js(summary)?;
    let opts: ConvertOptions = parse_options(options)?;
    let feature = converter::to_feature(&summary, &opts);
    serde_json::to_string(&feature).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Convert an array of TrackSummary objects to a GeoJSON FeatureCollection.
#[wasm_bindgen(js_name = tracksToGeoJson)]
pub fn tracks_to_geojson(summaries: JsValue, options: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let summaries: Vec<TrackSummary> = from_js(summaries)?;
    let opts: ConvertOptions = parse_options(options)?;
    to_js(&converter::to_feature_collection(&summaries, &opts))
}

/// Index of the track point nearest to (lat, lng), or undefined for an empty track.
#[wasm_bindgen(js_name = nearestPoint)]
pub fn nearest_point_index(
    summary: JsValue,
    lat: f64,
    lng: f64,
) -> Result<Option<u32>, JsValue> {
    console_error_panic_hook::set_once();

    let summary: TrackSummary = from_js(summary)?;
    Ok(analyzer::nearest_point(&summary.points, lat, lng).map(|i| i as u32))
}

/// Route `tracing` output to the browser console. Safe to call repeatedly.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = tracing_wasm::try_set_as_global_default();
}

fn parse_options<T: DeserializeOwned + Default>(options: JsValue) -> Result<T, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(T::default())
    } else {
        from_js(options)
    }
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}
