use serde::Deserialize;

pub const DEFAULT_TRACK_NAME: &str = "Untitled Track";
pub const DEFAULT_CREATOR: &str = "TurboTrack";

/// Options for extracting a track from GPX text.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseOptions {
    /// Name used when the document carries none (default: "Untitled Track")
    #[serde(default = "default_track_name")]
    pub fallback_name: String,

    /// Reject non-finite or out-of-range coordinates instead of passing them through (default: false)
    #[serde(default)]
    pub strict_coordinates: bool,

    /// Use this id instead of generating a fresh one
    #[serde(default)]
    pub id: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            fallback_name: default_track_name(),
            strict_coordinates: false,
            id: None,
        }
    }
}

/// Options for writing a summary back out as GPX.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    /// Track title; the summary's own name when absent
    #[serde(default)]
    pub name: Option<String>,

    /// Value of the `creator` attribute (default: "TurboTrack")
    #[serde(default = "default_creator")]
    pub creator: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            name: None,
            creator: default_creator(),
        }
    }
}

/// Options for GeoJSON output.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOptions {
    /// Include elevation as the 3rd coordinate value (default: true)
    #[serde(default = "default_true")]
    pub include_elevation: bool,

    /// Include timestamps in coordinateProperties.times (default: true)
    #[serde(default = "default_true")]
    pub include_time: bool,

    /// Include distance/elevation statistics in properties (default: true)
    #[serde(default = "default_true")]
    pub include_stats: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            include_elevation: true,
            include_time: true,
            include_stats: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_track_name() -> String {
    DEFAULT_TRACK_NAME.to_string()
}

fn default_creator() -> String {
    DEFAULT_CREATOR.to_string()
}
