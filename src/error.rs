use wasm_bindgen::JsValue;

#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("Not a GPX document: no <gpx> root element")]
    NotGpx,

    #[error("Unexpected end of document inside <{element}>")]
    UnexpectedEof { element: String },

    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("Invalid value '{value}' for attribute '{attribute}' on <{element}>")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },

    #[error("Coordinate out of range at point {index}: lat={lat}, lon={lon}")]
    InvalidCoordinate { index: usize, lat: f64, lon: f64 },

    #[error("GPX write error: {0}")]
    Write(#[from] std::io::Error),

    #[error("Generated GPX is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, TrackError>;

impl From<TrackError> for JsValue {
    fn from(e: TrackError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}
