/// Why a raw line from the device could not become a [`Reading`](crate::reading::Reading).
///
/// Parse failures are recoverable by design: the caller drops the single
/// record and keeps the connection open.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Empty record")]
    Empty,

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Record is not a JSON object")]
    NotAnObject,

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Field {field} is not numeric: {value}")]
    NotNumeric { field: &'static str, value: String },

    #[error("Field {field} is not a finite number")]
    NotFinite { field: &'static str },

    #[error("Field {field} is not a string")]
    NotText { field: &'static str },
}
