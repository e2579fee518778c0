//! Record parser: one JSON line from the device into a [`Reading`].
//!
//! The device emits objects such as
//! `{"temp":"23.5","humid":"60.2","press":"1013.1","time":"12:00:00"}`.
//! Numeric fields may arrive either as JSON numbers or as numeric strings;
//! any other keys are ignored.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::reading::Reading;

pub const FIELD_TEMPERATURE: &str = "temp";
pub const FIELD_HUMIDITY: &str = "humid";
pub const FIELD_PRESSURE: &str = "press";
pub const FIELD_TIME: &str = "time";

/// Parse a raw line, stamping the result with the current host time.
pub fn parse_reading(raw: &str) -> Result<Reading, ParseError> {
    parse_reading_at(raw, Utc::now())
}

/// Parse a raw line with an explicit receipt time.
pub fn parse_reading_at(raw: &str, received_at: DateTime<Utc>) -> Result<Reading, ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ParseError::Empty);
    }

    let value: Value = serde_json::from_str(raw)?;
    let object = value.as_object().ok_or(ParseError::NotAnObject)?;

    let temperature = numeric_field(object, FIELD_TEMPERATURE)?;
    let humidity = numeric_field(object, FIELD_HUMIDITY)?;
    let pressure = numeric_field(object, FIELD_PRESSURE)?;
    let device_time = match object.get(FIELD_TIME) {
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(ParseError::NotText { field: FIELD_TIME }),
        None => return Err(ParseError::MissingField(FIELD_TIME)),
    };

    Ok(Reading::from_finite(
        temperature,
        humidity,
        pressure,
        device_time,
        received_at,
    ))
}

fn numeric_field(object: &Map<String, Value>, field: &'static str) -> Result<f64, ParseError> {
    let value = object.get(field).ok_or(ParseError::MissingField(field))?;

    let number = match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| ParseError::NotNumeric {
            field,
            value: n.to_string(),
        })?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| ParseError::NotNumeric {
            field,
            value: s.clone(),
        })?,
        other => {
            return Err(ParseError::NotNumeric {
                field,
                value: other.to_string(),
            })
        }
    };

    if number.is_finite() {
        Ok(number)
    } else {
        Err(ParseError::NotFinite { field })
    }
}
