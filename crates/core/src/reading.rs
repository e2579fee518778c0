//! The sensor sample type shared by the acquisition loop and the HTTP layer.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Device time shown before the first sample arrives.
pub const PLACEHOLDER_DEVICE_TIME: &str = "00:00";

/// One complete sensor sample plus the host time it was received.
///
/// Fields are private so a `Reading` cannot be mutated after
/// construction; the numeric fields are always finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    temperature: f64,
    humidity: f64,
    pressure: f64,
    device_time: String,
    received_at: DateTime<Utc>,
}

impl Reading {
    /// Build a reading from already-validated values.
    ///
    /// Returns `None` if any numeric field is NaN or infinite.
    pub fn new(
        temperature: f64,
        humidity: f64,
        pressure: f64,
        device_time: impl Into<String>,
        received_at: DateTime<Utc>,
    ) -> Option<Self> {
        if !(temperature.is_finite() && humidity.is_finite() && pressure.is_finite()) {
            return None;
        }
        Some(Self {
            temperature,
            humidity,
            pressure,
            device_time: device_time.into(),
            received_at,
        })
    }

    /// Build a reading whose numeric fields the caller has already checked
    /// to be finite.
    pub(crate) fn from_finite(
        temperature: f64,
        humidity: f64,
        pressure: f64,
        device_time: String,
        received_at: DateTime<Utc>,
    ) -> Self {
        debug_assert!(temperature.is_finite() && humidity.is_finite() && pressure.is_finite());
        Self {
            temperature,
            humidity,
            pressure,
            device_time,
            received_at,
        }
    }

    /// The "no data yet" value held by the store before the first publish.
    pub fn placeholder() -> Self {
        Self {
            temperature: 0.0,
            humidity: 0.0,
            pressure: 0.0,
            device_time: PLACEHOLDER_DEVICE_TIME.to_string(),
            received_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.received_at == DateTime::<Utc>::UNIX_EPOCH
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn humidity(&self) -> f64 {
        self.humidity
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    /// Clock string as reported by the device, not interpreted.
    pub fn device_time(&self) -> &str {
        &self.device_time
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// Classify how current this reading is relative to `now`.
    pub fn freshness(&self, now: DateTime<Utc>, stale_after: Duration) -> Freshness {
        if self.is_placeholder() {
            return Freshness::Waiting;
        }
        // A received_at in the future (host clock stepped back) counts as fresh.
        let age = (now - self.received_at).to_std().unwrap_or(Duration::ZERO);
        if age > stale_after {
            Freshness::Stale
        } else {
            Freshness::Fresh
        }
    }
}

/// Whether the latest reading can be trusted as current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    /// No reading has been acquired since startup.
    Waiting,
    Fresh,
    /// The device has stopped sending (or the link is down).
    Stale,
}

impl Freshness {
    pub fn as_str(self) -> &'static str {
        match self {
            Freshness::Waiting => "waiting",
            Freshness::Fresh => "fresh",
            Freshness::Stale => "stale",
        }
    }
}
