//! `sensorlink-agent` -- serial acquisition for the sensor station.
//!
//! Opens the microcontroller's serial port, reads one JSON record per
//! line, and publishes each valid reading into a
//! [`LatestValueStore`](sensorlink_core::store::LatestValueStore).
//! The connection is re-established forever on failure.

pub mod acquisition;
pub mod config;
pub mod error;
pub mod framing;
pub mod link;
pub mod serial;
