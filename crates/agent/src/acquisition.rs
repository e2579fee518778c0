//! The acquisition loop.
//!
//! Drives connect -> read -> parse -> publish on a dedicated tokio task
//! for the lifetime of the process. Failures only delay data:
//!
//! - a connect failure waits `reconnect_delay` and tries again;
//! - a read failure closes the link so the next cycle reconnects;
//! - a malformed record is logged and dropped, the link stays open.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use sensorlink_core::parser::parse_reading;
use sensorlink_core::store::LatestValueStore;

use crate::config::AcquisitionConfig;
use crate::link::SerialLink;
use crate::serial::{PortOpener, SerialPortOpener};

/// What a single cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A reading was parsed and published.
    Published,
    /// A line arrived but was not a valid record.
    Rejected,
    /// No line within the read timeout, or a blank line.
    Idle,
    ConnectFailed,
    /// The link failed mid-read and was closed.
    ReadFailed,
}

pub struct Acquisition<O> {
    link: SerialLink<O>,
    store: Arc<LatestValueStore>,
    read_timeout: Duration,
    reconnect_delay: Duration,
    cycle_delay: Duration,
}

impl Acquisition<SerialPortOpener> {
    /// Acquisition over a real serial port.
    pub fn serial(config: &AcquisitionConfig, store: Arc<LatestValueStore>) -> Self {
        Self::new(SerialPortOpener::new(config.max_line_bytes), config, store)
    }
}

impl<O: PortOpener> Acquisition<O> {
    pub fn new(opener: O, config: &AcquisitionConfig, store: Arc<LatestValueStore>) -> Self {
        Self {
            link: SerialLink::new(opener, config),
            store,
            read_timeout: config.read_timeout,
            reconnect_delay: config.reconnect_delay,
            cycle_delay: config.cycle_delay,
        }
    }

    pub fn link(&self) -> &SerialLink<O> {
        &self.link
    }

    /// Run cycles until `cancel` is triggered, then close the port.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!(
            port = %self.link.port(),
            cycle_delay_ms = self.cycle_delay.as_millis() as u64,
            "Acquisition loop started",
        );

        loop {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => break,
                outcome = self.run_cycle() => outcome,
            };
            tracing::trace!(?outcome, "Acquisition cycle finished");

            let pause = match outcome {
                CycleOutcome::ConnectFailed => self.reconnect_delay,
                _ => self.cycle_delay,
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        self.link.close();
        tracing::info!("Acquisition loop stopped");
    }

    /// Execute one cycle without the trailing delay.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        if !self.link.is_connected() {
            if let Err(e) = self.link.connect().await {
                tracing::warn!(
                    port = %self.link.port(),
                    attempt = self.link.attempts(),
                    error = %e,
                    "Serial connect failed, will retry",
                );
                return CycleOutcome::ConnectFailed;
            }
            tracing::info!(
                port = %self.link.port(),
                attempt = self.link.attempts(),
                "Serial link connected",
            );
        }

        let line = match self.link.read_line(self.read_timeout).await {
            Ok(Some(line)) if !line.is_empty() => line,
            Ok(_) => return CycleOutcome::Idle,
            Err(e) => {
                tracing::warn!(
                    port = %self.link.port(),
                    error = %e,
                    "Serial read failed, reconnecting",
                );
                self.link.close();
                return CycleOutcome::ReadFailed;
            }
        };

        match parse_reading(&line) {
            Ok(reading) => {
                tracing::debug!(
                    temperature = reading.temperature(),
                    humidity = reading.humidity(),
                    pressure = reading.pressure(),
                    device_time = %reading.device_time(),
                    "Reading received",
                );
                self.store.publish(reading);
                CycleOutcome::Published
            }
            Err(e) => {
                tracing::warn!(error = %e, raw = %line, "Dropping malformed record");
                CycleOutcome::Rejected
            }
        }
    }
}

/// Start the acquisition loop on its own task.
pub fn spawn<O>(acquisition: Acquisition<O>, cancel: CancellationToken) -> JoinHandle<()>
where
    O: PortOpener + 'static,
{
    tokio::spawn(acquisition.run(cancel))
}
