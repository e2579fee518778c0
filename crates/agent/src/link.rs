//! Reconnection manager for the serial link.
//!
//! [`SerialLink`] owns the single connection to the device and moves it
//! through `Disconnected -> Connecting -> Connected -> Disconnected`.
//! There is no terminal state: callers retry [`SerialLink::connect`] for
//! as long as the process runs.

use std::time::Duration;

use crate::config::AcquisitionConfig;
use crate::error::{ConnectError, ReadError};
use crate::serial::{LineSource, PortOpener};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

pub struct SerialLink<O> {
    opener: O,
    port: String,
    baud_rate: u32,
    pre_open_settle: Duration,
    post_open_settle: Duration,
    handle: Option<Box<dyn LineSource>>,
    state: LinkState,
    attempts: u64,
}

impl<O: PortOpener> SerialLink<O> {
    pub fn new(opener: O, config: &AcquisitionConfig) -> Self {
        Self {
            opener,
            port: config.port.clone(),
            baud_rate: config.baud_rate,
            pre_open_settle: config.pre_open_settle,
            post_open_settle: config.post_open_settle,
            handle: None,
            state: LinkState::Disconnected,
            attempts: 0,
        }
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected && self.handle.is_some()
    }

    /// Total connection attempts since construction, successful or not.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// (Re)open the device.
    ///
    /// Closes any existing handle, waits for the OS to release the port,
    /// opens it exclusively, then waits for the board to finish its reset
    /// before reporting success.
    pub async fn connect(&mut self) -> Result<(), ConnectError> {
        self.close();
        self.state = LinkState::Connecting;
        self.attempts += 1;

        tokio::time::sleep(self.pre_open_settle).await;

        match self.opener.open(&self.port, self.baud_rate).await {
            Ok(handle) => {
                tracing::info!(
                    port = %self.port,
                    baud_rate = self.baud_rate,
                    settle_ms = self.post_open_settle.as_millis() as u64,
                    "Serial port opened, waiting for device to initialise",
                );
                self.handle = Some(handle);
                tokio::time::sleep(self.post_open_settle).await;
                self.state = LinkState::Connected;
                Ok(())
            }
            Err(e) => {
                self.state = LinkState::Disconnected;
                Err(e)
            }
        }
    }

    /// Release the device. Closing an already-closed link is a no-op.
    pub fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            drop(handle);
            tracing::info!(port = %self.port, "Serial port closed");
        }
        self.state = LinkState::Disconnected;
    }

    /// Read one line from the active connection.
    pub async fn read_line(&mut self, timeout: Duration) -> Result<Option<String>, ReadError> {
        match self.handle.as_mut() {
            Some(handle) if self.state == LinkState::Connected => handle.read_line(timeout).await,
            _ => Err(ReadError::NotConnected),
        }
    }
}
