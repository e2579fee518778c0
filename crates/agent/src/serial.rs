//! Serial port access.
//!
//! [`PortOpener`] and [`LineSource`] are the seams between the
//! reconnection logic and the physical device. [`SerialPortOpener`] is the
//! real implementation over the `serialport` crate; tests substitute
//! in-memory fakes.
//!
//! `serialport` is blocking, so both opening and reading run on
//! `spawn_blocking` and never stall the async runtime.

use std::io::ErrorKind;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::{ConnectError, ReadError};
use crate::framing::LineFramer;

/// Size of a single `read()` from the port.
const READ_CHUNK_BYTES: usize = 256;

/// An open connection that yields text lines.
///
/// Dropping the value closes the underlying device.
#[async_trait]
pub trait LineSource: Send {
    /// Wait up to `timeout` for one complete line.
    ///
    /// Returns `Ok(None)` when no delimiter arrived in time; this is not
    /// an error. Trailing whitespace is trimmed.
    async fn read_line(&mut self, timeout: Duration) -> Result<Option<String>, ReadError>;
}

/// Opens a device and hands back a [`LineSource`] for it.
#[async_trait]
pub trait PortOpener: Send + Sync {
    async fn open(&self, port: &str, baud_rate: u32) -> Result<Box<dyn LineSource>, ConnectError>;
}

/// Opens real serial ports in exclusive mode.
#[derive(Debug, Clone)]
pub struct SerialPortOpener {
    max_line_bytes: usize,
}

impl SerialPortOpener {
    pub fn new(max_line_bytes: usize) -> Self {
        Self { max_line_bytes }
    }
}

#[async_trait]
impl PortOpener for SerialPortOpener {
    async fn open(&self, port: &str, baud_rate: u32) -> Result<Box<dyn LineSource>, ConnectError> {
        let name = port.to_string();
        let serial = tokio::task::spawn_blocking(move || open_exclusive(&name, baud_rate)).await??;

        Ok(Box::new(SerialLineSource {
            port_name: port.to_string(),
            port: Some(serial),
            framer: LineFramer::new(self.max_line_bytes),
        }))
    }
}

/// Open `port` so that no other process can claim it while we hold it.
#[cfg(unix)]
fn open_exclusive(
    port: &str,
    baud_rate: u32,
) -> Result<Box<dyn serialport::SerialPort>, ConnectError> {
    let open_err = |source| ConnectError::Open {
        port: port.to_string(),
        source,
    };
    let mut native = serialport::new(port, baud_rate)
        .open_native()
        .map_err(open_err)?;
    native.set_exclusive(true).map_err(open_err)?;
    Ok(Box::new(native))
}

/// COM ports are always opened exclusively on Windows.
#[cfg(not(unix))]
fn open_exclusive(
    port: &str,
    baud_rate: u32,
) -> Result<Box<dyn serialport::SerialPort>, ConnectError> {
    serialport::new(port, baud_rate)
        .open()
        .map_err(|source| ConnectError::Open {
            port: port.to_string(),
            source,
        })
}

/// Line reader over an open serial port.
pub struct SerialLineSource {
    port_name: String,
    /// `None` only while a blocking read owns the port.
    port: Option<Box<dyn serialport::SerialPort>>,
    framer: LineFramer,
}

#[async_trait]
impl LineSource for SerialLineSource {
    async fn read_line(&mut self, timeout: Duration) -> Result<Option<String>, ReadError> {
        // A previous chunk may already hold further complete lines.
        if let Some(line) = self.framer.next_line() {
            return Ok(Some(line));
        }

        let mut port = self.port.take().ok_or(ReadError::NotConnected)?;
        let (port, result) = tokio::task::spawn_blocking(move || {
            let result = read_until_newline(port.as_mut(), timeout);
            (port, result)
        })
        .await?;
        self.port = Some(port);

        let bytes = result?;
        let discarded = self.framer.push(&bytes);
        if discarded > 0 {
            tracing::warn!(
                port = %self.port_name,
                discarded,
                "Discarding over-long unterminated line",
            );
        }

        let line = self.framer.next_line();
        if line.is_none() && self.framer.pending() > 0 {
            tracing::trace!(
                port = %self.port_name,
                pending = self.framer.pending(),
                "Read timed out mid-line, keeping partial data",
            );
        }
        Ok(line)
    }
}

/// Read chunks until one contains `\n` or `timeout` elapses.
///
/// Bytes read before the deadline are returned even when no newline was
/// seen; the framer keeps them for the next call.
fn read_until_newline(
    port: &mut dyn serialport::SerialPort,
    timeout: Duration,
) -> Result<Vec<u8>, ReadError> {
    let deadline = Instant::now() + timeout;
    let mut collected = Vec::new();
    let mut chunk = [0u8; READ_CHUNK_BYTES];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(collected);
        }
        port.set_timeout(remaining).map_err(std::io::Error::from)?;

        match port.read(&mut chunk) {
            Ok(0) => return Err(ReadError::Eof),
            Ok(n) => {
                collected.extend_from_slice(&chunk[..n]);
                if chunk[..n].contains(&b'\n') {
                    return Ok(collected);
                }
            }
            Err(e) if e.kind() == ErrorKind::TimedOut => return Ok(collected),
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::io::Write;

    use assert_matches::assert_matches;
    use serialport::TTYPort;

    use super::*;

    /// Reader over the slave end of a pseudo-terminal; the master end plays
    /// the device.
    fn pty_source() -> (TTYPort, SerialLineSource) {
        let (master, slave) = TTYPort::pair().unwrap();
        let source = SerialLineSource {
            port_name: "pty".to_string(),
            port: Some(Box::new(slave)),
            framer: LineFramer::new(4096),
        };
        (master, source)
    }

    #[tokio::test]
    async fn partial_line_survives_timeout() {
        let (mut master, mut source) = pty_source();

        master.write_all(b"{\"temp\":1,").unwrap();
        assert_matches!(source.read_line(Duration::from_millis(300)).await, Ok(None));

        master.write_all(b"\"humid\":2}\nnext\n").unwrap();
        assert_eq!(
            source.read_line(Duration::from_secs(2)).await.unwrap().as_deref(),
            Some("{\"temp\":1,\"humid\":2}")
        );
        assert_eq!(
            source.read_line(Duration::from_secs(2)).await.unwrap().as_deref(),
            Some("next")
        );
    }

    #[tokio::test]
    async fn lines_from_one_chunk_are_returned_one_per_call() {
        let (mut master, mut source) = pty_source();

        master.write_all(b"one\ntwo\nthree\n").unwrap();
        for expected in ["one", "two", "three"] {
            assert_eq!(
                source.read_line(Duration::from_secs(2)).await.unwrap().as_deref(),
                Some(expected)
            );
        }
    }

    #[tokio::test]
    async fn silent_device_returns_none_within_deadline() {
        let (_master, mut source) = pty_source();

        let started = Instant::now();
        assert_matches!(source.read_line(Duration::from_millis(200)).await, Ok(None));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(150), "returned early: {elapsed:?}");
        assert!(elapsed < Duration::from_secs(2), "overran deadline: {elapsed:?}");
    }

    #[tokio::test]
    async fn closed_device_is_a_read_error() {
        let (master, mut source) = pty_source();
        drop(master);

        assert_matches!(
            source.read_line(Duration::from_secs(2)).await,
            Err(ReadError::Io(_) | ReadError::Eof)
        );
    }

    #[tokio::test]
    async fn read_without_port_is_not_connected() {
        let mut source = SerialLineSource {
            port_name: "none".to_string(),
            port: None,
            framer: LineFramer::new(64),
        };
        assert_matches!(
            source.read_line(Duration::from_millis(10)).await,
            Err(ReadError::NotConnected)
        );
    }
}
