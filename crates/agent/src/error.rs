//! Error types for the acquisition side.
//!
//! None of these are fatal: [`ConnectError`] is retried after a delay,
//! [`ReadError`] forces a reconnect, and [`ConfigError`] is only raised
//! at startup.

/// The serial port could not be opened.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Failed to open {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// For openers that are not backed by the `serialport` crate and so
    /// have no `serialport::Error` to report.
    #[error("Port {port} unavailable: {reason}")]
    Unavailable { port: String, reason: String },

    #[error("Open task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Reading from an open connection failed mid-stream.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("Serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serial port closed by device")]
    Eof,

    #[error("No active connection")]
    NotConnected,

    #[error("Read task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// An environment variable held a value that could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}
