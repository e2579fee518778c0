use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Serial acquisition configuration loaded from environment variables.
///
/// All fields have defaults that match a typical USB-attached board at
/// 9600 baud. Every timing knob is overridable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionConfig {
    /// Serial port path or name (default: `/dev/ttyACM0`).
    pub port: String,
    /// Baud rate (default: `9600`).
    pub baud_rate: u32,
    /// Maximum wait for one line (default: 2 s).
    pub read_timeout: Duration,
    /// Delay between failed connection attempts (default: 1 s).
    pub reconnect_delay: Duration,
    /// Delay between acquisition cycles (default: 500 ms).
    pub cycle_delay: Duration,
    /// Pause before opening the port so the OS can release it (default: 1 s).
    pub pre_open_settle: Duration,
    /// Pause after opening while the board resets and boots (default: 2 s).
    pub post_open_settle: Duration,
    /// Longest unterminated line kept before it is discarded (default: 4096).
    pub max_line_bytes: usize,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyACM0".into(),
            baud_rate: 9600,
            read_timeout: Duration::from_millis(2000),
            reconnect_delay: Duration::from_millis(1000),
            cycle_delay: Duration::from_millis(500),
            pre_open_settle: Duration::from_millis(1000),
            post_open_settle: Duration::from_millis(2000),
            max_line_bytes: 4096,
        }
    }
}

impl AcquisitionConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default        |
    /// |--------------------------|----------------|
    /// | `SERIAL_PORT`            | `/dev/ttyACM0` |
    /// | `SERIAL_BAUD_RATE`       | `9600`         |
    /// | `SERIAL_READ_TIMEOUT_MS` | `2000`         |
    /// | `RECONNECT_DELAY_MS`     | `1000`         |
    /// | `CYCLE_DELAY_MS`         | `500`          |
    /// | `PRE_OPEN_SETTLE_MS`     | `1000`         |
    /// | `POST_OPEN_SETTLE_MS`    | `2000`         |
    /// | `MAX_LINE_BYTES`         | `4096`         |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = lookup("SERIAL_PORT")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.port);

        Ok(Self {
            port,
            baud_rate: parse_var(&lookup, "SERIAL_BAUD_RATE", defaults.baud_rate)?,
            read_timeout: millis_var(&lookup, "SERIAL_READ_TIMEOUT_MS", defaults.read_timeout)?,
            reconnect_delay: millis_var(&lookup, "RECONNECT_DELAY_MS", defaults.reconnect_delay)?,
            cycle_delay: millis_var(&lookup, "CYCLE_DELAY_MS", defaults.cycle_delay)?,
            pre_open_settle: millis_var(&lookup, "PRE_OPEN_SETTLE_MS", defaults.pre_open_settle)?,
            post_open_settle: millis_var(
                &lookup,
                "POST_OPEN_SETTLE_MS",
                defaults.post_open_settle,
            )?,
            max_line_bytes: parse_var(&lookup, "MAX_LINE_BYTES", defaults.max_line_bytes)?,
        })
    }
}

/// Parse `var` if set, otherwise fall back to `default`.
pub fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}

fn millis_var<F>(lookup: &F, var: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let default_ms = default.as_millis() as u64;
    parse_var(lookup, var, default_ms).map(Duration::from_millis)
}
