//! In-memory serial fakes shared by the agent integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use sensorlink_agent::config::AcquisitionConfig;
use sensorlink_agent::error::{ConnectError, ReadError};
use sensorlink_agent::serial::{LineSource, PortOpener};

pub const VALID_LINE: &str = r#"{"temp":"23.5","humid":"60.2","press":"1013.1","time":"12:00:00"}"#;
pub const SECOND_LINE: &str = r#"{"temp":"24.0","humid":"58.0","press":"1012.8","time":"12:00:05"}"#;
pub const MALFORMED_LINE: &str = r#"{"temp":"bad"}"#;

/// One scripted response to `read_line`.
#[derive(Debug, Clone)]
pub enum Step {
    Line(&'static str),
    Timeout,
    Fail,
}

/// One scripted response to `open`.
#[derive(Debug, Clone)]
pub enum OpenScript {
    Fail,
    Succeed(Vec<Step>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Open,
    OpenFailed,
    Read,
    Close,
}

#[derive(Default)]
struct FakeState {
    opens: VecDeque<OpenScript>,
    events: Vec<(Event, Instant)>,
}

impl FakeState {
    fn record(&mut self, event: Event) {
        self.events.push((event, Instant::now()));
    }
}

/// Scripted [`PortOpener`]. Clones share the same script and event log.
#[derive(Clone, Default)]
pub struct FakeOpener {
    state: Arc<Mutex<FakeState>>,
}

impl FakeOpener {
    pub fn new(opens: Vec<OpenScript>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                opens: opens.into(),
                events: Vec::new(),
            })),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().unwrap().events.iter().map(|(e, _)| *e).collect()
    }

    pub fn timed_events(&self) -> Vec<(Event, Instant)> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn count(&self, event: Event) -> usize {
        self.events().into_iter().filter(|e| *e == event).count()
    }
}

#[async_trait]
impl PortOpener for FakeOpener {
    async fn open(&self, port: &str, _baud_rate: u32) -> Result<Box<dyn LineSource>, ConnectError> {
        let mut state = self.state.lock().unwrap();
        match state.opens.pop_front() {
            Some(OpenScript::Succeed(steps)) => {
                state.record(Event::Open);
                Ok(Box::new(FakeSource {
                    steps: steps.into(),
                    state: Arc::clone(&self.state),
                }))
            }
            Some(OpenScript::Fail) | None => {
                state.record(Event::OpenFailed);
                Err(ConnectError::Unavailable {
                    port: port.to_string(),
                    reason: "no such device".into(),
                })
            }
        }
    }
}

/// Scripted connection. Once the script runs out every read times out.
pub struct FakeSource {
    steps: VecDeque<Step>,
    state: Arc<Mutex<FakeState>>,
}

#[async_trait]
impl LineSource for FakeSource {
    async fn read_line(&mut self, timeout: Duration) -> Result<Option<String>, ReadError> {
        self.state.lock().unwrap().record(Event::Read);
        match self.steps.pop_front() {
            Some(Step::Line(line)) => Ok(Some(line.to_string())),
            Some(Step::Fail) => Err(ReadError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "device unplugged",
            ))),
            Some(Step::Timeout) | None => {
                tokio::time::sleep(timeout).await;
                Ok(None)
            }
        }
    }
}

impl Drop for FakeSource {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.record(Event::Close);
        }
    }
}

/// Config with round, distinct delays so timings are easy to assert.
pub fn test_config() -> AcquisitionConfig {
    AcquisitionConfig {
        port: "/dev/ttyTEST0".into(),
        baud_rate: 9600,
        read_timeout: Duration::from_millis(2000),
        reconnect_delay: Duration::from_millis(1000),
        cycle_delay: Duration::from_millis(500),
        pre_open_settle: Duration::from_millis(300),
        post_open_settle: Duration::from_millis(2000),
        max_line_bytes: 4096,
    }
}
