//! Scripted stand-ins for the probe, clock and sleeper.
//!
//! [`ScriptedProbe`] answers each destination with a canned report or a
//! failure and records the order it was called in. Clones share state, so a
//! test can keep one handle while the scheduler owns another.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use hopwatch_core::{ProbeRequest, RawProbeOutput};
use hopwatch_runner::{Clock, Probe, ProbeError, Sleeper};

/// Canned answer for one destination.
#[derive(Debug, Clone)]
pub enum Scripted {
    Output(String),
    ExitFailure,
    Missing,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedProbe {
    responses: Arc<Mutex<HashMap<String, Scripted>>>,
    calls: Arc<Mutex<Vec<ProbeRequest>>>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `destination` with `output` on every call.
    pub fn respond(self, destination: &str, output: &str) -> Self {
        self.script(destination, Scripted::Output(output.to_string()))
    }

    /// Make `destination` exit non-zero on every call.
    pub fn fail(self, destination: &str) -> Self {
        self.script(destination, Scripted::ExitFailure)
    }

    pub fn script(self, destination: &str, answer: Scripted) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(destination.to_string(), answer);
        self
    }

    /// Destinations probed so far, in call order.
    pub fn called(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.destination.clone())
            .collect()
    }

    pub fn requests(&self) -> Vec<ProbeRequest> {
        self.calls.lock().unwrap().clone()
    }
}

impl Probe for ScriptedProbe {
    async fn invoke(&self, request: &ProbeRequest) -> Result<RawProbeOutput, ProbeError> {
        self.calls.lock().unwrap().push(request.clone());
        let answer = self
            .responses
            .lock()
            .unwrap()
            .get(&request.destination)
            .cloned()
            .unwrap_or(Scripted::Missing);
        match answer {
            Scripted::Output(text) => Ok(RawProbeOutput::new(request.dialect, text)),
            Scripted::ExitFailure => Err(ProbeError::Exit {
                status: failed_status(),
                stderr: "mtr: Failure to start mtr-packet".to_string(),
            }),
            Scripted::Missing => Err(ProbeError::Io {
                binary: PathBuf::from(&request.binary),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            }),
        }
    }
}

#[cfg(unix)]
fn failed_status() -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(1 << 8)
}

#[cfg(windows)]
fn failed_status() -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(1)
}

/// A clock that advances by `step` every time it is read, so consecutive
/// captures never share a second.
#[derive(Debug, Clone)]
pub struct SteppingClock {
    next: Arc<Mutex<DateTime<Utc>>>,
    step: chrono::Duration,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: chrono::Duration) -> Self {
        Self {
            next: Arc::new(Mutex::new(start)),
            step,
        }
    }

    /// A clock that never moves.
    pub fn frozen(at: DateTime<Utc>) -> Self {
        Self::new(at, chrono::Duration::zero())
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().unwrap();
        let now = *next;
        *next = now + self.step;
        now
    }
}

/// Records requested sleeps and returns immediately.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}
