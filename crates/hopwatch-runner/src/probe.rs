//! Probe — launches the external route-diagnostic tool and captures its report.
//!
//! [`Probe`] is the seam the scheduler talks to; [`MtrProbe`] is the real
//! implementation that spawns `mtr` as a child process. Test code swaps in
//! scripted probes that never touch the network.

use std::future::Future;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use hopwatch_core::{ProbeRequest, RawProbeOutput};
use tokio::process::Command;

/// Longest stderr excerpt carried in a [`ProbeError::Exit`].
const STDERR_EXCERPT_LEN: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The binary could not be started, or waiting on it failed.
    #[error("failed to run probe {}: {source}", .binary.display())]
    Io {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("probe exited with {status}: {stderr}")]
    Exit { status: ExitStatus, stderr: String },
    #[error("probe did not finish within {0:?}")]
    TimedOut(Duration),
}

/// Something that can run one probe and hand back its raw output.
pub trait Probe {
    fn invoke(
        &self,
        request: &ProbeRequest,
    ) -> impl Future<Output = Result<RawProbeOutput, ProbeError>>;
}

/// Runs the real `mtr` binary named by the request.
#[derive(Debug, Clone, Default)]
pub struct MtrProbe {
    timeout: Option<Duration>,
}

impl MtrProbe {
    /// A probe that waits as long as the child takes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the child and fail the run after `timeout`. `None` disables the
    /// limit.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Probe for MtrProbe {
    async fn invoke(&self, request: &ProbeRequest) -> Result<RawProbeOutput, ProbeError> {
        let mut cmd = Command::new(&request.binary);
        cmd.args(request.args())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        tracing::debug!(
            binary = %request.binary.display(),
            args = ?request.args(),
            "spawning probe"
        );

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| ProbeError::TimedOut(limit))?,
            None => cmd.output().await,
        }
        .map_err(|source| ProbeError::Io {
            binary: request.binary.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(ProbeError::Exit {
                status: output.status,
                stderr: stderr_excerpt(&output.stderr),
            });
        }

        Ok(RawProbeOutput::new(request.dialect, output.stdout))
    }
}

fn stderr_excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.is_empty() {
        return "<no stderr>".to_string();
    }
    match text.char_indices().nth(STDERR_EXCERPT_LEN) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
