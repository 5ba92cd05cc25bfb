//! hopwatch-runner — the process, filesystem and timing half of hopwatch.
//!
//! [`Scheduler`] owns the loop. It asks a [`Probe`] for raw output, hands it
//! to the normalizer in `hopwatch-core`, and writes the result through a
//! [`ResultStore`]. Time comes from a [`Clock`] and waiting goes through a
//! [`Sleeper`], so every side effect can be replaced in tests.

pub mod clock;
pub mod probe;
pub mod scheduler;
pub mod store;

pub use clock::{Clock, Sleeper, SystemClock, TokioSleeper};
pub use probe::{MtrProbe, Probe, ProbeError};
pub use scheduler::{CycleReport, Scheduler, StepOutcome};
pub use store::{ResultStore, StoreError};
