//! Session-scoped processing monitor.
//!
//! [`ProcessingMonitor`] owns the event stream for one authenticated
//! session, the run's event log and the stage deriver, and hands out
//! [`MonitorSnapshot`] values for presentation.

#[cfg(test)]
mod monitor_tests;
mod processing;
mod snapshot;

pub use processing::ProcessingMonitor;
pub use snapshot::MonitorSnapshot;
