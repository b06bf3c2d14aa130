//! Library side of the `mfds-reconcile` binary: logging setup, configuration
//! resolution, and output writers.

pub mod config;
pub mod logging;
pub mod output;
