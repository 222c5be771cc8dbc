#![forbid(unsafe_code)]
//! opencredit-exec: runs one report end to end and reports the outcome.
//!
//! `Engine` drives resolve → load → join → write on the calling thread;
//! `ReportWorker` runs the same on a background thread and delivers stage
//! events followed by exactly one terminal event.

pub mod metrics;
pub mod runtime;
pub mod worker;

pub use runtime::{Engine, ExecError, Stage};
pub use worker::{ReportHandle, ReportWorker, RunEvent, WORKER_THREAD_NAME};
