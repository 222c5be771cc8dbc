//! Background report worker.
//!
//! The run happens on a dedicated thread so a caller (a UI loop, the CLI)
//! stays responsive. Every run delivers zero or more `Stage` events and then
//! exactly one terminal event, `Completed` or `Failed`.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use opencredit_core::manifest::RunManifest;

use crate::runtime::{Engine, ExecError, Stage};

/// Name given to the worker thread.
pub const WORKER_THREAD_NAME: &str = "opencredit-report";

#[derive(Debug, Clone)]
pub enum RunEvent {
    Stage(Stage),
    Completed(RunManifest),
    Failed(String),
}

impl RunEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunEvent::Stage(_))
    }
}

pub struct ReportWorker;

impl ReportWorker {
    /// Start a run for `picked` on a background thread.
    pub fn spawn(engine: Engine, picked: PathBuf) -> Result<ReportHandle, ExecError> {
        let (tx, rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let stage_tx = tx.clone();
                let outcome = engine.run_with(&picked, |stage| {
                    // A dropped receiver only means nobody is listening.
                    let _ = stage_tx.send(RunEvent::Stage(stage));
                });
                let terminal = match outcome {
                    Ok(manifest) => RunEvent::Completed(manifest),
                    Err(e) => {
                        tracing::error!(error = %e, "report run failed");
                        RunEvent::Failed(e.to_string())
                    }
                };
                let _ = tx.send(terminal);
            })
            .map_err(|e| ExecError::Worker(format!("spawn: {e}")))?;

        Ok(ReportHandle {
            events: rx,
            thread: Some(thread),
        })
    }
}

/// Handle to a running report.
pub struct ReportHandle {
    events: Receiver<RunEvent>,
    thread: Option<JoinHandle<()>>,
}

impl ReportHandle {
    /// Raw event stream, for callers that poll (e.g. with `try_recv`).
    pub fn events(&self) -> &Receiver<RunEvent> {
        &self.events
    }

    /// Block until the run finishes.
    pub fn wait(self) -> Result<RunManifest, ExecError> {
        self.wait_with(|_| {})
    }

    /// Block until the run finishes, passing each stage to `on_stage`.
    pub fn wait_with(mut self, mut on_stage: impl FnMut(Stage)) -> Result<RunManifest, ExecError> {
        let mut terminal = None;
        while let Ok(event) = self.events.recv() {
            match event {
                RunEvent::Stage(stage) => on_stage(stage),
                RunEvent::Completed(m) => {
                    terminal = Some(Ok(m));
                    break;
                }
                RunEvent::Failed(msg) => {
                    terminal = Some(Err(ExecError::Failed(msg)));
                    break;
                }
            }
        }

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                return Err(ExecError::Worker("report thread panicked".into()));
            }
        }

        terminal.unwrap_or_else(|| {
            Err(ExecError::Worker(
                "report thread exited without a result".into(),
            ))
        })
    }
}
