//! Stage timing hooks.
//!
//! Kept to `tracing` events; a subscriber in the binary decides where they go.

use std::time::Instant;

pub fn emit_span(event: &str, key_values: &[(&str, String)]) {
    let span = tracing::span!(tracing::Level::TRACE, "opencredit", event);
    let _enter = span.enter();
    for (k, v) in key_values {
        tracing::trace!(%event, %k, %v, "metric");
    }
}

/// Measures one pipeline stage and logs its duration when finished.
pub struct StageTimer {
    stage: &'static str,
    started: Instant,
}

impl StageTimer {
    pub fn start(stage: &'static str) -> Self {
        Self {
            stage,
            started: Instant::now(),
        }
    }

    /// Log the stage with extra fields; returns the elapsed milliseconds.
    pub fn finish(self, key_values: &[(&str, String)]) -> u128 {
        let elapsed_ms = self.started.elapsed().as_millis();
        let mut kv = Vec::with_capacity(key_values.len() + 1);
        kv.push(("elapsed_ms", elapsed_ms.to_string()));
        kv.extend(key_values.iter().cloned());
        emit_span(self.stage, &kv);
        tracing::info!(stage = self.stage, elapsed_ms = elapsed_ms as u64, "stage finished");
        elapsed_ms
    }
}
