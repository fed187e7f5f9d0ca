//! Diagnostic sinks for asserting on emitted events.

use std::sync::Mutex;

use wx_common::{DiagnosticEvent, DiagnosticSink};

/// Collects every emitted event for later inspection.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events emitted so far.
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, event: &DiagnosticEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
