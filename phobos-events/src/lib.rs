// Recorder implementations for Phobos framework events
//
// The core emits fire-and-forget events (binding registration, route
// matches, pipeline runs) through the `Recorder` trait; this crate provides
// the sinks that consume them.

use parking_lot::Mutex;
use phobos_core::Recorder;
use tracing::debug;

/// Forwards every framework event to the `tracing` subscriber at debug
/// level.
pub struct TracingRecorder;

impl Recorder for TracingRecorder {
    fn record(&self, event: &str, context: &[(&str, String)]) {
        let rendered = context
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(" ");
        debug!(event, context = %rendered, "Framework event");
    }
}

/// One captured framework event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub name: String,
    pub context: Vec<(String, String)>,
}

/// Buffers every event in memory, for assertions in tests and for
/// diagnostics in tools.
#[derive(Default)]
pub struct MemoryRecorder {
    events: Mutex<Vec<RecordedEvent>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    /// Just the event names, in arrival order
    pub fn names(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.name.clone()).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Recorder for MemoryRecorder {
    fn record(&self, event: &str, context: &[(&str, String)]) {
        self.events.lock().push(RecordedEvent {
            name: event.to_string(),
            context: context
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect(),
        });
    }
}
