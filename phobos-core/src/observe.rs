// Observability sink consumed by the core

/// A fire-and-forget sink for framework events.
///
/// The core records events at well-defined points: binding registration,
/// resolution start/end, route match/miss, pipeline start/end, and each
/// middleware layer's entry and exit.
/// Implementations must never fail and must never affect control flow.
pub trait Recorder: Send + Sync {
    /// Record a single named event with its context pairs.
    fn record(&self, event: &str, context: &[(&str, String)]);
}

/// Recorder that discards every event.
pub struct NullRecorder;

impl Recorder for NullRecorder {
    fn record(&self, _event: &str, _context: &[(&str, String)]) {}
}
