//! Event sink trait and implementations.

use parking_lot::RwLock;
use tracing::{debug, info, warn, Level};

/// Trait for event sinks that receive pipeline events.
///
/// Emitting must never fail or panic; sinks swallow their own errors.
pub trait EventSink: Send + Sync {
    /// Emits an event.
    ///
    /// # Arguments
    ///
    /// * `event_type` - The type of event (e.g., "stage.started")
    /// * `data` - Optional event data
    fn emit(&self, event_type: &str, data: Option<serde_json::Value>);
}

/// A no-op event sink that discards all events.
///
/// Used as the default when no sink is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn emit(&self, _event_type: &str, _data: Option<serde_json::Value>) {}
}

/// Reads a string field from an event payload.
fn payload_str<'a>(data: Option<&'a serde_json::Value>, key: &str) -> &'a str {
    data.and_then(|d| d.get(key))
        .and_then(serde_json::Value::as_str)
        .unwrap_or("")
}

/// Logs probe events through `tracing`.
///
/// Stage name, status and summary are lifted out of the payload into
/// structured fields. `stage.failed` is always logged at WARN; everything
/// else uses the configured level.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self::debug()
    }
}

impl LoggingEventSink {
    /// Creates a sink logging routine events at `level`.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Routine events at DEBUG.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Routine events at INFO.
    #[must_use]
    pub fn info() -> Self {
        Self::new(Level::INFO)
    }

    /// Level used for `event_type`.
    #[must_use]
    pub fn level_for(&self, event_type: &str) -> Level {
        if event_type == "stage.failed" {
            Level::WARN
        } else {
            self.level
        }
    }
}

impl EventSink for LoggingEventSink {
    fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        let data = data.as_ref();
        let stage = payload_str(data, "stage");
        let status = data.and_then(|d| d.get("status")).and_then(serde_json::Value::as_str);
        let summary = payload_str(data, "summary");

        let level = self.level_for(event_type);
        if level == Level::WARN {
            warn!(event = event_type, stage, status, summary, "Stage failed");
        } else if level == Level::INFO {
            info!(event = event_type, stage, status, summary, "Probe event");
        } else {
            debug!(event = event_type, stage, status, summary, "Probe event");
        }
    }
}

/// A collecting event sink for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<(String, Option<serde_json::Value>)>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<(String, Option<serde_json::Value>)> {
        self.events.read().clone()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Returns events matching a type prefix.
    #[must_use]
    pub fn events_of_type(&self, type_prefix: &str) -> Vec<(String, Option<serde_json::Value>)> {
        self.events
            .read()
            .iter()
            .filter(|(t, _)| t.starts_with(type_prefix))
            .cloned()
            .collect()
    }

    /// Returns the `stage` field of every `event_type` event, in order.
    #[must_use]
    pub fn stages_for(&self, event_type: &str) -> Vec<String> {
        self.events
            .read()
            .iter()
            .filter(|(t, _)| t == event_type)
            .map(|(_, data)| payload_str(data.as_ref(), "stage").to_string())
            .collect()
    }
}

impl EventSink for CollectingEventSink {
    fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.events.write().push((event_type.to_string(), data));
    }
}
