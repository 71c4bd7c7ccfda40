//! Event sink system for observability.
//!
//! The pipeline reports stage lifecycle events through an [`EventSink`].

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
