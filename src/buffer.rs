//! EventBuffer - live append buffer for one (name, kind) event series
//!
//! A writer pushes decoded events between flushes, then appends
//! [`csv_events`](EventBuffer::csv_events) to the series' log file. The
//! header is written once, at file creation. Buffers serialize to the
//! `{name, kind, events}` transport map for process-to-process handoff.
//!
//! ## Usage
//!
//! ```rust
//! use runlog::buffer::EventBuffer;
//! use runlog::event::Event;
//! use runlog::kind::ArtifactKind;
//!
//! let mut buffer = EventBuffer::new("loss", ArtifactKind::Metric);
//! assert_eq!(buffer.csv_header(), "step|timestamp|metric");
//!
//! buffer.push(Event::builder().step(0).metric(1.0).build()?);
//! buffer.push(Event::builder().step(1).metric(0.5).build()?);
//! assert_eq!(buffer.csv_events()?.matches('\n').count(), 2);
//!
//! buffer.clear();
//! assert!(buffer.csv_events()?.is_empty());
//! # Ok::<(), runlog::Error>(())
//! ```

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Result;
use crate::event::{csv_header, Event};
use crate::kind::ArtifactKind;

/// Named append buffer of decoded events awaiting flush.
///
/// Not internally synchronized: `&mut` access already forces one producer
/// at a time, and callers with several producers keep one buffer per
/// producer and merge at flush.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBuffer {
    name: String,
    kind: ArtifactKind,
    events: Vec<Event>,
}

impl EventBuffer {
    /// Create an empty buffer for a series.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ArtifactKind) -> Self {
        Self {
            name: name.into(),
            kind,
            events: Vec::new(),
        }
    }

    /// Get the series name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the series kind.
    #[must_use]
    pub const fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Get the buffered events, in append order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of buffered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Append one event.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Empty the buffer in place, keeping the backing storage.
    pub fn clear(&mut self) {
        trace!(name = %self.name, kind = %self.kind, dropped = self.events.len(), "cleared event buffer");
        self.events.clear();
    }

    /// Header line for the series' log file: `step|timestamp|<kind-tag>`.
    #[must_use]
    pub fn csv_header(&self) -> String {
        csv_header(self.kind)
    }

    /// Append-ready fragment: one newline-prefixed row per buffered event.
    ///
    /// Empty when the buffer is empty.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if a structured payload fails to serialize.
    pub fn csv_events(&self) -> Result<String> {
        let mut out = String::new();
        for event in &self.events {
            out.push('\n');
            out.push_str(&event.to_csv()?);
        }
        Ok(out)
    }

    /// Encode the buffer as its `{name, kind, events}` transport map.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Decode a buffer from its transport map.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` for a malformed map; per-event one-of and
    /// timestamp failures surface through it.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Single-event queue item: one decoded event tagged with the series it
/// belongs to. Writers enqueue these and group them into per-series
/// [`EventBuffer`]s at flush time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// Series name
    pub name: String,
    /// Series kind
    pub kind: ArtifactKind,
    /// The decoded event
    pub event: Event,
}

impl LoggedEvent {
    /// Tag an event with its series.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ArtifactKind, event: Event) -> Self {
        Self {
            name: name.into(),
            kind,
            event,
        }
    }
}
