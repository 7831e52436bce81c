//! Event - one timestamped, stepped measurement with exactly one payload
//!
//! ## Shape
//!
//! ```text
//! Event   { step?, timestamp?, payload }     typed, invariant held by construction
//!    ^
//!    | one-of validation at the boundary
//!    v
//! RawEvent { step?, timestamp?, 13 slots }   flat transport/storage form
//!    ^
//!    | to_csv / row decode
//!    v
//! "step|timestamp|value"                     log row
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use runlog::event::Event;
//!
//! let event = Event::builder().step(10).metric(0.93).build()?;
//! let row = event.to_csv()?;
//! assert_eq!(row.split('|').next(), Some("10"));
//! # Ok::<(), runlog::Error>(())
//! ```

mod payload;

pub use payload::{
    ChartKind, CurveKind, EventArtifact, EventAudio, EventChart, EventConfusionMatrix,
    EventCurve, EventDataframe, EventHistogram, EventImage, EventModel, EventPayload,
    EventVideo,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::kind::ArtifactKind;
use crate::time;

/// Cell separator in the row format.
pub const SEPARATOR: char = '|';

/// Build the log header line for a kind: `step|timestamp|<kind-tag>`.
#[must_use]
pub fn csv_header(kind: ArtifactKind) -> String {
    format!("step{SEPARATOR}timestamp{SEPARATOR}{kind}")
}

/// One timestamped, stepped measurement.
///
/// Exactly one payload is active per event. For values built in process the
/// typed [`EventPayload`] makes that structural; input arriving through the
/// flat transport map is checked by [`RawEvent::into_event`] and rejected
/// with `MissingPayload`/`MultiplePayloads` when the invariant does not
/// hold. Events are immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    step: Option<i64>,
    timestamp: Option<DateTime<Utc>>,
    payload: EventPayload,
}

impl Event {
    /// Create an event carrying the given payload, timestamped now.
    #[must_use]
    pub fn new(payload: EventPayload) -> Self {
        Self {
            step: None,
            timestamp: Some(Utc::now()),
            payload,
        }
    }

    /// Create a builder for assembling an event from loose parts.
    #[must_use]
    pub fn builder() -> EventBuilder {
        EventBuilder::default()
    }

    /// Assemble an event from already-validated parts, no timestamp default.
    pub(crate) const fn from_parts(
        step: Option<i64>,
        timestamp: Option<DateTime<Utc>>,
        payload: EventPayload,
    ) -> Self {
        Self {
            step,
            timestamp,
            payload,
        }
    }

    /// Decode an event from its flat transport map.
    ///
    /// Structured payload slots given as JSON objects are coerced through
    /// their field contracts; unknown keys inside a payload are rejected.
    /// The timestamp is *not* defaulted here.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` for a malformed map, `Error::InvalidTimestamp`
    /// for unparsable timestamp text, and `Error::MissingPayload` /
    /// `Error::MultiplePayloads` when the one-of invariant is violated.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let raw: RawEvent = serde_json::from_value(value)?;
        raw.into_event()
    }

    /// Encode the event as its flat transport map.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.to_raw())?)
    }

    /// Get the step, if one was recorded.
    #[must_use]
    pub const fn step(&self) -> Option<i64> {
        self.step
    }

    /// Get the timestamp, if one was recorded.
    #[must_use]
    pub const fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Get the kind tag of the active payload.
    #[must_use]
    pub const fn kind(&self) -> ArtifactKind {
        self.payload.kind()
    }

    /// Get the active payload.
    #[must_use]
    pub const fn payload(&self) -> &EventPayload {
        &self.payload
    }

    /// Encode the event as one log row: `step|timestamp|value`.
    ///
    /// Absent step/timestamp cells are empty strings. The value cell is the
    /// payload's column encoding; a `|` inside a JSON string value is safe
    /// because row decoding splits into at most three cells.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if a structured payload fails to serialize.
    pub fn to_csv(&self) -> Result<String> {
        let step = self.step.map(|s| s.to_string()).unwrap_or_default();
        let timestamp = self.timestamp.map(time::format_timestamp).unwrap_or_default();
        let value = self.payload.to_column_value()?;
        Ok(format!("{step}{SEPARATOR}{timestamp}{SEPARATOR}{value}"))
    }

    /// Rebuild the flat transport form, payload in its kind's slot.
    #[must_use]
    pub fn to_raw(&self) -> RawEvent {
        let mut raw = RawEvent {
            step: self.step,
            timestamp: self.timestamp.map(time::format_timestamp),
            ..RawEvent::default()
        };
        match self.payload.clone() {
            EventPayload::Metric(v) => raw.metric = Some(v),
            EventPayload::Image(v) => raw.image = Some(v),
            EventPayload::Histogram(v) => raw.histogram = Some(v),
            EventPayload::Audio(v) => raw.audio = Some(v),
            EventPayload::Video(v) => raw.video = Some(v),
            EventPayload::Html(v) => raw.html = Some(v),
            EventPayload::Text(v) => raw.text = Some(v),
            EventPayload::Chart(v) => raw.chart = Some(v),
            EventPayload::Curve(v) => raw.curve = Some(v),
            EventPayload::Confusion(v) => raw.confusion = Some(v),
            EventPayload::Artifact(v) => raw.artifact = Some(v),
            EventPayload::Model(v) => raw.model = Some(v),
            EventPayload::Dataframe(v) => raw.dataframe = Some(v),
        }
        raw
    }
}

impl Serialize for Event {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_raw().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawEvent::deserialize(deserializer)?;
        raw.into_event().map_err(serde::de::Error::custom)
    }
}

/// Flat boundary form of an event: `{step, timestamp, <kind-tag>: value}`.
///
/// This is the shape events take on the wire and in column stores: thirteen
/// nullable payload slots of which exactly one may be set. It exists so
/// loosely-typed input has a single validated door into [`Event`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Global step the measurement was taken at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<i64>,
    /// ISO-8601 timestamp text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Scalar metric slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<f64>,
    /// Image slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EventImage>,
    /// Histogram slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram: Option<EventHistogram>,
    /// Audio slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<EventAudio>,
    /// Video slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<EventVideo>,
    /// HTML slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    /// Text slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Chart slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<EventChart>,
    /// Curve slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curve: Option<EventCurve>,
    /// Confusion matrix slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confusion: Option<EventConfusionMatrix>,
    /// Artifact reference slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<EventArtifact>,
    /// Model reference slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<EventModel>,
    /// Dataframe reference slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataframe: Option<EventDataframe>,
}

impl RawEvent {
    fn slot_count(&self) -> usize {
        [
            self.metric.is_some(),
            self.image.is_some(),
            self.histogram.is_some(),
            self.audio.is_some(),
            self.video.is_some(),
            self.html.is_some(),
            self.text.is_some(),
            self.chart.is_some(),
            self.curve.is_some(),
            self.confusion.is_some(),
            self.artifact.is_some(),
            self.model.is_some(),
            self.dataframe.is_some(),
        ]
        .into_iter()
        .filter(|&set| set)
        .count()
    }

    fn take_payload(&mut self) -> Option<EventPayload> {
        if let Some(v) = self.metric.take() {
            return Some(EventPayload::Metric(v));
        }
        if let Some(v) = self.image.take() {
            return Some(EventPayload::Image(v));
        }
        if let Some(v) = self.histogram.take() {
            return Some(EventPayload::Histogram(v));
        }
        if let Some(v) = self.audio.take() {
            return Some(EventPayload::Audio(v));
        }
        if let Some(v) = self.video.take() {
            return Some(EventPayload::Video(v));
        }
        if let Some(v) = self.html.take() {
            return Some(EventPayload::Html(v));
        }
        if let Some(v) = self.text.take() {
            return Some(EventPayload::Text(v));
        }
        if let Some(v) = self.chart.take() {
            return Some(EventPayload::Chart(v));
        }
        if let Some(v) = self.curve.take() {
            return Some(EventPayload::Curve(v));
        }
        if let Some(v) = self.confusion.take() {
            return Some(EventPayload::Confusion(v));
        }
        if let Some(v) = self.artifact.take() {
            return Some(EventPayload::Artifact(v));
        }
        if let Some(v) = self.model.take() {
            return Some(EventPayload::Model(v));
        }
        if let Some(v) = self.dataframe.take() {
            return Some(EventPayload::Dataframe(v));
        }
        None
    }

    /// Validate the one-of invariant and extract the single active payload.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingPayload` when no slot is set and
    /// `Error::MultiplePayloads` when more than one is.
    pub fn into_payload(mut self) -> Result<EventPayload> {
        let count = self.slot_count();
        if count > 1 {
            return Err(Error::MultiplePayloads { count });
        }
        self.take_payload().ok_or(Error::MissingPayload)
    }

    /// Validate and convert into a typed [`Event`].
    ///
    /// Timestamp text is parsed leniently (see [`crate::time`]); an absent
    /// timestamp stays absent.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTimestamp` for unparsable timestamp text, and
    /// the one-of errors from [`Self::into_payload`].
    pub fn into_event(mut self) -> Result<Event> {
        let step = self.step.take();
        let timestamp = match self.timestamp.take() {
            Some(text) => Some(time::parse_timestamp(&text)?),
            None => None,
        };
        let payload = self.into_payload()?;
        Ok(Event {
            step,
            timestamp,
            payload,
        })
    }
}

/// Builder for [`Event`].
///
/// One setter per payload slot; setting more than one slot fails at
/// [`build`](Self::build) with `MultiplePayloads`. The timestamp may be
/// given as an instant or as ISO-8601 text (last call wins) and defaults
/// to now when omitted.
#[derive(Debug, Default)]
pub struct EventBuilder {
    raw: RawEvent,
    instant: Option<DateTime<Utc>>,
}

impl EventBuilder {
    /// Set the step.
    #[must_use]
    pub fn step(mut self, step: i64) -> Self {
        self.raw.step = Some(step);
        self
    }

    /// Set the timestamp from an instant.
    #[must_use]
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.instant = Some(timestamp);
        self.raw.timestamp = None;
        self
    }

    /// Set the timestamp from ISO-8601 text, parsed at build time.
    #[must_use]
    pub fn timestamp_iso(mut self, text: impl Into<String>) -> Self {
        self.raw.timestamp = Some(text.into());
        self.instant = None;
        self
    }

    /// Set the metric slot.
    #[must_use]
    pub fn metric(mut self, value: f64) -> Self {
        self.raw.metric = Some(value);
        self
    }

    /// Set the image slot.
    #[must_use]
    pub fn image(mut self, image: EventImage) -> Self {
        self.raw.image = Some(image);
        self
    }

    /// Set the histogram slot.
    #[must_use]
    pub fn histogram(mut self, histogram: EventHistogram) -> Self {
        self.raw.histogram = Some(histogram);
        self
    }

    /// Set the audio slot.
    #[must_use]
    pub fn audio(mut self, audio: EventAudio) -> Self {
        self.raw.audio = Some(audio);
        self
    }

    /// Set the video slot.
    #[must_use]
    pub fn video(mut self, video: EventVideo) -> Self {
        self.raw.video = Some(video);
        self
    }

    /// Set the html slot.
    #[must_use]
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.raw.html = Some(html.into());
        self
    }

    /// Set the text slot.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.raw.text = Some(text.into());
        self
    }

    /// Set the chart slot.
    #[must_use]
    pub fn chart(mut self, chart: EventChart) -> Self {
        self.raw.chart = Some(chart);
        self
    }

    /// Set the curve slot.
    #[must_use]
    pub fn curve(mut self, curve: EventCurve) -> Self {
        self.raw.curve = Some(curve);
        self
    }

    /// Set the confusion matrix slot.
    #[must_use]
    pub fn confusion(mut self, confusion: EventConfusionMatrix) -> Self {
        self.raw.confusion = Some(confusion);
        self
    }

    /// Set the artifact reference slot.
    #[must_use]
    pub fn artifact(mut self, artifact: EventArtifact) -> Self {
        self.raw.artifact = Some(artifact);
        self
    }

    /// Set the model reference slot.
    #[must_use]
    pub fn model(mut self, model: EventModel) -> Self {
        self.raw.model = Some(model);
        self
    }

    /// Set the dataframe reference slot.
    #[must_use]
    pub fn dataframe(mut self, dataframe: EventDataframe) -> Self {
        self.raw.dataframe = Some(dataframe);
        self
    }

    /// Validate and build the [`Event`].
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTimestamp` when ISO text fails to parse, and
    /// `Error::MissingPayload` / `Error::MultiplePayloads` when the one-of
    /// invariant is violated.
    pub fn build(self) -> Result<Event> {
        let mut raw = self.raw;
        let timestamp = if let Some(instant) = self.instant {
            instant
        } else if let Some(text) = raw.timestamp.take() {
            time::parse_timestamp(&text)?
        } else {
            Utc::now()
        };
        let step = raw.step.take();
        let payload = raw.into_payload()?;
        Ok(Event {
            step,
            timestamp: Some(timestamp),
            payload,
        })
    }
}
