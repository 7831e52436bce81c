//! # Runlog: Typed Telemetry Event Model
//!
//! Runlog is the event model for experiment telemetry: one timestamped,
//! stepped measurement per event, exactly one payload out of a closed set
//! of kinds, a pipe-delimited row codec, and summaries over ordered event
//! series.
//!
//! ## Design
//!
//! - **One-of invariant**: an event carries exactly one payload. Typed
//!   construction makes that structural; loose input is validated at the
//!   flat-map boundary ([`event::RawEvent`]).
//! - **Lossless rows**: `step|timestamp|value` with at-most-three-cell
//!   splitting, so a `|` inside a JSON payload survives the round trip.
//! - **Positional summaries**: step/timestamp min/max are the first/last
//!   stored rows, matching writers that append in step order; metric
//!   statistics are true numeric descriptives.
//!
//! ## Example Usage
//!
//! ```rust
//! use runlog::buffer::EventBuffer;
//! use runlog::event::Event;
//! use runlog::kind::ArtifactKind;
//! use runlog::log::EventLog;
//!
//! // Buffer two metric samples
//! let mut buffer = EventBuffer::new("loss", ArtifactKind::Metric);
//! buffer.push(Event::builder().step(0).metric(1.0).build()?);
//! buffer.push(Event::builder().step(1).metric(3.0).build()?);
//!
//! // Flush: header once at file creation, then the append fragment
//! let text = format!("{}{}", buffer.csv_header(), buffer.csv_events()?);
//!
//! // Read back and summarize
//! let log = EventLog::read_csv(ArtifactKind::Metric, "loss", &text, true)?;
//! let summary = log.get_summary();
//! assert_eq!(summary.step.unwrap().count, 2);
//! assert_eq!(summary.metric.unwrap().last, 3.0);
//! # Ok::<(), runlog::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod buffer;
pub mod error;
pub mod event;
pub mod kind;
pub mod log;
pub mod time;

pub use error::{Error, Result};
