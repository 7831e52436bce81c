//! Comprehensive property-based tests for runlog
//!
//! Invariants that must hold for arbitrary inputs:
//! - Row and transport encodings are lossless for every payload shape
//! - The one-of payload rule rejects every multi-slot combination
//! - Summary statistics stay consistent with the rows they describe
//! - Buffer flush fragments reread as the events that were pushed

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use runlog::buffer::EventBuffer;
use runlog::event::{csv_header, Event, EventBuilder, EventHistogram, EventImage, EventPayload, RawEvent};
use runlog::kind::ArtifactKind;
use runlog::log::EventLog;
use runlog::time::{format_timestamp, parse_timestamp};
use runlog::Error;

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Generate instants across the representable range, down to nanoseconds
fn arb_timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_000_000_000, 0u32..1_000_000_000).prop_map(|(secs, nanos)| {
        Utc.timestamp_opt(secs, nanos)
            .single()
            .expect("seconds in range")
    })
}

/// Generate raw cell text: no line breaks, separators allowed
fn arb_cell_text() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-zA-Z0-9 |,.:;_()<>/-]{0,40}").expect("valid regex")
}

fn arb_path() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z0-9_/]{1,24}\\.[a-z]{2,4}").expect("valid regex")
}

/// Generate one payload of any shape: scalar, raw text, or structured
fn arb_payload() -> impl Strategy<Value = EventPayload> {
    prop_oneof![
        proptest::num::f64::NORMAL.prop_map(EventPayload::Metric),
        arb_cell_text().prop_map(EventPayload::Html),
        arb_cell_text().prop_map(EventPayload::Text),
        (
            proptest::option::of(1i32..4096),
            proptest::option::of(1i32..4096),
            proptest::option::of(arb_path()),
        )
            .prop_map(|(height, width, path)| {
                EventPayload::Image(EventImage {
                    height,
                    width,
                    colorspace: None,
                    path,
                })
            }),
        (
            proptest::collection::vec(-1e6..1e6f64, 0..8),
            proptest::collection::vec(0f64..1e6, 0..8),
        )
            .prop_map(|(values, counts)| {
                EventPayload::Histogram(EventHistogram {
                    values: Some(values),
                    counts: Some(counts),
                })
            }),
    ]
}

fn set_payload(builder: EventBuilder, payload: EventPayload) -> EventBuilder {
    match payload {
        EventPayload::Metric(v) => builder.metric(v),
        EventPayload::Html(v) => builder.html(v),
        EventPayload::Text(v) => builder.text(v),
        EventPayload::Image(v) => builder.image(v),
        EventPayload::Histogram(v) => builder.histogram(v),
        _ => unreachable!("strategy emits five shapes"),
    }
}

fn build_event(step: Option<i64>, timestamp: DateTime<Utc>, payload: EventPayload) -> Event {
    let mut builder = Event::builder().timestamp(timestamp);
    if let Some(step) = step {
        builder = builder.step(step);
    }
    set_payload(builder, payload)
        .build()
        .expect("one payload slot set")
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ========================================================================
    // Encoding Properties
    // ========================================================================

    /// Property: a row written by an event decodes back to the same event
    #[test]
    fn prop_row_encoding_is_lossless(
        step in proptest::option::of(any::<i64>()),
        timestamp in arb_timestamp(),
        payload in arb_payload(),
    ) {
        let event = build_event(step, timestamp, payload);
        let text = format!(
            "{}\n{}",
            csv_header(event.kind()),
            event.to_csv().expect("encodable row")
        );

        let log = EventLog::read_csv(event.kind(), "series", &text, true)
            .expect("own row decodes");
        prop_assert_eq!(log.len(), 1);
        prop_assert_eq!(log.get_event_at(0).expect("decodable"), event);
    }

    /// Property: the flat transport map reproduces the event exactly
    #[test]
    fn prop_transport_encoding_is_lossless(
        step in proptest::option::of(any::<i64>()),
        timestamp in arb_timestamp(),
        payload in arb_payload(),
    ) {
        let event = build_event(step, timestamp, payload);
        let value = event.to_value().expect("serializable");
        prop_assert_eq!(Event::from_value(value).expect("decodable"), event);
    }

    /// Property: canonical timestamp text parses back to the same instant
    #[test]
    fn prop_timestamp_text_round_trips(timestamp in arb_timestamp()) {
        prop_assert_eq!(
            parse_timestamp(&format_timestamp(timestamp)).expect("own text parses"),
            timestamp
        );
    }

    /// Property: float-formatted step cells decode to their integer value
    #[test]
    fn prop_float_step_cells_decode(step in -(1i64 << 40)..(1i64 << 40)) {
        let text = format!("step|timestamp|metric\n{step}.0||1");
        let log = EventLog::read_csv(ArtifactKind::Metric, "loss", &text, true)
            .expect("valid csv");
        prop_assert_eq!(log.get_event_at(0).expect("decodable").step(), Some(step));
    }

    // ========================================================================
    // Validation Properties
    // ========================================================================

    /// Property: every multi-slot combination is rejected with its count
    #[test]
    fn prop_multiple_slots_are_rejected(
        metric in proptest::num::f64::NORMAL,
        text in arb_cell_text(),
        with_html in any::<bool>(),
        with_image in any::<bool>(),
    ) {
        let raw = RawEvent {
            metric: Some(metric),
            text: Some(text),
            html: with_html.then(|| "<p>extra</p>".to_string()),
            image: with_image.then(EventImage::default),
            ..RawEvent::default()
        };
        let expected = 2 + usize::from(with_html) + usize::from(with_image);

        match raw.into_payload().expect_err("never one slot") {
            Error::MultiplePayloads { count } => prop_assert_eq!(count, expected),
            other => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    // ========================================================================
    // Summary Properties
    // ========================================================================

    /// Property: metric statistics describe exactly the parsed cells
    #[test]
    fn prop_metric_summary_matches_rows(
        samples in proptest::collection::vec(-1_000_000i32..1_000_000, 1..50),
    ) {
        let values: Vec<f64> = samples.iter().copied().map(f64::from).collect();
        let mut text = String::from("step|timestamp|metric");
        for (step, value) in values.iter().enumerate() {
            text.push_str(&format!("\n{step}||{value}"));
        }

        let log = EventLog::read_csv(ArtifactKind::Metric, "loss", &text, true)
            .expect("valid csv");
        let metric = log.get_summary().metric.expect("metric block");

        prop_assert_eq!(metric.count, values.len());
        prop_assert_eq!(metric.last, values[values.len() - 1]);
        prop_assert_eq!(
            metric.min,
            values.iter().copied().fold(f64::INFINITY, f64::min)
        );
        prop_assert_eq!(
            metric.max,
            values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        );
        prop_assert!(metric.min <= metric.p25);
        prop_assert!(metric.p25 <= metric.p50);
        prop_assert!(metric.p50 <= metric.p75);
        prop_assert!(metric.p75 <= metric.max);
        prop_assert!(metric.min <= metric.mean && metric.mean <= metric.max);
    }

    /// Property: step and timestamp blocks track the first and last rows
    #[test]
    fn prop_summary_min_max_are_positional(
        steps in proptest::collection::vec(any::<i64>(), 1..30),
    ) {
        let mut text = String::from("step|timestamp|metric");
        for step in &steps {
            text.push_str(&format!("\n{step}||1"));
        }

        let log = EventLog::read_csv(ArtifactKind::Metric, "loss", &text, true)
            .expect("valid csv");
        let step = log.get_summary().step.expect("step block");

        prop_assert_eq!(step.count, steps.len());
        prop_assert_eq!(step.min, Some(steps[0]));
        prop_assert_eq!(step.max, Some(steps[steps.len() - 1]));
    }

    // ========================================================================
    // Buffer Properties
    // ========================================================================

    /// Property: a flushed fragment rereads as the pushed events
    #[test]
    fn prop_buffer_fragment_rereads(
        samples in proptest::collection::vec(proptest::num::f64::NORMAL, 1..20),
    ) {
        let base = Utc.with_ymd_and_hms(2023, 1, 5, 12, 30, 0).unwrap();
        let mut buffer = EventBuffer::new("loss", ArtifactKind::Metric);
        for (step, value) in samples.iter().enumerate() {
            buffer.push(build_event(
                Some(step as i64),
                base,
                EventPayload::Metric(*value),
            ));
        }

        let file = format!(
            "{}{}",
            buffer.csv_header(),
            buffer.csv_events().expect("encodable")
        );
        let log = EventLog::read_csv(ArtifactKind::Metric, "loss", &file, true)
            .expect("own fragment decodes");

        prop_assert_eq!(log.len(), buffer.len());
        prop_assert_eq!(log.events().expect("decodable"), buffer.events());
    }
}
