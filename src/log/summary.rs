//! Column summaries over an event log
//!
//! Step and timestamp blocks use positional min/max: the first and last
//! stored rows, not numeric extrema. Writers append in non-decreasing step
//! order, which makes the two coincide; the summary does not re-sort to
//! enforce it. The metric block is the usual descriptive statistics and
//! those are true numeric extrema.

use serde::{Deserialize, Serialize};

/// Summary of the step column.
///
/// `min`/`max` are the first and last rows' steps in stored order. A
/// boundary row without a step leaves the matching field absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSummary {
    /// Non-null step cells
    pub count: usize,
    /// First row's step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    /// Last row's step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

/// Summary of the timestamp column, same positional first/last semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampSummary {
    /// First row's timestamp as ISO-8601 text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    /// Last row's timestamp as ISO-8601 text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
}

/// Descriptive statistics over the non-null metric cells.
///
/// Matches the usual dataframe `describe()` shape; `last` is the last
/// row's value in stored order, not the numeric maximum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Non-null metric cells
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation; absent for a single sample
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    /// Numeric minimum
    pub min: f64,
    /// First quartile (linear interpolation)
    #[serde(rename = "25%")]
    pub p25: f64,
    /// Median (linear interpolation)
    #[serde(rename = "50%")]
    pub p50: f64,
    /// Third quartile (linear interpolation)
    #[serde(rename = "75%")]
    pub p75: f64,
    /// Numeric maximum
    pub max: f64,
    /// Last row's metric value
    pub last: f64,
}

impl MetricSummary {
    /// Compute descriptive statistics over the non-null metric cells.
    ///
    /// `values` holds the non-null cells in row order and `last` the final
    /// row's value. Returns `None` when there is nothing to describe.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn describe(values: &[f64], last: f64) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let count = values.len();
        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if count > 1 {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            Some(var.sqrt())
        } else {
            None
        };

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            count,
            mean,
            std,
            min: sorted[0],
            p25: percentile(&sorted, 0.25),
            p50: percentile(&sorted, 0.5),
            p75: percentile(&sorted, 0.75),
            max: sorted[count - 1],
            last,
        })
    }
}

/// Summary of an event log.
///
/// Serializes to `{"is_event": true}` plus one block per column that has at
/// least one non-null entry; the metric block appears only for metric logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSummary {
    /// Marker distinguishing event summaries from other summary maps
    pub is_event: bool,
    /// Step column block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<StepSummary>,
    /// Timestamp column block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<TimestampSummary>,
    /// Metric statistics block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<MetricSummary>,
}

/// Linear-interpolation percentile over already-sorted values.
#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lo = position.floor() as usize;
    let hi = position.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let fraction = position - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_describe_two_values() {
        let summary = MetricSummary::describe(&[1.0, 3.0], 3.0).unwrap();
        assert_eq!(summary.count, 2);
        assert!(close(summary.mean, 2.0));
        assert!(close(summary.std.unwrap(), std::f64::consts::SQRT_2));
        assert!(close(summary.min, 1.0));
        assert!(close(summary.p25, 1.5));
        assert!(close(summary.p50, 2.0));
        assert!(close(summary.p75, 2.5));
        assert!(close(summary.max, 3.0));
        assert!(close(summary.last, 3.0));
    }

    #[test]
    fn test_describe_single_value_has_no_std() {
        let summary = MetricSummary::describe(&[4.2], 4.2).unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.std, None);
        assert!(close(summary.p50, 4.2));
    }

    #[test]
    fn test_describe_empty_is_none() {
        assert!(MetricSummary::describe(&[], 0.0).is_none());
    }

    #[test]
    fn test_describe_unsorted_input() {
        let summary = MetricSummary::describe(&[5.0, 1.0, 3.0], 3.0).unwrap();
        assert!(close(summary.min, 1.0));
        assert!(close(summary.max, 5.0));
        assert!(close(summary.p50, 3.0));
    }

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [10.0, 20.0, 30.0, 40.0];
        assert!(close(percentile(&sorted, 0.25), 17.5));
        assert!(close(percentile(&sorted, 0.5), 25.0));
        assert!(close(percentile(&sorted, 0.0), 10.0));
        assert!(close(percentile(&sorted, 1.0), 40.0));
    }

    #[test]
    fn test_summary_serializes_percent_keys() {
        let summary = LogSummary {
            is_event: true,
            step: Some(StepSummary {
                count: 2,
                min: Some(0),
                max: Some(1),
            }),
            timestamp: None,
            metric: MetricSummary::describe(&[1.0, 3.0], 3.0),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["is_event"], true);
        assert_eq!(json["step"]["count"], 2);
        assert!(json.get("timestamp").is_none());
        assert_eq!(json["metric"]["50%"], 2.0);
        assert_eq!(json["metric"]["last"], 3.0);
    }

    #[test]
    fn test_summary_round_trips() {
        let summary = LogSummary {
            is_event: true,
            step: Some(StepSummary {
                count: 3,
                min: Some(0),
                max: Some(2),
            }),
            timestamp: Some(TimestampSummary {
                min: Some("2023-01-05T12:30:00+00:00".to_string()),
                max: Some("2023-01-05T12:35:00+00:00".to_string()),
            }),
            metric: MetricSummary::describe(&[1.0, 2.0, 6.0], 6.0),
        };
        let json = serde_json::to_string(&summary).unwrap();
        let back: LogSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }
}
