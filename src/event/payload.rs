//! Typed payload variants - one shape per loggable kind
//!
//! Every structured shape mirrors its transport JSON object exactly: fields
//! are individually optional, absent fields are omitted from the serialized
//! object, and unknown keys are rejected on decode. The scalar kinds
//! (metric, html, text) have no object form; their column value is the
//! native number/string text.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::kind::ArtifactKind;

/// Plotting library that produced a chart figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Plotly figure JSON
    Plotly,
    /// Bokeh document JSON
    Bokeh,
    /// Vega/Vega-Lite spec
    Vega,
}

/// Family of a logged curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveKind {
    /// Receiver operating characteristic
    Roc,
    /// Precision/recall
    Pr,
    /// Caller-defined axes
    Custom,
}

/// Image reference with optional raster geometry.
///
/// `path` points at the stored file; geometry fields describe the raster
/// when the writer knows it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventImage {
    /// Raster height in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    /// Raster width in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    /// Channel count (1 grayscale, 3 RGB, 4 RGBA)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorspace: Option<i32>,
    /// Stored file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Video reference.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventVideo {
    /// Frame height in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    /// Frame width in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    /// Channel count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorspace: Option<i32>,
    /// Stored file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// MIME type (e.g. "video/mp4")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Tabular dataframe reference.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventDataframe {
    /// Stored file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Serialization format (e.g. "parquet", "csv")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Histogram as parallel bin-edge and count arrays.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventHistogram {
    /// Bin edge values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f64>>,
    /// Count per bin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<Vec<f64>>,
}

/// Audio clip reference.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventAudio {
    /// Samples per second
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<f64>,
    /// Channel count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_channels: Option<i32>,
    /// Clip length in frames
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_frames: Option<i64>,
    /// Stored file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// MIME type (e.g. "audio/wav")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Plotting-library figure, kept as opaque JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventChart {
    /// Producing library
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ChartKind>,
    /// Figure document as the library serialized it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub figure: Option<serde_json::Value>,
}

/// Curve as parallel x/y arrays.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventCurve {
    /// Curve family
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<CurveKind>,
    /// X coordinates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Vec<f64>>,
    /// Y coordinates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Vec<f64>>,
    /// Free-form annotation (e.g. the AUC value)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

/// Confusion matrix as arrays of opaque JSON cells.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventConfusionMatrix {
    /// X axis labels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Vec<serde_json::Value>>,
    /// Y axis labels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Vec<serde_json::Value>>,
    /// Cell values, row-major
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<Vec<serde_json::Value>>,
}

/// Generic artifact reference.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventArtifact {
    /// Storage shape of the referenced artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ArtifactKind>,
    /// Stored path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Trained model reference.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventModel {
    /// Producing framework (e.g. "torch", "tensorflow")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    /// Stored path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Framework-specific serving spec
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<serde_json::Value>,
}

/// The one active payload an event carries.
///
/// The tag decides the column-value encoding: scalar variants write their
/// native text, structured variants write their JSON object form. Decoding
/// runs the other way, driven by the log's declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// Scalar metric sample
    Metric(f64),
    /// Image reference
    Image(EventImage),
    /// Histogram
    Histogram(EventHistogram),
    /// Audio reference
    Audio(EventAudio),
    /// Video reference
    Video(EventVideo),
    /// Raw HTML fragment
    Html(String),
    /// Raw text
    Text(String),
    /// Chart figure
    Chart(EventChart),
    /// Curve
    Curve(EventCurve),
    /// Confusion matrix
    Confusion(EventConfusionMatrix),
    /// Generic artifact reference
    Artifact(EventArtifact),
    /// Model reference
    Model(EventModel),
    /// Dataframe reference
    Dataframe(EventDataframe),
}

impl EventPayload {
    /// Get the kind tag this payload serializes under.
    #[must_use]
    pub const fn kind(&self) -> ArtifactKind {
        match self {
            Self::Metric(_) => ArtifactKind::Metric,
            Self::Image(_) => ArtifactKind::Image,
            Self::Histogram(_) => ArtifactKind::Histogram,
            Self::Audio(_) => ArtifactKind::Audio,
            Self::Video(_) => ArtifactKind::Video,
            Self::Html(_) => ArtifactKind::Html,
            Self::Text(_) => ArtifactKind::Text,
            Self::Chart(_) => ArtifactKind::Chart,
            Self::Curve(_) => ArtifactKind::Curve,
            Self::Confusion(_) => ArtifactKind::Confusion,
            Self::Artifact(_) => ArtifactKind::Artifact,
            Self::Model(_) => ArtifactKind::Model,
            Self::Dataframe(_) => ArtifactKind::Dataframe,
        }
    }

    /// Encode the payload as its column value cell.
    ///
    /// Scalars produce their native text (`0.25`, the raw html/text string),
    /// structured payloads their JSON object form.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if a structured payload fails to serialize.
    pub fn to_column_value(&self) -> Result<String> {
        match self {
            Self::Metric(value) => Ok(value.to_string()),
            Self::Html(text) | Self::Text(text) => Ok(text.clone()),
            Self::Image(inner) => Ok(serde_json::to_string(inner)?),
            Self::Histogram(inner) => Ok(serde_json::to_string(inner)?),
            Self::Audio(inner) => Ok(serde_json::to_string(inner)?),
            Self::Video(inner) => Ok(serde_json::to_string(inner)?),
            Self::Chart(inner) => Ok(serde_json::to_string(inner)?),
            Self::Curve(inner) => Ok(serde_json::to_string(inner)?),
            Self::Confusion(inner) => Ok(serde_json::to_string(inner)?),
            Self::Artifact(inner) => Ok(serde_json::to_string(inner)?),
            Self::Model(inner) => Ok(serde_json::to_string(inner)?),
            Self::Dataframe(inner) => Ok(serde_json::to_string(inner)?),
        }
    }

    /// Decode a column value cell against the declared kind.
    ///
    /// # Errors
    ///
    /// Returns `Error::PayloadDecode` when the cell does not satisfy the
    /// kind's field contract, or when the kind has no payload variant
    /// (e.g. `tensor`, `file`).
    pub fn from_column_value(kind: ArtifactKind, cell: &str) -> Result<Self> {
        fn decode<T>(kind: ArtifactKind, cell: &str) -> Result<T>
        where
            T: for<'de> Deserialize<'de>,
        {
            serde_json::from_str(cell).map_err(|err| Error::PayloadDecode {
                kind,
                reason: err.to_string(),
            })
        }

        match kind {
            ArtifactKind::Metric => {
                let value = cell.trim().parse::<f64>().map_err(|err| Error::PayloadDecode {
                    kind,
                    reason: err.to_string(),
                })?;
                Ok(Self::Metric(value))
            }
            ArtifactKind::Html => Ok(Self::Html(cell.to_string())),
            ArtifactKind::Text => Ok(Self::Text(cell.to_string())),
            ArtifactKind::Image => Ok(Self::Image(decode(kind, cell)?)),
            ArtifactKind::Histogram => Ok(Self::Histogram(decode(kind, cell)?)),
            ArtifactKind::Audio => Ok(Self::Audio(decode(kind, cell)?)),
            ArtifactKind::Video => Ok(Self::Video(decode(kind, cell)?)),
            ArtifactKind::Chart => Ok(Self::Chart(decode(kind, cell)?)),
            ArtifactKind::Curve => Ok(Self::Curve(decode(kind, cell)?)),
            ArtifactKind::Confusion => Ok(Self::Confusion(decode(kind, cell)?)),
            ArtifactKind::Artifact => Ok(Self::Artifact(decode(kind, cell)?)),
            ArtifactKind::Model => Ok(Self::Model(decode(kind, cell)?)),
            ArtifactKind::Dataframe => Ok(Self::Dataframe(decode(kind, cell)?)),
            other => Err(Error::PayloadDecode {
                kind: other,
                reason: "kind has no event payload variant".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_column_value_round_trip() {
        let payload = EventPayload::Metric(0.25);
        let cell = payload.to_column_value().unwrap();
        assert_eq!(cell, "0.25");
        let back = EventPayload::from_column_value(ArtifactKind::Metric, &cell).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_html_column_value_is_raw_text() {
        let payload = EventPayload::Html("<b>done</b>".to_string());
        assert_eq!(payload.to_column_value().unwrap(), "<b>done</b>");
    }

    #[test]
    fn test_image_column_value_omits_absent_fields() {
        let payload = EventPayload::Image(EventImage {
            path: Some("img/step_1.png".to_string()),
            ..Default::default()
        });
        assert_eq!(
            payload.to_column_value().unwrap(),
            r#"{"path":"img/step_1.png"}"#
        );
    }

    #[test]
    fn test_image_round_trip_with_geometry() {
        let payload = EventPayload::Image(EventImage {
            height: Some(480),
            width: Some(640),
            colorspace: Some(3),
            path: Some("img.png".to_string()),
        });
        let cell = payload.to_column_value().unwrap();
        let back = EventPayload::from_column_value(ArtifactKind::Image, &cell).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err =
            EventPayload::from_column_value(ArtifactKind::Image, r#"{"path":"a","dpi":300}"#)
                .unwrap_err();
        match err {
            Error::PayloadDecode { kind, reason } => {
                assert_eq!(kind, ArtifactKind::Image);
                assert!(reason.contains("dpi"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_chart_kind_tags() {
        let chart = EventChart {
            kind: Some(ChartKind::Plotly),
            figure: Some(serde_json::json!({"data": []})),
        };
        let json = serde_json::to_string(&chart).unwrap();
        assert_eq!(json, r#"{"kind":"plotly","figure":{"data":[]}}"#);
    }

    #[test]
    fn test_curve_round_trip() {
        let payload = EventPayload::Curve(EventCurve {
            kind: Some(CurveKind::Roc),
            x: Some(vec![0.0, 0.5, 1.0]),
            y: Some(vec![0.0, 0.8, 1.0]),
            annotation: Some("auc=0.85".to_string()),
        });
        let cell = payload.to_column_value().unwrap();
        let back = EventPayload::from_column_value(ArtifactKind::Curve, &cell).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_histogram_round_trip_preserves_float_bits() {
        // shortest-repr float text must parse back to the identical f64,
        // not a neighboring representable value
        let payload = EventPayload::Histogram(EventHistogram {
            values: Some(vec![-972_284.407_540_061_3]),
            counts: Some(vec![1.0]),
        });
        let cell = payload.to_column_value().unwrap();
        let back = EventPayload::from_column_value(ArtifactKind::Histogram, &cell).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_kind_without_payload_variant() {
        let err = EventPayload::from_column_value(ArtifactKind::Tensor, "{}").unwrap_err();
        assert!(matches!(
            err,
            Error::PayloadDecode {
                kind: ArtifactKind::Tensor,
                ..
            }
        ));
    }

    #[test]
    fn test_metric_parses_special_floats() {
        let inf = EventPayload::from_column_value(ArtifactKind::Metric, "inf").unwrap();
        assert_eq!(inf, EventPayload::Metric(f64::INFINITY));
        let nan = EventPayload::from_column_value(ArtifactKind::Metric, "NaN").unwrap();
        match nan {
            EventPayload::Metric(v) => assert!(v.is_nan()),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_bad_metric_cell() {
        let err = EventPayload::from_column_value(ArtifactKind::Metric, "fast").unwrap_err();
        assert!(matches!(err, Error::PayloadDecode { .. }));
    }

    #[test]
    fn test_confusion_rejects_non_array_axis() {
        let payload = EventPayload::from_column_value(
            ArtifactKind::Confusion,
            r#"{"x":["a","b"],"z":[[1,0],[0,1]]}"#,
        )
        .unwrap();
        assert_eq!(
            payload,
            EventPayload::Confusion(EventConfusionMatrix {
                x: Some(vec![serde_json::json!("a"), serde_json::json!("b")]),
                y: None,
                z: Some(vec![serde_json::json!([1, 0]), serde_json::json!([0, 1])]),
            })
        );

        let err = EventPayload::from_column_value(ArtifactKind::Confusion, r#"{"x":"cat"}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::PayloadDecode {
                kind: ArtifactKind::Confusion,
                ..
            }
        ));
    }
}
