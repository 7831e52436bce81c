//! Artifact kinds - closed classification of logged values and stored outputs
//!
//! Each kind is a stable string tag used in log headers, transport maps, and
//! storage paths. The classification predicates are fixed, hand-maintained
//! membership tables consumed by storage-layer callers to pick an I/O
//! strategy; they are independent sets, not a derived partition.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Closed set of artifact/event kind tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Trained model reference
    Model,
    /// Audio clip
    Audio,
    /// Video clip
    Video,
    /// Value/count histogram
    Histogram,
    /// Image file(s)
    Image,
    /// Raw tensor dump
    Tensor,
    /// Tabular dataframe reference
    Dataframe,
    /// Plotting-library figure
    Chart,
    /// Comma-separated table
    Csv,
    /// Tab-separated table
    Tsv,
    /// Pipe-separated table
    Psv,
    /// Space-separated table
    Ssv,
    /// Scalar metric series
    Metric,
    /// Environment dump
    Env,
    /// Free-form HTML fragment
    Html,
    /// Free-form text
    Text,
    /// Single opaque file
    File,
    /// Directory tree
    Dir,
    /// Dockerfile
    Dockerfile,
    /// Docker image reference
    DockerImage,
    /// Generic data blob
    Data,
    /// Code reference (commit/branch)
    Coderef,
    /// Rendered table
    Table,
    /// Tensorboard log directory
    Tensorboard,
    /// ROC/PR/custom curve
    Curve,
    /// Confusion matrix
    Confusion,
    /// Analysis output
    Analysis,
    /// Iteration marker
    Iteration,
    /// Markdown document
    Markdown,
    /// System/resource telemetry
    System,
    /// Generic artifact reference
    Artifact,
}

impl ArtifactKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 31] = [
        Self::Model,
        Self::Audio,
        Self::Video,
        Self::Histogram,
        Self::Image,
        Self::Tensor,
        Self::Dataframe,
        Self::Chart,
        Self::Csv,
        Self::Tsv,
        Self::Psv,
        Self::Ssv,
        Self::Metric,
        Self::Env,
        Self::Html,
        Self::Text,
        Self::File,
        Self::Dir,
        Self::Dockerfile,
        Self::DockerImage,
        Self::Data,
        Self::Coderef,
        Self::Table,
        Self::Tensorboard,
        Self::Curve,
        Self::Confusion,
        Self::Analysis,
        Self::Iteration,
        Self::Markdown,
        Self::System,
        Self::Artifact,
    ];

    /// Get the stable tag string (the serialized form).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Histogram => "histogram",
            Self::Image => "image",
            Self::Tensor => "tensor",
            Self::Dataframe => "dataframe",
            Self::Chart => "chart",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Psv => "psv",
            Self::Ssv => "ssv",
            Self::Metric => "metric",
            Self::Env => "env",
            Self::Html => "html",
            Self::Text => "text",
            Self::File => "file",
            Self::Dir => "dir",
            Self::Dockerfile => "dockerfile",
            Self::DockerImage => "docker_image",
            Self::Data => "data",
            Self::Coderef => "coderef",
            Self::Table => "table",
            Self::Tensorboard => "tensorboard",
            Self::Curve => "curve",
            Self::Confusion => "confusion",
            Self::Analysis => "analysis",
            Self::Iteration => "iteration",
            Self::Markdown => "markdown",
            Self::System => "system",
            Self::Artifact => "artifact",
        }
    }

    /// Check if events of this kind are logged as a single file.
    #[must_use]
    pub const fn is_single_file_event(self) -> bool {
        matches!(
            self,
            Self::Html
                | Self::Text
                | Self::Histogram
                | Self::Chart
                | Self::Confusion
                | Self::Curve
                | Self::Metric
                | Self::System
        )
    }

    /// Check if events of this kind are logged as one file or several.
    #[must_use]
    pub const fn is_single_or_multi_file_event(self) -> bool {
        matches!(
            self,
            Self::Model
                | Self::Dataframe
                | Self::Audio
                | Self::Video
                | Self::Image
                | Self::Csv
                | Self::Tsv
                | Self::Psv
                | Self::Ssv
        )
    }

    /// Check if artifacts of this kind are stored as a directory.
    #[must_use]
    pub const fn is_dir(self) -> bool {
        matches!(self, Self::Tensorboard | Self::Dir)
    }

    /// Check if artifacts of this kind are stored as a single file.
    #[must_use]
    pub const fn is_file(self) -> bool {
        matches!(self, Self::Dockerfile | Self::File | Self::Env)
    }

    /// Check if artifacts of this kind may be either a file or a directory.
    #[must_use]
    pub const fn is_file_or_dir(self) -> bool {
        matches!(self, Self::Data | Self::Model)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnknownKind(s.to_string()))
    }
}
