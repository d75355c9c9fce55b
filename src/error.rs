//! Error taxonomy for the installer core.
//!
//! Every failure the pipeline can surface is one of these variants, so callers
//! (and tests) can tell a malformed override file from a failed apply without
//! string matching. The CLI converts them into `anyhow` errors at the edge.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used by the installer core.
pub type InstallResult<T> = Result<T, InstallError>;

/// Errors surfaced by configuration resolution, rendering, and apply.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The lvmd override file exists but is not valid lvmd YAML.
    #[error("parse lvmd config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Probing or reading the lvmd override file failed for a reason other
    /// than the file being absent.
    #[error("read lvmd config {}: {source}", .path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The global system config file exists but could not be loaded.
    #[error("load system config {}: {reason}", .path.display())]
    SystemConfig { path: PathBuf, reason: String },

    /// Parameters could not be computed or substituted into a manifest.
    #[error("render {manifest}: {reason}")]
    Render { manifest: String, reason: String },

    /// A stage references a manifest with no embedded content.
    #[error("unknown manifest {id}")]
    UnknownManifest { id: String },

    /// The apply capability rejected a stage.
    #[error(transparent)]
    Apply(#[from] ApplyError),

    /// A stage failed; `source` is the unmodified underlying error.
    #[error("stage {stage} failed for {manifests:?}")]
    Stage {
        stage: &'static str,
        manifests: Vec<String>,
        #[source]
        source: Box<InstallError>,
    },
}

impl InstallError {
    pub(crate) fn render(manifest: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Render {
            manifest: manifest.into(),
            reason: reason.into(),
        }
    }

    /// Strip stage context, returning the error that caused the failure.
    pub fn root(&self) -> &InstallError {
        match self {
            InstallError::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// Name of the stage that failed, when the error came from the pipeline.
    pub fn failed_stage(&self) -> Option<&'static str> {
        match self {
            InstallError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Failure reported by an [`crate::apply::Applier`].
#[derive(Debug, Error)]
pub enum ApplyError {
    /// The apply command could not be started or fed its input.
    #[error("run {command}: {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The apply command ran and reported failure.
    #[error("{command} exited with {status}: {detail}")]
    Command {
        command: String,
        status: String,
        detail: String,
    },

    /// Writing rendered manifests to disk failed.
    #[error("write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
