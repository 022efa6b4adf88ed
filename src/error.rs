//! Error type shared by every pipeline stage.
//!
//! Each failure carries the stage that produced it and a kind from a small
//! taxonomy. The binary maps the kind to a process exit code.

use thiserror::Error;

/// What went wrong, independent of where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Feature/target length mismatch, missing columns, unusable records.
    #[error("input shape error")]
    InputShape,
    /// Rank-deficient training matrix.
    #[error("degenerate input")]
    DegenerateInput,
    /// Empty or inverted axes, out-of-range fractions or ratios.
    #[error("configuration error")]
    Configuration,
    /// File system or parse failures outside the numeric core.
    #[error("i/o error")]
    Io,
    /// Broken internal invariant.
    #[error("internal error")]
    Internal,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Configuration | ErrorKind::Io => 2,
            ErrorKind::InputShape => 3,
            ErrorKind::DegenerateInput => 4,
            ErrorKind::Internal => 5,
        }
    }
}

/// Pipeline stage that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Load,
    BuildFeatures,
    Split,
    Fit,
    Evaluate,
    Simulate,
    Export,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Config => "config",
            Stage::Load => "load",
            Stage::BuildFeatures => "build-features",
            Stage::Split => "split",
            Stage::Fit => "fit",
            Stage::Evaluate => "evaluate",
            Stage::Simulate => "simulate",
            Stage::Export => "export",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Error)]
#[error("[{stage}] {kind}: {message}")]
pub struct AppError {
    kind: ErrorKind,
    stage: Stage,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, stage: Stage, message: impl Into<String>) -> Self {
        Self {
            kind,
            stage,
            message: message.into(),
        }
    }

    pub fn input_shape(stage: Stage, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InputShape, stage, message)
    }

    pub fn degenerate(stage: Stage, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DegenerateInput, stage, message)
    }

    pub fn config(stage: Stage, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, stage, message)
    }

    pub fn io(stage: Stage, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, stage, message)
    }

    pub fn internal(stage: Stage, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, stage, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("stage", &self.stage)
            .field("message", &self.message)
            .finish()
    }
}
