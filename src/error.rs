use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while generating declaration references for a package.
///
/// [`AstgenError::InputNotFound`], [`AstgenError::Unpack`] and [`AstgenError::OutputWrite`]
/// abort a run; every other variant is scoped to a single file and is reported as a diagnostic
/// by the driver.
#[derive(Error, Debug)]
pub enum AstgenError {
    #[error("inpath {} doesn't exist", .0.display())]
    InputNotFound(PathBuf),

    #[error("failed to unpack archive {}: {source}", .path.display())]
    Unpack {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read file {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("traversal failed in {}: {reason}", .path.display())]
    Traversal { path: PathBuf, reason: String },

    #[error("malformed source range in {}: {reason}", .path.display())]
    MalformedRange { path: PathBuf, reason: String },

    #[error("failed to write output {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AstgenError {
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AstgenError::InputNotFound(_) | AstgenError::Unpack { .. } | AstgenError::OutputWrite { .. }
        )
    }

    /// Pipeline stage the error belongs to, used when reporting per-file diagnostics.
    pub fn stage(&self) -> DiagnosticStage {
        match self {
            AstgenError::InputNotFound(_) | AstgenError::Unpack { .. } => DiagnosticStage::Discovery,
            AstgenError::FileRead { .. } => DiagnosticStage::Read,
            AstgenError::Parse { .. } => DiagnosticStage::Parse,
            AstgenError::Traversal { .. } => DiagnosticStage::Traversal,
            AstgenError::MalformedRange { .. } => DiagnosticStage::Normalize,
            AstgenError::OutputWrite { .. } => DiagnosticStage::Output,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticStage {
    Discovery,
    Read,
    Parse,
    Traversal,
    Normalize,
    Output,
}

impl std::fmt::Display for DiagnosticStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticStage::Discovery => write!(f, "discovery"),
            DiagnosticStage::Read => write!(f, "read"),
            DiagnosticStage::Parse => write!(f, "parse"),
            DiagnosticStage::Traversal => write!(f, "traversal"),
            DiagnosticStage::Normalize => write!(f, "normalize"),
            DiagnosticStage::Output => write!(f, "output"),
        }
    }
}
