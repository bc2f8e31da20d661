//! Ruby front-end of the API usage analysis pipeline.
//!
//! Walks tree-sitter syntax trees of Ruby sources, records call sites and backtick
//! execution literals, filters them against an allow-list and emits normalized
//! declaration-reference records for downstream taint and summary analysis.

pub mod analyzer;
pub mod archive;
pub mod config;
pub mod error;
pub mod filter;
pub mod parser;
pub mod records;
pub mod workspace;

pub use archive::{unpack_archive, ArchiveKind, UnpackedArchive};
pub use analyzer::{AstGenerator, AstgenOutcome, AstgenRequest, FileDiagnostic};
pub use config::{ApiEntry, LookupConfig, ReferenceKind};
pub use error::{AstgenError, DiagnosticStage};
pub use filter::DeclRefFilter;
pub use parser::{CandidateReference, RubyParser};
pub use records::{AstNode, FileInfo, Language, PkgAstResult, PkgAstResults};
pub use workspace::{discover_inputs, InputSet};
