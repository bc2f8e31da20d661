use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{LookupConfig, ReferenceKind};
use crate::parser::references::CandidateReference;
use crate::workspace::relative_path;

/// Source language tag carried by each package result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Language {
    Ruby,
}

impl Language {
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Ruby => &["rb"],
        }
    }

    /// Build-script file names analyzed regardless of extension.
    pub fn build_scripts(&self) -> &'static [&'static str] {
        match self {
            Language::Ruby => &["Rakefile", "Gemfile"],
        }
    }
}

/// Where a file sits relative to the analyzed root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Base name of the file
    pub filename: String,
    /// Directory of the file relative to the root (`.` for the root itself)
    pub relpath: String,
    /// Path of the file relative to the root
    pub file: String,
    /// Absolute root directory
    pub directory: String,
}

impl FileInfo {
    pub fn new(file: &Path, root: &Path) -> Self {
        let filename = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let parent = file.parent().unwrap_or_else(|| Path::new(""));

        Self {
            filename,
            relpath: display_relative(&relative_path(parent, root)),
            file: display_relative(&relative_path(file, root)),
            directory: root.to_string_lossy().to_string(),
        }
    }
}

fn display_relative(path: &Path) -> String {
    if path.as_os_str().is_empty() {
        ".".to_string()
    } else {
        path.to_string_lossy().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub row: usize,
    pub column: usize,
    pub file_info: FileInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRange {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

/// A normalized declaration reference as handed to downstream analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstNode {
    #[serde(rename = "type")]
    pub kind: ReferenceKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<String>>,
    pub source: String,
    pub range: SourceRange,
}

/// Position data that cannot form a valid source range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("end {last_line}:{last_column} precedes start {line}:{column} for {name}")]
pub struct MalformedRange {
    pub name: String,
    pub line: usize,
    pub column: usize,
    pub last_line: usize,
    pub last_column: usize,
}

impl AstNode {
    pub fn from_candidate(candidate: &CandidateReference, file_info: &FileInfo) -> Result<Self, MalformedRange> {
        let span = candidate.span;
        if span.line == 0 || !span.is_ordered() {
            return Err(MalformedRange {
                name: candidate.full_name(),
                line: span.line,
                column: span.column,
                last_line: span.last_line,
                last_column: span.last_column,
            });
        }

        Ok(Self {
            kind: ReferenceKind::FunctionDeclRefExpr,
            name: candidate.name.clone(),
            base_type: candidate.qualifier.clone(),
            full_name: candidate.full_name(),
            arguments: candidate.arguments.clone(),
            source: candidate.source_text.clone(),
            range: SourceRange {
                start: SourceLocation {
                    row: span.line,
                    column: span.column,
                    file_info: file_info.clone(),
                },
                end: SourceLocation {
                    row: span.last_line,
                    column: span.last_column,
                    file_info: file_info.clone(),
                },
            },
        })
    }
}

/// Everything extracted from one analyzed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkgAstResult {
    pub pkg_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pkg_version: Option<String>,
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<LookupConfig>,
    #[serde(default)]
    pub api_results: Vec<AstNode>,
}

impl PkgAstResult {
    pub fn new(pkg_name: String, pkg_version: Option<String>, config: Option<LookupConfig>) -> Self {
        Self {
            pkg_name,
            pkg_version,
            language: Language::Ruby,
            config,
            api_results: Vec::new(),
        }
    }
}

/// Outer aggregate; the driver always writes exactly one package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkgAstResults {
    #[serde(default)]
    pub pkgs: Vec<PkgAstResult>,
}
