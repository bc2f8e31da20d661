use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::LookupConfig;
use crate::error::{AstgenError, DiagnosticStage};
use crate::filter::DeclRefFilter;
use crate::parser::RubyParser;
use crate::records::{AstNode, FileInfo, Language, PkgAstResult, PkgAstResults};
use crate::archive::{unpack_archive, ArchiveKind};
use crate::workspace::{default_package_name, discover_inputs, InputSet};

/// Parameters of one run, already resolved by the caller.
#[derive(Debug, Clone)]
pub struct AstgenRequest {
    pub inpath: PathBuf,
    pub root: Option<PathBuf>,
    pub pkg_name: Option<String>,
    pub pkg_version: Option<String>,
}

impl AstgenRequest {
    pub fn new(inpath: impl Into<PathBuf>) -> Self {
        Self {
            inpath: inpath.into(),
            root: None,
            pkg_name: None,
            pkg_version: None,
        }
    }
}

/// A recovered per-file failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiagnostic {
    pub path: PathBuf,
    pub stage: DiagnosticStage,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileComposition {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "LoC")]
    pub loc: usize,
    #[serde(rename = "Native")]
    pub native: bool,
}

/// Per-file summary of everything enumerated under the input path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    #[serde(rename = "Files")]
    pub files: Vec<FileComposition>,
}

#[derive(Debug, Clone)]
pub struct AstgenOutcome {
    pub results: PkgAstResults,
    pub diagnostics: Vec<FileDiagnostic>,
    pub composition: Composition,
    pub files_analyzed: usize,
}

impl AstgenOutcome {
    /// The single package produced by the run.
    pub fn package(&self) -> Option<&PkgAstResult> {
        self.results.pkgs.first()
    }
}

/// Batch driver: discovers inputs, extracts references file by file and aggregates them.
pub struct AstGenerator {
    parser: RubyParser,
    filter: DeclRefFilter,
    config: Option<LookupConfig>,
    language: Language,
}

impl AstGenerator {
    pub fn new(config: Option<LookupConfig>) -> Result<Self> {
        Ok(Self::with_parser(RubyParser::new()?, config))
    }

    pub fn with_parser(parser: RubyParser, config: Option<LookupConfig>) -> Self {
        if config.as_ref().map(|c| c.save_feature).unwrap_or(false) {
            debug!("save_feature is set in the lookup config; feature data is not collected");
        }
        let filter = DeclRefFilter::new(config.as_ref());
        Self {
            parser,
            filter,
            config,
            language: Language::Ruby,
        }
    }

    pub fn filter(&self) -> &DeclRefFilter {
        &self.filter
    }

    /// Analyze every input file. Only a missing or unpackable input path is fatal here.
    pub fn analyze(&mut self, request: &AstgenRequest) -> Result<AstgenOutcome, AstgenError> {
        let start = Instant::now();

        // Held until the end of the run; dropping it removes the unpacked tree
        let unpacked = match ArchiveKind::of(&request.inpath) {
            Some(kind) if request.inpath.is_file() => {
                info!("unpacking {}", request.inpath.display());
                Some(unpack_archive(&request.inpath, kind)?)
            }
            _ => None,
        };
        let analyze_path = unpacked
            .as_ref()
            .map(|u| u.path().to_path_buf())
            .unwrap_or_else(|| request.inpath.clone());
        let inputs = discover_inputs(&analyze_path, request.root.as_deref(), self.language)?;

        let pkg_name = request
            .pkg_name
            .clone()
            .unwrap_or_else(|| default_package_name(&request.inpath));
        let mut pkg = PkgAstResult::new(pkg_name, request.pkg_version.clone(), self.config.clone());
        let mut diagnostics = Vec::new();
        let mut composition = Composition::default();
        let mut files_analyzed = 0;

        for path in &inputs.all_files {
            if !inputs.is_input(path) {
                record_composition(&mut composition, path);
                continue;
            }

            info!("analyzing {}", path.display());
            match self.analyze_file(path, &inputs, &mut composition) {
                Ok(records) => {
                    files_analyzed += 1;
                    debug!("{} references accepted in {}", records.len(), path.display());
                    pkg.api_results.extend(records);
                }
                Err(e) => {
                    if matches!(e, AstgenError::Traversal { .. }) {
                        error!("Skipping {}: {}", path.display(), e);
                    } else {
                        warn!("Skipping {}: {}", path.display(), e);
                    }
                    diagnostics.push(FileDiagnostic {
                        path: path.clone(),
                        stage: e.stage(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Extracted {} references from {} of {} files in {}ms ({} skipped)",
            pkg.api_results.len(),
            files_analyzed,
            inputs.inputs.len(),
            start.elapsed().as_millis(),
            diagnostics.len()
        );

        Ok(AstgenOutcome {
            results: PkgAstResults { pkgs: vec![pkg] },
            diagnostics,
            composition,
            files_analyzed,
        })
    }

    /// Analyze and persist the aggregate to `outfile`, plus the composition summary if asked.
    pub fn run(
        &mut self,
        request: &AstgenRequest,
        outfile: &Path,
        composition_file: Option<&Path>,
    ) -> Result<AstgenOutcome, AstgenError> {
        let outcome = self.analyze(request)?;
        write_json(&outcome.results, outfile)?;
        info!("wrote {}", outfile.display());

        if let Some(composition_file) = composition_file {
            write_json(&outcome.composition, composition_file)?;
            info!("wrote {}", composition_file.display());
        }
        Ok(outcome)
    }

    /// Read, parse, walk and normalize one file. Nothing reaches the package on failure.
    fn analyze_file(
        &mut self,
        path: &Path,
        inputs: &InputSet,
        composition: &mut Composition,
    ) -> Result<Vec<AstNode>, AstgenError> {
        let source = RubyParser::read_source(path)?;
        composition.files.push(FileComposition {
            name: path.to_string_lossy().to_string(),
            loc: line_count(&source),
            native: true,
        });

        let candidates = self.parser.extract_references(&source, path, &self.filter)?;

        let file_info = FileInfo::new(path, &inputs.root);
        candidates
            .iter()
            .map(|candidate| {
                AstNode::from_candidate(candidate, &file_info).map_err(|e| AstgenError::MalformedRange {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

fn record_composition(composition: &mut Composition, path: &Path) {
    match std::fs::read_to_string(path) {
        Ok(content) => composition.files.push(FileComposition {
            name: path.to_string_lossy().to_string(),
            loc: line_count(&content),
            native: false,
        }),
        Err(e) => debug!("Failed to read file {} for composition: {}", path.display(), e),
    }
}

fn line_count(content: &str) -> usize {
    content.split('\n').count()
}

/// Serialize `value` as pretty JSON to `path`.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), AstgenError> {
    let write = || -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()
    };
    write().map_err(|source| AstgenError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}
