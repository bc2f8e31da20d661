use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::archive::ArchiveKind;
use crate::error::AstgenError;
use crate::records::Language;

/// Files found under an input path, plus the root they are reported against.
#[derive(Debug, Clone)]
pub struct InputSet {
    pub root: PathBuf,
    /// Files to analyze, in enumeration order
    pub inputs: Vec<PathBuf>,
    /// Every enumerated file, analyzed or not
    pub all_files: Vec<PathBuf>,
    input_lookup: HashSet<PathBuf>,
}

impl InputSet {
    pub fn is_input(&self, path: &Path) -> bool {
        self.input_lookup.contains(path)
    }
}

/// Resolve `inpath` to absolute input files for `language`.
///
/// Directories are walked recursively in file-name order so repeated runs enumerate files
/// identically. A single file is analyzed whatever its extension.
pub fn discover_inputs(inpath: &Path, root: Option<&Path>, language: Language) -> Result<InputSet, AstgenError> {
    if !inpath.exists() {
        return Err(AstgenError::InputNotFound(inpath.to_path_buf()));
    }
    let inpath = absolute(inpath)?;

    let (inputs, all_files, default_root) = if inpath.is_dir() {
        let mut inputs = Vec::new();
        let mut all_files = Vec::new();

        let walker = WalkDir::new(&inpath)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", inpath.display(), e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file());

        for entry in walker {
            let path = entry.into_path();
            if is_source_file(&path, language) {
                inputs.push(path.clone());
            }
            all_files.push(path);
        }
        (inputs, all_files, inpath.clone())
    } else {
        let parent = inpath.parent().map(Path::to_path_buf).unwrap_or_else(|| inpath.clone());
        (vec![inpath.clone()], vec![inpath.clone()], parent)
    };

    let root = match root {
        Some(root) => absolute(root)?,
        None => default_root,
    };

    if inputs.is_empty() {
        warn!("No input files from {} for language {:?}", inpath.display(), language);
    }
    debug!(
        "Discovered {} input files ({} total) under {}, root {}",
        inputs.len(),
        all_files.len(),
        inpath.display(),
        root.display()
    );

    let input_lookup = inputs.iter().cloned().collect();
    Ok(InputSet {
        root,
        inputs,
        all_files,
        input_lookup,
    })
}

/// Base name of `inpath` after making it absolute, so `.` names the current directory.
///
/// Archive inputs lose their archive suffix.
pub fn default_package_name(inpath: &Path) -> String {
    let path = absolute(inpath).unwrap_or_else(|_| inpath.to_path_buf());
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return path.to_string_lossy().to_string();
    };
    match ArchiveKind::of(&path) {
        Some(kind) => kind.stem(name).to_string(),
        None => name.to_string(),
    }
}

fn is_source_file(path: &Path, language: Language) -> bool {
    let by_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| language.extensions().contains(&ext))
        .unwrap_or(false);
    let by_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| language.build_scripts().contains(&name))
        .unwrap_or(false);
    by_extension || by_name
}

fn absolute(path: &Path) -> Result<PathBuf, AstgenError> {
    std::path::absolute(path)
        .map(|p| normalize_lexically(&p))
        .map_err(|_| AstgenError::InputNotFound(path.to_path_buf()))
}

/// Drop `.` components and fold `..` into the preceding component, without touching the
/// filesystem (symlinks are not resolved).
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Lexical path of `path` relative to `base`; both are expected to be absolute.
///
/// Returns an empty path when they are equal and uses `..` to climb out of `base`.
pub fn relative_path(path: &Path, base: &Path) -> PathBuf {
    let path: Vec<_> = path.components().collect();
    let base: Vec<_> = base.components().collect();

    let common = path
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base.len() {
        rel.push("..");
    }
    for component in &path[common..] {
        rel.push(component);
    }
    rel
}
