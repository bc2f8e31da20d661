use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Kind of declaration a lookup entry or an output record refers to.
///
/// Only `FunctionDeclRefExpr` is produced by the Ruby front-end; the remaining kinds exist so
/// configurations shared with other language front-ends load unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceKind {
    #[default]
    FunctionDeclRefExpr,
    FunctionDecl,
    InvokeExpr,
    NewExpr,
    CastExpr,
    InstanceOfExpr,
    NewArrayExpr,
    NewMultiArrayExpr,
}

/// One API signature in the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEntry {
    #[serde(rename = "type", default)]
    pub kind: ReferenceKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
}

impl ApiEntry {
    pub fn function(base_type: Option<&str>, name: &str) -> Self {
        Self {
            kind: ReferenceKind::FunctionDeclRefExpr,
            name: name.to_string(),
            base_type: base_type.map(str::to_string),
            full_name: None,
            id: None,
        }
    }

    /// Base type label, treating an empty label as absent.
    pub fn base(&self) -> Option<&str> {
        self.base_type.as_deref().filter(|b| !b.is_empty())
    }

    pub fn is_qualified(&self) -> bool {
        self.base().is_some()
    }

    /// Explicit `full_name` when configured, otherwise `base_type.name` or the bare name.
    pub fn qualified_name(&self) -> String {
        if let Some(full_name) = self.full_name.as_deref().filter(|f| !f.is_empty()) {
            return full_name.to_string();
        }
        match self.base() {
            Some(base) => format!("{}.{}", base, self.name),
            None => self.name.clone(),
        }
    }
}

/// Filter configuration, loaded once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupConfig {
    #[serde(default)]
    pub apis: Vec<ApiEntry>,
    #[serde(default)]
    pub func_only: bool,
    #[serde(default)]
    pub save_feature: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smt_formula: Option<String>,
}

impl LookupConfig {
    /// Load a configuration file. `.json` files are read as JSON, everything else as TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Self::from_toml_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Entries that take part in call-reference matching.
    pub fn call_entries(&self) -> impl Iterator<Item = &ApiEntry> {
        self.apis
            .iter()
            .filter(|api| api.kind == ReferenceKind::FunctionDeclRefExpr)
    }
}
