//! Extraction configuration.
//!
//! `ExtractOptions` describes one platform's extraction; `ExtractInput` is a
//! whole multi-platform run, deserializable from a JSON file so a run is
//! reproducible from one artifact. Name-pattern lists are compiled once into
//! [`NameFilters`] before exploration begins so an invalid pattern fails the
//! run up front rather than mid-traversal.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CModelError, Result};
use crate::model::{NodeKind, TargetPlatform};

/// Options for extracting one platform's FFI model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// The header to extract from
    pub header: PathBuf,
    /// Requested target triple
    pub target: TargetPlatform,
    /// Directories passed as system include paths
    #[serde(default)]
    pub system_include_directories: Vec<PathBuf>,
    /// Directories passed as user include paths
    #[serde(default)]
    pub user_include_directories: Vec<PathBuf>,
    /// Macro defines (`NAME` or `NAME=VALUE`)
    #[serde(default)]
    pub defines: Vec<String>,
    /// Regex patterns for function names to skip
    #[serde(default)]
    pub ignored_function_names: Vec<String>,
    /// Regex patterns for variable names to skip
    #[serde(default)]
    pub ignored_variable_names: Vec<String>,
    /// Regex patterns for macro names to skip
    #[serde(default)]
    pub ignored_macro_names: Vec<String>,
    /// Names to explore even when they would not be reached from an entry
    /// point (extra included names)
    #[serde(default)]
    pub include_names: Vec<String>,
    /// Names forced to be treated as opaque types regardless of layout
    #[serde(default)]
    pub opaque_type_names: Vec<String>,
    /// Explore symbols living in system headers too
    #[serde(default)]
    pub allow_system_symbols: bool,
}

impl ExtractOptions {
    /// Build the compiler argument list handed to the front end.
    pub fn compiler_arguments(&self) -> Vec<String> {
        let mut args = Vec::new();
        if !self.target.as_str().is_empty() {
            args.push("-target".to_string());
            args.push(self.target.as_str().to_string());
        }
        for dir in &self.system_include_directories {
            args.push("-isystem".to_string());
            args.push(dir.display().to_string());
        }
        for dir in &self.user_include_directories {
            args.push(format!("-I{}", dir.display()));
        }
        for define in &self.defines {
            args.push(format!("-D{define}"));
        }
        args
    }

    /// All include directories, for the artifact envelope.
    pub fn include_directories(&self) -> Vec<String> {
        self.system_include_directories
            .iter()
            .chain(&self.user_include_directories)
            .map(|d| d.display().to_string())
            .collect()
    }

    /// Compile the name-pattern lists.
    pub fn compile_filters(&self) -> Result<NameFilters> {
        Ok(NameFilters {
            functions: compile_patterns(&self.ignored_function_names)?,
            variables: compile_patterns(&self.ignored_variable_names)?,
            macros: compile_patterns(&self.ignored_macro_names)?,
            include_names: self.include_names.iter().cloned().collect(),
            opaque_names: self.opaque_type_names.iter().cloned().collect(),
            allow_system: self.allow_system_symbols,
        })
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|error| CModelError::Pattern {
                pattern: p.clone(),
                error,
            })
        })
        .collect()
}

/// Compiled name policy for one extraction run.
#[derive(Debug, Default)]
pub struct NameFilters {
    functions: Vec<Regex>,
    variables: Vec<Regex>,
    macros: Vec<Regex>,
    include_names: HashSet<String>,
    opaque_names: HashSet<String>,
    allow_system: bool,
}

impl NameFilters {
    /// Whether a name is excluded by the kind-specific deny lists.
    pub fn is_ignored(&self, kind: NodeKind, name: &str) -> bool {
        let patterns = match kind {
            NodeKind::Function => &self.functions,
            NodeKind::Variable => &self.variables,
            NodeKind::MacroObject => &self.macros,
            _ => return false,
        };
        patterns.iter().any(|p| p.is_match(name))
    }

    /// Whether a name was explicitly requested for inclusion.
    pub fn is_included(&self, name: &str) -> bool {
        self.include_names.contains(name)
    }

    /// Whether a name is forced opaque by configuration.
    pub fn is_forced_opaque(&self, name: &str) -> bool {
        self.opaque_names.contains(name)
    }

    /// Whether system-header symbols are allowlisted for this run.
    pub fn allow_system(&self) -> bool {
        self.allow_system
    }
}

/// A whole multi-platform extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractInput {
    /// Where per-platform and cross-platform artifacts are written
    pub output_directory: PathBuf,
    /// One options block per requested platform
    pub platforms: Vec<ExtractOptions>,
}

impl ExtractInput {
    /// Load a run description from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CModelError::io_with_path(e, path))?;
        Ok(serde_json::from_str(&content)?)
    }
}
