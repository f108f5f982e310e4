//! Source locations.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Where a declaration was found in the parsed sources.
///
/// `full_file_path` is host-specific (an absolute path) and is excluded from
/// cross-platform comparisons; `file_path` is relative and is cleared by the
/// merger before a node enters the cross-platform model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Bare file name (e.g. `header.h`)
    #[serde(default)]
    pub file_name: String,
    /// Path relative to the extraction root
    #[serde(default)]
    pub file_path: String,
    /// Absolute path on the extracting host
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub full_file_path: String,
    /// 1-indexed line
    #[serde(default)]
    pub line: u32,
    /// 1-indexed column
    #[serde(default)]
    pub column: u32,
    /// Whether the location is inside a system header
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_system: bool,
}

impl Location {
    /// Build a location for a main-file declaration.
    pub fn new(file_name: impl Into<String>, line: u32, column: u32) -> Self {
        let file_name = file_name.into();
        Self {
            file_path: file_name.clone(),
            file_name,
            full_file_path: String::new(),
            line,
            column,
            is_system: false,
        }
    }

    /// Build a location inside a system header.
    pub fn system(file_name: impl Into<String>, line: u32, column: u32) -> Self {
        let mut loc = Self::new(file_name, line, column);
        loc.is_system = true;
        loc
    }

    /// Structural equality for the cross-platform merge.
    ///
    /// Paths are host-specific, so only the file name and the position within
    /// it participate.
    pub fn eq_across_platforms(&self, other: &Self) -> bool {
        self.file_name == other.file_name
            && self.line == other.line
            && self.column == other.column
            && self.is_system == other.is_system
    }

    /// Strip the host-specific path components, keeping the position.
    pub fn strip_paths(&mut self) {
        self.file_path.clear();
        self.full_file_path.clear();
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Location {
    /// Order by file name, then line, then column.
    fn cmp(&self, other: &Self) -> Ordering {
        self.file_name
            .cmp(&other.file_name)
            .then(self.line.cmp(&other.line))
            .then(self.column.cmp(&other.column))
    }
}
