//! Per-platform and cross-platform FFI models.
//!
//! Category maps are `BTreeMap` keyed by name, so serialization is sorted and
//! deterministic by construction. Within one platform a name is unique inside
//! its category and must not appear in two categories at once; the merger
//! treats a cross-platform kind clash as an error.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::node::{
    CEnum, CFunction, CFunctionPointer, CMacroObject, CNode, COpaqueType, CRecord, CTypeAlias,
    CVariable,
};

/// A target platform, identified by its canonical target triple
/// (e.g. `x86_64-unknown-linux-gnu`).
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TargetPlatform(pub String);

impl TargetPlatform {
    pub fn new(triple: impl Into<String>) -> Self {
        Self(triple.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetPlatform {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One platform's extracted FFI model, plus the inputs that produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FfiTargetPlatform {
    /// Name of the header the model was extracted from
    #[serde(default)]
    pub file_name: String,
    /// The platform the caller asked for
    pub platform_requested: TargetPlatform,
    /// The platform the front end actually resolved to
    pub platform_actual: TargetPlatform,
    /// Pointer width in bytes
    pub pointer_size: u64,
    /// Compiler arguments handed to the front end
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compiler_arguments: Vec<String>,
    /// Include directories in effect during extraction
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_directories: Vec<String>,
    #[serde(default)]
    pub variables: BTreeMap<String, CVariable>,
    #[serde(default)]
    pub functions: BTreeMap<String, CFunction>,
    #[serde(default)]
    pub records: BTreeMap<String, CRecord>,
    #[serde(default)]
    pub enums: BTreeMap<String, CEnum>,
    #[serde(default)]
    pub type_aliases: BTreeMap<String, CTypeAlias>,
    #[serde(default)]
    pub opaque_types: BTreeMap<String, COpaqueType>,
    #[serde(default)]
    pub function_pointers: BTreeMap<String, CFunctionPointer>,
    #[serde(default)]
    pub macro_objects: BTreeMap<String, CMacroObject>,
}

impl FfiTargetPlatform {
    /// Insert one node into its category map, keyed by name.
    ///
    /// Last write wins within a category; explorers guarantee at-most-once
    /// materialization per name, so a collision here indicates a caller bug
    /// rather than a parse artifact.
    pub fn insert(&mut self, node: CNode) {
        match node {
            CNode::Function(n) => {
                self.functions.insert(n.name.clone(), n);
            }
            CNode::Variable(n) => {
                self.variables.insert(n.name.clone(), n);
            }
            CNode::Record(n) => {
                self.records.insert(n.name.clone(), n);
            }
            CNode::Enum(n) => {
                self.enums.insert(n.name.clone(), n);
            }
            CNode::TypeAlias(n) => {
                self.type_aliases.insert(n.name.clone(), n);
            }
            CNode::OpaqueType(n) => {
                self.opaque_types.insert(n.name.clone(), n);
            }
            CNode::FunctionPointer(n) => {
                self.function_pointers.insert(n.name.clone(), n);
            }
            CNode::MacroObject(n) => {
                self.macro_objects.insert(n.name.clone(), n);
            }
        }
    }

    /// All nodes across every category, as tagged [`CNode`] clones.
    pub fn nodes(&self) -> Vec<CNode> {
        let mut out = Vec::with_capacity(self.node_count());
        out.extend(self.functions.values().cloned().map(CNode::Function));
        out.extend(self.variables.values().cloned().map(CNode::Variable));
        out.extend(self.records.values().cloned().map(CNode::Record));
        out.extend(self.enums.values().cloned().map(CNode::Enum));
        out.extend(self.type_aliases.values().cloned().map(CNode::TypeAlias));
        out.extend(self.opaque_types.values().cloned().map(CNode::OpaqueType));
        out.extend(
            self.function_pointers
                .values()
                .cloned()
                .map(CNode::FunctionPointer),
        );
        out.extend(self.macro_objects.values().cloned().map(CNode::MacroObject));
        out
    }

    /// Total number of nodes across every category.
    pub fn node_count(&self) -> usize {
        self.functions.len()
            + self.variables.len()
            + self.records.len()
            + self.enums.len()
            + self.type_aliases.len()
            + self.opaque_types.len()
            + self.function_pointers.len()
            + self.macro_objects.len()
    }
}

/// The merged, platform-agnostic FFI model: only symbols present and
/// structurally identical across every requested platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FfiCrossPlatform {
    /// Contributing platforms, sorted by target triple
    #[serde(default)]
    pub platforms: Vec<TargetPlatform>,
    #[serde(default)]
    pub variables: BTreeMap<String, CVariable>,
    #[serde(default)]
    pub functions: BTreeMap<String, CFunction>,
    #[serde(default)]
    pub records: BTreeMap<String, CRecord>,
    #[serde(default)]
    pub enums: BTreeMap<String, CEnum>,
    #[serde(default)]
    pub type_aliases: BTreeMap<String, CTypeAlias>,
    #[serde(default)]
    pub opaque_types: BTreeMap<String, COpaqueType>,
    #[serde(default)]
    pub function_pointers: BTreeMap<String, CFunctionPointer>,
    #[serde(default)]
    pub macro_objects: BTreeMap<String, CMacroObject>,
}

impl FfiCrossPlatform {
    /// Insert one accepted node into its category map.
    pub fn insert(&mut self, node: CNode) {
        match node {
            CNode::Function(n) => {
                self.functions.insert(n.name.clone(), n);
            }
            CNode::Variable(n) => {
                self.variables.insert(n.name.clone(), n);
            }
            CNode::Record(n) => {
                self.records.insert(n.name.clone(), n);
            }
            CNode::Enum(n) => {
                self.enums.insert(n.name.clone(), n);
            }
            CNode::TypeAlias(n) => {
                self.type_aliases.insert(n.name.clone(), n);
            }
            CNode::OpaqueType(n) => {
                self.opaque_types.insert(n.name.clone(), n);
            }
            CNode::FunctionPointer(n) => {
                self.function_pointers.insert(n.name.clone(), n);
            }
            CNode::MacroObject(n) => {
                self.macro_objects.insert(n.name.clone(), n);
            }
        }
    }

    /// Total number of nodes across every category.
    pub fn node_count(&self) -> usize {
        self.functions.len()
            + self.variables.len()
            + self.records.len()
            + self.enums.len()
            + self.type_aliases.len()
            + self.opaque_types.len()
            + self.function_pointers.len()
            + self.macro_objects.len()
    }
}
