//! Recursive type information.
//!
//! `CType` is the fully-resolved, platform-concrete description of one C
//! type: its node kind, byte size and alignment, and (for pointers, arrays
//! and aliases) the exclusively-owned inner type. Once built by the resolver
//! it is immutable and strictly tree-shaped; referential cycles in the source
//! (a struct field pointing back at its container) terminate at the named
//! declaration, which lives as its own top-level node in the model.

use serde::{Deserialize, Serialize};

use crate::model::location::Location;

/// Kind tag shared by nodes and types.
///
/// Two nodes of different concrete kinds are never equal; within a kind,
/// nodes with the same name are compared structurally.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum NodeKind {
    Primitive,
    Pointer,
    Array,
    Function,
    FunctionParameter,
    FunctionPointer,
    FunctionPointerParameter,
    Struct,
    Union,
    RecordField,
    Enum,
    EnumValue,
    OpaqueType,
    TypeAlias,
    Variable,
    MacroObject,
}

impl NodeKind {
    /// Human-readable name used in diagnostics and artifact keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Primitive => "primitive",
            NodeKind::Pointer => "pointer",
            NodeKind::Array => "array",
            NodeKind::Function => "function",
            NodeKind::FunctionParameter => "function_parameter",
            NodeKind::FunctionPointer => "function_pointer",
            NodeKind::FunctionPointerParameter => "function_pointer_parameter",
            NodeKind::Struct => "struct",
            NodeKind::Union => "union",
            NodeKind::RecordField => "record_field",
            NodeKind::Enum => "enum",
            NodeKind::EnumValue => "enum_value",
            NodeKind::OpaqueType => "opaque_type",
            NodeKind::TypeAlias => "type_alias",
            NodeKind::Variable => "variable",
            NodeKind::MacroObject => "macro_object",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully-resolved type information for one C type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CType {
    /// Type spelling; empty for anonymous records until hoisting names them
    #[serde(default)]
    pub name: String,
    /// Node kind of the type (restricted to type-bearing kinds)
    pub kind: NodeKind,
    /// Size in bytes; absent for function, void and opaque types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_of: Option<u64>,
    /// Alignment in bytes; absent where size is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align_of: Option<u64>,
    /// For arrays and pointers: the true size of one element/pointee
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_size: Option<u64>,
    /// For constant-size arrays: the element count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_length: Option<u64>,
    /// Whether the declaring cursor was anonymous
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_anonymous: bool,
    /// Whether the type is const-qualified
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_const: bool,
    /// Declaring location, when one exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Pointee (Pointer), element (Array) or underlying (TypeAlias) type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_type: Option<Box<CType>>,
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::Primitive
    }
}

impl CType {
    /// Structural equality for the cross-platform merge, ignoring locations
    /// at every nesting level.
    pub fn eq_across_platforms(&self, other: &Self) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.size_of == other.size_of
            && self.align_of == other.align_of
            && self.element_size == other.element_size
            && self.array_length == other.array_length
            && self.is_anonymous == other.is_anonymous
            && self.is_const == other.is_const
            && match (&self.inner_type, &other.inner_type) {
                (None, None) => true,
                (Some(a), Some(b)) => a.eq_across_platforms(b),
                _ => false,
            }
    }

    /// Drop locations at every nesting level.
    ///
    /// Applied to accepted nodes before they enter the cross-platform model,
    /// since nested declaration positions are host-specific.
    pub fn clear_locations(&mut self) {
        self.location = None;
        if let Some(inner) = self.inner_type.as_mut() {
            inner.clear_locations();
        }
    }
}
