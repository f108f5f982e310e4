//! Model nodes.
//!
//! One variant per top-level node category. Values are immutable once an
//! explorer has materialized them; the merger clones and normalizes them but
//! never mutates a per-platform model in place.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::location::Location;
use crate::model::ty::{CType, NodeKind};

/// Calling convention of a function or function pointer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum CallingConvention {
    #[default]
    Cdecl,
    StdCall,
    FastCall,
    Unknown,
}

/// Whether a record is a struct or a union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Struct,
    Union,
}

/// An exported function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CFunction {
    #[serde(default)]
    pub name: String,
    pub calling_convention: CallingConvention,
    pub return_type: CType,
    #[serde(default)]
    pub parameters: Vec<CFunctionParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_system: bool,
}

/// One positional function parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CFunctionParameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: CType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// An exported global variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CVariable {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: CType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_system: bool,
}

/// A struct or union with known layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CRecord {
    #[serde(default)]
    pub name: String,
    pub record_kind: RecordKind,
    pub size_of: u64,
    pub align_of: u64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_anonymous: bool,
    #[serde(default)]
    pub fields: Vec<CRecordField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_system: bool,
}

/// One record field, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CRecordField {
    /// Field name; empty for a hoisted anonymous member
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: CType,
    /// Byte offset of the field within the record
    pub offset_of: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// An enum with its underlying storage type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CEnum {
    #[serde(default)]
    pub name: String,
    pub integer_type: CType,
    #[serde(default)]
    pub values: Vec<CEnumValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_system: bool,
}

/// One named enum constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CEnumValue {
    #[serde(default)]
    pub name: String,
    pub value: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A typedef to a complete type.
///
/// An alias whose target is incomplete collapses to [`COpaqueType`] during
/// resolution and never appears as a `CTypeAlias` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CTypeAlias {
    #[serde(default)]
    pub name: String,
    pub underlying_type: CType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_system: bool,
}

/// A forward-declared record with no knowable layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct COpaqueType {
    #[serde(default)]
    pub name: String,
    /// Zero by convention
    #[serde(default)]
    pub size_of: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_system: bool,
}

/// A function-pointer signature, inline or typedef-named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CFunctionPointer {
    #[serde(default)]
    pub name: String,
    /// The function-pointer type itself, used when inlined as a field or
    /// parameter type
    #[serde(rename = "type")]
    pub ty: CType,
    pub calling_convention: CallingConvention,
    pub return_type: CType,
    #[serde(default)]
    pub parameters: Vec<CFunctionPointerParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_system: bool,
}

/// One function-pointer parameter; the name may be empty (positional only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CFunctionPointerParameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: CType,
}

/// An object-like macro with an evaluable literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CMacroObject {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: CType,
    /// String-encoded literal: signed/unsigned integer, float, or a quoted
    /// string
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_system: bool,
}

impl CMacroObject {
    /// Structural equality that tolerates a differing literal value.
    ///
    /// Platforms may legitimately disagree on a macro's value (buffer sizes,
    /// feature levels) while agreeing on its type; the merger accepts such
    /// macros and keeps the first platform's value.
    pub fn eq_ignoring_value(&self, other: &Self) -> bool {
        self.name == other.name && self.ty.eq_across_platforms(&other.ty)
    }
}

/// One model node, tagged by category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node_kind")]
pub enum CNode {
    Function(CFunction),
    Variable(CVariable),
    Record(CRecord),
    Enum(CEnum),
    TypeAlias(CTypeAlias),
    OpaqueType(COpaqueType),
    FunctionPointer(CFunctionPointer),
    MacroObject(CMacroObject),
}

impl CNode {
    /// The node's concrete kind tag.
    pub fn kind(&self) -> NodeKind {
        match self {
            CNode::Function(_) => NodeKind::Function,
            CNode::Variable(_) => NodeKind::Variable,
            CNode::Record(r) => match r.record_kind {
                RecordKind::Struct => NodeKind::Struct,
                RecordKind::Union => NodeKind::Union,
            },
            CNode::Enum(_) => NodeKind::Enum,
            CNode::TypeAlias(_) => NodeKind::TypeAlias,
            CNode::OpaqueType(_) => NodeKind::OpaqueType,
            CNode::FunctionPointer(_) => NodeKind::FunctionPointer,
            CNode::MacroObject(_) => NodeKind::MacroObject,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CNode::Function(n) => &n.name,
            CNode::Variable(n) => &n.name,
            CNode::Record(n) => &n.name,
            CNode::Enum(n) => &n.name,
            CNode::TypeAlias(n) => &n.name,
            CNode::OpaqueType(n) => &n.name,
            CNode::FunctionPointer(n) => &n.name,
            CNode::MacroObject(n) => &n.name,
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            CNode::Function(n) => n.location.as_ref(),
            CNode::Variable(n) => n.location.as_ref(),
            CNode::Record(n) => n.location.as_ref(),
            CNode::Enum(n) => n.location.as_ref(),
            CNode::TypeAlias(n) => n.location.as_ref(),
            CNode::OpaqueType(n) => n.location.as_ref(),
            CNode::FunctionPointer(n) => n.location.as_ref(),
            CNode::MacroObject(n) => n.location.as_ref(),
        }
    }

    /// Deep structural equality for the cross-platform merge.
    ///
    /// Nodes of different concrete kinds are never equal. Locations compare
    /// path-blind at the top level and are ignored in nested positions.
    pub fn eq_across_platforms(&self, other: &Self) -> bool {
        if self.kind() != other.kind() {
            return false;
        }
        if !location_eq(self.location(), other.location()) {
            return false;
        }
        match (self, other) {
            (CNode::Function(a), CNode::Function(b)) => {
                a.name == b.name
                    && a.calling_convention == b.calling_convention
                    && a.return_type.eq_across_platforms(&b.return_type)
                    && a.parameters.len() == b.parameters.len()
                    && a.parameters.iter().zip(&b.parameters).all(|(x, y)| {
                        x.name == y.name && x.ty.eq_across_platforms(&y.ty)
                    })
            }
            (CNode::Variable(a), CNode::Variable(b)) => {
                a.name == b.name && a.ty.eq_across_platforms(&b.ty)
            }
            (CNode::Record(a), CNode::Record(b)) => {
                a.name == b.name
                    && a.record_kind == b.record_kind
                    && a.size_of == b.size_of
                    && a.align_of == b.align_of
                    && a.is_anonymous == b.is_anonymous
                    && a.fields.len() == b.fields.len()
                    && a.fields.iter().zip(&b.fields).all(|(x, y)| {
                        x.name == y.name
                            && x.offset_of == y.offset_of
                            && x.ty.eq_across_platforms(&y.ty)
                    })
            }
            (CNode::Enum(a), CNode::Enum(b)) => {
                a.name == b.name
                    && a.integer_type.eq_across_platforms(&b.integer_type)
                    && a.values.len() == b.values.len()
                    && a.values
                        .iter()
                        .zip(&b.values)
                        .all(|(x, y)| x.name == y.name && x.value == y.value)
            }
            (CNode::TypeAlias(a), CNode::TypeAlias(b)) => {
                a.name == b.name
                    && a.underlying_type.eq_across_platforms(&b.underlying_type)
            }
            (CNode::OpaqueType(a), CNode::OpaqueType(b)) => {
                a.name == b.name && a.size_of == b.size_of
            }
            (CNode::FunctionPointer(a), CNode::FunctionPointer(b)) => {
                a.name == b.name
                    && a.calling_convention == b.calling_convention
                    && a.ty.eq_across_platforms(&b.ty)
                    && a.return_type.eq_across_platforms(&b.return_type)
                    && a.parameters.len() == b.parameters.len()
                    && a.parameters.iter().zip(&b.parameters).all(|(x, y)| {
                        x.name == y.name && x.ty.eq_across_platforms(&y.ty)
                    })
            }
            (CNode::MacroObject(a), CNode::MacroObject(b)) => {
                a.eq_ignoring_value(b) && a.value == b.value
            }
            _ => false,
        }
    }

    /// Normalize an accepted node for the cross-platform model.
    ///
    /// The top-level location keeps its position but loses its paths; nested
    /// locations (fields, parameters, enum values, types) are cleared outright.
    pub fn normalize_for_merge(&mut self) {
        match self {
            CNode::Function(n) => {
                if let Some(loc) = n.location.as_mut() {
                    loc.strip_paths();
                }
                n.return_type.clear_locations();
                for p in &mut n.parameters {
                    p.location = None;
                    p.ty.clear_locations();
                }
            }
            CNode::Variable(n) => {
                if let Some(loc) = n.location.as_mut() {
                    loc.strip_paths();
                }
                n.ty.clear_locations();
            }
            CNode::Record(n) => {
                if let Some(loc) = n.location.as_mut() {
                    loc.strip_paths();
                }
                for f in &mut n.fields {
                    f.location = None;
                    f.ty.clear_locations();
                }
            }
            CNode::Enum(n) => {
                if let Some(loc) = n.location.as_mut() {
                    loc.strip_paths();
                }
                n.integer_type.clear_locations();
                for v in &mut n.values {
                    v.location = None;
                }
            }
            CNode::TypeAlias(n) => {
                if let Some(loc) = n.location.as_mut() {
                    loc.strip_paths();
                }
                n.underlying_type.clear_locations();
            }
            CNode::OpaqueType(n) => {
                if let Some(loc) = n.location.as_mut() {
                    loc.strip_paths();
                }
            }
            CNode::FunctionPointer(n) => {
                if let Some(loc) = n.location.as_mut() {
                    loc.strip_paths();
                }
                n.ty.clear_locations();
                n.return_type.clear_locations();
                for p in &mut n.parameters {
                    p.ty.clear_locations();
                }
            }
            CNode::MacroObject(n) => {
                if let Some(loc) = n.location.as_mut() {
                    loc.strip_paths();
                }
                n.ty.clear_locations();
            }
        }
    }

    /// Sort key: name first, location as the tiebreak.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        self.name()
            .cmp(other.name())
            .then_with(|| match (self.location(), other.location()) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => Ordering::Equal,
            })
    }
}

fn location_eq(a: Option<&Location>, b: Option<&Location>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.eq_across_platforms(b),
        _ => false,
    }
}
