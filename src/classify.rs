//! Type classification.
//!
//! Pure mapping from a raw front-end type to one of the model's node kinds.
//! Compiler-internal wrapper kinds (attributed, elaborated, unexposed) are
//! unwrapped by recursion; incomplete records come out as opaque; pointers to
//! function types come out as function pointers. Anything unrecognized is a
//! hard failure: the caller must not proceed with a type it cannot place.

use crate::error::{CModelError, Result};
use crate::frontend::{Cursor, CursorKind, TypeHandle, TypeKind, LAYOUT_INCOMPLETE};
use crate::model::NodeKind;

/// Outcome of classifying one front-end type.
#[derive(Debug, Clone)]
pub struct Classification<T: TypeHandle> {
    /// Resolved name; empty for anonymous records (naming happens during
    /// hoisting)
    pub name: String,
    pub kind: NodeKind,
    /// The type to resolve further. For function pointers this is the
    /// pointee's function type, not the pointer wrapper.
    pub ty: T,
    /// Declaring cursor, when one exists
    pub cursor: Option<T::Cur>,
}

/// Classify a front-end type, unwrapping compiler-internal wrappers.
///
/// `parent_kind` is the kind of the node being explored when this type was
/// encountered; a function type reached through a `TypeAlias` parent is a
/// function pointer, not a function.
pub fn classify<T: TypeHandle>(
    ty: &T,
    parent_kind: Option<NodeKind>,
) -> Result<Classification<T>> {
    let kind = ty.kind();

    if kind.is_primitive() {
        return Ok(Classification {
            name: ty.spelling(),
            kind: NodeKind::Primitive,
            ty: ty.clone(),
            cursor: None,
        });
    }

    match kind {
        TypeKind::Attributed => {
            let inner = ty
                .modified_type()
                .ok_or_else(|| unsupported(ty, "attributed type without modified type"))?;
            classify(&inner, parent_kind)
        }
        TypeKind::Elaborated => {
            let inner = ty
                .named_type()
                .ok_or_else(|| unsupported(ty, "elaborated type without named type"))?;
            classify(&inner, parent_kind)
        }
        TypeKind::Unexposed => {
            let canonical = ty.canonical();
            if canonical.kind() == TypeKind::Unexposed {
                return Err(unsupported(ty, "unexposed type with no canonical form"));
            }
            classify(&canonical, parent_kind)
        }
        TypeKind::ConstantArray | TypeKind::IncompleteArray => Ok(Classification {
            name: ty.spelling(),
            kind: NodeKind::Array,
            ty: ty.clone(),
            cursor: ty.declaration(),
        }),
        TypeKind::Pointer => {
            let mut pointee = ty
                .pointee()
                .ok_or_else(|| unsupported(ty, "pointer without pointee"))?;
            while pointee.kind() == TypeKind::Attributed {
                match pointee.modified_type() {
                    Some(inner) => pointee = inner,
                    None => break,
                }
            }
            if pointee.kind().is_function() {
                return Ok(Classification {
                    name: ty.spelling(),
                    kind: NodeKind::FunctionPointer,
                    ty: pointee.clone(),
                    cursor: pointee.declaration(),
                });
            }
            Ok(Classification {
                name: ty.spelling(),
                kind: NodeKind::Pointer,
                ty: ty.clone(),
                cursor: None,
            })
        }
        TypeKind::Enum => Ok(Classification {
            name: decl_name(ty),
            kind: NodeKind::Enum,
            ty: ty.clone(),
            cursor: ty.declaration(),
        }),
        TypeKind::Record => {
            if ty.size_of() == LAYOUT_INCOMPLETE {
                return Ok(Classification {
                    name: decl_name(ty),
                    kind: NodeKind::OpaqueType,
                    ty: ty.clone(),
                    cursor: ty.declaration(),
                });
            }
            let cursor = ty.declaration();
            let anonymous = cursor.as_ref().is_some_and(|c| c.is_anonymous());
            let record_kind = match cursor.as_ref().map(|c| c.kind()) {
                Some(CursorKind::UnionDecl) => NodeKind::Union,
                _ => NodeKind::Struct,
            };
            Ok(Classification {
                name: if anonymous { String::new() } else { decl_name(ty) },
                kind: record_kind,
                ty: ty.clone(),
                cursor,
            })
        }
        TypeKind::Typedef => Ok(Classification {
            name: decl_name(ty),
            kind: NodeKind::TypeAlias,
            ty: ty.clone(),
            cursor: ty.declaration(),
        }),
        TypeKind::FunctionProto | TypeKind::FunctionNoProto => {
            let cursor = ty.declaration();
            let via_alias = parent_kind == Some(NodeKind::TypeAlias);
            if cursor.is_none() || via_alias {
                return Ok(Classification {
                    name: ty.spelling(),
                    kind: NodeKind::FunctionPointer,
                    ty: ty.clone(),
                    cursor,
                });
            }
            Ok(Classification {
                name: cursor.as_ref().map(|c| c.spelling()).unwrap_or_default(),
                kind: NodeKind::Function,
                ty: ty.clone(),
                cursor,
            })
        }
        other => Err(CModelError::UnsupportedType {
            kind: format!("{other:?}"),
            type_name: ty.spelling(),
        }),
    }
}

/// Prefer the declaring cursor's spelling; fall back to the type spelling.
fn decl_name<T: TypeHandle>(ty: &T) -> String {
    match ty.declaration() {
        Some(cursor) => {
            let name = cursor.spelling();
            if name.is_empty() {
                ty.spelling()
            } else {
                name
            }
        }
        None => ty.spelling(),
    }
}

fn unsupported<T: TypeHandle>(ty: &T, detail: &str) -> CModelError {
    CModelError::UnsupportedType {
        kind: detail.to_string(),
        type_name: ty.spelling(),
    }
}
