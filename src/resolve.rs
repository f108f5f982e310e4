//! Recursive type resolution.
//!
//! Builds a [`CType`] for any front-end type, computing platform-correct
//! layout and offering the type's underlying named declaration to the
//! exploration frontier. Recursion is bounded by real type nesting depth;
//! symbol-level fan-out goes through the frontier's worklists instead of the
//! call stack.
//!
//! Sizing conventions:
//! - pointers take the platform pointer width, not the pointee's layout;
//! - incomplete arrays decay to pointer width, constant arrays get their
//!   full storage size (`array_length x element_size`) with the pointer
//!   width as alignment;
//! - an alias adopts its underlying type's layout, except an alias to an
//!   incomplete type, which collapses to the opaque type itself;
//! - on 32-bit targets the layout query reports 8-byte primitives as 4-byte
//!   aligned, which is wrong for FFI layout, so primitive alignment is
//!   overridden to equal the size.

use tracing::trace;

use crate::classify::classify;
use crate::error::{CModelError, Result};
use crate::explore::{Candidate, ExploreContext, TyOf};
use crate::frontend::{Cursor, Frontend, TypeHandle};
use crate::model::{CType, NodeKind};

/// Resolve a type and offer its underlying declaration to the frontier.
pub fn resolve_type<F: Frontend>(
    ctx: &mut ExploreContext<'_, F>,
    ty: &TyOf<F>,
    parent_kind: Option<NodeKind>,
) -> Result<CType> {
    resolve_inner(ctx, ty, parent_kind, true)
}

/// Resolve a type without feeding the frontier.
///
/// Used for types read out of nested translation units (macro evaluation
/// stubs), whose cursors must not leak into the main unit's traversal.
pub fn resolve_type_detached<F: Frontend>(
    ctx: &mut ExploreContext<'_, F>,
    ty: &TyOf<F>,
    parent_kind: Option<NodeKind>,
) -> Result<CType> {
    resolve_inner(ctx, ty, parent_kind, false)
}

fn resolve_inner<F: Frontend>(
    ctx: &mut ExploreContext<'_, F>,
    ty: &TyOf<F>,
    parent_kind: Option<NodeKind>,
    feed_frontier: bool,
) -> Result<CType> {
    let cls = classify(ty, parent_kind)?;
    let kind = if !cls.name.is_empty() && ctx.filters.is_forced_opaque(&cls.name) {
        NodeKind::OpaqueType
    } else {
        cls.kind
    };
    let location = cls.cursor.as_ref().map(|c| c.location());
    let is_anonymous = cls.cursor.as_ref().is_some_and(|c| c.is_anonymous());
    let is_const = ty.is_const();
    let pointer_size = ctx.pointer_size;

    let resolved = match kind {
        NodeKind::Pointer => {
            let pointee = cls
                .ty
                .pointee()
                .ok_or_else(|| no_layout(&cls.name, "pointer without pointee"))?;
            let inner = resolve_inner(ctx, &pointee, Some(NodeKind::Pointer), feed_frontier)?;
            CType {
                name: cls.name.clone(),
                kind,
                size_of: Some(pointer_size),
                align_of: Some(pointer_size),
                element_size: inner.size_of,
                array_length: None,
                is_anonymous,
                is_const,
                location,
                inner_type: Some(Box::new(inner)),
            }
        }
        NodeKind::Array => {
            let element = cls
                .ty
                .element_type()
                .ok_or_else(|| no_layout(&cls.name, "array without element type"))?;
            let inner = resolve_inner(ctx, &element, Some(NodeKind::Array), feed_frontier)?;
            let element_size = inner.size_of;
            let array_length = cls.ty.array_length();
            let size_of = match array_length {
                Some(len) => element_size.map(|s| s * len),
                // Incomplete arrays decay to a pointer.
                None => Some(pointer_size),
            };
            CType {
                name: cls.name.clone(),
                kind,
                size_of,
                align_of: Some(pointer_size),
                element_size,
                array_length,
                is_anonymous,
                is_const,
                location,
                inner_type: Some(Box::new(inner)),
            }
        }
        NodeKind::TypeAlias => {
            let underlying = cls
                .ty
                .typedef_underlying()
                .ok_or_else(|| no_layout(&cls.name, "typedef without underlying type"))?;
            let inner =
                resolve_inner(ctx, &underlying, Some(NodeKind::TypeAlias), feed_frontier)?;

            if inner.kind == NodeKind::OpaqueType {
                // An alias to an incomplete type collapses: the caller sees
                // the opaque type under the alias's name, and the model gets
                // an opaque node instead of an alias node.
                let mut opaque = inner;
                opaque.name = cls.name.clone();
                opaque.location = location.clone();
                if feed_frontier {
                    ctx.try_enqueue(Candidate {
                        name: cls.name.clone(),
                        kind: NodeKind::OpaqueType,
                        cursor: cls.cursor.clone(),
                        ty: Some(cls.ty.clone()),
                        location: location.unwrap_or_default(),
                    });
                }
                return Ok(opaque);
            }

            let resolved = CType {
                name: cls.name.clone(),
                kind,
                size_of: inner.size_of,
                align_of: inner.align_of,
                element_size: None,
                array_length: None,
                is_anonymous,
                is_const,
                location,
                inner_type: Some(Box::new(inner)),
            };
            // Self-referential alias the front end failed to unwrap fully;
            // returning without enqueueing terminates the chain.
            if resolved
                .inner_type
                .as_ref()
                .is_some_and(|inner| inner.name == cls.name)
            {
                trace!(name = %cls.name, "self-referential alias, not enqueued");
                return Ok(resolved);
            }
            resolved
        }
        NodeKind::FunctionPointer => CType {
            name: cls.name.clone(),
            kind,
            size_of: Some(pointer_size),
            align_of: Some(pointer_size),
            element_size: None,
            array_length: None,
            is_anonymous,
            is_const,
            location,
            inner_type: None,
        },
        NodeKind::OpaqueType => CType {
            name: cls.name.clone(),
            kind,
            size_of: None,
            align_of: None,
            element_size: None,
            array_length: None,
            is_anonymous,
            is_const,
            location,
            inner_type: None,
        },
        _ => {
            let size_of = layout(cls.ty.size_of());
            let mut align_of = layout(cls.ty.align_of());
            // On a 32-bit target the layout query reports 64-bit primitives
            // as 4-byte aligned; FFI layout needs natural alignment.
            if pointer_size == 4 && kind == NodeKind::Primitive && size_of == Some(8) {
                align_of = Some(8);
            }
            CType {
                name: cls.name.clone(),
                kind,
                size_of,
                align_of,
                element_size: None,
                array_length: None,
                is_anonymous,
                is_const,
                location,
                inner_type: None,
            }
        }
    };

    // The eligibility chain (system policy, visited table, name filters)
    // runs inside try_enqueue.
    if feed_frontier && wants_exploration(kind) {
        ctx.try_enqueue(Candidate {
            name: cls.name.clone(),
            kind,
            cursor: cls.cursor,
            ty: Some(cls.ty),
            location: resolved.location.clone().unwrap_or_default(),
        });
    }

    Ok(resolved)
}

/// Which resolved kinds have an underlying named declaration worth exploring.
fn wants_exploration(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Struct
            | NodeKind::Union
            | NodeKind::Enum
            | NodeKind::TypeAlias
            | NodeKind::OpaqueType
            | NodeKind::FunctionPointer
    )
}

fn layout(value: i64) -> Option<u64> {
    u64::try_from(value).ok()
}

fn no_layout(name: &str, detail: &str) -> CModelError {
    CModelError::UnsupportedType {
        kind: detail.to_string(),
        type_name: name.to_string(),
    }
}
