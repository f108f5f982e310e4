//! Typedef and opaque-type explorers.
//!
//! A typedef whose underlying type is complete becomes a `TypeAlias` node.
//! Two shapes divert elsewhere: an alias to an incomplete type collapses to
//! an opaque node (the resolver already routes the candidate), and a typedef
//! naming a function-pointer type becomes the named form of that function
//! pointer rather than an alias wrapping it.

use crate::error::Result;
use crate::explore::{function_pointer, Candidate, ExploreContext};
use crate::frontend::{Cursor, Frontend, TypeHandle};
use crate::model::{CNode, COpaqueType, CTypeAlias, NodeKind};
use crate::resolve::resolve_type;

pub(crate) fn materialize<F: Frontend>(
    ctx: &mut ExploreContext<'_, F>,
    candidate: &Candidate<F::Cur>,
) -> Result<Option<CNode>> {
    let Some(cursor) = candidate.cursor.as_ref() else {
        return Ok(None);
    };
    let Some(underlying) = cursor.ty().typedef_underlying() else {
        return Ok(None);
    };
    let underlying_type = resolve_type(ctx, &underlying, Some(NodeKind::TypeAlias))?;

    match underlying_type.kind {
        // The alias collapsed; the opaque node carries the name instead.
        NodeKind::OpaqueType => Ok(Some(CNode::OpaqueType(COpaqueType {
            name: candidate.name.clone(),
            size_of: 0,
            location: Some(candidate.location.clone()),
            comment: cursor.comment(),
            is_system: candidate.location.is_system,
        }))),
        // Typedef-named function pointer.
        NodeKind::FunctionPointer => {
            let function_ty = function_pointer::unwrap_function_type(&underlying);
            function_pointer::build(
                ctx,
                candidate.name.clone(),
                &function_ty,
                Some(cursor),
                candidate.location.clone(),
                underlying_type,
            )
            .map(Some)
        }
        _ => Ok(Some(CNode::TypeAlias(CTypeAlias {
            name: candidate.name.clone(),
            underlying_type,
            location: Some(candidate.location.clone()),
            comment: cursor.comment(),
            is_system: candidate.location.is_system,
        }))),
    }
}

/// Materialize a forward-declared or collapsed-alias opaque type.
pub(crate) fn materialize_opaque<F: Frontend>(
    _ctx: &mut ExploreContext<'_, F>,
    candidate: &Candidate<F::Cur>,
) -> Result<Option<CNode>> {
    let comment = candidate.cursor.as_ref().and_then(|c| c.comment());
    Ok(Some(CNode::OpaqueType(COpaqueType {
        name: candidate.name.clone(),
        size_of: 0,
        location: Some(candidate.location.clone()),
        comment,
        is_system: candidate.location.is_system,
    })))
}
