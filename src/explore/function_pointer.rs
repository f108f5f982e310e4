//! Function-pointer explorer.
//!
//! Covers both the inline form (a field, parameter or return type spelled
//! `int (*)(int)`) and the typedef-named form. The same underlying signature
//! may be materialized from several call sites; every materialization of the
//! same type signature produces a structurally-equal node, so revisits are
//! harmless and the visited table collapses them to one.

use crate::error::Result;
use crate::explore::{Candidate, ExploreContext, TyOf};
use crate::frontend::{Cursor, Frontend, TypeHandle, TypeKind};
use crate::model::{
    CFunctionPointer, CFunctionPointerParameter, CNode, CType, Location, NodeKind,
};
use crate::resolve::resolve_type;

pub(crate) fn materialize<F: Frontend>(
    ctx: &mut ExploreContext<'_, F>,
    candidate: &Candidate<F::Cur>,
) -> Result<Option<CNode>> {
    let Some(ty) = candidate.ty.as_ref() else {
        return Ok(None);
    };
    let function_ty = unwrap_function_type(ty);
    let pointer_type = CType {
        name: candidate.name.clone(),
        kind: NodeKind::FunctionPointer,
        size_of: Some(ctx.pointer_size),
        align_of: Some(ctx.pointer_size),
        location: if candidate.location == Location::default() {
            None
        } else {
            Some(candidate.location.clone())
        },
        ..Default::default()
    };
    build(
        ctx,
        candidate.name.clone(),
        &function_ty,
        candidate.cursor.as_ref(),
        candidate.location.clone(),
        pointer_type,
    )
    .map(Some)
}

/// Build a function-pointer node from its function type.
///
/// `pointer_type` is the node's own type, the one call sites embed when the
/// pointer appears inline as a field or parameter type.
pub(crate) fn build<F: Frontend>(
    ctx: &mut ExploreContext<'_, F>,
    name: String,
    function_ty: &TyOf<F>,
    cursor: Option<&F::Cur>,
    location: Location,
    pointer_type: CType,
) -> Result<CNode> {
    let return_type = match function_ty.result_type() {
        Some(result) => resolve_type(ctx, &result, Some(NodeKind::FunctionPointer))?,
        None => CType {
            name: "void".to_string(),
            kind: NodeKind::Primitive,
            ..Default::default()
        },
    };

    // Parameter names come from the declaration when one exists; the type
    // alone only knows positions.
    let argument_names: Vec<String> = cursor
        .map(|c| c.arguments().iter().map(|a| a.spelling()).collect())
        .unwrap_or_default();

    let mut parameters = Vec::new();
    for (index, argument_ty) in function_ty.argument_types().iter().enumerate() {
        let ty = resolve_type(ctx, argument_ty, Some(NodeKind::FunctionPointerParameter))?;
        parameters.push(CFunctionPointerParameter {
            name: argument_names.get(index).cloned().unwrap_or_default(),
            ty,
        });
    }

    let is_system = location.is_system;
    Ok(CNode::FunctionPointer(CFunctionPointer {
        name,
        ty: pointer_type,
        calling_convention: function_ty.calling_convention(),
        return_type,
        parameters,
        location: if location == Location::default() {
            None
        } else {
            Some(location)
        },
        comment: cursor.and_then(|c| c.comment()),
        is_system,
    }))
}

/// Peel pointer and compiler-internal wrappers down to the function type.
pub(crate) fn unwrap_function_type<T: TypeHandle>(ty: &T) -> T {
    let mut current = ty.clone();
    loop {
        current = match current.kind() {
            TypeKind::Pointer => match current.pointee() {
                Some(pointee) => pointee,
                None => return current,
            },
            TypeKind::Attributed => match current.modified_type() {
                Some(inner) => inner,
                None => return current,
            },
            TypeKind::Elaborated => match current.named_type() {
                Some(inner) => inner,
                None => return current,
            },
            TypeKind::Typedef => match current.typedef_underlying() {
                Some(inner) => inner,
                None => return current,
            },
            _ => return current,
        };
    }
}
