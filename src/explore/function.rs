//! Function explorer.

use crate::error::Result;
use crate::explore::{Candidate, ExploreContext};
use crate::frontend::{Cursor, Frontend, TypeHandle};
use crate::model::{CFunction, CFunctionParameter, CNode, NodeKind};
use crate::resolve::resolve_type;

/// Materialize an exported function: calling convention from the type,
/// positional parameters each independently type-resolved.
pub(crate) fn materialize<F: Frontend>(
    ctx: &mut ExploreContext<'_, F>,
    candidate: &Candidate<F::Cur>,
) -> Result<Option<CNode>> {
    let Some(cursor) = candidate.cursor.as_ref() else {
        return Ok(None);
    };
    let ty = cursor.ty();

    let return_type = match ty.result_type() {
        Some(result) => resolve_type(ctx, &result, Some(NodeKind::Function))?,
        None => return Ok(None),
    };

    let mut parameters = Vec::new();
    for argument in cursor.arguments() {
        let parameter_type =
            resolve_type(ctx, &argument.ty(), Some(NodeKind::FunctionParameter))?;
        parameters.push(CFunctionParameter {
            name: argument.spelling(),
            ty: parameter_type,
            location: Some(argument.location()),
            comment: argument.comment(),
        });
    }

    Ok(Some(CNode::Function(CFunction {
        name: candidate.name.clone(),
        calling_convention: ty.calling_convention(),
        return_type,
        parameters,
        location: Some(candidate.location.clone()),
        comment: cursor.comment(),
        is_system: candidate.location.is_system,
    })))
}
