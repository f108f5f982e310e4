//! Variable explorer.

use crate::error::Result;
use crate::explore::{Candidate, ExploreContext};
use crate::frontend::{Cursor, Frontend};
use crate::model::{CNode, CVariable, NodeKind};
use crate::resolve::resolve_type;

pub(crate) fn materialize<F: Frontend>(
    ctx: &mut ExploreContext<'_, F>,
    candidate: &Candidate<F::Cur>,
) -> Result<Option<CNode>> {
    let Some(cursor) = candidate.cursor.as_ref() else {
        return Ok(None);
    };
    let ty = resolve_type(ctx, &cursor.ty(), Some(NodeKind::Variable))?;
    Ok(Some(CNode::Variable(CVariable {
        name: candidate.name.clone(),
        ty,
        location: Some(candidate.location.clone()),
        comment: cursor.comment(),
        is_system: candidate.location.is_system,
    })))
}
