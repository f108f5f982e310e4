//! Enum explorer.

use crate::error::Result;
use crate::explore::{Candidate, ExploreContext};
use crate::frontend::{Cursor, Frontend};
use crate::model::{CEnum, CEnumValue, CNode, NodeKind};
use crate::resolve::resolve_type;

/// Materialize an enum: underlying integer type first (for its layout), then
/// every constant child cursor with its declared value.
pub(crate) fn materialize<F: Frontend>(
    ctx: &mut ExploreContext<'_, F>,
    candidate: &Candidate<F::Cur>,
) -> Result<Option<CNode>> {
    let Some(cursor) = candidate.cursor.as_ref() else {
        return Ok(None);
    };
    let Some(integer) = cursor.enum_integer_type() else {
        return Ok(None);
    };
    let integer_type = resolve_type(ctx, &integer, Some(NodeKind::Enum))?;

    let values = cursor
        .enum_constants()
        .into_iter()
        .map(|constant| CEnumValue {
            name: constant.spelling(),
            value: constant.enum_constant_value(),
            location: Some(constant.location()),
            comment: constant.comment(),
        })
        .collect();

    Ok(Some(CNode::Enum(CEnum {
        name: candidate.name.clone(),
        integer_type,
        values,
        location: Some(candidate.location.clone()),
        comment: cursor.comment(),
        is_system: candidate.location.is_system,
    })))
}
