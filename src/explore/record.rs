//! Struct/union explorer.
//!
//! Reads field cursors in declaration order and handles the two anonymous-
//! member shapes C headers use:
//!
//! - the "tag + member name" idiom, where an embedded unnamed union is
//!   immediately followed by a named field of the identical type — the
//!   anonymous declaration is filtered out to avoid a duplicate entry;
//! - true anonymous members (C11), which are hoisted into their own named
//!   node (`<parent>_ANONYMOUS_<index>`) and referenced by the containing
//!   field's type.

use tracing::debug;

use crate::error::Result;
use crate::explore::{Candidate, ExploreContext, TyOf};
use crate::frontend::{Cursor, CursorKind, Frontend, TypeHandle, TypeKind};
use crate::model::{CNode, CRecord, CRecordField, CType, Location, NodeKind, RecordKind};
use crate::resolve::resolve_type;

pub(crate) fn materialize<F: Frontend>(
    ctx: &mut ExploreContext<'_, F>,
    candidate: &Candidate<F::Cur>,
) -> Result<Option<CNode>> {
    let Some(cursor) = candidate.cursor.as_ref() else {
        return Ok(None);
    };
    let record_kind = match candidate.kind {
        NodeKind::Struct => RecordKind::Struct,
        NodeKind::Union => RecordKind::Union,
        _ => return Ok(None),
    };
    let record = build_record(
        ctx,
        candidate.name.clone(),
        record_kind,
        cursor,
        candidate.location.clone(),
        false,
    )?;
    Ok(record.map(CNode::Record))
}

/// Build one record node; shared by top-level records and hoisted anonymous
/// members.
fn build_record<F: Frontend>(
    ctx: &mut ExploreContext<'_, F>,
    name: String,
    record_kind: RecordKind,
    cursor: &F::Cur,
    location: Location,
    is_anonymous: bool,
) -> Result<Option<CRecord>> {
    let ty = cursor.ty();
    let Ok(size_of) = u64::try_from(ty.size_of()) else {
        debug!(name = %name, "record has no layout");
        return Ok(None);
    };
    let Ok(align_of) = u64::try_from(ty.align_of()) else {
        return Ok(None);
    };
    let fields = build_fields(ctx, &name, cursor)?;
    Ok(Some(CRecord {
        name,
        record_kind,
        size_of,
        align_of,
        is_anonymous,
        fields,
        location: Some(location.clone()),
        comment: cursor.comment(),
        is_system: location.is_system,
    }))
}

fn build_fields<F: Frontend>(
    ctx: &mut ExploreContext<'_, F>,
    record_name: &str,
    cursor: &F::Cur,
) -> Result<Vec<CRecordField>> {
    let members = cursor.record_members();
    let mut fields = Vec::new();
    let mut anonymous_index = 0usize;

    for (index, member) in members.iter().enumerate() {
        match member.kind() {
            CursorKind::StructDecl | CursorKind::UnionDecl => {
                // Tag for the next member? Then the field declaration that
                // follows carries the data; drop the duplicate.
                let tag_for_next = members.get(index + 1).is_some_and(|next| {
                    next.kind() == CursorKind::FieldDecl && next.ty().same_as(&member.ty())
                });
                if tag_for_next {
                    continue;
                }
                let member_ty = member.ty();
                let Some(field_ty) =
                    hoist_anonymous(ctx, record_name, anonymous_index, member, &member_ty)?
                else {
                    continue;
                };
                anonymous_index += 1;
                fields.push(CRecordField {
                    name: String::new(),
                    ty: field_ty,
                    offset_of: bits_to_bytes(member.field_bit_offset()),
                    location: Some(member.location()),
                    comment: member.comment(),
                });
            }
            CursorKind::FieldDecl => {
                let member_ty = member.ty();
                let field_ty = match anonymous_record(&member_ty) {
                    Some((decl, record_ty)) => {
                        let Some(hoisted) = hoist_anonymous(
                            ctx,
                            record_name,
                            anonymous_index,
                            &decl,
                            &record_ty,
                        )?
                        else {
                            continue;
                        };
                        anonymous_index += 1;
                        hoisted
                    }
                    None => resolve_type(ctx, &member_ty, Some(NodeKind::RecordField))?,
                };
                fields.push(CRecordField {
                    name: member.spelling(),
                    ty: field_ty,
                    offset_of: bits_to_bytes(member.field_bit_offset()),
                    location: Some(member.location()),
                    comment: member.comment(),
                });
            }
            _ => continue,
        }
    }
    Ok(fields)
}

/// Hoist an anonymous nested record into its own named node and return the
/// type the containing field should carry.
fn hoist_anonymous<F: Frontend>(
    ctx: &mut ExploreContext<'_, F>,
    parent_name: &str,
    index: usize,
    cursor: &F::Cur,
    ty: &TyOf<F>,
) -> Result<Option<CType>> {
    let name = format!("{parent_name}_ANONYMOUS_{index}");
    let record_kind = match cursor.kind() {
        CursorKind::UnionDecl => RecordKind::Union,
        _ => RecordKind::Struct,
    };
    let node_kind = match record_kind {
        RecordKind::Struct => NodeKind::Struct,
        RecordKind::Union => NodeKind::Union,
    };
    let location = cursor.location();

    if !ctx.is_visited(node_kind, &name) {
        ctx.mark_visited(node_kind, &name, location.clone());
        let Some(record) =
            build_record(ctx, name.clone(), record_kind, cursor, location.clone(), true)?
        else {
            return Ok(None);
        };
        ctx.model.insert(CNode::Record(record));
    }

    Ok(Some(CType {
        name,
        kind: node_kind,
        size_of: u64::try_from(ty.size_of()).ok(),
        align_of: u64::try_from(ty.align_of()).ok(),
        is_anonymous: true,
        is_const: ty.is_const(),
        location: Some(location),
        ..Default::default()
    }))
}

/// Unwrap compiler-internal wrappers and report an anonymous record type's
/// declaring cursor, if that is what this type is.
fn anonymous_record<T: TypeHandle>(ty: &T) -> Option<(T::Cur, T)> {
    let mut current = ty.clone();
    loop {
        current = match current.kind() {
            TypeKind::Elaborated => current.named_type()?,
            TypeKind::Attributed => current.modified_type()?,
            TypeKind::Unexposed => {
                let canonical = current.canonical();
                if canonical.kind() == TypeKind::Unexposed {
                    return None;
                }
                canonical
            }
            _ => break,
        };
    }
    if current.kind() != TypeKind::Record {
        return None;
    }
    let decl = current.declaration()?;
    if decl.is_anonymous() {
        Some((decl, current))
    } else {
        None
    }
}

fn bits_to_bytes(bits: i64) -> u64 {
    u64::try_from(bits / 8).unwrap_or(0)
}
