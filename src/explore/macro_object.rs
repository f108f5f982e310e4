//! Object-like macro explorer.
//!
//! Macros have no type until used, so the definition's tokens are
//! transplanted into a synthesized variable initializer
//! (`auto variable_<name> = <tokens>;`) in a temporary file, which is parsed
//! as its own translation unit. The front end then reports both the literal
//! value and the inferred type of the variable, and those become the node.
//!
//! Types read out of the nested unit stay detached from the main traversal:
//! a macro expanding to `sizeof(struct foo)` must not enqueue `foo` through
//! the stub's cursors.

use std::io::Write as _;

use tracing::debug;

use crate::error::{CModelError, Result};
use crate::explore::{Candidate, ExploreContext};
use crate::frontend::{Cursor, CursorKind, EvalResult, Frontend, TranslationUnit, TypeHandle};
use crate::model::{CMacroObject, CNode, NodeKind};
use crate::resolve::resolve_type_detached;

pub(crate) fn materialize<F: Frontend>(
    ctx: &mut ExploreContext<'_, F>,
    candidate: &Candidate<F::Cur>,
) -> Result<Option<CNode>> {
    let Some(cursor) = candidate.cursor.as_ref() else {
        return Ok(None);
    };
    let Some(tokens) = usable_tokens(&cursor.tokens()) else {
        debug!(name = %candidate.name, "macro has no usable expansion");
        return Ok(None);
    };

    let variable_name = format!("variable_{}", candidate.name);
    let mut stub = tempfile::Builder::new()
        .prefix("cmodel_macro_")
        .suffix(".c")
        .tempfile()?;
    writeln!(stub, "auto {variable_name} = {};", tokens.join(" "))?;
    stub.flush()?;

    let unit = ctx.frontend.parse(stub.path(), &ctx.compiler_arguments)?;
    let Some(variable) = unit
        .top_level()
        .into_iter()
        .find(|c| c.kind() == CursorKind::VarDecl && c.spelling() == variable_name)
    else {
        debug!(name = %candidate.name, "macro stub produced no variable");
        return Ok(None);
    };

    let variable_ty = variable.ty();
    let unsigned = variable_ty.canonical().kind().is_unsigned();
    let value = match variable.evaluate() {
        EvalResult::SignedInteger(v) if unsigned => (v as u64).to_string(),
        EvalResult::SignedInteger(v) => v.to_string(),
        EvalResult::UnsignedInteger(v) if unsigned => v.to_string(),
        EvalResult::UnsignedInteger(v) => (v as i64).to_string(),
        EvalResult::FloatingPoint(v) => v.to_string(),
        EvalResult::StringLiteral(s) => format!("\"{s}\""),
        EvalResult::Other(result_kind) => {
            return Err(CModelError::UnsupportedMacroValue {
                name: candidate.name.clone(),
                kind: result_kind,
            });
        }
        EvalResult::Unevaluated => {
            debug!(name = %candidate.name, "macro value not constant, dropped");
            return Ok(None);
        }
    };

    let ty = resolve_type_detached(ctx, &variable_ty, Some(NodeKind::MacroObject))?;

    Ok(Some(CNode::MacroObject(CMacroObject {
        name: candidate.name.clone(),
        ty,
        value,
        location: Some(candidate.location.clone()),
        comment: cursor.comment(),
        is_system: candidate.location.is_system,
    })))
}

/// Filter a macro definition's tokens down to a transplantable expansion.
///
/// The first token is the macro's own name and is dropped. Line-continuation
/// backslashes are stripped. Definitions that are name-only, or that mention
/// compiler-reserved `__..__` identifiers, are not transplantable.
fn usable_tokens(raw: &[String]) -> Option<Vec<String>> {
    if raw.len() <= 1 {
        return None;
    }
    let mut tokens = Vec::with_capacity(raw.len() - 1);
    for token in &raw[1..] {
        let token = token.trim().trim_start_matches('\\').trim();
        if token.is_empty() {
            continue;
        }
        if token.starts_with("__") && token.ends_with("__") {
            return None;
        }
        tokens.push(token.to_string());
    }
    if tokens.is_empty() {
        return None;
    }
    Some(tokens)
}
