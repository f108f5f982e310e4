//! Per-platform extraction.
//!
//! One call per target platform: parse the header, seed the frontier from the
//! top-level cursors, drain to a fixpoint, hand back the filled model. The
//! functions, variables and macro definitions of the main file are the entry
//! points; every type in the model is reachable from one of them, plus any
//! names the caller explicitly asked for.

use tracing::{debug, info};

use crate::config::ExtractOptions;
use crate::error::Result;
use crate::explore::{Candidate, ExploreContext};
use crate::frontend::{Cursor, CursorKind, Frontend, TranslationUnit};
use crate::model::{FfiTargetPlatform, NodeKind};

/// Extract one platform's FFI model from a header.
pub fn extract_platform<F: Frontend>(
    frontend: &F,
    options: &ExtractOptions,
) -> Result<FfiTargetPlatform> {
    let filters = options.compile_filters()?;
    let compiler_arguments = options.compiler_arguments();

    info!(
        header = %options.header.display(),
        target = %options.target,
        "extracting platform model"
    );
    let unit = frontend.parse(&options.header, &compiler_arguments)?;

    let model = FfiTargetPlatform {
        file_name: options
            .header
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        platform_requested: options.target.clone(),
        platform_actual: unit.resolved_target(),
        pointer_size: unit.pointer_width(),
        compiler_arguments: compiler_arguments.clone(),
        include_directories: options.include_directories(),
        ..Default::default()
    };

    let mut ctx = ExploreContext::new(
        frontend,
        &filters,
        unit.pointer_width(),
        compiler_arguments,
        model,
    );

    for cursor in unit.top_level() {
        let kind = match cursor.kind() {
            CursorKind::FunctionDecl => NodeKind::Function,
            CursorKind::VarDecl => NodeKind::Variable,
            CursorKind::MacroDefinition => NodeKind::MacroObject,
            // Type declarations are normally discovered through usage; a
            // declaration nothing references enters only on request.
            CursorKind::StructDecl => NodeKind::Struct,
            CursorKind::UnionDecl => NodeKind::Union,
            CursorKind::EnumDecl => NodeKind::Enum,
            CursorKind::TypedefDecl => NodeKind::TypeAlias,
            _ => continue,
        };
        if matches!(
            kind,
            NodeKind::Struct | NodeKind::Union | NodeKind::Enum | NodeKind::TypeAlias
        ) && !filters.is_included(&cursor.spelling())
        {
            continue;
        }
        ctx.try_enqueue(Candidate::from_cursor(kind, cursor));
    }

    ctx.drain()?;

    let model = ctx.model;
    debug!(
        target = %model.platform_actual,
        nodes = model.node_count(),
        "platform model complete"
    );
    Ok(model)
}
