//! Extract-then-merge pipeline tests.
//!
//! Models are extracted from per-platform fixture trees, round-tripped
//! through their JSON artifact form, and merged, the way the CLI consumes
//! them.

use std::path::PathBuf;

use cmodel::config::ExtractOptions;
use cmodel::extract::extract_platform;
use cmodel::frontend::memory::{DeclData, MemoryFrontend, TreeBuilder, TreeData};
use cmodel::frontend::{CursorKind, TypeKind};
use cmodel::merge::{merge, MergeDiagnostic};
use cmodel::model::{FfiTargetPlatform, Location, TargetPlatform};

struct Fixture {
    /// Byte width of `long`
    long_size: i64,
    /// Expansion token of the PAGE_SIZE macro
    page_size: &'static str,
    /// Include the linux-only variable
    with_posix_fd: bool,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            long_size: 8,
            page_size: "4096",
            with_posix_fd: false,
        }
    }
}

fn api_tree(fixture: &Fixture) -> TreeData {
    let mut b = TreeBuilder::new();
    let int_ty = b.primitive(TypeKind::Int, "int", 4, 4);
    let long_ty = b.primitive(TypeKind::Long, "long", fixture.long_size, fixture.long_size);

    let counter = b.add_decl(DeclData {
        kind: CursorKind::VarDecl,
        spelling: "counter".to_string(),
        ty: long_ty,
        location: Location::new("api.h", 1, 1),
        ..Default::default()
    });
    b.add_top_level(counter);

    let fn_ty = b.add_type(cmodel::frontend::memory::TypeData {
        kind: TypeKind::FunctionProto,
        spelling: "int (void)".to_string(),
        result: Some(int_ty),
        ..Default::default()
    });
    let init = b.add_decl(DeclData {
        kind: CursorKind::FunctionDecl,
        spelling: "api_init".to_string(),
        ty: fn_ty,
        location: Location::new("api.h", 2, 1),
        ..Default::default()
    });
    b.add_top_level(init);

    let page_size = b.add_decl(DeclData {
        kind: CursorKind::MacroDefinition,
        spelling: "PAGE_SIZE".to_string(),
        location: Location::new("api.h", 3, 1),
        tokens: vec!["PAGE_SIZE".to_string(), fixture.page_size.to_string()],
        ..Default::default()
    });
    b.add_top_level(page_size);

    if fixture.with_posix_fd {
        let fd = b.add_decl(DeclData {
            kind: CursorKind::VarDecl,
            spelling: "posix_fd".to_string(),
            ty: int_ty,
            location: Location::new("api.h", 4, 1),
            ..Default::default()
        });
        b.add_top_level(fd);
    }

    b.build()
}

fn extract_for(triple: &str, fixture: &Fixture) -> FfiTargetPlatform {
    let mut frontend = MemoryFrontend::new(triple, 8);
    frontend.register("api.h", api_tree(fixture));
    let options = ExtractOptions {
        header: PathBuf::from("api.h"),
        target: TargetPlatform::new(triple),
        ..Default::default()
    };
    let model = extract_platform(&frontend, &options).unwrap();

    // Round-trip through the artifact form the CLI reads.
    let json = serde_json::to_string(&model).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn identical_platforms_merge_completely() {
    let darwin = extract_for("aarch64-apple-darwin", &Fixture::default());
    let linux = extract_for("x86_64-unknown-linux-gnu", &Fixture::default());

    let result = merge(&[linux, darwin]).unwrap();
    assert!(result.diagnostics.is_empty());
    assert!(result.model.variables.contains_key("counter"));
    assert!(result.model.functions.contains_key("api_init"));
    assert!(result.model.macro_objects.contains_key("PAGE_SIZE"));

    // Contributing platforms are recorded sorted by triple.
    let triples: Vec<&str> = result.model.platforms.iter().map(|p| p.as_str()).collect();
    assert_eq!(
        triples,
        vec!["aarch64-apple-darwin", "x86_64-unknown-linux-gnu"]
    );

    // Accepted nodes lose their host paths.
    let counter = &result.model.variables["counter"];
    let loc = counter.location.as_ref().unwrap();
    assert_eq!(loc.file_name, "api.h");
    assert!(loc.file_path.is_empty());
    assert!(loc.full_file_path.is_empty());
}

#[test]
fn platform_only_symbol_is_dropped_with_diagnostic() {
    let linux = extract_for(
        "x86_64-unknown-linux-gnu",
        &Fixture {
            with_posix_fd: true,
            ..Fixture::default()
        },
    );
    let windows = extract_for("x86_64-pc-windows-msvc", &Fixture::default());

    let result = merge(&[linux, windows]).unwrap();
    assert!(!result.model.variables.contains_key("posix_fd"));
    assert!(result.model.variables.contains_key("counter"));
    let diagnostic = result
        .diagnostics
        .iter()
        .find(|d| matches!(d, MergeDiagnostic::MissingOnPlatforms { name, .. } if name == "posix_fd"))
        .expect("missing-platform diagnostic emitted");
    match diagnostic {
        MergeDiagnostic::MissingOnPlatforms { missing, .. } => {
            assert_eq!(missing.len(), 1);
            assert_eq!(missing[0].as_str(), "x86_64-pc-windows-msvc");
        }
        _ => unreachable!(),
    }
}

#[test]
fn layout_divergence_drops_the_symbol() {
    let linux = extract_for("x86_64-unknown-linux-gnu", &Fixture::default());
    let windows = extract_for(
        "x86_64-pc-windows-msvc",
        &Fixture {
            // LLP64: long stays 4 bytes.
            long_size: 4,
            ..Fixture::default()
        },
    );

    let result = merge(&[linux, windows]).unwrap();
    assert!(!result.model.variables.contains_key("counter"));
    assert!(result.model.functions.contains_key("api_init"));
    assert!(result
        .diagnostics
        .iter()
        .any(|d| matches!(d, MergeDiagnostic::NotEqual { name, .. } if name == "counter")));
}

#[test]
fn macro_value_divergence_is_tolerated() {
    let darwin = extract_for(
        "aarch64-apple-darwin",
        &Fixture {
            page_size: "16384",
            ..Fixture::default()
        },
    );
    let linux = extract_for("x86_64-unknown-linux-gnu", &Fixture::default());

    let result = merge(&[linux, darwin]).unwrap();
    assert!(result.diagnostics.is_empty());
    // First platform in triple order wins the value.
    assert_eq!(result.model.macro_objects["PAGE_SIZE"].value, "16384");
}

#[test]
fn merge_result_is_independent_of_argument_order() {
    let darwin = extract_for("aarch64-apple-darwin", &Fixture::default());
    let linux = extract_for(
        "x86_64-unknown-linux-gnu",
        &Fixture {
            with_posix_fd: true,
            ..Fixture::default()
        },
    );

    let forward = merge(&[darwin.clone(), linux.clone()]).unwrap();
    let backward = merge(&[linux, darwin]).unwrap();
    assert_eq!(forward.model, backward.model);
    assert_eq!(forward.diagnostics, backward.diagnostics);
}
