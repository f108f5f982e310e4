//! End-to-end extraction over the in-memory front end.
//!
//! Each test registers a synthetic header, runs a full extraction and checks
//! the resulting platform model, so the classifier, the resolver, the
//! frontier and the per-kind explorers are all exercised together.

use std::path::PathBuf;

use cmodel::config::ExtractOptions;
use cmodel::extract::extract_platform;
use cmodel::frontend::memory::{DeclData, MemoryFrontend, TreeBuilder, TypeData};
use cmodel::frontend::{CursorKind, TypeKind, LAYOUT_INCOMPLETE, LAYOUT_INVALID};
use cmodel::model::{FfiTargetPlatform, Location, NodeKind, RecordKind, TargetPlatform};

fn options(header: &str, target: &str) -> ExtractOptions {
    ExtractOptions {
        header: PathBuf::from(header),
        target: TargetPlatform::new(target),
        ..Default::default()
    }
}

fn extract(frontend: &MemoryFrontend, header: &str, target: &str) -> FfiTargetPlatform {
    extract_platform(frontend, &options(header, target)).expect("extraction succeeds")
}

#[test]
fn constant_array_variable_gets_full_storage_size() {
    let mut b = TreeBuilder::new();
    let int_ty = b.primitive(TypeKind::Int, "int", 4, 4);
    let array_ty = b.constant_array(int_ty, 10, "int[10]");
    let var = b.add_decl(DeclData {
        kind: CursorKind::VarDecl,
        spelling: "history".to_string(),
        ty: array_ty,
        location: Location::new("api.h", 1, 1),
        ..Default::default()
    });
    b.add_top_level(var);

    let mut frontend = MemoryFrontend::new("x86_64-unknown-linux-gnu", 8);
    frontend.register("api.h", b.build());

    let model = extract(&frontend, "api.h", "x86_64-unknown-linux-gnu");
    let ty = &model.variables["history"].ty;
    assert_eq!(ty.kind, NodeKind::Array);
    assert_eq!(ty.size_of, Some(40));
    assert_eq!(ty.align_of, Some(8));
    assert_eq!(ty.element_size, Some(4));
    assert_eq!(ty.array_length, Some(10));
    let inner = ty.inner_type.as_ref().unwrap();
    assert_eq!(inner.name, "int");
    assert_eq!(inner.kind, NodeKind::Primitive);

    // The whole platform model must survive an artifact round trip.
    let json = serde_json::to_string_pretty(&model).unwrap();
    let back: FfiTargetPlatform = serde_json::from_str(&json).unwrap();
    assert_eq!(back, model);
}

#[test]
fn wide_primitives_get_natural_alignment_on_32_bit() {
    let mut b = TreeBuilder::new();
    // A 32-bit front end reports 4-byte alignment for doubles.
    let double_ty = b.primitive(TypeKind::Double, "double", 8, 4);
    let int_ty = b.primitive(TypeKind::Int, "int", 4, 4);
    let ptr_ty = b.pointer_to(int_ty, "int *", 4);
    let ratio = b.add_decl(DeclData {
        kind: CursorKind::VarDecl,
        spelling: "ratio".to_string(),
        ty: double_ty,
        location: Location::new("api.h", 1, 1),
        ..Default::default()
    });
    let cursor = b.add_decl(DeclData {
        kind: CursorKind::VarDecl,
        spelling: "cursor".to_string(),
        ty: ptr_ty,
        location: Location::new("api.h", 2, 1),
        ..Default::default()
    });
    b.add_top_level(ratio);
    b.add_top_level(cursor);

    let mut frontend = MemoryFrontend::new("i686-unknown-linux-gnu", 4);
    frontend.register("api.h", b.build());

    let model = extract(&frontend, "api.h", "i686-unknown-linux-gnu");
    let ratio_ty = &model.variables["ratio"].ty;
    assert_eq!(ratio_ty.size_of, Some(8));
    assert_eq!(ratio_ty.align_of, Some(8));

    let cursor_ty = &model.variables["cursor"].ty;
    assert_eq!(cursor_ty.kind, NodeKind::Pointer);
    assert_eq!(cursor_ty.size_of, Some(4));
    assert_eq!(cursor_ty.align_of, Some(4));
}

#[test]
fn alias_to_incomplete_record_collapses_to_opaque() {
    let mut b = TreeBuilder::new();
    let handle_decl = b.add_decl(DeclData {
        kind: CursorKind::StructDecl,
        spelling: "handle".to_string(),
        location: Location::new("api.h", 1, 1),
        ..Default::default()
    });
    let record_ty = b.add_type(TypeData {
        kind: TypeKind::Record,
        spelling: "struct handle".to_string(),
        declaration: Some(handle_decl),
        size: LAYOUT_INCOMPLETE,
        align: LAYOUT_INCOMPLETE,
        ..Default::default()
    });
    let typedef_ty = b.add_type(TypeData {
        kind: TypeKind::Typedef,
        spelling: "handle_t".to_string(),
        underlying: Some(record_ty),
        size: LAYOUT_INCOMPLETE,
        align: LAYOUT_INCOMPLETE,
        ..Default::default()
    });
    let typedef_decl = b.add_decl(DeclData {
        kind: CursorKind::TypedefDecl,
        spelling: "handle_t".to_string(),
        ty: typedef_ty,
        location: Location::new("api.h", 2, 1),
        ..Default::default()
    });
    b.tree_mut().types[typedef_ty].declaration = Some(typedef_decl);
    let ptr_ty = b.pointer_to(typedef_ty, "handle_t *", 8);
    let fn_ty = b.add_type(TypeData {
        kind: TypeKind::FunctionProto,
        spelling: "handle_t *(void)".to_string(),
        result: Some(ptr_ty),
        ..Default::default()
    });
    let open = b.add_decl(DeclData {
        kind: CursorKind::FunctionDecl,
        spelling: "api_open".to_string(),
        ty: fn_ty,
        location: Location::new("api.h", 3, 1),
        ..Default::default()
    });
    b.add_top_level(open);

    let mut frontend = MemoryFrontend::new("x86_64-unknown-linux-gnu", 8);
    frontend.register("api.h", b.build());

    let model = extract(&frontend, "api.h", "x86_64-unknown-linux-gnu");
    let return_type = &model.functions["api_open"].return_type;
    assert_eq!(return_type.kind, NodeKind::Pointer);
    let pointee = return_type.inner_type.as_ref().unwrap();
    // The alias vanished: callers see the opaque type under the alias name.
    assert_eq!(pointee.kind, NodeKind::OpaqueType);
    assert_eq!(pointee.name, "handle_t");
    assert_eq!(pointee.size_of, None);
    assert!(model.type_aliases.is_empty());
    assert!(model.opaque_types.contains_key("handle_t"));
}

#[test]
fn anonymous_union_member_is_hoisted_and_named() {
    let mut b = TreeBuilder::new();
    let int_ty = b.primitive(TypeKind::Int, "int", 4, 4);
    let float_ty = b.primitive(TypeKind::Float, "float", 4, 4);

    let a_field = b.add_decl(DeclData {
        kind: CursorKind::FieldDecl,
        spelling: "as_int".to_string(),
        ty: int_ty,
        location: Location::new("api.h", 3, 9),
        ..Default::default()
    });
    let b_field = b.add_decl(DeclData {
        kind: CursorKind::FieldDecl,
        spelling: "as_float".to_string(),
        ty: float_ty,
        location: Location::new("api.h", 4, 9),
        ..Default::default()
    });
    let union_ty = b.add_type(TypeData {
        kind: TypeKind::Record,
        spelling: "event::(anonymous union)".to_string(),
        size: 4,
        align: 4,
        ..Default::default()
    });
    let union_decl = b.add_decl(DeclData {
        kind: CursorKind::UnionDecl,
        spelling: String::new(),
        ty: union_ty,
        location: Location::new("api.h", 2, 5),
        anonymous: true,
        members: vec![a_field, b_field],
        ..Default::default()
    });
    b.tree_mut().types[union_ty].declaration = Some(union_decl);

    let code_field = b.add_decl(DeclData {
        kind: CursorKind::FieldDecl,
        spelling: "code".to_string(),
        ty: int_ty,
        location: Location::new("api.h", 6, 5),
        bit_offset: 32,
        ..Default::default()
    });
    let struct_ty = b.add_type(TypeData {
        kind: TypeKind::Record,
        spelling: "struct event".to_string(),
        size: 8,
        align: 4,
        ..Default::default()
    });
    let struct_decl = b.add_decl(DeclData {
        kind: CursorKind::StructDecl,
        spelling: "event".to_string(),
        ty: struct_ty,
        location: Location::new("api.h", 1, 1),
        members: vec![union_decl, code_field],
        ..Default::default()
    });
    b.tree_mut().types[struct_ty].declaration = Some(struct_decl);

    let var = b.add_decl(DeclData {
        kind: CursorKind::VarDecl,
        spelling: "last_event".to_string(),
        ty: struct_ty,
        location: Location::new("api.h", 8, 1),
        ..Default::default()
    });
    b.add_top_level(var);

    let mut frontend = MemoryFrontend::new("x86_64-unknown-linux-gnu", 8);
    frontend.register("api.h", b.build());

    let model = extract(&frontend, "api.h", "x86_64-unknown-linux-gnu");
    let event = &model.records["event"];
    assert_eq!(event.fields.len(), 2);
    assert_eq!(event.fields[0].name, "");
    assert_eq!(event.fields[0].offset_of, 0);
    assert_eq!(event.fields[0].ty.name, "event_ANONYMOUS_0");
    assert_eq!(event.fields[0].ty.kind, NodeKind::Union);
    assert!(event.fields[0].ty.is_anonymous);
    assert_eq!(event.fields[1].name, "code");
    assert_eq!(event.fields[1].offset_of, 4);

    let hoisted = &model.records["event_ANONYMOUS_0"];
    assert_eq!(hoisted.record_kind, RecordKind::Union);
    assert!(hoisted.is_anonymous);
    assert_eq!(hoisted.fields.len(), 2);
    assert_eq!(hoisted.fields[0].name, "as_int");
}

#[test]
fn tag_and_member_idiom_produces_single_field() {
    let mut b = TreeBuilder::new();
    let int_ty = b.primitive(TypeKind::Int, "int", 4, 4);

    let version_field = b.add_decl(DeclData {
        kind: CursorKind::FieldDecl,
        spelling: "version".to_string(),
        ty: int_ty,
        location: Location::new("api.h", 2, 9),
        ..Default::default()
    });
    let header_ty = b.add_type(TypeData {
        kind: TypeKind::Record,
        spelling: "struct header".to_string(),
        size: 4,
        align: 4,
        ..Default::default()
    });
    let header_decl = b.add_decl(DeclData {
        kind: CursorKind::StructDecl,
        spelling: "header".to_string(),
        ty: header_ty,
        location: Location::new("api.h", 1, 5),
        members: vec![version_field],
        ..Default::default()
    });
    b.tree_mut().types[header_ty].declaration = Some(header_decl);

    // The declaration and the field that names it share one type.
    let header_field = b.add_decl(DeclData {
        kind: CursorKind::FieldDecl,
        spelling: "header".to_string(),
        ty: header_ty,
        location: Location::new("api.h", 3, 5),
        ..Default::default()
    });
    let len_field = b.add_decl(DeclData {
        kind: CursorKind::FieldDecl,
        spelling: "len".to_string(),
        ty: int_ty,
        location: Location::new("api.h", 4, 5),
        bit_offset: 32,
        ..Default::default()
    });
    let packet_ty = b.add_type(TypeData {
        kind: TypeKind::Record,
        spelling: "struct packet".to_string(),
        size: 8,
        align: 4,
        ..Default::default()
    });
    let packet_decl = b.add_decl(DeclData {
        kind: CursorKind::StructDecl,
        spelling: "packet".to_string(),
        ty: packet_ty,
        location: Location::new("api.h", 1, 1),
        members: vec![header_decl, header_field, len_field],
        ..Default::default()
    });
    b.tree_mut().types[packet_ty].declaration = Some(packet_decl);

    let var = b.add_decl(DeclData {
        kind: CursorKind::VarDecl,
        spelling: "last_packet".to_string(),
        ty: packet_ty,
        location: Location::new("api.h", 6, 1),
        ..Default::default()
    });
    b.add_top_level(var);

    let mut frontend = MemoryFrontend::new("x86_64-unknown-linux-gnu", 8);
    frontend.register("api.h", b.build());

    let model = extract(&frontend, "api.h", "x86_64-unknown-linux-gnu");
    let packet = &model.records["packet"];
    // The embedded declaration cursor was filtered; only the named field and
    // `len` remain.
    assert_eq!(packet.fields.len(), 2);
    assert_eq!(packet.fields[0].name, "header");
    assert_eq!(packet.fields[0].ty.kind, NodeKind::Struct);
    assert_eq!(packet.fields[1].name, "len");
    // The embedded struct still got its own node through the field's type.
    assert!(model.records.contains_key("header"));
}

#[test]
fn typedef_function_pointer_becomes_named_function_pointer() {
    let mut b = TreeBuilder::new();
    let void_ty = b.primitive(TypeKind::Void, "void", LAYOUT_INVALID, LAYOUT_INVALID);
    let int_ty = b.primitive(TypeKind::Int, "int", 4, 4);
    let fn_ty = b.add_type(TypeData {
        kind: TypeKind::FunctionProto,
        spelling: "void (int)".to_string(),
        result: Some(void_ty),
        argument_types: vec![int_ty],
        ..Default::default()
    });
    let fn_ptr_ty = b.add_type(TypeData {
        kind: TypeKind::Pointer,
        spelling: "void (*)(int)".to_string(),
        pointee: Some(fn_ty),
        size: 8,
        align: 8,
        ..Default::default()
    });
    let typedef_ty = b.add_type(TypeData {
        kind: TypeKind::Typedef,
        spelling: "callback_t".to_string(),
        underlying: Some(fn_ptr_ty),
        size: 8,
        align: 8,
        ..Default::default()
    });
    let typedef_decl = b.add_decl(DeclData {
        kind: CursorKind::TypedefDecl,
        spelling: "callback_t".to_string(),
        ty: typedef_ty,
        location: Location::new("api.h", 1, 1),
        ..Default::default()
    });
    b.tree_mut().types[typedef_ty].declaration = Some(typedef_decl);

    let var = b.add_decl(DeclData {
        kind: CursorKind::VarDecl,
        spelling: "on_event".to_string(),
        ty: typedef_ty,
        location: Location::new("api.h", 2, 1),
        ..Default::default()
    });
    b.add_top_level(var);

    let mut frontend = MemoryFrontend::new("x86_64-unknown-linux-gnu", 8);
    frontend.register("api.h", b.build());

    let model = extract(&frontend, "api.h", "x86_64-unknown-linux-gnu");
    let callback = model
        .function_pointers
        .get("callback_t")
        .expect("typedef materialized as function pointer");
    assert_eq!(callback.parameters.len(), 1);
    assert_eq!(callback.parameters[0].ty.name, "int");
    assert_eq!(callback.return_type.name, "void");
    assert_eq!(callback.ty.size_of, Some(8));
    // No alias node competes with the named function pointer.
    assert!(!model.type_aliases.contains_key("callback_t"));
}

#[test]
fn macro_objects_evaluate_through_synthesized_unit() {
    let mut b = TreeBuilder::new();
    // Cursor handles need a type slot even for macros.
    let _ = b.primitive(TypeKind::Int, "int", 4, 4);
    let max_clients = b.add_decl(DeclData {
        kind: CursorKind::MacroDefinition,
        spelling: "MAX_CLIENTS".to_string(),
        location: Location::new("api.h", 1, 1),
        tokens: vec!["MAX_CLIENTS".to_string(), "64".to_string()],
        ..Default::default()
    });
    let version = b.add_decl(DeclData {
        kind: CursorKind::MacroDefinition,
        spelling: "API_VERSION".to_string(),
        location: Location::new("api.h", 2, 1),
        tokens: vec!["API_VERSION".to_string(), "\"1.2\"".to_string()],
        ..Default::default()
    });
    // Include guard: name only, never a value.
    let guard = b.add_decl(DeclData {
        kind: CursorKind::MacroDefinition,
        spelling: "API_H".to_string(),
        location: Location::new("api.h", 0, 1),
        tokens: vec!["API_H".to_string()],
        ..Default::default()
    });
    let aligned = b.add_decl(DeclData {
        kind: CursorKind::MacroDefinition,
        spelling: "API_ALIGNED".to_string(),
        location: Location::new("api.h", 3, 1),
        tokens: vec![
            "API_ALIGNED".to_string(),
            "__attribute__".to_string(),
            "(".to_string(),
            "aligned".to_string(),
            ")".to_string(),
        ],
        ..Default::default()
    });
    b.add_top_level(max_clients);
    b.add_top_level(version);
    b.add_top_level(guard);
    b.add_top_level(aligned);

    let mut frontend = MemoryFrontend::new("x86_64-unknown-linux-gnu", 8);
    frontend.register("api.h", b.build());

    let model = extract(&frontend, "api.h", "x86_64-unknown-linux-gnu");
    assert_eq!(model.macro_objects.len(), 2);

    let max = &model.macro_objects["MAX_CLIENTS"];
    assert_eq!(max.value, "64");
    assert_eq!(max.ty.kind, NodeKind::Primitive);
    assert_eq!(max.ty.name, "int");

    let version = &model.macro_objects["API_VERSION"];
    assert_eq!(version.value, "\"1.2\"");
    assert_eq!(version.ty.kind, NodeKind::Pointer);
}

#[test]
fn shared_type_is_materialized_once() {
    let mut b = TreeBuilder::new();
    let int_ty = b.primitive(TypeKind::Int, "int", 4, 4);
    let x_field = b.add_decl(DeclData {
        kind: CursorKind::FieldDecl,
        spelling: "x".to_string(),
        ty: int_ty,
        location: Location::new("api.h", 2, 5),
        ..Default::default()
    });
    let point_ty = b.add_type(TypeData {
        kind: TypeKind::Record,
        spelling: "struct point".to_string(),
        size: 4,
        align: 4,
        ..Default::default()
    });
    let point_decl = b.add_decl(DeclData {
        kind: CursorKind::StructDecl,
        spelling: "point".to_string(),
        ty: point_ty,
        location: Location::new("api.h", 1, 1),
        members: vec![x_field],
        ..Default::default()
    });
    b.tree_mut().types[point_ty].declaration = Some(point_decl);
    let ptr_ty = b.pointer_to(point_ty, "struct point *", 8);

    let mut add_getter = |b: &mut TreeBuilder, name: &str, line: u32| {
        let param = b.add_decl(DeclData {
            kind: CursorKind::ParmDecl,
            spelling: "p".to_string(),
            ty: ptr_ty,
            location: Location::new("api.h", line, 20),
            ..Default::default()
        });
        let fn_ty = b.add_type(TypeData {
            kind: TypeKind::FunctionProto,
            spelling: "int (struct point *)".to_string(),
            result: Some(int_ty),
            argument_types: vec![ptr_ty],
            ..Default::default()
        });
        let decl = b.add_decl(DeclData {
            kind: CursorKind::FunctionDecl,
            spelling: name.to_string(),
            ty: fn_ty,
            location: Location::new("api.h", line, 1),
            arguments: vec![param],
            ..Default::default()
        });
        b.add_top_level(decl);
    };
    add_getter(&mut b, "point_get_x", 4);
    add_getter(&mut b, "point_mirror_x", 5);

    let mut frontend = MemoryFrontend::new("x86_64-unknown-linux-gnu", 8);
    frontend.register("api.h", b.build());

    let model = extract(&frontend, "api.h", "x86_64-unknown-linux-gnu");
    assert_eq!(model.functions.len(), 2);
    // Both functions reference the struct; it exists exactly once.
    assert_eq!(model.records.len(), 1);
    assert!(model.records.contains_key("point"));
}

#[test]
fn system_header_types_are_skipped_unless_allowed() {
    let build = || {
        let mut b = TreeBuilder::new();
        let long_ty = b.primitive(TypeKind::Long, "long", 8, 8);
        let tv_field = b.add_decl(DeclData {
            kind: CursorKind::FieldDecl,
            spelling: "tv_sec".to_string(),
            ty: long_ty,
            location: Location::system("time.h", 12, 5),
            ..Default::default()
        });
        let timeval_ty = b.add_type(TypeData {
            kind: TypeKind::Record,
            spelling: "struct timeval".to_string(),
            size: 8,
            align: 8,
            ..Default::default()
        });
        let timeval_decl = b.add_decl(DeclData {
            kind: CursorKind::StructDecl,
            spelling: "timeval".to_string(),
            ty: timeval_ty,
            location: Location::system("time.h", 11, 1),
            members: vec![tv_field],
            ..Default::default()
        });
        b.tree_mut().types[timeval_ty].declaration = Some(timeval_decl);
        let ptr_ty = b.pointer_to(timeval_ty, "struct timeval *", 8);
        let int_ty = b.primitive(TypeKind::Int, "int", 4, 4);
        let param = b.add_decl(DeclData {
            kind: CursorKind::ParmDecl,
            spelling: "tv".to_string(),
            ty: ptr_ty,
            location: Location::new("api.h", 1, 20),
            ..Default::default()
        });
        let fn_ty = b.add_type(TypeData {
            kind: TypeKind::FunctionProto,
            spelling: "int (struct timeval *)".to_string(),
            result: Some(int_ty),
            argument_types: vec![ptr_ty],
            ..Default::default()
        });
        let decl = b.add_decl(DeclData {
            kind: CursorKind::FunctionDecl,
            spelling: "api_get_time".to_string(),
            ty: fn_ty,
            location: Location::new("api.h", 1, 1),
            arguments: vec![param],
            ..Default::default()
        });
        b.add_top_level(decl);
        b.build()
    };

    let mut frontend = MemoryFrontend::new("x86_64-unknown-linux-gnu", 8);
    frontend.register("api.h", build());
    let model = extract(&frontend, "api.h", "x86_64-unknown-linux-gnu");
    // The function is typed against the struct, but the system struct itself
    // is not exported.
    assert!(model.functions.contains_key("api_get_time"));
    assert!(model.records.is_empty());

    let mut frontend = MemoryFrontend::new("x86_64-unknown-linux-gnu", 8);
    frontend.register("api.h", build());
    let options = ExtractOptions {
        allow_system_symbols: true,
        ..options("api.h", "x86_64-unknown-linux-gnu")
    };
    let model = extract_platform(&frontend, &options).unwrap();
    assert!(model.records.contains_key("timeval"));
    assert!(model.records["timeval"].is_system);
}

#[test]
fn ignored_function_names_are_filtered() {
    let mut b = TreeBuilder::new();
    let int_ty = b.primitive(TypeKind::Int, "int", 4, 4);
    let fn_ty = b.add_type(TypeData {
        kind: TypeKind::FunctionProto,
        spelling: "int (void)".to_string(),
        result: Some(int_ty),
        ..Default::default()
    });
    for (name, line) in [("api_public", 1), ("_api_internal", 2)] {
        let decl = b.add_decl(DeclData {
            kind: CursorKind::FunctionDecl,
            spelling: name.to_string(),
            ty: fn_ty,
            location: Location::new("api.h", line, 1),
            ..Default::default()
        });
        b.add_top_level(decl);
    }

    let mut frontend = MemoryFrontend::new("x86_64-unknown-linux-gnu", 8);
    frontend.register("api.h", b.build());

    let options = ExtractOptions {
        ignored_function_names: vec!["^_".to_string()],
        ..options("api.h", "x86_64-unknown-linux-gnu")
    };
    let model = extract_platform(&frontend, &options).unwrap();
    assert!(model.functions.contains_key("api_public"));
    assert!(!model.functions.contains_key("_api_internal"));
}
