//! In-memory front end.
//!
//! A [`Frontend`] implementation over synthetic declaration trees instead of
//! a native parser. Tests build headers as data (declarations, types, layout
//! answers) and run the full exploration pipeline against them; embedders can
//! use it to feed pre-digested declarations through the engine.
//!
//! Handles are `(Rc<TreeData>, index)` pairs: cheap to clone, scope-bound to
//! their unit, and never `Send`, matching the ownership rules of real
//! cursor-based parsers.
//!
//! The frontend also understands the macro-evaluation stub files the macro
//! explorer synthesizes (`auto variable_<name> = <tokens>;`): when asked to
//! parse an unregistered path it reads the file and evaluates the single
//! literal initializer, the way a native front end would constant-fold it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{CModelError, Result};
use crate::frontend::{
    Cursor, CursorKind, EvalResult, Frontend, TranslationUnit, TypeHandle, TypeKind,
    LAYOUT_INVALID,
};
use crate::model::{CallingConvention, Location, TargetPlatform};

/// One synthetic declaration.
#[derive(Debug, Clone)]
pub struct DeclData {
    pub kind: CursorKind,
    pub spelling: String,
    /// Index into [`TreeData::types`]
    pub ty: usize,
    pub location: Location,
    pub comment: Option<String>,
    pub anonymous: bool,
    /// Record members (field decls and embedded anonymous record decls)
    pub members: Vec<usize>,
    /// Function parameters
    pub arguments: Vec<usize>,
    /// Enum constants
    pub enum_constants: Vec<usize>,
    /// Declared value of an enum constant
    pub enum_value: i64,
    /// Underlying integer type of an enum declaration
    pub enum_integer_type: Option<usize>,
    /// Bit offset of a field within its record
    pub bit_offset: i64,
    /// Macro definition tokens, the macro's own name first
    pub tokens: Vec<String>,
    /// Evaluation answer for this cursor
    pub eval: EvalResult,
}

impl Default for DeclData {
    fn default() -> Self {
        Self {
            kind: CursorKind::Other,
            spelling: String::new(),
            ty: 0,
            location: Location::default(),
            comment: None,
            anonymous: false,
            members: Vec::new(),
            arguments: Vec::new(),
            enum_constants: Vec::new(),
            enum_value: 0,
            enum_integer_type: None,
            bit_offset: 0,
            tokens: Vec::new(),
            eval: EvalResult::Unevaluated,
        }
    }
}

/// One synthetic type.
#[derive(Debug, Clone)]
pub struct TypeData {
    pub kind: TypeKind,
    pub spelling: String,
    /// Canonical form; self when absent
    pub canonical: Option<usize>,
    /// Declaring cursor, when one exists
    pub declaration: Option<usize>,
    pub pointee: Option<usize>,
    pub element: Option<usize>,
    pub array_length: Option<u64>,
    pub modified: Option<usize>,
    pub named: Option<usize>,
    pub underlying: Option<usize>,
    /// Size in bytes or a negative layout sentinel
    pub size: i64,
    /// Alignment in bytes or a negative layout sentinel
    pub align: i64,
    pub is_const: bool,
    pub calling_convention: CallingConvention,
    pub result: Option<usize>,
    pub argument_types: Vec<usize>,
}

impl Default for TypeData {
    fn default() -> Self {
        Self {
            kind: TypeKind::Invalid,
            spelling: String::new(),
            canonical: None,
            declaration: None,
            pointee: None,
            element: None,
            array_length: None,
            modified: None,
            named: None,
            underlying: None,
            size: LAYOUT_INVALID,
            align: LAYOUT_INVALID,
            is_const: false,
            calling_convention: CallingConvention::Cdecl,
            result: None,
            argument_types: Vec::new(),
        }
    }
}

/// A complete synthetic translation-unit description.
#[derive(Debug, Default)]
pub struct TreeData {
    pub decls: Vec<DeclData>,
    pub types: Vec<TypeData>,
    /// Declarations directly in the main file, in source order
    pub top_level: Vec<usize>,
}

/// Incremental builder for [`TreeData`] fixtures.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    tree: TreeData,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_type(&mut self, ty: TypeData) -> usize {
        self.tree.types.push(ty);
        self.tree.types.len() - 1
    }

    pub fn add_decl(&mut self, decl: DeclData) -> usize {
        self.tree.decls.push(decl);
        self.tree.decls.len() - 1
    }

    pub fn add_top_level(&mut self, decl: usize) {
        self.tree.top_level.push(decl);
    }

    /// A primitive type with layout.
    pub fn primitive(&mut self, kind: TypeKind, spelling: &str, size: i64, align: i64) -> usize {
        self.add_type(TypeData {
            kind,
            spelling: spelling.to_string(),
            size,
            align,
            ..Default::default()
        })
    }

    /// A pointer type; size/align are filled in by the resolver from the
    /// platform pointer width, so the layout answer here mirrors what a real
    /// front end would report for the target.
    pub fn pointer_to(&mut self, pointee: usize, spelling: &str, pointer_size: i64) -> usize {
        self.add_type(TypeData {
            kind: TypeKind::Pointer,
            spelling: spelling.to_string(),
            pointee: Some(pointee),
            size: pointer_size,
            align: pointer_size,
            ..Default::default()
        })
    }

    /// A constant-size array type.
    pub fn constant_array(&mut self, element: usize, length: u64, spelling: &str) -> usize {
        let elem_size = self.tree.types[element].size;
        let elem_align = self.tree.types[element].align;
        self.add_type(TypeData {
            kind: TypeKind::ConstantArray,
            spelling: spelling.to_string(),
            element: Some(element),
            array_length: Some(length),
            size: elem_size.saturating_mul(length as i64),
            align: elem_align,
            ..Default::default()
        })
    }

    /// Mutable access to the tree, for backpatching cross-references
    /// (a record type's declaring cursor is added after both exist).
    pub fn tree_mut(&mut self) -> &mut TreeData {
        &mut self.tree
    }

    pub fn build(self) -> TreeData {
        self.tree
    }
}

/// Front end serving registered fixture trees and macro-evaluation stubs.
#[derive(Debug, Default)]
pub struct MemoryFrontend {
    target: TargetPlatform,
    pointer_width: u64,
    units: HashMap<PathBuf, Rc<TreeData>>,
}

impl MemoryFrontend {
    pub fn new(target: impl Into<TargetPlatform>, pointer_width: u64) -> Self {
        Self {
            target: target.into(),
            pointer_width,
            units: HashMap::new(),
        }
    }

    /// Register a fixture tree under a path.
    pub fn register(&mut self, path: impl Into<PathBuf>, tree: TreeData) {
        self.units.insert(path.into(), Rc::new(tree));
    }

    pub fn pointer_width(&self) -> u64 {
        self.pointer_width
    }

    /// Build a stub unit for a synthesized macro-evaluation source.
    fn parse_stub(&self, path: &Path, source: &str) -> Result<MemoryUnit> {
        let trimmed = source.trim();
        let body = trimmed
            .strip_prefix("auto ")
            .and_then(|rest| rest.strip_suffix(';'))
            .ok_or_else(|| CModelError::parse(path, "not a recognized evaluation stub"))?;
        let (name, expr) = body
            .split_once('=')
            .map(|(n, e)| (n.trim(), e.trim()))
            .ok_or_else(|| CModelError::parse(path, "stub has no initializer"))?;

        let (eval, type_kind, type_spelling, size) = evaluate_literal(expr, self.pointer_width);

        let mut builder = TreeBuilder::new();
        let var_ty = if type_kind == TypeKind::Pointer {
            let char_ty = builder.primitive(TypeKind::CharS, "char", 1, 1);
            builder.pointer_to(char_ty, "const char *", self.pointer_width as i64)
        } else {
            builder.primitive(type_kind, type_spelling, size, size)
        };
        let var = builder.add_decl(DeclData {
            kind: CursorKind::VarDecl,
            spelling: name.to_string(),
            ty: var_ty,
            location: Location::new(
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                1,
                1,
            ),
            eval,
            ..Default::default()
        });
        builder.add_top_level(var);

        Ok(MemoryUnit {
            tree: Rc::new(builder.build()),
            target: self.target.clone(),
            pointer_width: self.pointer_width,
        })
    }
}

impl Frontend for MemoryFrontend {
    type Cur = MemoryCursor;
    type Unit = MemoryUnit;

    fn parse(&self, path: &Path, _args: &[String]) -> Result<MemoryUnit> {
        if let Some(tree) = self.units.get(path) {
            return Ok(MemoryUnit {
                tree: Rc::clone(tree),
                target: self.target.clone(),
                pointer_width: self.pointer_width,
            });
        }
        // Unregistered path: treat it as a synthesized evaluation stub on disk.
        let source = std::fs::read_to_string(path)
            .map_err(|e| CModelError::io_with_path(e, path))?;
        self.parse_stub(path, &source)
    }
}

/// Classify and evaluate a single literal initializer.
///
/// Returns the evaluation result together with the inferred variable type,
/// mirroring what a native front end reports for an `auto` declaration.
fn evaluate_literal(expr: &str, pointer_width: u64) -> (EvalResult, TypeKind, &'static str, i64) {
    let expr = expr.trim().trim_start_matches('(').trim_end_matches(')').trim();

    if expr.starts_with('"') && expr.ends_with('"') && expr.len() >= 2 {
        let inner = expr[1..expr.len() - 1].to_string();
        return (
            EvalResult::StringLiteral(inner),
            TypeKind::Pointer,
            "const char *",
            pointer_width as i64,
        );
    }

    let unsigned_suffix = {
        let lowered = expr.to_ascii_lowercase();
        let trimmed = lowered.trim_end_matches(['l', 'f']);
        trimmed.ends_with('u')
    };
    let digits = expr.trim_end_matches(['u', 'U', 'l', 'L', 'f', 'F']);

    if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        if let Ok(v) = u64::from_str_radix(hex, 16) {
            return if unsigned_suffix {
                (EvalResult::UnsignedInteger(v), TypeKind::UInt, "unsigned int", 4)
            } else if let Ok(signed) = i64::try_from(v) {
                int_result(signed)
            } else {
                (EvalResult::UnsignedInteger(v), TypeKind::ULongLong, "unsigned long long", 8)
            };
        }
    }

    if digits.contains('.') || (digits.contains(['e', 'E']) && !digits.contains("0x")) {
        if let Ok(v) = digits.parse::<f64>() {
            return (EvalResult::FloatingPoint(v), TypeKind::Double, "double", 8);
        }
    }

    if unsigned_suffix {
        if let Ok(v) = digits.parse::<u64>() {
            return (EvalResult::UnsignedInteger(v), TypeKind::UInt, "unsigned int", 4);
        }
    }
    if let Ok(v) = digits.parse::<i64>() {
        return int_result(v);
    }
    if let Ok(v) = digits.parse::<f64>() {
        return (EvalResult::FloatingPoint(v), TypeKind::Double, "double", 8);
    }

    (EvalResult::Unevaluated, TypeKind::Invalid, "", LAYOUT_INVALID)
}

fn int_result(v: i64) -> (EvalResult, TypeKind, &'static str, i64) {
    if i32::try_from(v).is_ok() {
        (EvalResult::SignedInteger(v), TypeKind::Int, "int", 4)
    } else {
        (EvalResult::SignedInteger(v), TypeKind::LongLong, "long long", 8)
    }
}

/// A parsed synthetic translation unit.
#[derive(Debug, Clone)]
pub struct MemoryUnit {
    tree: Rc<TreeData>,
    target: TargetPlatform,
    pointer_width: u64,
}

impl MemoryUnit {
    /// Wrap a fixture tree directly, without going through [`Frontend::parse`].
    pub fn from_tree(tree: TreeData, target: impl Into<TargetPlatform>, pointer_width: u64) -> Self {
        Self {
            tree: Rc::new(tree),
            target: target.into(),
            pointer_width,
        }
    }

    /// Handle to the type at `id`, for callers that built the tree themselves.
    pub fn type_at(&self, id: usize) -> MemoryType {
        MemoryType {
            tree: Rc::clone(&self.tree),
            id,
        }
    }

    /// Handle to the declaration at `id`.
    pub fn decl_at(&self, id: usize) -> MemoryCursor {
        MemoryCursor {
            tree: Rc::clone(&self.tree),
            id,
        }
    }
}

impl TranslationUnit for MemoryUnit {
    type Cur = MemoryCursor;

    fn top_level(&self) -> Vec<MemoryCursor> {
        self.tree
            .top_level
            .iter()
            .map(|&id| MemoryCursor {
                tree: Rc::clone(&self.tree),
                id,
            })
            .collect()
    }

    fn resolved_target(&self) -> TargetPlatform {
        self.target.clone()
    }

    fn pointer_width(&self) -> u64 {
        self.pointer_width
    }
}

/// Handle to one synthetic declaration.
#[derive(Debug, Clone)]
pub struct MemoryCursor {
    tree: Rc<TreeData>,
    id: usize,
}

impl MemoryCursor {
    fn data(&self) -> &DeclData {
        &self.tree.decls[self.id]
    }

    fn cursor(&self, id: usize) -> MemoryCursor {
        MemoryCursor {
            tree: Rc::clone(&self.tree),
            id,
        }
    }

    fn type_handle(&self, id: usize) -> MemoryType {
        MemoryType {
            tree: Rc::clone(&self.tree),
            id,
        }
    }
}

impl Cursor for MemoryCursor {
    type Ty = MemoryType;

    fn kind(&self) -> CursorKind {
        self.data().kind
    }

    fn spelling(&self) -> String {
        self.data().spelling.clone()
    }

    fn ty(&self) -> MemoryType {
        self.type_handle(self.data().ty)
    }

    fn location(&self) -> Location {
        self.data().location.clone()
    }

    fn comment(&self) -> Option<String> {
        self.data().comment.clone()
    }

    fn is_anonymous(&self) -> bool {
        self.data().anonymous
    }

    fn record_members(&self) -> Vec<MemoryCursor> {
        self.data().members.iter().map(|&id| self.cursor(id)).collect()
    }

    fn arguments(&self) -> Vec<MemoryCursor> {
        self.data().arguments.iter().map(|&id| self.cursor(id)).collect()
    }

    fn enum_constants(&self) -> Vec<MemoryCursor> {
        self.data()
            .enum_constants
            .iter()
            .map(|&id| self.cursor(id))
            .collect()
    }

    fn enum_constant_value(&self) -> i64 {
        self.data().enum_value
    }

    fn enum_integer_type(&self) -> Option<MemoryType> {
        self.data().enum_integer_type.map(|id| self.type_handle(id))
    }

    fn field_bit_offset(&self) -> i64 {
        self.data().bit_offset
    }

    fn tokens(&self) -> Vec<String> {
        self.data().tokens.clone()
    }

    fn evaluate(&self) -> EvalResult {
        self.data().eval.clone()
    }
}

/// Handle to one synthetic type.
#[derive(Debug, Clone)]
pub struct MemoryType {
    tree: Rc<TreeData>,
    id: usize,
}

impl MemoryType {
    fn data(&self) -> &TypeData {
        &self.tree.types[self.id]
    }

    fn type_handle(&self, id: usize) -> MemoryType {
        MemoryType {
            tree: Rc::clone(&self.tree),
            id,
        }
    }
}

impl TypeHandle for MemoryType {
    type Cur = MemoryCursor;

    fn kind(&self) -> TypeKind {
        self.data().kind
    }

    fn spelling(&self) -> String {
        self.data().spelling.clone()
    }

    fn canonical(&self) -> MemoryType {
        match self.data().canonical {
            Some(id) => self.type_handle(id),
            None => self.clone(),
        }
    }

    fn declaration(&self) -> Option<MemoryCursor> {
        self.data().declaration.map(|id| MemoryCursor {
            tree: Rc::clone(&self.tree),
            id,
        })
    }

    fn pointee(&self) -> Option<MemoryType> {
        self.data().pointee.map(|id| self.type_handle(id))
    }

    fn element_type(&self) -> Option<MemoryType> {
        self.data().element.map(|id| self.type_handle(id))
    }

    fn array_length(&self) -> Option<u64> {
        self.data().array_length
    }

    fn modified_type(&self) -> Option<MemoryType> {
        self.data().modified.map(|id| self.type_handle(id))
    }

    fn named_type(&self) -> Option<MemoryType> {
        self.data().named.map(|id| self.type_handle(id))
    }

    fn typedef_underlying(&self) -> Option<MemoryType> {
        self.data().underlying.map(|id| self.type_handle(id))
    }

    fn size_of(&self) -> i64 {
        self.data().size
    }

    fn align_of(&self) -> i64 {
        self.data().align
    }

    fn is_const(&self) -> bool {
        self.data().is_const
    }

    fn calling_convention(&self) -> CallingConvention {
        self.data().calling_convention
    }

    fn result_type(&self) -> Option<MemoryType> {
        self.data().result.map(|id| self.type_handle(id))
    }

    fn argument_types(&self) -> Vec<MemoryType> {
        self.data()
            .argument_types
            .iter()
            .map(|&id| self.type_handle(id))
            .collect()
    }

    fn same_as(&self, other: &MemoryType) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree) && self.id == other.id
    }
}
