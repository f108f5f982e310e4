//! The parser front-end seam.
//!
//! The exploration engine never talks to a native C parser directly; it is
//! generic over the [`Frontend`] trait family, which mirrors the cursor-based
//! interface such parsers expose: a parsed translation unit yields cursors,
//! each with a kind, a spelling, an associated type, a location, and
//! structural queries. Cursor and type handles are scope-bound to their
//! translation unit and are not assumed `Send`; the engine copies out plain
//! data (names, kinds, sizes, locations) as it goes.
//!
//! [`memory`] provides the in-crate implementation used by tests and
//! embedders; a libclang-backed implementation would plug into the same four
//! traits.

pub mod memory;

use std::path::Path;

use crate::error::Result;
use crate::model::{CallingConvention, Location, TargetPlatform};

/// Layout query sentinel: the type is invalid or has no layout.
pub const LAYOUT_INVALID: i64 = -1;
/// Layout query sentinel: the type is declared but incomplete.
pub const LAYOUT_INCOMPLETE: i64 = -2;

/// Kind of an AST cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorKind {
    FunctionDecl,
    VarDecl,
    StructDecl,
    UnionDecl,
    EnumDecl,
    EnumConstantDecl,
    FieldDecl,
    ParmDecl,
    TypedefDecl,
    MacroDefinition,
    Other,
}

/// Kind of a front-end type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Void,
    Bool,
    CharU,
    UChar,
    UShort,
    UInt,
    ULong,
    ULongLong,
    CharS,
    SChar,
    Short,
    Int,
    Long,
    LongLong,
    Float,
    Double,
    LongDouble,
    Pointer,
    ConstantArray,
    IncompleteArray,
    Record,
    Enum,
    Typedef,
    FunctionProto,
    FunctionNoProto,
    /// Compiler-internal wrapper: a type with attributes applied
    Attributed,
    /// Compiler-internal wrapper: a type referred to through an
    /// elaborated specifier (`struct foo`)
    Elaborated,
    /// Compiler-internal wrapper: not exposed, canonical form available
    Unexposed,
    Invalid,
}

impl TypeKind {
    /// Whether this is a direct primitive (void, bool, integer or floating
    /// width).
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            TypeKind::Void
                | TypeKind::Bool
                | TypeKind::CharU
                | TypeKind::UChar
                | TypeKind::UShort
                | TypeKind::UInt
                | TypeKind::ULong
                | TypeKind::ULongLong
                | TypeKind::CharS
                | TypeKind::SChar
                | TypeKind::Short
                | TypeKind::Int
                | TypeKind::Long
                | TypeKind::LongLong
                | TypeKind::Float
                | TypeKind::Double
                | TypeKind::LongDouble
        )
    }

    /// Whether this is a function type (with or without a prototype).
    pub fn is_function(&self) -> bool {
        matches!(self, TypeKind::FunctionProto | TypeKind::FunctionNoProto)
    }

    /// Whether the canonical type is unsigned.
    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            TypeKind::Bool
                | TypeKind::CharU
                | TypeKind::UChar
                | TypeKind::UShort
                | TypeKind::UInt
                | TypeKind::ULong
                | TypeKind::ULongLong
        )
    }
}

/// Result of asking the front end to evaluate a cursor to a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalResult {
    SignedInteger(i64),
    UnsignedInteger(u64),
    FloatingPoint(f64),
    StringLiteral(String),
    /// Evaluation produced a result kind this system has no handling for;
    /// carries the front end's name for it.
    Other(String),
    /// The cursor could not be evaluated at all.
    Unevaluated,
}

/// A parser front end: given a source file and compiler arguments, yields a
/// navigable translation unit.
pub trait Frontend {
    type Cur: Cursor;
    type Unit: TranslationUnit<Cur = Self::Cur>;

    /// Parse one translation unit. A failure here is fatal for the platform
    /// being extracted.
    fn parse(&self, path: &Path, args: &[String]) -> Result<Self::Unit>;
}

/// A parsed translation unit.
pub trait TranslationUnit {
    type Cur: Cursor;

    /// Declarations directly in the main file, in source order.
    fn top_level(&self) -> Vec<Self::Cur>;

    /// The target the front end actually resolved to.
    fn resolved_target(&self) -> TargetPlatform;

    /// Pointer width of the resolved target, in bytes.
    fn pointer_width(&self) -> u64;
}

/// An opaque handle to one AST node.
///
/// Queries that do not apply to the cursor's kind return empty/zero values;
/// callers gate on [`Cursor::kind`] first.
pub trait Cursor: Clone {
    type Ty: TypeHandle<Cur = Self> + std::fmt::Debug;

    fn kind(&self) -> CursorKind;
    fn spelling(&self) -> String;
    fn ty(&self) -> Self::Ty;
    fn location(&self) -> Location;
    fn comment(&self) -> Option<String>;
    /// Whether the front end reports this declaration as anonymous.
    fn is_anonymous(&self) -> bool;

    /// Member cursors of a record declaration, in declaration order.
    /// Includes embedded anonymous record declarations.
    fn record_members(&self) -> Vec<Self>;
    /// Parameter cursors of a function declaration, positional.
    fn arguments(&self) -> Vec<Self>;
    /// Enum constant cursors of an enum declaration.
    fn enum_constants(&self) -> Vec<Self>;
    /// Declared value of an enum constant cursor.
    fn enum_constant_value(&self) -> i64;
    /// Underlying integer type of an enum declaration.
    fn enum_integer_type(&self) -> Option<Self::Ty>;
    /// Bit offset of a field cursor within its record.
    fn field_bit_offset(&self) -> i64;

    /// Token spellings of a macro definition, the macro's own name first.
    fn tokens(&self) -> Vec<String>;
    /// Evaluate the cursor to a literal, if the front end can.
    fn evaluate(&self) -> EvalResult;
}

/// An opaque handle to one front-end type.
pub trait TypeHandle: Clone {
    type Cur: Cursor<Ty = Self>;

    fn kind(&self) -> TypeKind;
    fn spelling(&self) -> String;
    /// The canonical (fully desugared) form of this type.
    fn canonical(&self) -> Self;
    /// The declaring cursor, when one exists.
    fn declaration(&self) -> Option<Self::Cur>;

    /// Pointee type of a pointer.
    fn pointee(&self) -> Option<Self>;
    /// Element type of an array.
    fn element_type(&self) -> Option<Self>;
    /// Element count of a constant-size array.
    fn array_length(&self) -> Option<u64>;
    /// The modified type behind an attributed wrapper.
    fn modified_type(&self) -> Option<Self>;
    /// The named type behind an elaborated wrapper.
    fn named_type(&self) -> Option<Self>;
    /// The underlying type of a typedef.
    fn typedef_underlying(&self) -> Option<Self>;

    /// Size in bytes, or a negative layout sentinel.
    fn size_of(&self) -> i64;
    /// Alignment in bytes, or a negative layout sentinel.
    fn align_of(&self) -> i64;
    fn is_const(&self) -> bool;

    /// Calling convention of a function type.
    fn calling_convention(&self) -> CallingConvention;
    /// Result type of a function type.
    fn result_type(&self) -> Option<Self>;
    /// Parameter types of a function type, positional.
    fn argument_types(&self) -> Vec<Self>;

    /// Whether two handles denote the identical front-end type.
    fn same_as(&self, other: &Self) -> bool;
}
