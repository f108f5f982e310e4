//! The exploration engine.
//!
//! A worklist-based traversal over the front end's cursor graph. Four FIFO
//! worklists drive a breadth-first walk: functions and variables first (the
//! entry points), then macro objects, then the transitive closure of every
//! type they reference. Exploring a symbol may enqueue more type candidates,
//! so the types queue is drained to a fixpoint.
//!
//! Deduplication lives in the eligibility check, not the queues: a candidate
//! name is recorded as visited before it is queued, which both guarantees
//! at-most-once materialization per name per kind and prevents re-entrant
//! enqueue of a name whose own materialization is still pending. That marking
//! is also what makes the traversal finite despite referential cycles in the
//! source (a struct field pointing back at its container).

pub mod alias;
pub mod enumeration;
pub mod function;
pub mod function_pointer;
pub mod macro_object;
pub mod record;
pub mod variable;

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::config::NameFilters;
use crate::error::Result;
use crate::frontend::{Cursor, CursorKind, Frontend, TypeHandle, TypeKind};
use crate::model::{CNode, FfiTargetPlatform, Location, NodeKind};

/// The type handle produced by a frontend's cursors.
pub type TyOf<F> = <<F as Frontend>::Cur as Cursor>::Ty;

/// A not-yet-materialized exploration candidate.
///
/// Transient: discarded after producing (or declining to produce) a node.
#[derive(Debug, Clone)]
pub struct Candidate<C: Cursor> {
    pub name: String,
    pub kind: NodeKind,
    /// Underlying declaration cursor; absent for inline function pointers
    pub cursor: Option<C>,
    /// The front-end type being explored
    pub ty: Option<C::Ty>,
    pub location: Location,
}

impl<C: Cursor> Candidate<C> {
    /// Candidate for a top-level declaration cursor.
    pub fn from_cursor(kind: NodeKind, cursor: C) -> Self {
        let location = cursor.location();
        let ty = cursor.ty();
        Self {
            name: cursor.spelling(),
            kind,
            cursor: Some(cursor),
            ty: Some(ty),
            location,
        }
    }
}

/// Expected cursor/type kinds for one explorer; an empty slice means "any".
struct KindRules {
    cursor_kinds: &'static [CursorKind],
    type_kinds: &'static [TypeKind],
}

fn rules_for(kind: NodeKind) -> KindRules {
    match kind {
        NodeKind::Function => KindRules {
            cursor_kinds: &[CursorKind::FunctionDecl],
            type_kinds: &[TypeKind::FunctionProto, TypeKind::FunctionNoProto],
        },
        NodeKind::Variable => KindRules {
            cursor_kinds: &[CursorKind::VarDecl],
            type_kinds: &[],
        },
        NodeKind::Struct | NodeKind::Union => KindRules {
            cursor_kinds: &[CursorKind::StructDecl, CursorKind::UnionDecl],
            type_kinds: &[TypeKind::Record],
        },
        NodeKind::Enum => KindRules {
            cursor_kinds: &[CursorKind::EnumDecl],
            type_kinds: &[TypeKind::Enum],
        },
        NodeKind::TypeAlias => KindRules {
            cursor_kinds: &[CursorKind::TypedefDecl],
            type_kinds: &[TypeKind::Typedef],
        },
        NodeKind::MacroObject => KindRules {
            cursor_kinds: &[CursorKind::MacroDefinition],
            type_kinds: &[],
        },
        // Opaque types arrive via records and collapsed aliases; function
        // pointers via any cursor that mentions one.
        NodeKind::OpaqueType | NodeKind::FunctionPointer => KindRules {
            cursor_kinds: &[],
            type_kinds: &[],
        },
        _ => KindRules {
            cursor_kinds: &[],
            type_kinds: &[],
        },
    }
}

/// The four ordered worklists.
#[derive(Debug)]
struct Frontier<C: Cursor> {
    functions: VecDeque<Candidate<C>>,
    variables: VecDeque<Candidate<C>>,
    macro_objects: VecDeque<Candidate<C>>,
    types: VecDeque<Candidate<C>>,
}

impl<C: Cursor> Frontier<C> {
    fn new() -> Self {
        Self {
            functions: VecDeque::new(),
            variables: VecDeque::new(),
            macro_objects: VecDeque::new(),
            types: VecDeque::new(),
        }
    }

    fn push(&mut self, candidate: Candidate<C>) {
        match candidate.kind {
            NodeKind::Function => self.functions.push_back(candidate),
            NodeKind::Variable => self.variables.push_back(candidate),
            NodeKind::MacroObject => self.macro_objects.push_back(candidate),
            _ => self.types.push_back(candidate),
        }
    }
}

/// Shared state for one platform's exploration run.
///
/// Owns the frontier, the per-kind visited tables and the model under
/// construction. Constructed fresh per extraction run, so concurrent
/// per-platform extraction needs no shared state.
pub struct ExploreContext<'a, F: Frontend> {
    pub frontend: &'a F,
    pub filters: &'a NameFilters,
    /// Pointer width of the platform being extracted, in bytes
    pub pointer_size: u64,
    /// Compiler arguments, reused for nested macro-evaluation parses
    pub compiler_arguments: Vec<String>,
    frontier: Frontier<F::Cur>,
    visited: FxHashMap<NodeKind, FxHashMap<String, Location>>,
    pub model: FfiTargetPlatform,
}

impl<'a, F: Frontend> ExploreContext<'a, F> {
    pub fn new(
        frontend: &'a F,
        filters: &'a NameFilters,
        pointer_size: u64,
        compiler_arguments: Vec<String>,
        model: FfiTargetPlatform,
    ) -> Self {
        Self {
            frontend,
            filters,
            pointer_size,
            compiler_arguments,
            frontier: Frontier::new(),
            visited: FxHashMap::default(),
            model,
        }
    }

    /// Offer a candidate to the frontier.
    ///
    /// Runs the eligibility chain; on success the name is recorded as visited
    /// and the candidate queued. Returns whether the candidate was accepted.
    pub fn try_enqueue(&mut self, candidate: Candidate<F::Cur>) -> bool {
        if !self.is_eligible(&candidate) {
            return false;
        }
        self.mark_visited(candidate.kind, &candidate.name, candidate.location.clone());
        trace!(name = %candidate.name, kind = %candidate.kind, "enqueued");
        self.frontier.push(candidate);
        true
    }

    /// The eligibility chain, in order, short-circuiting.
    fn is_eligible(&self, candidate: &Candidate<F::Cur>) -> bool {
        if candidate.name.is_empty() {
            return false;
        }
        let rules = rules_for(candidate.kind);
        if !rules.cursor_kinds.is_empty() {
            match &candidate.cursor {
                Some(cursor) => {
                    if !rules.cursor_kinds.contains(&cursor.kind()) {
                        return false;
                    }
                }
                None => return false,
            }
        }
        if !rules.type_kinds.is_empty() {
            match &candidate.ty {
                Some(ty) => {
                    if !rules.type_kinds.contains(&ty.kind()) {
                        return false;
                    }
                }
                None => return false,
            }
        }
        // Function pointers nested inside system struct fields must still be
        // captured so dependent structs can be fully typed.
        if candidate.location.is_system
            && candidate.kind != NodeKind::FunctionPointer
            && !self.filters.allow_system()
            && !self.filters.is_included(&candidate.name)
        {
            return false;
        }
        if self.is_visited(candidate.kind, &candidate.name) {
            return false;
        }
        if self.filters.is_ignored(candidate.kind, &candidate.name) {
            debug!(name = %candidate.name, kind = %candidate.kind, "excluded by name policy");
            return false;
        }
        true
    }

    pub fn is_visited(&self, kind: NodeKind, name: &str) -> bool {
        self.visited
            .get(&kind)
            .is_some_and(|table| table.contains_key(name))
    }

    /// Record a name as visited for one explorer kind, keeping the
    /// first-seen location.
    pub fn mark_visited(&mut self, kind: NodeKind, name: &str, location: Location) {
        self.visited
            .entry(kind)
            .or_default()
            .entry(name.to_string())
            .or_insert(location);
    }

    /// Drain all four worklists in their fixed order.
    ///
    /// Functions and variables first, macro objects next, then types until
    /// the queue stops growing: explorers append to the very queue being
    /// drained, so the length is re-checked after every pop.
    pub fn drain(&mut self) -> Result<()> {
        while let Some(candidate) = self.frontier.functions.pop_front() {
            self.explore(candidate)?;
        }
        while let Some(candidate) = self.frontier.variables.pop_front() {
            self.explore(candidate)?;
        }
        while let Some(candidate) = self.frontier.macro_objects.pop_front() {
            self.explore(candidate)?;
        }
        while let Some(candidate) = self.frontier.types.pop_front() {
            self.explore(candidate)?;
        }
        debug_assert!(self.frontier.functions.is_empty());
        debug_assert!(self.frontier.variables.is_empty());
        debug_assert!(self.frontier.macro_objects.is_empty());
        Ok(())
    }

    /// Materialize one candidate and collect the node, if any.
    fn explore(&mut self, candidate: Candidate<F::Cur>) -> Result<()> {
        let name = candidate.name.clone();
        let kind = candidate.kind;
        let node: Option<CNode> = match kind {
            NodeKind::Function => function::materialize(self, &candidate)?,
            NodeKind::Variable => variable::materialize(self, &candidate)?,
            NodeKind::Struct | NodeKind::Union => record::materialize(self, &candidate)?,
            NodeKind::Enum => enumeration::materialize(self, &candidate)?,
            NodeKind::TypeAlias => alias::materialize(self, &candidate)?,
            NodeKind::OpaqueType => alias::materialize_opaque(self, &candidate)?,
            NodeKind::FunctionPointer => function_pointer::materialize(self, &candidate)?,
            NodeKind::MacroObject => macro_object::materialize(self, &candidate)?,
            other => {
                trace!(name = %name, kind = %other, "kind has no explorer");
                None
            }
        };
        match node {
            Some(node) => {
                trace!(name = %name, kind = %kind, "materialized");
                self.model.insert(node);
            }
            None => debug!(name = %name, kind = %kind, "no node produced"),
        }
        Ok(())
    }
}
