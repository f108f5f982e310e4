//! C FFI model extraction.
//!
//! Walks a C header's declarations through a pluggable cursor-based front
//! end, resolves every reachable type with platform-concrete layout, and
//! produces a serializable per-platform model. Models extracted for several
//! target platforms merge into one cross-platform model containing only the
//! symbols that are structurally identical everywhere.
//!
//! # Pipeline
//! - [`extract::extract_platform`] parses one header for one target and
//!   drains the exploration worklists to a fixpoint;
//! - [`merge::merge`] intersects N per-platform models, reporting every
//!   dropped symbol as a [`merge::MergeDiagnostic`].
//!
//! The front end is abstract: implement [`frontend::Frontend`] over any
//! cursor-style C parser. [`frontend::memory::MemoryFrontend`] ships as the
//! reference implementation over synthetic declaration trees.

pub mod classify;
pub mod config;
pub mod error;
pub mod explore;
pub mod extract;
pub mod frontend;
pub mod merge;
pub mod model;
pub mod resolve;

pub use config::{ExtractInput, ExtractOptions, NameFilters};
pub use error::{CModelError, Result};
pub use extract::extract_platform;
pub use merge::{merge, MergeDiagnostic, MergeResult};
pub use model::{
    CNode, CType, FfiCrossPlatform, FfiTargetPlatform, Location, NodeKind, TargetPlatform,
};
