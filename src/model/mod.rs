//! The FFI model: nodes, types, locations, and the per-platform and
//! cross-platform containers.
//!
//! Everything here is plain owned data with serde derives. Values are
//! constructed once by the exploration engine and never mutated afterwards,
//! except by the merger's normalization pass.

pub mod location;
pub mod node;
pub mod platform;
pub mod ty;

pub use location::Location;
pub use node::{
    CEnum, CEnumValue, CFunction, CFunctionParameter, CFunctionPointer,
    CFunctionPointerParameter, CMacroObject, CNode, COpaqueType, CRecord, CRecordField,
    CTypeAlias, CVariable, CallingConvention, RecordKind,
};
pub use platform::{FfiCrossPlatform, FfiTargetPlatform, TargetPlatform};
pub use ty::{CType, NodeKind};
