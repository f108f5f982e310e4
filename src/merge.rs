//! Cross-platform merge.
//!
//! Takes N per-platform models and keeps only the symbols that exist on every
//! platform with an identical structure. Platforms are ordered by requested
//! target triple before pooling, so the outcome is a pure function of the set
//! of inputs, not of argument order. Every dropped symbol is reported as a
//! [`MergeDiagnostic`] rather than silently vanishing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CModelError, Result};
use crate::model::{CNode, FfiCrossPlatform, FfiTargetPlatform, NodeKind, TargetPlatform};

/// Why one symbol was excluded from the cross-platform model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason")]
pub enum MergeDiagnostic {
    /// Present on some platforms but not all of them.
    MissingOnPlatforms {
        name: String,
        kind: NodeKind,
        missing: Vec<TargetPlatform>,
    },
    /// The same name resolves to different node kinds across platforms.
    KindMismatch { name: String, kinds: Vec<NodeKind> },
    /// Present everywhere with the same kind, but structurally different.
    NotEqual {
        name: String,
        kind: NodeKind,
        platform: TargetPlatform,
    },
}

impl std::fmt::Display for MergeDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeDiagnostic::MissingOnPlatforms { name, kind, missing } => {
                let triples: Vec<&str> = missing.iter().map(|p| p.as_str()).collect();
                write!(f, "{kind} '{name}' missing on: {}", triples.join(", "))
            }
            MergeDiagnostic::KindMismatch { name, kinds } => {
                let kinds: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
                write!(f, "'{name}' has conflicting kinds: {}", kinds.join(", "))
            }
            MergeDiagnostic::NotEqual { name, kind, platform } => {
                write!(f, "{kind} '{name}' differs structurally on {platform}")
            }
        }
    }
}

/// The merged model together with the reasons symbols were dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeResult {
    pub model: FfiCrossPlatform,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<MergeDiagnostic>,
}

/// Merge per-platform models into one cross-platform model.
///
/// Fails on an empty input and on two models claiming the same requested
/// platform; anything symbol-level is a diagnostic, not an error.
pub fn merge(platforms: &[FfiTargetPlatform]) -> Result<MergeResult> {
    if platforms.is_empty() {
        return Err(CModelError::Merge("no platform models to merge".to_string()));
    }

    let mut ordered: Vec<&FfiTargetPlatform> = platforms.iter().collect();
    ordered.sort_by(|a, b| a.platform_requested.cmp(&b.platform_requested));
    for pair in ordered.windows(2) {
        if pair[0].platform_requested == pair[1].platform_requested {
            return Err(CModelError::Merge(format!(
                "duplicate platform model for {}",
                pair[0].platform_requested
            )));
        }
    }

    info!(platforms = ordered.len(), "merging platform models");

    // Pool by name across all categories, so a name that changes category
    // between platforms still lands in one bucket and the clash is visible.
    let mut pool: BTreeMap<String, Vec<(usize, CNode)>> = BTreeMap::new();
    for (index, platform) in ordered.iter().enumerate() {
        for node in platform.nodes() {
            pool.entry(node.name().to_string())
                .or_default()
                .push((index, node));
        }
    }

    let mut model = FfiCrossPlatform {
        platforms: ordered
            .iter()
            .map(|p| p.platform_requested.clone())
            .collect(),
        ..Default::default()
    };
    let mut diagnostics = Vec::new();

    for (name, entries) in pool {
        let first_kind = entries[0].1.kind();

        let mut kinds: Vec<NodeKind> = entries.iter().map(|(_, n)| n.kind()).collect();
        kinds.sort();
        kinds.dedup();
        if kinds.len() > 1 {
            debug!(name = %name, "dropped: kind mismatch");
            diagnostics.push(MergeDiagnostic::KindMismatch { name, kinds });
            continue;
        }

        if entries.len() < ordered.len() {
            let present: Vec<usize> = entries.iter().map(|(i, _)| *i).collect();
            let missing: Vec<TargetPlatform> = ordered
                .iter()
                .enumerate()
                .filter(|(i, _)| !present.contains(i))
                .map(|(_, p)| p.platform_requested.clone())
                .collect();
            debug!(name = %name, "dropped: not on every platform");
            diagnostics.push(MergeDiagnostic::MissingOnPlatforms {
                name,
                kind: first_kind,
                missing,
            });
            continue;
        }

        let (_, reference) = &entries[0];
        let mut divergent = None;
        for (index, node) in &entries[1..] {
            let equal = match (reference, node) {
                // Macro values may legitimately differ per platform; the
                // type must still agree, and the first value wins.
                (CNode::MacroObject(a), CNode::MacroObject(b)) => a.eq_ignoring_value(b),
                _ => reference.eq_across_platforms(node),
            };
            if !equal {
                divergent = Some(*index);
                break;
            }
        }
        if let Some(index) = divergent {
            debug!(name = %name, platform = %ordered[index].platform_requested, "dropped: structural difference");
            diagnostics.push(MergeDiagnostic::NotEqual {
                name,
                kind: first_kind,
                platform: ordered[index].platform_requested.clone(),
            });
            continue;
        }

        let mut accepted = reference.clone();
        accepted.normalize_for_merge();
        model.insert(accepted);
    }

    info!(
        accepted = model.node_count(),
        dropped = diagnostics.len(),
        "merge complete"
    );
    Ok(MergeResult { model, diagnostics })
}
