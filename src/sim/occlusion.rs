//! Line-of-sight occlusion for blast damage
//!
//! Given the ordered hit list of a trace from the blast origin toward a
//! candidate, decide whether the blast reaches it or the candidate is in
//! cover. Blocked by default: a candidate the trace never actually struck is
//! treated as unreachable.

use serde::{Deserialize, Serialize};

use crate::host::{EntityId, TraceHit};

/// How trace hits between the blast origin and a candidate are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OcclusionPolicy {
    /// Pawns never occlude: the scan walks past pawn-like hits, so blast
    /// passes through a crowd to reach the candidate behind it. Only a solid
    /// (non-pawn) hit short of the candidate blocks.
    #[default]
    PawnPassthrough,
    /// Degraded variant: the candidate is reachable only when it is the very
    /// first hit of the trace.
    FirstHitOnly,
}

/// Whether the blast reaches `target` given `hits`, ordered from the blast
/// origin toward the target.
///
/// Under [`OcclusionPolicy::PawnPassthrough`]:
/// - reaching the target itself unblocks; nothing past it matters
/// - any other solid (non-pawn) entity blocks and ends the scan
/// - other pawns and entity-less surface hits are scanned past
/// - a scan that never reaches the target stays blocked
pub fn blast_reaches(hits: &[TraceHit], target: EntityId, policy: OcclusionPolicy) -> bool {
    match policy {
        OcclusionPolicy::PawnPassthrough => {
            for hit in hits {
                match hit.entity {
                    Some(entity) if entity == target => return true,
                    Some(_) if !hit.pawn_like => return false,
                    _ => {}
                }
            }
            false
        }
        OcclusionPolicy::FirstHitOnly => {
            hits.first().is_some_and(|hit| hit.entity == Some(target))
        }
    }
}
