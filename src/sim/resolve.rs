//! Blast resolution: overlap candidates to applied damage
//!
//! Each candidate is independent; processing order carries no meaning and is
//! not observable through the damage sink contract.

use glam::Vec3;

use crate::host::{CollisionQuery, DamageSink, EntityId, TraceMask};

use super::falloff::FalloffCurve;
use super::occlusion::{OcclusionPolicy, blast_reaches};

/// Outcome summary of one blast resolution, for logging only. Hosts observe
/// the damage sink, not this.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlastReport {
    /// Candidates returned by the overlap query
    pub candidates: usize,
    /// Candidates that passed occlusion and took damage
    pub damaged: usize,
}

/// Resolve one blast: query candidates within the curve's blast radius, run
/// the occlusion trace per candidate, and apply falloff damage to everyone
/// the blast reaches. An empty overlap result is a valid no-op.
pub fn resolve_blast<W: CollisionQuery, D: DamageSink>(
    origin: Vec3,
    source: EntityId,
    curve: &FalloffCurve,
    mask: TraceMask,
    policy: OcclusionPolicy,
    world: &W,
    damage: &mut D,
) -> BlastReport {
    let candidates = world.query_overlaps(origin, curve.blast_radius());
    let mut report = BlastReport { candidates: candidates.len(), damaged: 0 };

    // Never trace against the blast source itself
    let ignore = [source];

    for candidate in candidates {
        if candidate.entity == source {
            continue;
        }
        let hits = world.trace_segment(origin, candidate.pos, mask, &ignore);
        if !blast_reaches(&hits, candidate.entity, policy) {
            continue;
        }
        // sample() clamps: an overlap can report a center slightly past the
        // blast radius when only the candidate's bounds touch the volume
        let dealt = curve.sample(origin.distance(candidate.pos));
        damage.apply_damage(candidate.entity, dealt, source);
        report.damaged += 1;
    }

    report
}
