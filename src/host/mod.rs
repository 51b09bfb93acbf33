//! Host-simulation abstraction layer
//!
//! The detonator never owns the world. Collision queries, the timer service,
//! damage application, one-shot effects and destruction all come through the
//! traits here, so the decision logic stays deterministic and unit-testable
//! against scripted fakes.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

pub mod scripted;

/// Opaque identity of a host entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Opaque handle to a host asset (sound cue, VFX system, attenuation or
/// concurrency settings)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId(pub u32);

/// Collision-channel selector for segment traces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceMask(pub u32);

impl TraceMask {
    /// Blast/visibility channel
    pub const BLAST: TraceMask = TraceMask(1 << 0);
    /// Static world geometry channel
    pub const WORLD: TraceMask = TraceMask(1 << 1);

    /// Whether any channel is shared between the two masks
    #[inline]
    pub fn overlaps(self, other: TraceMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for TraceMask {
    fn default() -> Self {
        Self::BLAST
    }
}

/// Handle to a pending one-shot countdown owned by the host timer service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// An entity overlapping the blast volume, considered for damage during one
/// resolution pass. Never retained past that pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub entity: EntityId,
    pub pos: Vec3,
    /// Whether this entity participates in pawn-passthrough occlusion
    pub pawn_like: bool,
}

/// One surface struck by a segment trace, in hit order from the trace origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceHit {
    /// Entity the struck surface belongs to, if any
    pub entity: Option<EntityId>,
    pub pawn_like: bool,
}

/// Host timer service owning one-shot countdowns
pub trait TimerService {
    fn schedule_once(&mut self, delay_seconds: f32) -> TimerHandle;

    /// Cancel a pending countdown. Cancelling an expired or unknown handle is
    /// a no-op.
    fn cancel(&mut self, handle: TimerHandle);

    /// Seconds left on a pending countdown; 0 for expired or unknown handles.
    fn time_remaining(&self, handle: TimerHandle) -> f32;
}

/// Host collision subsystem: spatial overlap and segment queries.
///
/// Both calls are synchronous. An empty result is a valid answer meaning
/// "no candidates" / "nothing struck".
pub trait CollisionQuery {
    /// All blast candidates overlapping the sphere at `center`. The host
    /// pre-filters this to pawn-like targets through its own trigger-volume
    /// response setup; resolution only consumes the set it receives.
    fn query_overlaps(&self, center: Vec3, radius: f32) -> Vec<Candidate>;

    /// Hits along the segment `from -> to` on channel `mask`, ordered nearest
    /// first, skipping entities in `ignore`.
    fn trace_segment(
        &self,
        from: Vec3,
        to: Vec3,
        mask: TraceMask,
        ignore: &[EntityId],
    ) -> Vec<TraceHit>;
}

/// Damage application, the one capability blast targets must implement
pub trait DamageSink {
    fn apply_damage(&mut self, target: EntityId, amount: f32, source: EntityId);
}

/// Detached one-shot audio/visual playback. Both events outlive whatever
/// entity emitted them; the emitter never tracks their completion.
pub trait EffectSink {
    #[allow(clippy::too_many_arguments)]
    fn play_sound(
        &mut self,
        cue: AssetId,
        position: Vec3,
        volume: f32,
        pitch: f32,
        attenuation: Option<AssetId>,
        concurrency: Option<AssetId>,
    );

    fn spawn_visual_effect(&mut self, effect: AssetId, position: Vec3, rotation: Quat, scale: Vec3);
}

/// Deferred entity removal from the host simulation
pub trait Despawn {
    fn request_destroy(&mut self, entity: EntityId);
}
