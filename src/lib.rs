//! Blastwave - timed explosive detonation and blast resolution
//!
//! Models a grenade-style device: a one-shot countdown, a spatial query for
//! candidates caught in the blast, a line-of-sight occlusion pass that decides
//! who is in cover, distance-based damage falloff, and detached one-shot
//! audio/visual effects.
//!
//! Core modules:
//! - `sim`: deterministic blast-decision logic (falloff, occlusion, resolution,
//!   detonator state machine)
//! - `host`: traits the host simulation implements (collision queries, timers,
//!   damage/effect sinks), plus a scripted host for tests and the demo

pub mod host;
pub mod sim;

pub use host::{
    AssetId, Candidate, CollisionQuery, DamageSink, Despawn, EffectSink, EntityId, TimerHandle,
    TimerService, TraceHit, TraceMask,
};
pub use sim::{
    BlastReport, CurveError, CurveKey, Detonator, DetonatorConfig, DetonatorState, FalloffCurve,
    OcclusionPolicy, SoundSettings, VfxSettings,
};

/// Configuration defaults
pub mod consts {
    /// Default explosion sound volume multiplier
    pub const DEFAULT_VOLUME: f32 = 1.0;
    /// Default explosion sound pitch multiplier
    pub const DEFAULT_PITCH: f32 = 1.0;
}
