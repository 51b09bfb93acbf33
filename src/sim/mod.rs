//! Deterministic blast-decision logic
//!
//! Everything here is pure relative to the injected host traits: the same
//! world answers produce the same outcome. No clocks, no RNG, no engine
//! types.

pub mod detonator;
pub mod falloff;
pub mod occlusion;
pub mod resolve;

pub use detonator::{Detonator, DetonatorConfig, DetonatorState, SoundSettings, VfxSettings};
pub use falloff::{CurveError, CurveKey, FalloffCurve};
pub use occlusion::{OcclusionPolicy, blast_reaches};
pub use resolve::{BlastReport, resolve_blast};
