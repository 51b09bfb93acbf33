//! The detonator: a two-state machine (armed -> detonated) that owns the
//! countdown and fires blast resolution plus one-shot effects exactly once.
//!
//! The host drives it through explicit lifecycle calls: `arm` on spawn,
//! `on_timer_fire` at countdown expiry, `on_destroy` on teardown. The
//! terminal latch makes every entry point after detonation a silent no-op.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_PITCH, DEFAULT_VOLUME};
use crate::host::{
    AssetId, CollisionQuery, DamageSink, Despawn, EffectSink, EntityId, TimerHandle, TimerService,
    TraceMask,
};

use super::falloff::FalloffCurve;
use super::occlusion::OcclusionPolicy;
use super::resolve::resolve_blast;

fn default_volume() -> f32 {
    DEFAULT_VOLUME
}

fn default_pitch() -> f32 {
    DEFAULT_PITCH
}

fn default_vfx_scale() -> Vec3 {
    Vec3::ONE
}

/// Explosion sound playback settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundSettings {
    /// Sound cue to play upon detonation
    pub cue: AssetId,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_pitch")]
    pub pitch: f32,
    #[serde(default)]
    pub attenuation: Option<AssetId>,
    #[serde(default)]
    pub concurrency: Option<AssetId>,
}

impl SoundSettings {
    pub fn new(cue: AssetId) -> Self {
        Self {
            cue,
            volume: DEFAULT_VOLUME,
            pitch: DEFAULT_PITCH,
            attenuation: None,
            concurrency: None,
        }
    }
}

/// Explosion visual-effect settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VfxSettings {
    pub effect: AssetId,
    /// Non-uniform spawn scale
    #[serde(default = "default_vfx_scale")]
    pub scale: Vec3,
}

impl VfxSettings {
    pub fn new(effect: AssetId) -> Self {
        Self { effect, scale: Vec3::ONE }
    }
}

/// Detonator configuration, set once at creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetonatorConfig {
    /// Seconds to wait after arming before the explosion; zero (or less)
    /// detonates synchronously on arm
    #[serde(default)]
    pub detonation_delay: f32,
    /// Distance -> damage mapping; its domain upper bound is the blast
    /// radius. Absent is a valid degraded configuration: detonation skips
    /// the damage step entirely.
    #[serde(default)]
    pub damage_curve: Option<FalloffCurve>,
    /// Collision channel for occlusion traces
    #[serde(default)]
    pub trace_mask: TraceMask,
    #[serde(default)]
    pub occlusion: OcclusionPolicy,
    #[serde(default)]
    pub sound: Option<SoundSettings>,
    #[serde(default)]
    pub vfx: Option<VfxSettings>,
    /// Host-side blast-radius visualization toggle; never read by the
    /// resolution algorithm
    #[serde(default)]
    pub debug_draw: bool,
}

impl Default for DetonatorConfig {
    fn default() -> Self {
        Self {
            detonation_delay: 0.0,
            damage_curve: None,
            trace_mask: TraceMask::BLAST,
            occlusion: OcclusionPolicy::PawnPassthrough,
            sound: None,
            vfx: None,
            debug_draw: false,
        }
    }
}

/// Detonator lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetonatorState {
    /// Live; countdown pending or awaiting arm
    Armed,
    /// Terminal; all side effects already dispatched
    Detonated,
}

/// A timed explosive. Owned by the host simulation and driven through
/// explicit lifecycle calls; the host also owns this entity's transform, so
/// the position held here is read-only world state.
#[derive(Debug, Clone)]
pub struct Detonator {
    entity: EntityId,
    pos: Vec3,
    config: DetonatorConfig,
    state: DetonatorState,
    timer: Option<TimerHandle>,
}

impl Detonator {
    pub fn new(entity: EntityId, pos: Vec3, config: DetonatorConfig) -> Self {
        Self { entity, pos, config, state: DetonatorState::Armed, timer: None }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn pos(&self) -> Vec3 {
        self.pos
    }

    pub fn state(&self) -> DetonatorState {
        self.state
    }

    pub fn is_detonated(&self) -> bool {
        self.state == DetonatorState::Detonated
    }

    /// Blast volume radius, derived from the damage curve domain; zero
    /// without a curve.
    pub fn blast_radius(&self) -> f32 {
        self.config
            .damage_curve
            .as_ref()
            .map(FalloffCurve::blast_radius)
            .unwrap_or(0.0)
    }

    pub fn debug_enabled(&self) -> bool {
        self.config.debug_draw
    }

    /// Replace the damage curve (live-edit path). The blast radius follows
    /// the new curve domain automatically. Ignored once detonated.
    pub fn set_damage_curve(&mut self, curve: Option<FalloffCurve>) {
        if self.state == DetonatorState::Detonated {
            return;
        }
        self.config.damage_curve = curve;
    }

    /// Start the one-shot countdown. A configured delay of zero or less
    /// detonates synchronously within this call. Arming while a countdown is
    /// already pending, or after detonation, is a no-op.
    pub fn arm<T, W, H>(&mut self, timers: &mut T, world: &W, host: &mut H)
    where
        T: TimerService,
        W: CollisionQuery,
        H: DamageSink + EffectSink + Despawn,
    {
        if self.state == DetonatorState::Detonated || self.timer.is_some() {
            return;
        }
        if self.config.detonation_delay > 0.0 {
            self.timer = Some(timers.schedule_once(self.config.detonation_delay));
        } else {
            self.detonate(world, host);
        }
    }

    /// Host callback when the countdown expires
    pub fn on_timer_fire<W, H>(&mut self, world: &W, host: &mut H)
    where
        W: CollisionQuery,
        H: DamageSink + EffectSink + Despawn,
    {
        self.timer = None;
        self.detonate(world, host);
    }

    /// Seconds until detonation. Zero once detonated or when nothing is
    /// scheduled; never negative.
    pub fn remaining_time<T: TimerService>(&self, timers: &T) -> f32 {
        match self.timer {
            Some(handle) if self.state == DetonatorState::Armed => {
                timers.time_remaining(handle).max(0.0)
            }
            _ => 0.0,
        }
    }

    /// Release the pending countdown when the host tears this entity down
    /// before expiry.
    pub fn on_destroy<T: TimerService>(&mut self, timers: &mut T) {
        if let Some(handle) = self.timer.take() {
            timers.cancel(handle);
        }
    }

    /// Resolve the blast, dispatch one-shot effects, latch the terminal state
    /// and request destruction. Any call after the first is a silent no-op.
    pub fn detonate<W, H>(&mut self, world: &W, host: &mut H)
    where
        W: CollisionQuery,
        H: DamageSink + EffectSink + Despawn,
    {
        if self.state == DetonatorState::Detonated {
            log::debug!("detonator {:?}: redundant trigger ignored", self.entity);
            return;
        }
        self.state = DetonatorState::Detonated;

        match &self.config.damage_curve {
            Some(curve) => {
                let report = resolve_blast(
                    self.pos,
                    self.entity,
                    curve,
                    self.config.trace_mask,
                    self.config.occlusion,
                    world,
                    host,
                );
                log::debug!(
                    "detonator {:?}: damaged {}/{} candidates within r={}",
                    self.entity,
                    report.damaged,
                    report.candidates,
                    curve.blast_radius()
                );
            }
            None => {
                log::warn!(
                    "detonator {:?}: missing damage curve, no damage can be dealt",
                    self.entity
                );
            }
        }

        self.dispatch_effects(host);
        host.request_destroy(self.entity);
    }

    // One-shot SFX/VFX at the final position, detached from this entity so
    // playback outlives its destruction. VFX is gated on the sound branch.
    fn dispatch_effects<H: EffectSink>(&self, host: &mut H) {
        let Some(sound) = &self.config.sound else {
            return;
        };
        host.play_sound(
            sound.cue,
            self.pos,
            sound.volume,
            sound.pitch,
            sound.attenuation,
            sound.concurrency,
        );
        if let Some(vfx) = &self.config.vfx {
            host.spawn_visual_effect(vfx.effect, self.pos, Quat::IDENTITY, vfx.scale);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::scripted::{FixedTimers, RecordedEffects, ScriptedWorld};

    const GRENADE: EntityId = EntityId(999);

    fn armed_config() -> DetonatorConfig {
        DetonatorConfig {
            detonation_delay: 3.0,
            damage_curve: Some(FalloffCurve::linear(100.0, 500.0).unwrap()),
            sound: Some(SoundSettings::new(AssetId(1))),
            vfx: Some(VfxSettings::new(AssetId(2))),
            ..DetonatorConfig::default()
        }
    }

    #[test]
    fn test_scenario_blast_at_origin() {
        // Linear 100 -> 0 over 500, one clear candidate at distance 200:
        // one ~60 damage application, one sound, one VFX, one destroy.
        let mut world = ScriptedWorld::new();
        let target = world.add_pawn(Vec3::new(200.0, 0.0, 0.0), 40.0);
        let mut effects = RecordedEffects::new();

        let mut det = Detonator::new(
            GRENADE,
            Vec3::ZERO,
            DetonatorConfig { detonation_delay: 0.0, ..armed_config() },
        );
        let mut timers = FixedTimers::new();
        det.arm(&mut timers, &world, &mut effects);

        assert!(det.is_detonated());
        assert_eq!(effects.damage.len(), 1);
        assert!((effects.damage_to(target) - 60.0).abs() < 0.001);
        assert_eq!(effects.sounds.len(), 1);
        assert_eq!(effects.vfx.len(), 1);
        assert_eq!(effects.destroyed, vec![GRENADE]);
    }

    #[test]
    fn test_detonate_is_idempotent() {
        let mut world = ScriptedWorld::new();
        world.add_pawn(Vec3::new(200.0, 0.0, 0.0), 40.0);
        let mut effects = RecordedEffects::new();

        let mut det = Detonator::new(GRENADE, Vec3::ZERO, armed_config());
        det.detonate(&world, &mut effects);
        det.detonate(&world, &mut effects);

        assert_eq!(effects.damage.len(), 1);
        assert_eq!(effects.sounds.len(), 1);
        assert_eq!(effects.vfx.len(), 1);
        assert_eq!(effects.destroyed.len(), 1);
    }

    #[test]
    fn test_zero_delay_detonates_on_arm() {
        let world = ScriptedWorld::new();
        let mut effects = RecordedEffects::new();
        let mut timers = FixedTimers::new();

        let mut det = Detonator::new(
            GRENADE,
            Vec3::ZERO,
            DetonatorConfig { detonation_delay: 0.0, ..armed_config() },
        );
        det.arm(&mut timers, &world, &mut effects);

        assert!(det.is_detonated());
        assert_eq!(timers.pending_count(), 0);
        assert_eq!(det.remaining_time(&timers), 0.0);
    }

    #[test]
    fn test_countdown_runs_to_expiry() {
        let world = ScriptedWorld::new();
        let mut effects = RecordedEffects::new();
        let mut timers = FixedTimers::new();

        let mut det = Detonator::new(GRENADE, Vec3::ZERO, armed_config());
        det.arm(&mut timers, &world, &mut effects);
        assert!(!det.is_detonated());
        assert!((det.remaining_time(&timers) - 3.0).abs() < 1e-6);

        // Strictly decreasing until expiry, never firing early
        let mut previous = det.remaining_time(&timers);
        for _ in 0..2 {
            assert!(timers.advance(1.0).is_empty());
            let left = det.remaining_time(&timers);
            assert!(left < previous);
            assert!(!det.is_detonated());
            previous = left;
        }

        let expired = timers.advance(1.0);
        assert_eq!(expired.len(), 1);
        det.on_timer_fire(&world, &mut effects);

        assert!(det.is_detonated());
        assert_eq!(det.remaining_time(&timers), 0.0);
        assert_eq!(effects.sounds.len(), 1);
    }

    #[test]
    fn test_rearm_while_pending_is_a_noop() {
        let world = ScriptedWorld::new();
        let mut effects = RecordedEffects::new();
        let mut timers = FixedTimers::new();

        let mut det = Detonator::new(GRENADE, Vec3::ZERO, armed_config());
        det.arm(&mut timers, &world, &mut effects);
        det.arm(&mut timers, &world, &mut effects);

        assert_eq!(timers.pending_count(), 1);
    }

    #[test]
    fn test_destroy_before_expiry_releases_timer() {
        let world = ScriptedWorld::new();
        let mut effects = RecordedEffects::new();
        let mut timers = FixedTimers::new();

        let mut det = Detonator::new(GRENADE, Vec3::ZERO, armed_config());
        det.arm(&mut timers, &world, &mut effects);
        assert_eq!(timers.pending_count(), 1);

        det.on_destroy(&mut timers);
        assert_eq!(timers.pending_count(), 0);
        assert_eq!(det.remaining_time(&timers), 0.0);
    }

    #[test]
    fn test_early_detonate_keeps_timer_cancellable() {
        let world = ScriptedWorld::new();
        let mut effects = RecordedEffects::new();
        let mut timers = FixedTimers::new();

        let mut det = Detonator::new(GRENADE, Vec3::ZERO, armed_config());
        det.arm(&mut timers, &world, &mut effects);

        // Externally triggered before the countdown expires
        det.detonate(&world, &mut effects);
        assert!(det.is_detonated());
        assert_eq!(det.remaining_time(&timers), 0.0);

        // Teardown must still release the pending host countdown
        det.on_destroy(&mut timers);
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn test_missing_curve_skips_damage_only() {
        let mut world = ScriptedWorld::new();
        let bystander = world.add_pawn(Vec3::new(100.0, 0.0, 0.0), 40.0);
        let mut effects = RecordedEffects::new();

        let mut det = Detonator::new(
            GRENADE,
            Vec3::ZERO,
            DetonatorConfig { damage_curve: None, ..armed_config() },
        );
        det.detonate(&world, &mut effects);

        // Degraded but non-fatal: zero damage, effects and destruction proceed
        assert!(det.is_detonated());
        assert_eq!(effects.damage_to(bystander), 0.0);
        assert!(effects.damage.is_empty());
        assert_eq!(effects.sounds.len(), 1);
        assert_eq!(effects.vfx.len(), 1);
        assert_eq!(effects.destroyed, vec![GRENADE]);
    }

    #[test]
    fn test_vfx_gated_on_sound() {
        let world = ScriptedWorld::new();
        let mut effects = RecordedEffects::new();

        let mut det = Detonator::new(
            GRENADE,
            Vec3::ZERO,
            DetonatorConfig { sound: None, ..armed_config() },
        );
        det.detonate(&world, &mut effects);

        // No sound cue configured: neither sound nor VFX, destruction still
        // requested
        assert!(effects.sounds.is_empty());
        assert!(effects.vfx.is_empty());
        assert_eq!(effects.destroyed, vec![GRENADE]);
    }

    #[test]
    fn test_sound_without_vfx() {
        let world = ScriptedWorld::new();
        let mut effects = RecordedEffects::new();

        let mut det = Detonator::new(
            GRENADE,
            Vec3::ZERO,
            DetonatorConfig { vfx: None, ..armed_config() },
        );
        det.detonate(&world, &mut effects);

        assert_eq!(effects.sounds.len(), 1);
        assert!(effects.vfx.is_empty());
    }

    #[test]
    fn test_effect_parameters_carried_through() {
        let world = ScriptedWorld::new();
        let mut effects = RecordedEffects::new();

        let sound = SoundSettings {
            cue: AssetId(11),
            volume: 0.8,
            pitch: 1.2,
            attenuation: Some(AssetId(12)),
            concurrency: Some(AssetId(13)),
        };
        let vfx = VfxSettings { effect: AssetId(14), scale: Vec3::new(2.0, 1.0, 0.5) };
        let pos = Vec3::new(10.0, 20.0, 30.0);

        let mut det = Detonator::new(
            GRENADE,
            pos,
            DetonatorConfig { sound: Some(sound), vfx: Some(vfx), ..armed_config() },
        );
        det.detonate(&world, &mut effects);

        let played = &effects.sounds[0];
        assert_eq!(played.cue, AssetId(11));
        assert_eq!(played.position, pos);
        assert_eq!(played.volume, 0.8);
        assert_eq!(played.pitch, 1.2);
        assert_eq!(played.attenuation, Some(AssetId(12)));
        assert_eq!(played.concurrency, Some(AssetId(13)));

        let spawned = &effects.vfx[0];
        assert_eq!(spawned.effect, AssetId(14));
        assert_eq!(spawned.position, pos);
        assert_eq!(spawned.rotation, Quat::IDENTITY);
        assert_eq!(spawned.scale, Vec3::new(2.0, 1.0, 0.5));
    }

    #[test]
    fn test_blast_radius_follows_curve() {
        let mut det = Detonator::new(GRENADE, Vec3::ZERO, armed_config());
        assert_eq!(det.blast_radius(), 500.0);

        det.set_damage_curve(Some(FalloffCurve::linear(50.0, 250.0).unwrap()));
        assert_eq!(det.blast_radius(), 250.0);

        det.set_damage_curve(None);
        assert_eq!(det.blast_radius(), 0.0);
    }

    #[test]
    fn test_curve_edit_ignored_after_detonation() {
        let world = ScriptedWorld::new();
        let mut effects = RecordedEffects::new();

        let mut det = Detonator::new(GRENADE, Vec3::ZERO, armed_config());
        det.detonate(&world, &mut effects);

        det.set_damage_curve(None);
        assert_eq!(det.blast_radius(), 500.0);
    }
}
