//! Scripted in-memory host for deterministic tests and the demo driver
//!
//! Entities are spheres. Overlap queries return the pawn-like entities whose
//! sphere touches the blast sphere (the pawn pre-filter lives host-side, as
//! it would in a real trigger-volume setup); segment traces return every
//! entity sphere crossing the segment, ordered by entry distance. Damage,
//! sound, VFX and destroy requests are recorded for inspection.

use glam::{Quat, Vec3};

use super::{
    AssetId, Candidate, CollisionQuery, DamageSink, Despawn, EffectSink, EntityId, TimerHandle,
    TimerService, TraceHit, TraceMask,
};

/// A sphere-shaped scripted entity
#[derive(Debug, Clone)]
pub struct ScriptedEntity {
    pub id: EntityId,
    pub pos: Vec3,
    pub radius: f32,
    pub pawn_like: bool,
    /// Channels this entity answers to in segment traces
    pub channels: TraceMask,
}

/// Scripted collision world
#[derive(Debug, Default)]
pub struct ScriptedWorld {
    entities: Vec<ScriptedEntity>,
    next_id: u32,
}

impl ScriptedWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pawn-like sphere on the blast channel
    pub fn add_pawn(&mut self, pos: Vec3, radius: f32) -> EntityId {
        self.add(pos, radius, true, TraceMask::BLAST)
    }

    /// Add solid, blast-blocking geometry. Walls also answer on the world
    /// channel, so geometry-only traces skip pawns.
    pub fn add_wall(&mut self, pos: Vec3, radius: f32) -> EntityId {
        self.add(pos, radius, false, TraceMask(TraceMask::BLAST.0 | TraceMask::WORLD.0))
    }

    fn add(&mut self, pos: Vec3, radius: f32, pawn_like: bool, channels: TraceMask) -> EntityId {
        self.next_id += 1;
        let id = EntityId(self.next_id);
        self.entities.push(ScriptedEntity { id, pos, radius, pawn_like, channels });
        id
    }

    pub fn entity(&self, id: EntityId) -> Option<&ScriptedEntity> {
        self.entities.iter().find(|e| e.id == id)
    }
}

/// Entry distance of the segment `from -> to` into a sphere, if it crosses it
fn segment_sphere_entry(from: Vec3, to: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let delta = to - from;
    let len = delta.length();
    if len <= f32::EPSILON {
        return (from.distance(center) <= radius).then_some(0.0);
    }
    let dir = delta / len;
    let m = from - center;
    // Segment start inside the sphere counts as an immediate hit
    if m.length_squared() <= radius * radius {
        return Some(0.0);
    }
    let b = m.dot(dir);
    let c = m.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0 && t <= len).then_some(t)
}

impl CollisionQuery for ScriptedWorld {
    fn query_overlaps(&self, center: Vec3, radius: f32) -> Vec<Candidate> {
        self.entities
            .iter()
            .filter(|e| e.pawn_like)
            .filter(|e| e.pos.distance(center) <= radius + e.radius)
            .map(|e| Candidate { entity: e.id, pos: e.pos, pawn_like: e.pawn_like })
            .collect()
    }

    fn trace_segment(
        &self,
        from: Vec3,
        to: Vec3,
        mask: TraceMask,
        ignore: &[EntityId],
    ) -> Vec<TraceHit> {
        let mut hits: Vec<(f32, TraceHit)> = Vec::new();
        for e in &self.entities {
            if !e.channels.overlaps(mask) || ignore.contains(&e.id) {
                continue;
            }
            if let Some(t) = segment_sphere_entry(from, to, e.pos, e.radius) {
                hits.push((t, TraceHit { entity: Some(e.id), pawn_like: e.pawn_like }));
            }
        }
        hits.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        hits.into_iter().map(|(_, hit)| hit).collect()
    }
}

/// One recorded damage application
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    pub target: EntityId,
    pub amount: f32,
    pub source: EntityId,
}

/// One recorded detached sound playback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundEvent {
    pub cue: AssetId,
    pub position: Vec3,
    pub volume: f32,
    pub pitch: f32,
    pub attenuation: Option<AssetId>,
    pub concurrency: Option<AssetId>,
}

/// One recorded detached visual-effect spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VfxEvent {
    pub effect: AssetId,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

/// Records every side effect a detonation dispatches
#[derive(Debug, Default)]
pub struct RecordedEffects {
    pub damage: Vec<DamageEvent>,
    pub sounds: Vec<SoundEvent>,
    pub vfx: Vec<VfxEvent>,
    pub destroyed: Vec<EntityId>,
}

impl RecordedEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total damage applied to one entity across the recording
    pub fn damage_to(&self, target: EntityId) -> f32 {
        self.damage
            .iter()
            .filter(|d| d.target == target)
            .map(|d| d.amount)
            .sum()
    }
}

impl DamageSink for RecordedEffects {
    fn apply_damage(&mut self, target: EntityId, amount: f32, source: EntityId) {
        self.damage.push(DamageEvent { target, amount, source });
    }
}

impl EffectSink for RecordedEffects {
    fn play_sound(
        &mut self,
        cue: AssetId,
        position: Vec3,
        volume: f32,
        pitch: f32,
        attenuation: Option<AssetId>,
        concurrency: Option<AssetId>,
    ) {
        self.sounds.push(SoundEvent { cue, position, volume, pitch, attenuation, concurrency });
    }

    fn spawn_visual_effect(&mut self, effect: AssetId, position: Vec3, rotation: Quat, scale: Vec3) {
        self.vfx.push(VfxEvent { effect, position, rotation, scale });
    }
}

impl Despawn for RecordedEffects {
    fn request_destroy(&mut self, entity: EntityId) {
        self.destroyed.push(entity);
    }
}

/// Fixed-step timer service: `advance(dt)` counts pending one-shots down and
/// hands back the handles that expired during the step.
#[derive(Debug, Default)]
pub struct FixedTimers {
    pending: Vec<(TimerHandle, f32)>,
    next_handle: u64,
}

impl FixedTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step all pending countdowns by `dt` seconds
    pub fn advance(&mut self, dt: f32) -> Vec<TimerHandle> {
        let mut expired = Vec::new();
        for (handle, left) in &mut self.pending {
            *left -= dt;
            if *left <= 0.0 {
                expired.push(*handle);
            }
        }
        self.pending.retain(|(_, left)| *left > 0.0);
        expired
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl TimerService for FixedTimers {
    fn schedule_once(&mut self, delay_seconds: f32) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.pending.push((handle, delay_seconds.max(0.0)));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|(h, _)| *h != handle);
    }

    fn time_remaining(&self, handle: TimerHandle) -> f32 {
        self.pending
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, left)| left.max(0.0))
            .unwrap_or(0.0)
    }
}
