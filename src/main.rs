//! Demo driver: arms a grenade in a scripted world and logs what the blast
//! does to candidates in the open, behind cover, and behind other pawns.
//!
//! Run with `RUST_LOG=debug` to see the resolution summary and warnings.

use glam::Vec3;

use blastwave::host::scripted::{FixedTimers, RecordedEffects, ScriptedWorld};
use blastwave::{
    AssetId, Detonator, DetonatorConfig, EntityId, FalloffCurve, SoundSettings, VfxSettings,
};

const TICK_DT: f32 = 0.5;

fn main() {
    env_logger::init();

    let mut world = ScriptedWorld::new();
    // One pawn in the open, one behind a wall, one screened by another pawn
    let open = world.add_pawn(Vec3::new(200.0, 0.0, 0.0), 40.0);
    let covered = world.add_pawn(Vec3::new(0.0, 300.0, 0.0), 40.0);
    world.add_wall(Vec3::new(0.0, 150.0, 0.0), 50.0);
    let screen = world.add_pawn(Vec3::new(-150.0, 0.0, 0.0), 40.0);
    let screened = world.add_pawn(Vec3::new(-350.0, 0.0, 0.0), 40.0);

    let grenade = EntityId(1000);
    let config = DetonatorConfig {
        detonation_delay: 3.0,
        damage_curve: Some(
            FalloffCurve::linear(100.0, 500.0).expect("linear ramp is a valid curve"),
        ),
        sound: Some(SoundSettings::new(AssetId(1))),
        vfx: Some(VfxSettings::new(AssetId(2))),
        ..DetonatorConfig::default()
    };

    match serde_json::to_string_pretty(&config) {
        Ok(json) => log::debug!("grenade config:\n{json}"),
        Err(err) => log::warn!("config not serializable: {err}"),
    }

    let mut det = Detonator::new(grenade, Vec3::ZERO, config);
    let mut timers = FixedTimers::new();
    let mut effects = RecordedEffects::new();

    det.arm(&mut timers, &world, &mut effects);
    log::info!(
        "armed grenade {:?}: blast radius {}, detonation in {:.1}s",
        det.entity(),
        det.blast_radius(),
        det.remaining_time(&timers)
    );

    while !det.is_detonated() {
        let expired = timers.advance(TICK_DT);
        if expired.is_empty() {
            log::info!("tick: {:.1}s remaining", det.remaining_time(&timers));
        } else {
            det.on_timer_fire(&world, &mut effects);
        }
    }

    for (name, id) in [("open", open), ("covered", covered), ("screen", screen), ("screened", screened)] {
        log::info!("{name} pawn {id:?} took {:.1} damage", effects.damage_to(id));
    }
    log::info!(
        "dispatched {} sound event(s), {} VFX event(s), {} destroy request(s)",
        effects.sounds.len(),
        effects.vfx.len(),
        effects.destroyed.len()
    );
}
