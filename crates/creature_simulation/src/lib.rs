//! Creature Simulation Core
//!
//! Per-creature combat & motion controller на Bevy 0.16 ECS.
//!
//! HYBRID ARCHITECTURE:
//! - Ядро = правила (health, stun, knockback arcs, buffs, hitbox selection)
//! - Движок = collaborators (физика, рендер, анимации, overlap detection)
//!
//! Headless режим (`headless`) заменяет движок in-memory collaborators
//! и polygon contact resolver для тестов и `main.rs`.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod behaviors;
pub mod combat;
pub mod components;
pub mod creature;
pub mod headless;
pub mod logger;

// Re-export основных типов для удобства
pub use behaviors::{sparring_hitboxes, Rival, Sparring, SparringPlugin};
pub use combat::{
    AirRequest, BuffEffect, CreatureDied, HitConfirmed, HitData, HitLanded, HitboxDef,
    HitboxError, Landing, KNOCKBACK_AIR_DURATION, KNOCKBACK_PRIORITY, MIN_STUN_DURATION,
};
pub use components::{Health, StatBlock};
pub use creature::{Collaborators, Creature, CreatureBehavior, CreatureConfig, CreaturePlugin};
pub use headless::{spawn_headless_creature, HeadlessPlugin, HeadlessRig, RigProbes};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, log_with_level, set_log_level,
    set_logger, set_logger_if_needed, LogLevel, LogPrinter,
};

/// Частота симуляции (FixedUpdate)
pub const SIMULATION_HZ: f64 = 60.0;

/// Главный plugin симуляции (timestep + RNG)
///
/// Creature системы добавляются отдельно: `CreaturePlugin::<B>` на каждый
/// behavior тип.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
            // Детерминистичный RNG (seed по умолчанию)
            .insert_resource(DeterministicRng::new(42));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Каждый `app.update()` продвигает время ровно на один fixed tick,
/// поэтому прогоны с одинаковым seed побайтно совпадают.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins((MinimalPlugins, SimulationPlugin))
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / SIMULATION_HZ,
        )));

    app
}

/// Snapshot существ типа `B` для сравнения детерминизма
pub fn creature_snapshot<B: CreatureBehavior>(world: &mut World) -> Vec<u8> {
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &Creature<B>)>();
    let mut creatures: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    creatures.sort_by_key(|(entity, _)| entity.index());

    for (entity, creature) in creatures {
        let position = creature.position();
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(&creature.hp().to_le_bytes());
        snapshot.extend_from_slice(&position.x.to_le_bytes());
        snapshot.extend_from_slice(&position.y.to_le_bytes());
        snapshot.extend_from_slice(&creature.stats().speed_mod.to_le_bytes());
        snapshot.push(creature.is_dead() as u8);
        snapshot.push(creature.is_airborne() as u8);
        snapshot.push(creature.flipped as u8);
    }

    snapshot
}
