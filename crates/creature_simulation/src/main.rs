//! Headless спарринг двух существ
//!
//! Запускает Bevy App без рендера: 1000 тиков, отчёт каждые 100.

use bevy::prelude::*;
use rand::Rng;
use creature_simulation::{
    create_headless_app, creature_snapshot, log_error, log_info, spawn_headless_creature,
    sparring_hitboxes, Creature, CreatureConfig, CreaturePlugin, DeterministicRng,
    HeadlessPlugin, Rival, Sparring, SparringPlugin,
};

fn main() {
    let seed = 42;
    println!("Starting creature sparring simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins((
        CreaturePlugin::<Sparring>::default(),
        HeadlessPlugin::<Sparring>::default(),
        SparringPlugin,
    ));

    let left_home = Vec2::new(-0.5, 0.0);
    let right_home = Vec2::new(0.5, 0.0);
    let (left_seed, right_seed) = {
        let mut rng = app.world_mut().resource_mut::<DeterministicRng>();
        (rng.rng.gen::<u64>(), rng.rng.gen::<u64>())
    };

    let fighters = [
        (Sparring::new(left_seed, left_home, right_home), left_home),
        (Sparring::new(right_seed, right_home, left_home), right_home),
    ];
    let mut entities = Vec::with_capacity(fighters.len());
    for (behavior, home) in fighters {
        match spawn_headless_creature(
            app.world_mut(),
            behavior,
            CreatureConfig::default(),
            sparring_hitboxes(),
            home,
        ) {
            Ok((entity, _)) => entities.push(entity),
            Err(err) => {
                log_error(&format!("Failed to spawn fighter: {}", err));
                return;
            }
        }
    }
    // Каждый следит за другим
    if let [left, right] = entities[..] {
        app.world_mut().entity_mut(left).insert(Rival(right));
        app.world_mut().entity_mut(right).insert(Rival(left));
    }

    // Запускаем 1000 тиков симуляции
    for tick in 0..1000 {
        app.update();

        if tick % 100 == 0 {
            let mut query = app.world_mut().query::<&Creature<Sparring>>();
            let report: Vec<String> = query
                .iter(app.world())
                .map(|c| {
                    format!(
                        "hp {}/{} swings {} hits {}{}",
                        c.hp(),
                        c.health().max,
                        c.behavior.swings,
                        c.behavior.hits_landed,
                        if c.is_dead() { " (dead)" } else { "" }
                    )
                })
                .collect();
            println!("Tick {}: {}", tick, report.join(" | "));
        }
    }

    let snapshot = creature_snapshot::<Sparring>(app.world_mut());
    log_info(&format!("Final snapshot: {} bytes", snapshot.len()));
    println!("Simulation complete!");
}
