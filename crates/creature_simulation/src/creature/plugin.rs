//! ECS integration: Creature<B> как component + системы в FixedUpdate
//!
//! Порядок выполнения (chain):
//! 1. tick_creatures: buffs, air/AI, landing callbacks
//! 2. apply_incoming_hits: HitLanded → get_hit → HitConfirmed
//! 3. notify_attackers: HitConfirmed → on_hit на атакующем
//!
//! Внешний combat resolution (движок или headless resolver) пишет HitLanded
//! до FixedUpdate этого фрейма или в предыдущем фрейме.

use std::marker::PhantomData;

use bevy::prelude::*;

use super::{Creature, CreatureBehavior};
use crate::combat::{CreatureDied, HitConfirmed, HitLanded};
use crate::logger;

/// Creature Plugin для конкретного behavior типа
///
/// Можно добавить несколько раз с разными `B` (player + enemies):
/// события регистрируются идемпотентно.
pub struct CreaturePlugin<B: CreatureBehavior>(PhantomData<B>);

impl<B: CreatureBehavior> Default for CreaturePlugin<B> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<B: CreatureBehavior> Plugin for CreaturePlugin<B> {
    fn build(&self, app: &mut App) {
        app.add_event::<HitLanded>()
            .add_event::<HitConfirmed>()
            .add_event::<CreatureDied>();

        app.add_systems(
            FixedUpdate,
            (
                tick_creatures::<B>,
                apply_incoming_hits::<B>,
                notify_attackers::<B>,
            )
                .chain(), // Последовательное выполнение для детерминизма
        );
    }
}

/// Система: per-frame tick всех существ типа `B`
///
/// Death transition происходит внутри landing callback → детектим переход
/// false → true и шлём CreatureDied ровно один раз.
pub fn tick_creatures<B: CreatureBehavior>(
    time: Res<Time<Fixed>>,
    mut creatures: Query<(Entity, &mut Creature<B>)>,
    mut died_events: EventWriter<CreatureDied>,
) {
    let delta = time.delta_secs();

    for (entity, mut creature) in creatures.iter_mut() {
        let was_dead = creature.is_dead();
        creature.tick(delta);

        if !was_dead && creature.is_dead() {
            died_events.write(CreatureDied { entity });
            logger::log_info(&format!("Entity {:?} died", entity));
        }
    }
}

/// Система: HitLanded → `Creature::get_hit`
///
/// События для других behavior типов пропускаются молча (их читает
/// свой экземпляр системы).
pub fn apply_incoming_hits<B: CreatureBehavior>(
    mut hit_events: EventReader<HitLanded>,
    mut creatures: Query<&mut Creature<B>>,
    mut confirmed_events: EventWriter<HitConfirmed>,
    mut died_events: EventWriter<CreatureDied>,
) {
    for event in hit_events.read() {
        let Ok(mut target) = creatures.get_mut(event.target) else {
            continue;
        };

        let was_dead = target.is_dead();
        if !target.get_hit(event.hit.clone()) {
            logger::log(&format!(
                "Hit on {:?} ignored (dead or vetoed)",
                event.target
            ));
            continue;
        }

        confirmed_events.write(HitConfirmed {
            attacker: event.hit.source.attacker,
            target: event.target,
        });

        if !was_dead && target.is_dead() {
            died_events.write(CreatureDied {
                entity: event.target,
            });
        }
    }
}

/// Система: HitConfirmed → `CreatureBehavior::on_hit` на атакующем
pub fn notify_attackers<B: CreatureBehavior>(
    mut confirmed_events: EventReader<HitConfirmed>,
    mut creatures: Query<&mut Creature<B>>,
) {
    for event in confirmed_events.read() {
        if let Ok(mut attacker) = creatures.get_mut(event.attacker) {
            attacker.notify_hit_confirmed(event.target);
        }
    }
}
