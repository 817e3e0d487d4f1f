//! Combat события (ECS слой)

use bevy::prelude::*;

use super::hitbox::HitData;

/// Событие: hitbox атакующего пересёкся с target
///
/// Пишется внешним combat resolution (движок или headless resolver).
/// Потребляется `apply_incoming_hits` → `Creature::get_hit`.
#[derive(Event, Debug, Clone)]
pub struct HitLanded {
    pub target: Entity,
    pub hit: HitData,
}

/// Событие: попадание принято target'ом (не вето, не мёртв)
///
/// Используется для `CreatureBehavior::on_hit` на стороне атакующего.
#[derive(Event, Debug, Clone)]
pub struct HitConfirmed {
    pub attacker: Entity,
    pub target: Entity,
}

/// Событие: существо умерло (death flag false → true)
#[derive(Event, Debug, Clone)]
pub struct CreatureDied {
    pub entity: Entity,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::HitSource;

    #[test]
    fn test_hit_landed_event() {
        let event = HitLanded {
            target: Entity::PLACEHOLDER,
            hit: HitData {
                damage: 15,
                knockback_power: 2.0,
                stun_duration: 0.3,
                attacker_position: Vec2::ZERO,
                knockback_direction: Vec2::X,
                source: HitSource {
                    attacker: Entity::PLACEHOLDER,
                    phase: 1,
                },
            },
        };

        assert_eq!(event.hit.damage, 15);
        assert_eq!(event.hit.source.phase, 1);
    }
}
