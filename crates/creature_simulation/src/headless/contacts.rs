//! Headless contact resolution: armed hitbox polygon vs позиция цели
//!
//! Одна цель получает не больше одного HitLanded за одно "вооружение"
//! hitbox (пока `ArmedHitbox` не сменится или не снимется).

use bevy::prelude::*;

use crate::combat::{ArmedHitbox, HitLanded};
use crate::creature::{Creature, CreatureBehavior};

/// Кого уже задел текущий hitbox атакующего
#[derive(Component, Debug, Default, Clone)]
pub struct ContactMemory {
    armed: Option<ArmedHitbox>,
    struck: Vec<Entity>,
}

impl ContactMemory {
    /// Синхронизировать с текущим hitbox (смена → память сбрасывается)
    pub fn observe(&mut self, armed: Option<ArmedHitbox>) {
        if self.armed != armed {
            self.armed = armed;
            self.struck.clear();
        }
    }

    /// `true` если target ещё не задет этим hitbox (и теперь запомнен)
    pub fn register(&mut self, target: Entity) -> bool {
        if self.struck.contains(&target) {
            return false;
        }
        self.struck.push(target);
        true
    }

    pub fn struck(&self) -> &[Entity] {
        &self.struck
    }
}

/// Система: overlap armed hitbox → HitLanded
///
/// Резолвит контакты только между существами одного behavior типа `B`.
pub fn resolve_contacts<B: CreatureBehavior>(
    mut attackers: Query<(Entity, &Creature<B>, &mut ContactMemory)>,
    targets: Query<(Entity, &Creature<B>)>,
    mut hit_events: EventWriter<HitLanded>,
) {
    for (attacker, creature, mut memory) in attackers.iter_mut() {
        let armed = if creature.is_dead() {
            None
        } else {
            creature.armed()
        };
        memory.observe(armed);

        if armed.is_none() {
            continue;
        }
        let Some(entry) = creature.armed_hitbox() else {
            continue;
        };

        for (target, victim) in targets.iter() {
            if target == attacker || victim.is_dead() {
                continue;
            }
            if !entry.contains(creature.position(), victim.position()) {
                continue;
            }
            if !memory.register(target) {
                continue;
            }

            if let Some(hit) = creature.strike(attacker, victim.position()) {
                hit_events.write(HitLanded { target, hit });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_resets_on_rearm() {
        let mut memory = ContactMemory::default();
        let target = Entity::from_raw(4);
        let jab = ArmedHitbox {
            phase: 0,
            flipped: false,
        };

        memory.observe(Some(jab));
        assert!(memory.register(target));
        assert!(!memory.register(target));

        // Тот же hitbox → память сохраняется
        memory.observe(Some(jab));
        assert!(!memory.register(target));

        // Снят и заново вооружён → новая атака
        memory.observe(None);
        memory.observe(Some(jab));
        assert!(memory.register(target));
    }

    #[test]
    fn test_memory_resets_on_facing_change() {
        let mut memory = ContactMemory::default();
        let target = Entity::from_raw(9);

        memory.observe(Some(ArmedHitbox {
            phase: 1,
            flipped: false,
        }));
        memory.register(target);

        memory.observe(Some(ArmedHitbox {
            phase: 1,
            flipped: true,
        }));
        assert!(memory.struck().is_empty());
    }
}
