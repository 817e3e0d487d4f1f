//! Hitbox система для combat
//!
//! Архитектура:
//! - HitboxDef приходят извне (data-driven), порядок: unflipped, затем flipped
//! - При setup пары сворачиваются в явный two-key lookup (phase, facing)
//! - Активен максимум один hitbox (`ArmedHitbox`), коллизию считает движок
//! - Попадание описывается `HitData` и потребляется ровно один раз

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Внешнее описание hitbox (одна сторона одной фазы)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitboxDef {
    pub damage: u32,
    pub knockback_power: f32,
    pub stun_duration: f32,
    /// Если задано, переопределяет направление "от атакующего"
    pub forced_direction: Option<Vec2>,
    /// Полигон в локальных координатах атакующего
    pub points: Vec<Vec2>,
}

/// Immutable hitbox после setup
#[derive(Debug, Clone, PartialEq)]
pub struct HitboxEntry {
    pub damage: u32,
    pub knockback_power: f32,
    pub stun_duration: f32,
    pub forced_direction: Option<Vec2>,
    pub points: Vec<Vec2>,
}

impl From<HitboxDef> for HitboxEntry {
    fn from(def: HitboxDef) -> Self {
        Self {
            damage: def.damage,
            knockback_power: def.knockback_power,
            stun_duration: def.stun_duration,
            forced_direction: def.forced_direction,
            points: def.points,
        }
    }
}

impl HitboxEntry {
    /// Point-in-polygon (even-odd), полигон смещён в `origin`
    pub fn contains(&self, origin: Vec2, point: Vec2) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }

        let p = point - origin;
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > p.y) != (b.y > p.y) {
                let cross_x = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                if p.x < cross_x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

/// Обе стороны одной attack phase
#[derive(Debug, Clone, PartialEq)]
pub struct HitboxPhase {
    pub unflipped: HitboxEntry,
    pub flipped: HitboxEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HitboxError {
    #[error("hitbox definitions must come in unflipped/flipped pairs, got {count}")]
    UnpairedDefinition { count: usize },
}

/// Набор hitbox существа, индексированный (phase, facing)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitboxSet {
    phases: Vec<HitboxPhase>,
}

impl HitboxSet {
    /// Собрать из списка, где unflipped сразу за ним flipped
    pub fn from_defs(defs: Vec<HitboxDef>) -> Result<Self, HitboxError> {
        if defs.len() % 2 != 0 {
            return Err(HitboxError::UnpairedDefinition { count: defs.len() });
        }

        let mut phases = Vec::with_capacity(defs.len() / 2);
        let mut defs = defs.into_iter();
        while let (Some(unflipped), Some(flipped)) = (defs.next(), defs.next()) {
            phases.push(HitboxPhase {
                unflipped: unflipped.into(),
                flipped: flipped.into(),
            });
        }

        Ok(Self { phases })
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn get(&self, phase: usize, flipped: bool) -> Option<&HitboxEntry> {
        self.phases.get(phase).map(|p| {
            if flipped {
                &p.flipped
            } else {
                &p.unflipped
            }
        })
    }
}

/// Какой hitbox сейчас активен
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedHitbox {
    pub phase: usize,
    pub flipped: bool,
}

/// Источник попадания (кто и какой фазой)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitSource {
    pub attacker: Entity,
    pub phase: usize,
}

/// Попадание: создаётся combat resolution, потребляется `Creature::get_hit`
#[derive(Debug, Clone, PartialEq)]
pub struct HitData {
    pub damage: u32,
    pub knockback_power: f32,
    pub stun_duration: f32,
    pub attacker_position: Vec2,
    pub knockback_direction: Vec2,
    pub source: HitSource,
}

impl HitData {
    /// Попадание из hitbox entry
    ///
    /// Направление: forced direction если задано, иначе attacker → target.
    pub fn from_entry(
        entry: &HitboxEntry,
        source: HitSource,
        attacker_position: Vec2,
        target_position: Vec2,
    ) -> Self {
        let knockback_direction = entry
            .forced_direction
            .unwrap_or(target_position - attacker_position);

        Self {
            damage: entry.damage,
            knockback_power: entry.knockback_power,
            stun_duration: entry.stun_duration,
            attacker_position,
            knockback_direction,
            source,
        }
    }

    /// Knockback velocity для air request
    pub fn knockback_velocity(&self) -> Vec2 {
        self.knockback_direction.normalize_or_zero() * self.knockback_power
    }
}
