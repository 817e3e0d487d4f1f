//! Derived combat/movement modifiers
//!
//! StatBlock никогда не патчится при снятии баффа, только полный
//! пересчёт из активных баффов (см. `combat::buffs::BuffEngine`).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Живой набор модификаторов, пересчитываемый из баффов
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct StatBlock {
    /// Slow-эффекты игнорируются
    pub slow_immune: bool,
    /// Множитель скорости движения (1.0 = без изменений)
    pub speed_mod: f32,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            slow_immune: false,
            speed_mod: 1.0,
        }
    }
}

impl StatBlock {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn effective_speed(&self, base_speed: f32) -> f32 {
        base_speed * self.speed_mod
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_block_defaults() {
        let stats = StatBlock::default();
        assert!(!stats.slow_immune);
        assert_eq!(stats.speed_mod, 1.0);
        assert_eq!(stats.effective_speed(2.0), 2.0);
    }

    #[test]
    fn test_stat_block_reset() {
        let mut stats = StatBlock {
            slow_immune: true,
            speed_mod: 0.25,
        };
        assert_eq!(stats.effective_speed(4.0), 1.0);

        stats.reset();
        assert_eq!(stats, StatBlock::default());
    }
}
