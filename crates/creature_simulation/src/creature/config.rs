//! Параметры существа (data-driven setup)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Статические параметры существа
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct CreatureConfig {
    pub max_hp: u32,
    /// Базовая скорость (units/sec), умножается на `StatBlock::speed_mod`
    pub base_speed: f32,
    /// Вертикальный offset health bar над существом
    pub health_bar_offset: f32,
    /// Пиковая высота knockback дуги
    pub knockback_height: f32,
}

impl Default for CreatureConfig {
    fn default() -> Self {
        Self {
            max_hp: 100,
            base_speed: 2.0,
            health_bar_offset: 0.6,
            knockback_height: 0.25,
        }
    }
}
