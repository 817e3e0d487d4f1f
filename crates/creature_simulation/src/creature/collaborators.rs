//! Внешние collaborators существа
//!
//! Ядро только отдаёт команды и читает позицию назад:
//! - MovementController: реальное перемещение + collision response
//! - CreatureRenderer: спрайты (flip, tint, sorting, visual position)
//! - AnimationGraph: параметры анимаций (см. `signals::AnimationSignals`)
//! - CollisionShapes: hurtbox + polygon hitbox
//! - HealthDisplay: UI health bar
//!
//! Все collaborators инжектятся уже созданными (`Collaborators`),
//! ядро ничего не инстанцирует само.

use bevy::prelude::*;

/// Цвет спрайтов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tint {
    #[default]
    Normal,
    /// Hit flash после попадания
    Damaged,
}

/// Физическое перемещение (движок двигает, ядро командует)
pub trait MovementController: Send + Sync {
    fn position(&self) -> Vec2;
    fn set_velocity(&mut self, velocity: Vec2);
    fn set_collision_enabled(&mut self, enabled: bool);
    /// Освободить ресурсы движка. Вызывается не более одного раза.
    fn release(&mut self);
}

pub trait CreatureRenderer: Send + Sync {
    fn set_flipped(&mut self, flipped: bool);
    fn set_tint(&mut self, tint: Tint);
    fn set_visible(&mut self, visible: bool);
    fn set_sort_order(&mut self, order: i32);
    /// Sorting layer "в воздухе" (поверх стен)
    fn set_air_layer(&mut self, airborne: bool);
    /// Визуальная позиция = позиция тела + air offset
    fn set_position(&mut self, position: Vec2);
    fn release(&mut self);
}

/// Один animation graph с набором объявленных параметров
pub trait AnimationGraph: Send + Sync {
    fn parameters(&self) -> Vec<String>;
    fn set_bool(&mut self, name: &str, value: bool);
    fn set_int(&mut self, name: &str, value: i32);
    fn set_float(&mut self, name: &str, value: f32);
    fn set_trigger(&mut self, name: &str);
    fn reset_trigger(&mut self, name: &str);
}

pub trait CollisionShapes: Send + Sync {
    /// Hurtbox тела (отключается при смерти)
    fn set_hurtbox_enabled(&mut self, enabled: bool);
    fn arm_hitbox(&mut self, points: &[Vec2]);
    fn disarm_hitbox(&mut self);
}

pub trait HealthDisplay: Send + Sync {
    /// fraction ∈ [0, 1]
    fn set_health_fraction(&mut self, fraction: f32);
    /// Вертикальный offset над существом
    fn set_offset(&mut self, offset: f32);
    fn release(&mut self);
}

/// Набор collaborators для `Creature::new`
pub struct Collaborators {
    pub movement: Box<dyn MovementController>,
    pub renderer: Box<dyn CreatureRenderer>,
    pub shapes: Box<dyn CollisionShapes>,
    pub health_display: Box<dyn HealthDisplay>,
    pub animation_graphs: Vec<Box<dyn AnimationGraph>>,
}
