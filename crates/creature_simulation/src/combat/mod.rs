//! Combat module: hit resolution, knockback arcs, buffs, hitboxes
//!
//! Ответственность ядра:
//! - Правила: damage, stun floor, knockback priority, buff recompute
//! - События: HitLanded, HitConfirmed, CreatureDied
//!
//! Ответственность движка (collaborators):
//! - Реальное перемещение и overlap detection
//! - Анимации, спрайты, health bar

pub mod air;
pub mod buffs;
pub mod events;
pub mod hitbox;

pub use air::{AirMotion, AirRequest, AirState, AirStep, Landing};
pub use buffs::{BuffEffect, BuffEngine, BuffTimer};
pub use events::{CreatureDied, HitConfirmed, HitLanded};
pub use hitbox::{
    ArmedHitbox, HitData, HitSource, HitboxDef, HitboxEntry, HitboxError, HitboxPhase, HitboxSet,
};

/// Приоритет knockback дуги (прыжки и т.п. обычно ниже)
pub const KNOCKBACK_PRIORITY: i32 = 1;
/// Длительность knockback полёта (секунды)
pub const KNOCKBACK_AIR_DURATION: f32 = 0.25;
/// Минимальный stun (hit reaction всегда видна)
pub const MIN_STUN_DURATION: f32 = 0.1;
