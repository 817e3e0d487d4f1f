//! Creature: combat & motion state machine одного существа.
//!
//! # Architecture
//!
//! **Core (this module):**
//! - Health, death flag, stun, facing
//! - `BuffEngine` (StatBlock), `AirMotion` (knockback/jump arcs), `HitboxSet`
//! - Per-frame `tick` and synchronous `get_hit`
//!
//! **Collaborators (engine side):**
//! - Movement, rendering, animation graphs, collision shapes, health bar
//!
//! **Behavior hooks (`CreatureBehavior`):**
//! - AI, hit veto, hitbox adjustment, on-hit, death, death-idle, landing
//!
//! # Tick order
//!
//! ```text
//! dead? → on_death_idle, return
//!   ↓
//! buffs age (StatBlock recompute on expiry)
//!   ↓
//! visual sync (isMoving, position, sort order, flip)
//!   ↓
//! airborne? → air advance (offset or landing) : ai hook
//!   ↓
//! cached position ← movement collaborator
//! ```

use bevy::prelude::*;

pub mod collaborators;
pub mod config;
pub mod plugin;
pub mod signals;

#[cfg(test)]
mod creature_tests;

pub use collaborators::*;
pub use config::CreatureConfig;
pub use plugin::{apply_incoming_hits, notify_attackers, tick_creatures, CreaturePlugin};
pub use signals::AnimationSignals;

use crate::combat::{
    AirMotion, AirRequest, AirStep, ArmedHitbox, BuffEffect, BuffEngine, HitData, HitSource,
    HitboxDef, HitboxEntry, HitboxError, HitboxSet, Landing, KNOCKBACK_AIR_DURATION,
    KNOCKBACK_PRIORITY, MIN_STUN_DURATION,
};
use crate::components::{Health, StatBlock};
use crate::logger;

/// Переопределяемые hooks существа.
///
/// Hooks принимают всё существо целиком, поэтому могут вызывать
/// `set_hitbox`, `add_buff`, `request_air` и т.д. Состояние behavior
/// лежит в `creature.behavior`.
pub trait CreatureBehavior: Send + Sync + Sized + 'static {
    /// AI/input на каждый тик (только на земле и живым).
    fn ai(_creature: &mut Creature<Self>, _delta: f32) {}

    /// Вето перед попаданием: `false` полностью игнорирует hit (i-frames).
    fn when_hit(_creature: &mut Creature<Self>, _hit: &HitData) -> bool {
        true
    }

    /// Подстройка hitbox под конкретную атаку после активации фазы.
    fn modify_hitbox(_creature: &mut Creature<Self>, _phase: usize) {}

    /// Вызывается на атакующем, когда `target` принял попадание.
    fn on_hit(_creature: &mut Creature<Self>, _target: Entity) {}

    /// Один раз, после базового death transition.
    fn on_death(_creature: &mut Creature<Self>) {}

    /// Заменяет обычный tick после смерти (например, camera follow).
    fn on_death_idle(_creature: &mut Creature<Self>, _delta: f32) {}

    /// Действие при приземлении для дуг `Landing::Behavior(tag)`.
    fn on_land(_creature: &mut Creature<Self>, _tag: u32) {}
}

/// Combat/motion состояние одного существа.
#[derive(Component)]
pub struct Creature<B: CreatureBehavior> {
    pub behavior: B,
    pub config: CreatureConfig,

    // Facing / movement
    /// `true` = sprite flipped (facing -X)
    pub flipped: bool,
    pub moving: bool,
    position: Vec2,
    visual_position: Vec2,

    // Health
    health: Health,
    dead: bool,
    stun_remaining: f32,

    // Combat state
    buffs: BuffEngine,
    air: AirMotion,
    hitboxes: HitboxSet,
    armed: Option<ArmedHitbox>,

    // Collaborators (Option = может быть уже освобождён)
    movement: Option<Box<dyn MovementController>>,
    health_display: Option<Box<dyn HealthDisplay>>,
    renderer: Box<dyn CreatureRenderer>,
    /// После `cleanup`: ни одной записи в collaborators
    released: bool,
    shapes: Box<dyn CollisionShapes>,
    signals: AnimationSignals,
}

impl<B: CreatureBehavior> Creature<B> {
    /// Setup: пары hitbox, индекс сигналов, полное HP, чистый StatBlock.
    pub fn new(
        behavior: B,
        config: CreatureConfig,
        hitboxes: Vec<HitboxDef>,
        collaborators: Collaborators,
    ) -> Result<Self, HitboxError> {
        let hitboxes = HitboxSet::from_defs(hitboxes)?;
        let Collaborators {
            movement,
            renderer,
            shapes,
            mut health_display,
            animation_graphs,
        } = collaborators;

        let health = Health::new(config.max_hp);
        health_display.set_offset(config.health_bar_offset);
        health_display.set_health_fraction(health.fraction());
        let position = movement.position();

        Ok(Self {
            behavior,
            config,
            flipped: false,
            moving: false,
            position,
            visual_position: position,
            health,
            dead: false,
            stun_remaining: 0.0,
            buffs: BuffEngine::new(),
            air: AirMotion::new(),
            hitboxes,
            armed: None,
            movement: Some(movement),
            health_display: Some(health_display),
            renderer,
            released: false,
            shapes,
            signals: AnimationSignals::new(animation_graphs),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Позиция тела + air offset (то, что видит renderer)
    pub fn visual_position(&self) -> Vec2 {
        self.visual_position
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    pub fn hp(&self) -> u32 {
        self.health.current
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn is_airborne(&self) -> bool {
        self.air.is_airborne()
    }

    pub fn air(&self) -> &AirMotion {
        &self.air
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_remaining > 0.0
    }

    pub fn stun_remaining(&self) -> f32 {
        self.stun_remaining
    }

    pub fn stats(&self) -> &StatBlock {
        self.buffs.stats()
    }

    pub fn buffs(&self) -> &BuffEngine {
        &self.buffs
    }

    pub fn hitboxes(&self) -> &HitboxSet {
        &self.hitboxes
    }

    pub fn armed(&self) -> Option<ArmedHitbox> {
        self.armed
    }

    pub fn armed_hitbox(&self) -> Option<&HitboxEntry> {
        self.armed
            .and_then(|armed| self.hitboxes.get(armed.phase, armed.flipped))
    }

    pub fn signals_mut(&mut self) -> &mut AnimationSignals {
        &mut self.signals
    }

    /// Текущая скорость с учётом баффов
    pub fn speed(&self) -> f32 {
        self.stats().effective_speed(self.config.base_speed)
    }

    // ========================================================================
    // Frame update
    // ========================================================================

    pub fn tick(&mut self, delta: f32) {
        if self.released {
            return;
        }
        if self.dead {
            B::on_death_idle(self, delta);
            return;
        }

        self.buffs.age(delta);
        self.sync_visuals();
        self.stun_remaining = (self.stun_remaining - delta).max(0.0);

        if self.air.is_airborne() {
            self.advance_air(delta);
        } else {
            B::ai(self, delta);
        }

        self.refresh_position();
    }

    fn sync_visuals(&mut self) {
        let moving = self.moving;
        self.signals.set_bool("isMoving", moving);

        self.refresh_position();
        self.visual_position = self.position;
        self.renderer.set_position(self.visual_position);
        self.renderer
            .set_sort_order((self.visual_position.y * -1000.0) as i32);
        self.renderer.set_flipped(self.flipped);
    }

    fn refresh_position(&mut self) {
        if let Some(movement) = &self.movement {
            self.position = movement.position();
        }
    }

    // ========================================================================
    // Air travel
    // ========================================================================

    /// Запросить air arc
    ///
    /// Returns `false` если активен arc с приоритетом ≥ запрошенного
    /// (запрос отброшен, не в очередь).
    pub fn request_air(&mut self, request: AirRequest) -> bool {
        if self.released {
            return false;
        }
        if !self.air.request(&request) {
            if request.duration.is_nan() || request.duration <= 0.0 {
                logger::log_warning(&format!(
                    "Air request with non-positive duration {} dropped",
                    request.duration
                ));
            }
            return false;
        }

        self.renderer.set_air_layer(true);
        if let Some(movement) = self.movement.as_mut() {
            movement.set_velocity(request.velocity);
            movement.set_collision_enabled(!request.pass_over);
        }
        true
    }

    fn advance_air(&mut self, delta: f32) {
        match self.air.advance(delta) {
            AirStep::Grounded => {}
            AirStep::Airborne { height } => {
                self.visual_position += Vec2::Y * height;
                self.renderer.set_position(self.visual_position);
            }
            AirStep::Landed(landing) => {
                if let Some(movement) = self.movement.as_mut() {
                    movement.set_velocity(Vec2::ZERO);
                    movement.set_collision_enabled(true);
                }
                self.renderer.set_air_layer(false);
                // Landing hook может сразу запросить следующую дугу
                self.land(landing);
            }
        }
    }

    fn land(&mut self, landing: Landing) {
        match landing {
            Landing::Nothing => {}
            Landing::KnockbackRecovery => self.recover_from_knockback(),
            Landing::Behavior(tag) => B::on_land(self, tag),
        }
    }

    fn recover_from_knockback(&mut self) {
        self.renderer.set_tint(Tint::Normal);
        self.stun_remaining = 0.0;
        self.signals.set_float("stun", 0.0);
        if self.health.is_depleted() {
            self.die();
        }
        self.signals.set_bool("reset", false);
    }

    // ========================================================================
    // Getting hit
    // ========================================================================

    /// Принять попадание
    ///
    /// Returns `true` если попадание применено. Мёртвое существо и вето
    /// `when_hit` → полный no-op.
    pub fn get_hit(&mut self, hit: HitData) -> bool {
        if self.dead || self.released {
            return false;
        }
        if !B::when_hit(self, &hit) {
            return false;
        }

        self.reset_attack();

        // Damage (saturating, health никогда не отрицательный)
        self.health.take_damage(hit.damage);
        self.report_health();

        // Stun floor: не меньше MIN_STUN_DURATION
        let stun = hit.stun_duration.max(MIN_STUN_DURATION);
        self.stun_remaining = stun;
        self.signals.set_float("stun", stun);

        // Разворот к атакующему + hit flash
        self.flipped = hit.attacker_position.x < self.position.x;
        self.renderer.set_flipped(self.flipped);
        self.renderer.set_tint(Tint::Damaged);

        let knockback = AirRequest {
            duration: KNOCKBACK_AIR_DURATION,
            peak_height: self.config.knockback_height,
            velocity: hit.knockback_velocity(),
            pass_over: false,
            landing: Landing::KnockbackRecovery,
            priority: KNOCKBACK_PRIORITY,
        };
        self.request_air(knockback);

        logger::log(&format!(
            "Creature hit by {:?} phase {}: -{} hp ({}/{}), stun {:.2}s",
            hit.source.attacker,
            hit.source.phase,
            hit.damage,
            self.health.current,
            self.health.max,
            stun
        ));
        true
    }

    fn report_health(&mut self) {
        let fraction = self.health.fraction();
        if let Some(display) = self.health_display.as_mut() {
            display.set_health_fraction(fraction);
        }
    }

    /// Отмена текущей атаки (начало hit reaction или cancel из behavior)
    pub fn reset_attack(&mut self) {
        if self.released {
            return;
        }
        if let Some(movement) = self.movement.as_mut() {
            movement.set_collision_enabled(true);
        }
        self.signals.set_bool("reset", true);
        self.set_hitbox(None);
        self.air.clear();
        self.renderer.set_air_layer(false);
    }

    // ========================================================================
    // Death
    // ========================================================================

    /// Death transition (однократный)
    pub fn die(&mut self) {
        if self.dead || self.released {
            return;
        }

        if let Some(mut movement) = self.movement.take() {
            movement.release();
        }
        self.shapes.set_hurtbox_enabled(false);
        self.signals.set_bool("Dead", true);
        self.dead = true;

        logger::log_info(&format!(
            "Creature died at ({:.2}, {:.2})",
            self.position.x, self.position.y
        ));
        B::on_death(self);
    }

    // ========================================================================
    // Hitboxes
    // ========================================================================

    /// Активировать hitbox фазы (`None`: снять все)
    ///
    /// Запись выбирается по текущему facing. Неизвестная фаза → warning
    /// и disarm. Returns `true` если hitbox активен.
    pub fn set_hitbox(&mut self, phase: Option<usize>) -> bool {
        if self.released {
            return false;
        }
        let Some(phase) = phase else {
            self.shapes.disarm_hitbox();
            self.armed = None;
            return false;
        };

        let Some(entry) = self.hitboxes.get(phase, self.flipped) else {
            logger::log_warning(&format!(
                "Hitbox phase {} out of range ({} phases), disarming",
                phase,
                self.hitboxes.len()
            ));
            self.shapes.disarm_hitbox();
            self.armed = None;
            return false;
        };

        self.shapes.arm_hitbox(&entry.points);
        self.armed = Some(ArmedHitbox {
            phase,
            flipped: self.flipped,
        });
        B::modify_hitbox(self, phase);
        true
    }

    /// HitData для target в `target_position`, если hitbox активен
    pub fn strike(&self, attacker: Entity, target_position: Vec2) -> Option<HitData> {
        let armed = self.armed?;
        let entry = self.hitboxes.get(armed.phase, armed.flipped)?;
        let source = HitSource {
            attacker,
            phase: armed.phase,
        };
        Some(HitData::from_entry(
            entry,
            source,
            self.position,
            target_position,
        ))
    }

    /// Вызывается на атакующем, когда target принял попадание
    pub fn notify_hit_confirmed(&mut self, target: Entity) {
        if self.dead || self.released {
            return;
        }
        B::on_hit(self, target);
    }

    // ========================================================================
    // Buffs & movement
    // ========================================================================

    /// Добавить бафф (эффект применяется сразу)
    pub fn add_buff(&mut self, duration: f32, effect: BuffEffect) {
        self.buffs.add(duration, effect);
    }

    /// Двигаться в направлении со скоростью `speed()`
    pub fn move_in_direction(&mut self, direction: Vec2) {
        let velocity = direction.normalize_or_zero() * self.speed();
        self.moving = velocity != Vec2::ZERO;
        if velocity.x != 0.0 {
            self.flipped = velocity.x < 0.0;
        }
        if let Some(movement) = self.movement.as_mut() {
            movement.set_velocity(velocity);
        }
    }

    pub fn stop(&mut self) {
        self.move_in_direction(Vec2::ZERO);
    }

    pub fn set_sprite_visible(&mut self, visible: bool) {
        if !self.released {
            self.renderer.set_visible(visible);
        }
    }

    // ========================================================================
    // Cleanup
    // ========================================================================

    /// Освободить все ресурсы collaborators (повторный вызов: no-op)
    ///
    /// После cleanup существо инертно: tick, get_hit, set_hitbox и air
    /// requests больше ничего не пишут в collaborators.
    pub fn cleanup(&mut self) {
        if self.released {
            return;
        }

        if let Some(mut movement) = self.movement.take() {
            movement.release();
        }
        if let Some(mut display) = self.health_display.take() {
            display.release();
        }
        self.shapes.disarm_hitbox();
        self.shapes.set_hurtbox_enabled(false);
        self.renderer.release();

        self.armed = None;
        self.air.clear();
        self.moving = false;
        self.released = true;
    }
}
