//! Sparring: простой детерминированный спарринг-партнёр
//!
//! Цикл: Idle → (Wander | Swing | Hop) → Idle
//!
//! - Wander: шаг к случайной точке около `home` (держит пару рядом)
//! - Swing: разворот к сопернику, hitbox фазы на `SWING_DURATION`
//! - Hop: низкоприоритетная air дуга с pass-over, после приземления
//!   короткое окно неуязвимости (`when_hit` → false)
//!
//! Решения принимаются собственным ChaCha8Rng (seed задаётся при spawn).
//!
//! Цель замаха и hop = живая позиция соперника (`Rival` + `track_rivals`).
//! `rival_home` только fallback, пока позиция ещё не известна.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::combat::{AirRequest, BuffEffect, HitData, HitboxDef, Landing};
use crate::creature::{tick_creatures, Creature, CreatureBehavior};
use crate::logger;

/// Landing tag для hop дуги
pub const HOP_TAG: u32 = 1;
/// Сколько секунд hitbox активен за один замах
pub const SWING_DURATION: f32 = 0.2;
/// Окно неуязвимости после приземления hop
pub const GUARD_WINDOW: f32 = 0.3;
/// Дистанция, с которой начинается замах
pub const SWING_RANGE: f32 = 1.2;

const HOP_DURATION: f32 = 0.4;
const HOP_HEIGHT: f32 = 0.5;
const HOP_SPEED: f32 = 1.0;
const WANDER_RADIUS: f32 = 0.3;
/// Бонус скорости после подтверждённого попадания
const MOMENTUM_BUFF: (f32, f32) = (1.0, 1.5);

/// Текущее действие спарринг-партнёра
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SparringAction {
    /// Ждём следующего решения
    Idle { timer: f32 },
    /// Идём к точке
    Wander { target: Vec2, timer: f32 },
    /// Hitbox активен
    Swing { timer: f32 },
}

#[derive(Debug, Clone)]
pub struct Sparring {
    rng: ChaCha8Rng,
    pub home: Vec2,
    /// Anchor соперника, если `rival_position` ещё не выставлен
    pub rival_home: Vec2,
    /// Живая позиция соперника (обновляет `track_rivals` каждый tick)
    pub rival_position: Option<Vec2>,
    pub action: SparringAction,
    pub guard_remaining: f32,

    // Счётчики (headless отчёт / тесты)
    pub swings: u32,
    pub hops: u32,
    pub hits_landed: u32,
    pub hits_guarded: u32,
    pub deaths: u32,
    pub death_idle_time: f32,
}

impl Sparring {
    pub fn new(seed: u64, home: Vec2, rival_home: Vec2) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            home,
            rival_home,
            rival_position: None,
            action: SparringAction::Idle { timer: 0.0 },
            guard_remaining: 0.0,
            swings: 0,
            hops: 0,
            hits_landed: 0,
            hits_guarded: 0,
            deaths: 0,
            death_idle_time: 0.0,
        }
    }

    pub fn is_guarding(&self) -> bool {
        self.guard_remaining > 0.0
    }

    /// Куда целиться: живая позиция, иначе anchor
    pub fn rival_target(&self) -> Vec2 {
        self.rival_position.unwrap_or(self.rival_home)
    }

    fn decide(creature: &mut Creature<Self>) {
        let position = creature.position();
        let rival = creature.behavior.rival_target();
        let roll = creature.behavior.rng.gen_range(0..10);

        if roll < 5 && position.distance(rival) < SWING_RANGE {
            Self::swing(creature, rival);
        } else if roll == 5 {
            Self::hop(creature, rival);
        } else {
            let offset = Vec2::new(
                creature.behavior.rng.gen_range(-WANDER_RADIUS..WANDER_RADIUS),
                creature.behavior.rng.gen_range(-WANDER_RADIUS..WANDER_RADIUS),
            );
            let timer = creature.behavior.rng.gen_range(0.3..0.8);
            creature.behavior.action = SparringAction::Wander {
                target: creature.behavior.home + offset,
                timer,
            };
        }
    }

    fn swing(creature: &mut Creature<Self>, rival: Vec2) {
        creature.stop();
        creature.flipped = rival.x < creature.position().x;

        let phases = creature.hitboxes().len();
        if phases == 0 {
            creature.behavior.action = SparringAction::Idle { timer: 0.5 };
            return;
        }
        let phase = creature.behavior.rng.gen_range(0..phases);
        if creature.set_hitbox(Some(phase)) {
            creature.behavior.swings += 1;
            creature.behavior.action = SparringAction::Swing {
                timer: SWING_DURATION,
            };
        }
    }

    fn hop(creature: &mut Creature<Self>, rival: Vec2) {
        creature.stop();
        let direction = (rival - creature.position()).normalize_or_zero();
        let request = AirRequest {
            duration: HOP_DURATION,
            peak_height: HOP_HEIGHT,
            velocity: direction * HOP_SPEED,
            pass_over: true,
            landing: Landing::Behavior(HOP_TAG),
            priority: 0,
        };

        if creature.request_air(request) {
            creature.behavior.hops += 1;
            creature.signals_mut().set_bool("hop", true);
        }
        creature.behavior.action = SparringAction::Idle { timer: 0.2 };
    }
}

impl CreatureBehavior for Sparring {
    fn ai(creature: &mut Creature<Self>, delta: f32) {
        let position = creature.position();
        let guard = &mut creature.behavior.guard_remaining;
        *guard = (*guard - delta).max(0.0);

        match creature.behavior.action {
            SparringAction::Swing { timer } => {
                let timer = timer - delta;
                if timer > 0.0 {
                    creature.behavior.action = SparringAction::Swing { timer };
                } else {
                    creature.set_hitbox(None);
                    creature.behavior.action = SparringAction::Idle { timer: 0.3 };
                }
            }
            SparringAction::Wander { target, timer } => {
                let timer = timer - delta;
                if timer > 0.0 && position.distance(target) > 0.05 {
                    creature.behavior.action = SparringAction::Wander { target, timer };
                    creature.move_in_direction(target - position);
                } else {
                    creature.stop();
                    creature.behavior.action = SparringAction::Idle { timer: 0.1 };
                }
            }
            SparringAction::Idle { timer } => {
                let timer = timer - delta;
                if timer > 0.0 {
                    creature.behavior.action = SparringAction::Idle { timer };
                } else {
                    Self::decide(creature);
                }
            }
        }
    }

    fn when_hit(creature: &mut Creature<Self>, _hit: &HitData) -> bool {
        if creature.behavior.is_guarding() {
            creature.behavior.hits_guarded += 1;
            return false;
        }
        // Попадание сбивает замах
        creature.behavior.action = SparringAction::Idle { timer: 0.2 };
        true
    }

    fn modify_hitbox(_creature: &mut Creature<Self>, phase: usize) {
        logger::log(&format!("Sparring swing armed (phase {})", phase));
    }

    fn on_hit(creature: &mut Creature<Self>, target: Entity) {
        creature.behavior.hits_landed += 1;
        let (duration, factor) = MOMENTUM_BUFF;
        creature.add_buff(duration, BuffEffect::ScaleSpeed(factor));
        logger::log(&format!("Sparring hit confirmed on {:?}", target));
    }

    fn on_death(creature: &mut Creature<Self>) {
        creature.behavior.deaths += 1;
        creature.behavior.action = SparringAction::Idle { timer: 0.0 };
    }

    fn on_death_idle(creature: &mut Creature<Self>, delta: f32) {
        let was_visible = creature.behavior.death_idle_time < 1.0;
        creature.behavior.death_idle_time += delta;
        if was_visible && creature.behavior.death_idle_time >= 1.0 {
            creature.set_sprite_visible(false);
        }
    }

    fn on_land(creature: &mut Creature<Self>, tag: u32) {
        if tag == HOP_TAG {
            creature.signals_mut().set_bool("hop", false);
            creature.behavior.guard_remaining = GUARD_WINDOW;
        }
    }
}

/// Соперник существа (entity с `Creature<Sparring>`)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rival(pub Entity);

/// Система: копирует позицию соперника в `rival_position`
///
/// Соперник без `Creature<Sparring>` (despawn) → `None`, decide падает на anchor.
pub fn track_rivals(mut creatures: Query<(Entity, &mut Creature<Sparring>, Option<&Rival>)>) {
    let positions: Vec<(Entity, Vec2)> = creatures
        .iter()
        .map(|(entity, creature, _)| (entity, creature.position()))
        .collect();

    for (_, mut creature, rival) in creatures.iter_mut() {
        let position = rival.and_then(|Rival(target)| {
            positions
                .iter()
                .find(|(entity, _)| entity == target)
                .map(|(_, position)| *position)
        });
        creature.behavior.rival_position = position;
    }
}

/// Sparring systems: rival tracking до tick существ
///
/// Добавлять вместе с `CreaturePlugin::<Sparring>`.
pub struct SparringPlugin;

impl Plugin for SparringPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            track_rivals.before(tick_creatures::<Sparring>),
        );
    }
}

/// Две фазы атаки: jab (быстрый, слабый) и heavy (дальше, сильнее)
///
/// Порядок: unflipped, flipped для каждой фазы.
pub fn sparring_hitboxes() -> Vec<HitboxDef> {
    vec![
        rect(8, 3.0, 0.15, 0.2, 1.0),
        rect(8, 3.0, 0.15, -1.0, -0.2),
        rect(15, 5.0, 0.3, 0.3, 1.4),
        rect(15, 5.0, 0.3, -1.4, -0.3),
    ]
}

fn rect(damage: u32, knockback_power: f32, stun_duration: f32, min_x: f32, max_x: f32) -> HitboxDef {
    HitboxDef {
        damage,
        knockback_power,
        stun_duration,
        forced_direction: None,
        points: vec![
            Vec2::new(min_x, -0.4),
            Vec2::new(max_x, -0.4),
            Vec2::new(max_x, 0.4),
            Vec2::new(min_x, 0.4),
        ],
    }
}
