//! Buff таймеры и пересчёт StatBlock
//!
//! # Правила
//!
//! - `add` применяет эффект к живому StatBlock сразу.
//! - `age` уменьшает все таймеры, истёкшие удаляются.
//! - Любое истечение сбрасывает StatBlock в default и заново применяет
//!   оставшиеся эффекты в порядке добавления. Других путей снять
//!   модификацию нет, обратные эффекты не нужны.

use crate::components::StatBlock;

/// Чистая модификация статов, которую несёт бафф
///
/// Хранится по значению, без захваченного состояния: повторное применение
/// того же списка всегда даёт тот же StatBlock.
#[derive(Clone, Copy, Debug)]
pub enum BuffEffect {
    /// Умножает `speed_mod` безусловно (haste, перегруз)
    ScaleSpeed(f32),
    /// Умножает `speed_mod`, если нет иммунитета к slow
    Slow(f32),
    /// Ставит `slow_immune`, влияет только на slow, применённые после
    SlowImmunity,
    /// Произвольная модификация для разовых эффектов
    Custom(fn(&mut StatBlock)),
}

impl BuffEffect {
    pub fn apply(&self, stats: &mut StatBlock) {
        match *self {
            BuffEffect::ScaleSpeed(factor) => stats.speed_mod *= factor,
            BuffEffect::Slow(factor) => {
                if !stats.slow_immune {
                    stats.speed_mod *= factor;
                }
            }
            BuffEffect::SlowImmunity => stats.slow_immune = true,
            BuffEffect::Custom(effect) => effect(stats),
        }
    }
}

/// Эффект с таймером
#[derive(Clone, Debug)]
pub struct BuffTimer {
    /// Секунд до истечения
    pub remaining: f32,
    pub effect: BuffEffect,
}

/// Упорядоченный список активных баффов + производный от них StatBlock
#[derive(Clone, Debug, Default)]
pub struct BuffEngine {
    stats: StatBlock,
    timers: Vec<BuffTimer>,
}

impl BuffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &StatBlock {
        &self.stats
    }

    pub fn timers(&self) -> &[BuffTimer] {
        &self.timers
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Добавить бафф и применить сразу (без сброса)
    pub fn add(&mut self, duration: f32, effect: BuffEffect) {
        self.timers.push(BuffTimer {
            remaining: duration,
            effect,
        });
        effect.apply(&mut self.stats);
    }

    /// Состарить все таймеры на `delta` секунд
    ///
    /// Returns `true` если хотя бы один бафф истёк (StatBlock пересобран).
    pub fn age(&mut self, delta: f32) -> bool {
        let before = self.timers.len();
        self.timers.retain_mut(|timer| {
            timer.remaining -= delta;
            timer.remaining > 0.0
        });

        if self.timers.len() == before {
            return false;
        }

        self.recompute();
        true
    }

    /// Сброс в default и повторное применение эффектов в порядке добавления
    pub fn recompute(&mut self) {
        self.stats.reset();
        for timer in &self.timers {
            timer.effect.apply(&mut self.stats);
        }
    }
}
