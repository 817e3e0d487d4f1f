//! Air motion: closed-form parabolic arc поверх planar движения
//!
//! `height(t) = A·t² + B·t`, где `A = -4h/d²`, `B = 4h/d`.
//! Профиль начинается и заканчивается в нуле, пик `h` в середине.
//! Высота считается от remaining time напрямую: кривая симметрична,
//! отдельный "phase" не нужен.
//!
//! Приоритет: новый request вытесняет активный только при
//! `new.priority > active.priority`, иначе молча отбрасывается.

/// Что выполнить при приземлении (ровно один раз)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    /// Ничего (например, принудительный прыжок без последствий)
    Nothing,
    /// Восстановление после knockback (tint, stun, death check)
    KnockbackRecovery,
    /// Передать `CreatureBehavior::on_land` с тегом
    Behavior(u32),
}

/// Запрос на air travel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirRequest {
    /// Общее время в воздухе (секунды)
    pub duration: f32,
    /// Пиковая высота в середине дуги
    pub peak_height: f32,
    /// Planar velocity для movement collaborator на всё время полёта
    pub velocity: bevy::math::Vec2,
    /// Отключить collision response на время полёта
    pub pass_over: bool,
    pub landing: Landing,
    pub priority: i32,
}

/// Активное air-состояние
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirState {
    pub remaining: f32,
    pub quad_a: f32,
    pub quad_b: f32,
    pub priority: i32,
    pub landing: Landing,
}

impl AirState {
    pub fn height_at(&self, t: f32) -> f32 {
        self.quad_a * t * t + self.quad_b * t
    }
}

/// Результат одного тика
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AirStep {
    /// Не в воздухе
    Grounded,
    /// Всё ещё в воздухе, вертикальное смещение поверх позиции
    Airborne { height: f32 },
    /// Пересекли ноль в этом тике
    Landed(Landing),
}

/// Air motion model (не более одного AirState)
#[derive(Debug, Clone, Default)]
pub struct AirMotion {
    state: Option<AirState>,
}

impl AirMotion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_airborne(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&AirState> {
        self.state.as_ref()
    }

    /// Принять или отбросить запрос
    ///
    /// Returns `true` если запрос стал активным состоянием.
    pub fn request(&mut self, request: &AirRequest) -> bool {
        if let Some(active) = &self.state {
            if request.priority <= active.priority {
                return false;
            }
        }

        // Нулевая длительность → деление на ноль в коэффициентах
        if request.duration.is_nan() || request.duration <= 0.0 {
            return false;
        }

        let quad_b = 4.0 * request.peak_height / request.duration;
        let quad_a = -quad_b / request.duration;

        self.state = Some(AirState {
            remaining: request.duration,
            quad_a,
            quad_b,
            priority: request.priority,
            landing: request.landing,
        });
        true
    }

    /// Продвинуть дугу на `delta` секунд
    ///
    /// Landing возвращается ровно один раз: состояние забирается через `take()`.
    pub fn advance(&mut self, delta: f32) -> AirStep {
        let Some(state) = self.state.as_mut() else {
            return AirStep::Grounded;
        };

        state.remaining -= delta;
        if state.remaining > 0.0 {
            return AirStep::Airborne {
                height: state.height_at(state.remaining),
            };
        }

        match self.state.take() {
            Some(landed) => AirStep::Landed(landed.landing),
            None => AirStep::Grounded,
        }
    }

    /// Сбросить полёт без landing (reset attack / hit reaction)
    pub fn clear(&mut self) {
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec2;

    fn request(duration: f32, peak_height: f32, priority: i32) -> AirRequest {
        AirRequest {
            duration,
            peak_height,
            velocity: Vec2::ZERO,
            pass_over: false,
            landing: Landing::Nothing,
            priority,
        }
    }

    #[test]
    fn test_parabola_profile() {
        let mut air = AirMotion::new();
        assert!(air.request(&request(0.8, 1.5, 0)));

        let state = *air.state().unwrap();
        assert!(state.height_at(0.0).abs() < 1e-6);
        assert!(state.height_at(0.8).abs() < 1e-5);
        assert!((state.height_at(0.4) - 1.5).abs() < 1e-5);
        // Симметрия
        assert!((state.height_at(0.2) - state.height_at(0.6)).abs() < 1e-5);
    }

    #[test]
    fn test_lower_or_equal_priority_is_dropped() {
        let mut air = AirMotion::new();
        assert!(air.request(&request(1.0, 2.0, 1)));
        let before = *air.state().unwrap();

        assert!(!air.request(&request(0.3, 0.1, 0)));
        assert!(!air.request(&request(0.3, 0.1, 1)));
        assert_eq!(*air.state().unwrap(), before);
    }

    #[test]
    fn test_higher_priority_overwrites() {
        let mut air = AirMotion::new();
        assert!(air.request(&request(1.0, 2.0, 1)));
        air.advance(0.5);

        assert!(air.request(&request(0.4, 0.5, 2)));
        let state = air.state().unwrap();
        assert_eq!(state.remaining, 0.4);
        assert_eq!(state.priority, 2);
        assert!((state.quad_b - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_landing_fires_exactly_once() {
        let mut air = AirMotion::new();
        let mut req = request(0.25, 0.25, 1);
        req.landing = Landing::KnockbackRecovery;
        assert!(air.request(&req));

        let mut landings = 0;
        for _ in 0..30 {
            match air.advance(1.0 / 60.0) {
                AirStep::Landed(landing) => {
                    assert_eq!(landing, Landing::KnockbackRecovery);
                    landings += 1;
                }
                AirStep::Airborne { height } => assert!(height >= 0.0),
                AirStep::Grounded => {}
            }
        }

        assert_eq!(landings, 1);
        assert!(!air.is_airborne());
    }

    #[test]
    fn test_non_positive_duration_rejected() {
        let mut air = AirMotion::new();
        assert!(!air.request(&request(0.0, 1.0, 5)));
        assert!(!air.request(&request(-1.0, 1.0, 5)));
        assert!(!air.is_airborne());
    }

    #[test]
    fn test_clear_drops_without_landing() {
        let mut air = AirMotion::new();
        assert!(air.request(&request(1.0, 1.0, 3)));
        air.clear();

        assert_eq!(air.advance(2.0), AirStep::Grounded);
        // После clear любой приоритет снова принимается
        assert!(air.request(&request(1.0, 1.0, 0)));
    }
}
