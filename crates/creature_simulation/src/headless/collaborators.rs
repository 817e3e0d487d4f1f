//! In-memory collaborators
//!
//! Каждый collaborator пишет состояние в shared `Probe`, который тест
//! (или headless runner) держит у себя и читает после тиков.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bevy::prelude::*;

use crate::creature::{
    AnimationGraph, CollisionShapes, CreatureRenderer, HealthDisplay, MovementController, Tint,
};

/// Shared handle на состояние collaborator'а
#[derive(Debug, Default)]
pub struct Probe<T>(Arc<Mutex<T>>);

impl<T> Clone for Probe<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Probe<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(Mutex::new(value)))
    }

    pub fn read(&self) -> MutexGuard<'_, T> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ============================================================================
// Movement
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub collision_enabled: bool,
    pub releases: u32,
}

impl Default for BodyState {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            collision_enabled: true,
            releases: 0,
        }
    }
}

/// Kinematic тело без физики: position += velocity * dt
#[derive(Debug, Clone, Default)]
pub struct HeadlessBody {
    state: Probe<BodyState>,
}

impl HeadlessBody {
    pub fn at(position: Vec2) -> Self {
        Self {
            state: Probe::new(BodyState {
                position,
                ..BodyState::default()
            }),
        }
    }

    pub fn probe(&self) -> Probe<BodyState> {
        self.state.clone()
    }

    /// Интеграция velocity (отпущенное тело не двигается)
    pub fn integrate(&self, delta: f32) {
        let mut state = self.state.read();
        if state.releases == 0 {
            let velocity = state.velocity;
            state.position += velocity * delta;
        }
    }
}

impl MovementController for HeadlessBody {
    fn position(&self) -> Vec2 {
        self.state.read().position
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.state.read().velocity = velocity;
    }

    fn set_collision_enabled(&mut self, enabled: bool) {
        self.state.read().collision_enabled = enabled;
    }

    fn release(&mut self) {
        let mut state = self.state.read();
        state.releases += 1;
        state.velocity = Vec2::ZERO;
    }
}

// ============================================================================
// Rendering
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub flipped: bool,
    pub tint: Tint,
    pub visible: bool,
    pub sort_order: i32,
    pub air_layer: bool,
    pub position: Vec2,
    pub tint_changes: u32,
    pub releases: u32,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            flipped: false,
            tint: Tint::Normal,
            visible: true,
            sort_order: 0,
            air_layer: false,
            position: Vec2::ZERO,
            tint_changes: 0,
            releases: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    state: Probe<RenderState>,
}

impl RecordingRenderer {
    pub fn probe(&self) -> Probe<RenderState> {
        self.state.clone()
    }
}

impl CreatureRenderer for RecordingRenderer {
    fn set_flipped(&mut self, flipped: bool) {
        self.state.read().flipped = flipped;
    }

    fn set_tint(&mut self, tint: Tint) {
        let mut state = self.state.read();
        state.tint = tint;
        state.tint_changes += 1;
    }

    fn set_visible(&mut self, visible: bool) {
        self.state.read().visible = visible;
    }

    fn set_sort_order(&mut self, order: i32) {
        self.state.read().sort_order = order;
    }

    fn set_air_layer(&mut self, airborne: bool) {
        self.state.read().air_layer = airborne;
    }

    fn set_position(&mut self, position: Vec2) {
        self.state.read().position = position;
    }

    fn release(&mut self) {
        self.state.read().releases += 1;
    }
}

// ============================================================================
// Animation
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct GraphState {
    pub bools: HashMap<String, bool>,
    pub ints: HashMap<String, i32>,
    pub floats: HashMap<String, f32>,
    /// `true` = fired, `false` = reset
    pub triggers: HashMap<String, bool>,
    pub writes: u32,
}

/// Animation graph с фиксированным списком параметров
#[derive(Debug, Clone, Default)]
pub struct ParameterGraph {
    parameters: Vec<String>,
    state: Probe<GraphState>,
}

impl ParameterGraph {
    pub fn new<'a>(parameters: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            parameters: parameters.into_iter().map(str::to_owned).collect(),
            state: Probe::default(),
        }
    }

    pub fn probe(&self) -> Probe<GraphState> {
        self.state.clone()
    }
}

impl AnimationGraph for ParameterGraph {
    fn parameters(&self) -> Vec<String> {
        self.parameters.clone()
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        let mut state = self.state.read();
        state.bools.insert(name.to_owned(), value);
        state.writes += 1;
    }

    fn set_int(&mut self, name: &str, value: i32) {
        let mut state = self.state.read();
        state.ints.insert(name.to_owned(), value);
        state.writes += 1;
    }

    fn set_float(&mut self, name: &str, value: f32) {
        let mut state = self.state.read();
        state.floats.insert(name.to_owned(), value);
        state.writes += 1;
    }

    fn set_trigger(&mut self, name: &str) {
        let mut state = self.state.read();
        state.triggers.insert(name.to_owned(), true);
        state.writes += 1;
    }

    fn reset_trigger(&mut self, name: &str) {
        let mut state = self.state.read();
        state.triggers.insert(name.to_owned(), false);
        state.writes += 1;
    }
}

// ============================================================================
// Collision shapes
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeState {
    pub hurtbox_enabled: bool,
    pub hitbox: Option<Vec<Vec2>>,
}

impl Default for ShapeState {
    fn default() -> Self {
        Self {
            hurtbox_enabled: true,
            hitbox: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingShapes {
    state: Probe<ShapeState>,
}

impl RecordingShapes {
    pub fn probe(&self) -> Probe<ShapeState> {
        self.state.clone()
    }
}

impl CollisionShapes for RecordingShapes {
    fn set_hurtbox_enabled(&mut self, enabled: bool) {
        self.state.read().hurtbox_enabled = enabled;
    }

    fn arm_hitbox(&mut self, points: &[Vec2]) {
        self.state.read().hitbox = Some(points.to_vec());
    }

    fn disarm_hitbox(&mut self) {
        self.state.read().hitbox = None;
    }
}

// ============================================================================
// Health bar
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct HealthBarState {
    pub fraction: f32,
    pub offset: f32,
    pub releases: u32,
}

impl Default for HealthBarState {
    fn default() -> Self {
        Self {
            fraction: 1.0,
            offset: 0.0,
            releases: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingHealthBar {
    state: Probe<HealthBarState>,
}

impl RecordingHealthBar {
    pub fn probe(&self) -> Probe<HealthBarState> {
        self.state.clone()
    }
}

impl HealthDisplay for RecordingHealthBar {
    fn set_health_fraction(&mut self, fraction: f32) {
        self.state.read().fraction = fraction;
    }

    fn set_offset(&mut self, offset: f32) {
        self.state.read().offset = offset;
    }

    fn release(&mut self) {
        self.state.read().releases += 1;
    }
}
