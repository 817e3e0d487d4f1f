//! Headless runtime: collaborators без движка
//!
//! Используется тестами и `main.rs`:
//! - `collaborators`: in-memory реализации + probes
//! - `rig`: полный набор collaborators одного существа
//! - `contacts`: polygon overlap вместо physics engine
//!
//! Порядок в FixedUpdate:
//! ```text
//! integrate_headless_bodies → resolve_contacts<B> → tick_creatures<B> → ...
//! ```

use std::marker::PhantomData;

use bevy::prelude::*;

pub mod collaborators;
pub mod contacts;
pub mod rig;

pub use collaborators::{
    BodyState, GraphState, HealthBarState, HeadlessBody, ParameterGraph, Probe,
    RecordingHealthBar, RecordingRenderer, RecordingShapes, RenderState, ShapeState,
};
pub use contacts::{resolve_contacts, ContactMemory};
pub use rig::{HeadlessRig, RigProbes, CREATURE_SIGNALS};

use crate::combat::{HitboxDef, HitboxError};
use crate::creature::{tick_creatures, Creature, CreatureBehavior, CreatureConfig};

/// Handle на kinematic тело (тот же Probe, что у collaborator'а)
#[derive(Component, Debug, Clone)]
pub struct HeadlessBodyHandle(pub HeadlessBody);

/// Система: position += velocity * dt для всех headless тел
pub fn integrate_headless_bodies(time: Res<Time<Fixed>>, bodies: Query<&HeadlessBodyHandle>) {
    let delta = time.delta_secs();
    for body in bodies.iter() {
        body.0.integrate(delta);
    }
}

/// Интеграция тел (один раз на App, независимо от числа behavior типов)
struct HeadlessBodiesPlugin;

impl Plugin for HeadlessBodiesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, integrate_headless_bodies);
    }
}

/// Headless contacts + body integration для behavior типа `B`
///
/// Добавлять вместе с `CreaturePlugin<B>`.
pub struct HeadlessPlugin<B: CreatureBehavior>(PhantomData<B>);

impl<B: CreatureBehavior> Default for HeadlessPlugin<B> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<B: CreatureBehavior> Plugin for HeadlessPlugin<B> {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<HeadlessBodiesPlugin>() {
            app.add_plugins(HeadlessBodiesPlugin);
        }

        app.add_systems(
            FixedUpdate,
            resolve_contacts::<B>
                .after(integrate_headless_bodies)
                .before(tick_creatures::<B>),
        );
    }
}

/// Spawn существа с headless rig
///
/// Returns entity + probes для инспекции collaborators.
pub fn spawn_headless_creature<B: CreatureBehavior>(
    world: &mut World,
    behavior: B,
    config: CreatureConfig,
    hitboxes: Vec<HitboxDef>,
    position: Vec2,
) -> Result<(Entity, RigProbes), HitboxError> {
    let rig = HeadlessRig::at(position);
    let probes = rig.probes();
    let body = HeadlessBodyHandle(rig.body.clone());

    let creature = Creature::new(behavior, config, hitboxes, rig.into_collaborators())?;
    let entity = world
        .spawn((creature, body, ContactMemory::default()))
        .id();

    Ok((entity, probes))
}
