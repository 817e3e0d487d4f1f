//! Тесты combat/motion state machine существа

use bevy::prelude::*;

use super::*;
use crate::combat::{AirRequest, BuffEffect, HitData, HitSource, HitboxDef, Landing};
use crate::headless::{HeadlessRig, RigProbes};

const DT: f32 = 1.0 / 60.0;

#[derive(Default)]
struct TestBehavior {
    veto: bool,
    ai_calls: u32,
    observed_speed: Option<f32>,
    deaths: u32,
    death_idle_calls: u32,
    modified_phases: Vec<usize>,
    landed_tags: Vec<u32>,
    /// Дуга, запрашиваемая прямо из landing hook
    chained_arc: Option<AirRequest>,
    confirmed_targets: Vec<Entity>,
}

impl CreatureBehavior for TestBehavior {
    fn ai(creature: &mut Creature<Self>, _delta: f32) {
        let speed = creature.speed();
        creature.behavior.ai_calls += 1;
        creature.behavior.observed_speed = Some(speed);
    }

    fn when_hit(creature: &mut Creature<Self>, _hit: &HitData) -> bool {
        !creature.behavior.veto
    }

    fn modify_hitbox(creature: &mut Creature<Self>, phase: usize) {
        creature.behavior.modified_phases.push(phase);
    }

    fn on_hit(creature: &mut Creature<Self>, target: Entity) {
        creature.behavior.confirmed_targets.push(target);
    }

    fn on_death(creature: &mut Creature<Self>) {
        creature.behavior.deaths += 1;
    }

    fn on_death_idle(creature: &mut Creature<Self>, _delta: f32) {
        creature.behavior.death_idle_calls += 1;
    }

    fn on_land(creature: &mut Creature<Self>, tag: u32) {
        creature.behavior.landed_tags.push(tag);
        if let Some(next) = creature.behavior.chained_arc.take() {
            creature.request_air(next);
        }
    }
}

fn hitbox(damage: u32, x_offset: f32) -> HitboxDef {
    HitboxDef {
        damage,
        knockback_power: 4.0,
        stun_duration: 0.2,
        forced_direction: None,
        points: vec![
            Vec2::new(x_offset, -0.5),
            Vec2::new(x_offset + 1.0, -0.5),
            Vec2::new(x_offset + 1.0, 0.5),
            Vec2::new(x_offset, 0.5),
        ],
    }
}

fn spawn(max_hp: u32) -> (Creature<TestBehavior>, RigProbes) {
    let rig = HeadlessRig::at(Vec2::ZERO);
    let probes = rig.probes();
    let config = CreatureConfig {
        max_hp,
        ..CreatureConfig::default()
    };
    let defs = vec![
        hitbox(10, 0.0),
        hitbox(10, -1.0),
        hitbox(20, 0.5),
        hitbox(20, -1.5),
    ];
    let creature = Creature::new(TestBehavior::default(), config, defs, rig.into_collaborators())
        .expect("paired hitbox definitions");
    (creature, probes)
}

fn hit(damage: u32, stun_duration: f32, attacker_x: f32) -> HitData {
    HitData {
        damage,
        knockback_power: 4.0,
        stun_duration,
        attacker_position: Vec2::new(attacker_x, 0.0),
        knockback_direction: Vec2::new(1.0, 0.0),
        source: HitSource {
            attacker: Entity::PLACEHOLDER,
            phase: 0,
        },
    }
}

fn tick_n(creature: &mut Creature<TestBehavior>, ticks: usize) {
    for _ in 0..ticks {
        creature.tick(DT);
    }
}

// ============================================================================
// Getting hit
// ============================================================================

#[test]
fn test_hit_applies_damage_stun_floor_and_knockback() {
    let (mut creature, probes) = spawn(100);

    assert!(creature.get_hit(hit(30, 0.05, -2.0)));

    assert_eq!(creature.hp(), 70);
    assert_eq!(creature.stun_remaining(), 0.1);
    assert!(creature.is_airborne());
    assert!(creature.flipped); // атакующий слева
    assert_eq!(creature.air().state().unwrap().remaining, 0.25);
    assert_eq!(creature.air().state().unwrap().priority, 1);

    assert_eq!(probes.health_bar.read().fraction, 0.7);
    assert_eq!(probes.render.read().tint, Tint::Damaged);
    assert_eq!(probes.body.read().velocity, Vec2::new(4.0, 0.0));
    assert!(probes.body.read().collision_enabled);
    assert!(probes.render.read().air_layer);
    assert_eq!(probes.graph.read().floats.get("stun"), Some(&0.1));
    assert_eq!(probes.graph.read().bools.get("reset"), Some(&true));
}

#[test]
fn test_knockback_lands_once_and_restores_visuals() {
    let (mut creature, probes) = spawn(100);
    creature.get_hit(hit(30, 0.05, -2.0));

    tick_n(&mut creature, 8);
    assert!(creature.is_airborne());
    assert!(probes.render.read().position.y > 0.2); // около пика дуги

    tick_n(&mut creature, 6); // 14 тиков ≈ 0.233s
    assert!(creature.is_airborne());

    tick_n(&mut creature, 2); // 16 тиков ≈ 0.267s
    assert!(!creature.is_airborne());
    assert!(!creature.is_stunned());
    assert!(!creature.is_dead());

    let render = probes.render.read();
    assert_eq!(render.tint, Tint::Normal);
    assert_eq!(render.tint_changes, 2); // Damaged → Normal
    assert!(!render.air_layer);
    drop(render);

    assert_eq!(probes.body.read().velocity, Vec2::ZERO);
    assert_eq!(probes.graph.read().bools.get("reset"), Some(&false));
    assert_eq!(probes.graph.read().floats.get("stun"), Some(&0.0));

    // Дальше AI снова работает, landing не повторяется
    let ai_before = creature.behavior.ai_calls;
    tick_n(&mut creature, 30);
    assert_eq!(creature.behavior.ai_calls, ai_before + 30);
    assert_eq!(probes.render.read().tint_changes, 2);
}

#[test]
fn test_lethal_hit_dies_on_landing_exactly_once() {
    let (mut creature, probes) = spawn(10);

    assert!(creature.get_hit(hit(15, 0.3, 5.0)));
    assert_eq!(creature.hp(), 0);
    assert!(!creature.is_dead()); // смерть только при приземлении
    assert!(!creature.flipped);

    tick_n(&mut creature, 30);
    assert!(creature.is_dead());
    assert_eq!(creature.behavior.deaths, 1);
    assert_eq!(probes.body.read().releases, 1);
    assert!(!probes.shapes.read().hurtbox_enabled);
    assert_eq!(probes.graph.read().bools.get("Dead"), Some(&true));

    let idle_before = creature.behavior.death_idle_calls;
    tick_n(&mut creature, 30);
    assert_eq!(creature.behavior.deaths, 1);
    assert_eq!(creature.behavior.death_idle_calls, idle_before + 30);
    assert_eq!(creature.behavior.ai_calls, 0); // весь полёт + смерть без AI
}

#[test]
fn test_hits_after_death_are_inert() {
    let (mut creature, probes) = spawn(10);
    creature.get_hit(hit(15, 0.0, 0.0));
    tick_n(&mut creature, 30);
    assert!(creature.is_dead());
    let tint_changes = probes.render.read().tint_changes;

    assert!(!creature.get_hit(hit(50, 1.0, 0.0)));
    assert_eq!(creature.hp(), 0);
    assert!(!creature.is_airborne());
    assert_eq!(probes.render.read().tint_changes, tint_changes);
}

#[test]
fn test_overkill_while_airborne_still_dies_once() {
    let (mut creature, _probes) = spawn(10);

    assert!(creature.get_hit(hit(15, 0.1, 0.0)));
    tick_n(&mut creature, 5);
    assert!(creature.get_hit(hit(15, 0.1, 0.0)));
    assert!(creature.get_hit(hit(999, 0.1, 0.0)));
    assert_eq!(creature.hp(), 0);

    tick_n(&mut creature, 60);
    assert!(creature.is_dead());
    assert_eq!(creature.behavior.deaths, 1);
}

#[test]
fn test_vetoed_hit_is_no_op() {
    let (mut creature, probes) = spawn(100);
    creature.set_hitbox(Some(1));
    creature.behavior.veto = true;

    assert!(!creature.get_hit(hit(30, 0.5, -1.0)));

    assert_eq!(creature.hp(), 100);
    assert!(!creature.is_airborne());
    assert!(!creature.is_stunned());
    assert!(creature.armed().is_some()); // атака не сброшена
    assert_eq!(probes.render.read().tint_changes, 0);
    assert_eq!(probes.health_bar.read().fraction, 1.0);
}

#[test]
fn test_health_never_increases_and_stays_in_bounds() {
    let (mut creature, _probes) = spawn(100);
    let mut previous = creature.hp();

    for damage in [0, 5, 1, 40, 0, 200, 3] {
        creature.get_hit(hit(damage, 0.0, 0.0));
        assert!(creature.hp() <= previous);
        assert!(creature.hp() <= creature.health().max);
        previous = creature.hp();
        tick_n(&mut creature, 3);
    }

    assert_eq!(creature.hp(), 0);
}

#[test]
fn test_hit_resets_attack() {
    let (mut creature, probes) = spawn(100);
    assert!(creature.set_hitbox(Some(0)));
    assert!(probes.shapes.read().hitbox.is_some());

    creature.get_hit(hit(1, 0.0, 1.0));

    assert!(creature.armed().is_none());
    assert!(probes.shapes.read().hitbox.is_none());
}

// ============================================================================
// Air travel
// ============================================================================

#[test]
fn test_lower_priority_air_request_dropped_during_knockback() {
    let (mut creature, _probes) = spawn(100);
    creature.get_hit(hit(5, 0.0, 0.0));
    let before = *creature.air().state().unwrap();

    let hop = AirRequest {
        duration: 0.6,
        peak_height: 1.0,
        velocity: Vec2::new(0.0, 1.0),
        pass_over: true,
        landing: Landing::Behavior(3),
        priority: 0,
    };
    assert!(!creature.request_air(hop));
    assert_eq!(*creature.air().state().unwrap(), before);

    let launch = AirRequest { priority: 2, ..hop };
    assert!(creature.request_air(launch));
    assert_eq!(creature.air().state().unwrap().remaining, 0.6);
}

#[test]
fn test_behavior_landing_and_pass_over() {
    let (mut creature, probes) = spawn(100);
    let hop = AirRequest {
        duration: 0.5,
        peak_height: 1.0,
        velocity: Vec2::new(2.0, 0.0),
        pass_over: true,
        landing: Landing::Behavior(7),
        priority: 0,
    };

    assert!(creature.request_air(hop));
    assert!(!probes.body.read().collision_enabled);
    assert_eq!(probes.body.read().velocity, Vec2::new(2.0, 0.0));

    tick_n(&mut creature, 40);

    assert_eq!(creature.behavior.landed_tags, vec![7]);
    assert!(probes.body.read().collision_enabled);
    assert_eq!(probes.body.read().velocity, Vec2::ZERO);
    assert!(!probes.render.read().air_layer);
}

#[test]
fn test_arc_chained_from_landing_keeps_air_layer() {
    let (mut creature, probes) = spawn(100);
    creature.behavior.chained_arc = Some(AirRequest {
        duration: 0.5,
        peak_height: 0.8,
        velocity: Vec2::new(0.0, 1.5),
        pass_over: true,
        landing: Landing::Behavior(2),
        priority: 0,
    });
    let first = AirRequest {
        duration: 0.2,
        peak_height: 0.3,
        velocity: Vec2::new(1.0, 0.0),
        pass_over: true,
        landing: Landing::Behavior(1),
        priority: 0,
    };

    assert!(creature.request_air(first));
    tick_n(&mut creature, 13); // первая дуга приземлилась, вторая в полёте

    assert_eq!(creature.behavior.landed_tags, vec![1]);
    assert!(creature.is_airborne());
    assert!(probes.render.read().air_layer);
    assert!(!probes.body.read().collision_enabled);
    assert_eq!(probes.body.read().velocity, Vec2::new(0.0, 1.5));

    tick_n(&mut creature, 40);

    assert_eq!(creature.behavior.landed_tags, vec![1, 2]);
    assert!(!creature.is_airborne());
    assert!(!probes.render.read().air_layer);
    assert!(probes.body.read().collision_enabled);
}

#[test]
fn test_zero_duration_air_request_rejected() {
    let (mut creature, probes) = spawn(100);
    let request = AirRequest {
        duration: 0.0,
        peak_height: 1.0,
        velocity: Vec2::X,
        pass_over: true,
        landing: Landing::Nothing,
        priority: 9,
    };

    assert!(!creature.request_air(request));
    assert!(!creature.is_airborne());
    assert!(probes.body.read().collision_enabled);
}

// ============================================================================
// Hitboxes
// ============================================================================

#[test]
fn test_set_hitbox_selects_by_facing() {
    let (mut creature, probes) = spawn(100);

    assert!(creature.set_hitbox(Some(1)));
    let unflipped = probes.shapes.read().hitbox.clone().unwrap();
    assert_eq!(creature.armed_hitbox().unwrap().damage, 20);

    creature.flipped = true;
    assert!(creature.set_hitbox(Some(1)));
    let flipped = probes.shapes.read().hitbox.clone().unwrap();

    assert_ne!(unflipped, flipped);
    assert_eq!(flipped[0].x, -1.5);
    assert_eq!(creature.behavior.modified_phases, vec![1, 1]);
}

#[test]
fn test_set_hitbox_none_always_disarms() {
    let (mut creature, probes) = spawn(100);

    assert!(!creature.set_hitbox(None));
    assert!(creature.armed().is_none());

    creature.set_hitbox(Some(0));
    assert!(!creature.set_hitbox(None));
    assert!(creature.armed().is_none());
    assert!(probes.shapes.read().hitbox.is_none());
    assert_eq!(creature.behavior.modified_phases, vec![0]);
}

#[test]
fn test_unknown_phase_disarms() {
    let (mut creature, probes) = spawn(100);
    creature.set_hitbox(Some(0));

    assert!(!creature.set_hitbox(Some(5)));
    assert!(creature.armed().is_none());
    assert!(probes.shapes.read().hitbox.is_none());
}

#[test]
fn test_strike_uses_armed_entry() {
    let (mut creature, _probes) = spawn(100);
    let attacker = Entity::from_raw(3);
    assert!(creature.strike(attacker, Vec2::X).is_none());

    creature.set_hitbox(Some(1));
    let hit = creature.strike(attacker, Vec2::new(0.0, 2.0)).unwrap();
    assert_eq!(hit.damage, 20);
    assert_eq!(hit.source.phase, 1);
    assert_eq!(hit.source.attacker, attacker);
    assert_eq!(hit.knockback_direction, Vec2::new(0.0, 2.0));
}

#[test]
fn test_hit_confirmation_reaches_behavior() {
    let (mut creature, _probes) = spawn(100);
    let target = Entity::from_raw(11);

    creature.notify_hit_confirmed(target);
    assert_eq!(creature.behavior.confirmed_targets, vec![target]);
}

// ============================================================================
// Buffs
// ============================================================================

#[test]
fn test_buff_halves_speed_then_expires() {
    let (mut creature, _probes) = spawn(100);
    assert_eq!(creature.speed(), 2.0);

    creature.add_buff(0.5, BuffEffect::ScaleSpeed(0.5));
    assert_eq!(creature.stats().speed_mod, 0.5);
    assert_eq!(creature.speed(), 1.0);

    creature.tick(0.3);
    assert_eq!(creature.stats().speed_mod, 0.5);
    creature.tick(0.3);
    assert_eq!(creature.stats().speed_mod, 1.0);
}

#[test]
fn test_buff_aging_precedes_ai() {
    let (mut creature, _probes) = spawn(100);
    creature.add_buff(0.1, BuffEffect::ScaleSpeed(0.5));

    creature.tick(0.2);

    // AI видит уже пересчитанный StatBlock того же тика
    assert_eq!(creature.behavior.observed_speed, Some(2.0));
}

// ============================================================================
// Movement & visuals
// ============================================================================

#[test]
fn test_move_in_direction_uses_buffed_speed() {
    let (mut creature, probes) = spawn(100);
    creature.add_buff(5.0, BuffEffect::Slow(0.5));

    creature.move_in_direction(Vec2::new(-3.0, 0.0));
    assert_eq!(probes.body.read().velocity, Vec2::new(-1.0, 0.0));
    assert!(creature.flipped);
    assert!(creature.moving);

    creature.tick(DT);
    assert_eq!(probes.graph.read().bools.get("isMoving"), Some(&true));
    assert!(probes.render.read().flipped);

    creature.stop();
    creature.tick(DT);
    assert_eq!(probes.graph.read().bools.get("isMoving"), Some(&false));
    assert_eq!(probes.body.read().velocity, Vec2::ZERO);
}

#[test]
fn test_sort_order_follows_position() {
    let rig = HeadlessRig::at(Vec2::new(0.0, 1.5));
    let probes = rig.probes();
    let mut creature = Creature::new(
        TestBehavior::default(),
        CreatureConfig::default(),
        Vec::new(),
        rig.into_collaborators(),
    )
    .unwrap();

    creature.tick(DT);
    assert_eq!(probes.render.read().sort_order, -1500);
    assert_eq!(creature.position(), Vec2::new(0.0, 1.5));
}

#[test]
fn test_health_bar_setup() {
    let (_creature, probes) = spawn(100);
    let bar = probes.health_bar.read();
    assert_eq!(bar.fraction, 1.0);
    assert_eq!(bar.offset, 0.6);
}

#[test]
fn test_sprite_visibility_toggle() {
    let (mut creature, probes) = spawn(100);
    creature.set_sprite_visible(false);
    assert!(!probes.render.read().visible);
}

// ============================================================================
// Death & cleanup
// ============================================================================

#[test]
fn test_die_is_idempotent() {
    let (mut creature, probes) = spawn(100);

    creature.die();
    creature.die();

    assert!(creature.is_dead());
    assert_eq!(creature.behavior.deaths, 1);
    assert_eq!(probes.body.read().releases, 1);
}

#[test]
fn test_cleanup_twice_is_safe() {
    let (mut creature, probes) = spawn(100);

    creature.cleanup();
    creature.cleanup();

    assert_eq!(probes.body.read().releases, 1);
    assert_eq!(probes.health_bar.read().releases, 1);
    assert_eq!(probes.render.read().releases, 1);
}

#[test]
fn test_cleanup_releases_shapes_and_goes_inert() {
    let (mut creature, probes) = spawn(100);
    creature.set_hitbox(Some(0));

    creature.cleanup();

    assert!(creature.is_released());
    assert!(creature.armed().is_none());
    assert!(probes.shapes.read().hitbox.is_none());
    assert!(!probes.shapes.read().hurtbox_enabled);

    let render = probes.render.read().clone();
    let shapes = probes.shapes.read().clone();
    let body = probes.body.read().clone();
    let health_bar = probes.health_bar.read().clone();
    let graph_writes = probes.graph.read().writes;

    // Ни одной записи в collaborators после cleanup
    tick_n(&mut creature, 5);
    assert!(!creature.get_hit(hit(5, 0.1, -1.0)));
    assert!(!creature.set_hitbox(Some(1)));
    assert!(!creature.request_air(AirRequest {
        duration: 0.3,
        peak_height: 0.2,
        velocity: Vec2::X,
        pass_over: true,
        landing: Landing::Nothing,
        priority: 5,
    }));
    creature.reset_attack();
    creature.set_sprite_visible(false);
    creature.move_in_direction(Vec2::X);
    creature.die();

    assert_eq!(*probes.render.read(), render);
    assert_eq!(*probes.shapes.read(), shapes);
    assert_eq!(*probes.body.read(), body);
    assert_eq!(*probes.health_bar.read(), health_bar);
    assert_eq!(probes.graph.read().writes, graph_writes);
    assert_eq!(creature.hp(), 100);
    assert!(!creature.is_dead());
    assert_eq!(creature.behavior.ai_calls, 0);
}

#[test]
fn test_cleanup_after_death_does_not_double_release_body() {
    let (mut creature, probes) = spawn(100);
    creature.die();
    creature.cleanup();

    assert_eq!(probes.body.read().releases, 1);
    assert_eq!(probes.health_bar.read().releases, 1);
}

#[test]
fn test_unpaired_hitboxes_fail_setup() {
    let rig = HeadlessRig::at(Vec2::ZERO);
    let result = Creature::new(
        TestBehavior::default(),
        CreatureConfig::default(),
        vec![hitbox(1, 0.0)],
        rig.into_collaborators(),
    );

    assert!(matches!(
        result,
        Err(crate::combat::HitboxError::UnpairedDefinition { count: 1 })
    ));
}
