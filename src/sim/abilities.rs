/// Ability/cooldown engine.
///
/// `try_use_ability` is the single entry point for every cast. It gates on
/// phase, unlock state and cooldown, dispatches on the registry's
/// `AbilityEffect`, arms the cooldown, and finally routes any kills through
/// the combat resolver's death sweep.
///
/// Decoys and bombs left behind by a cast are advanced by `tick_decoys`
/// and `tick_bombs`; meteor volleys go through the world's scheduled queue.

use std::f32::consts::TAU;

use tracing::debug;

use crate::domain::ability::{self, AbilityEffect, AbilityId, COOLDOWN_STEP, OBLITERATE};
use crate::domain::collision::{clamp_to_arena, distance_to_segment, within_radius, Vec2};
use crate::domain::entity::{
    ms_to_ticks, Beam, Bomb, Decoy, Element, Modifier, Owner, Projectile, Rgb,
};
use super::combat;
use super::event::GameEvent;
use super::world::{Deferred, WorldState};

const DECOY_SHOT_SPEED: f32 = 15.0;
const DECOY_SHOT_LIFE: u32 = 120;
const DECOY_SHOT_RADIUS: f32 = 12.0;

// ══════════════════════════════════════════════════════════════
// Cooldowns
// ══════════════════════════════════════════════════════════════

pub fn tick_cooldowns(world: &mut WorldState) {
    for cd in &mut world.cooldowns {
        *cd = cd.saturating_sub(COOLDOWN_STEP);
    }
}

/// Fraction of the last cooldown still remaining, 0.0 when ready.
pub fn cooldown_ratio(world: &WorldState, id: AbilityId) -> f32 {
    let full = world.cooldown_spans[id as usize].max(1);
    (world.cooldown(id) as f32 / full as f32).min(1.0)
}

// ══════════════════════════════════════════════════════════════
// Casting
// ══════════════════════════════════════════════════════════════

/// Fire whatever is equipped in `slot`. Empty slots are a no-op.
pub fn try_use_slot(world: &mut WorldState, slot: usize, events: &mut Vec<GameEvent>) -> bool {
    match world.loadout.get(slot) {
        Some(id) => try_use_ability(world, id, events),
        None => false,
    }
}

/// Cast `id` if it is unlocked and off cooldown. Returns whether it fired.
pub fn try_use_ability(world: &mut WorldState, id: AbilityId, events: &mut Vec<GameEvent>) -> bool {
    if !world.phase.is_live() || world.paused {
        return false;
    }
    if world.cooldown(id) > 0 || !world.is_available(id) {
        return false;
    }

    let def = id.def();
    let tier = world.tier(id);
    let damage = ability::projectile_damage(id, tier, world.player.damage_bonus());
    let origin = world.player.pos;
    let aim = world.player.aim;
    let mut color = Rgb::hex(0xFFFFFF);

    match def.effect {
        AbilityEffect::Aimed { speed, life, radius, element } => {
            color = element.color();
            world.push_projectile(Projectile {
                pos: origin,
                vel: origin.velocity_toward(aim, speed),
                damage,
                element,
                owner: Owner::Player,
                life,
                radius,
            });
        }
        AbilityEffect::Radial { count, speed, life, radius, element } => {
            color = element.color();
            for i in 0..count {
                let angle = i as f32 * TAU / count as f32;
                world.push_projectile(Projectile {
                    pos: origin,
                    vel: Vec2::from_angle(angle) * speed,
                    damage,
                    element,
                    owner: Owner::Player,
                    life,
                    radius,
                });
            }
        }
        AbilityEffect::Teleport => {
            world.player.pos = clamp_to_arena(aim, world.player.radius, world.width, world.height);
        }
        AbilityEffect::Buff { modifiers, ms } => {
            for &m in modifiers {
                world.player.modifiers.arm(m, ms_to_ticks(ms));
            }
        }
        AbilityEffect::SlowEnemies { ms } => {
            for e in &mut world.enemies {
                e.slow_ticks = ms_to_ticks(ms);
            }
        }
        AbilityEffect::FreezeEnemies { ms } => {
            color = Element::Ice.color();
            for e in &mut world.enemies {
                e.frozen_ticks = ms_to_ticks(ms);
            }
        }
        AbilityEffect::FullHeal => {
            world.player.health = world.player.max_health;
        }
        AbilityEffect::Nova { radius } => {
            strike_area(world, origin, radius, def.base_damage);
        }
        AbilityEffect::Decoys { count, distance, shots, interval_ms } => {
            for i in 0..count {
                let angle = i as f32 * TAU / count as f32;
                let pos = clamp_to_arena(
                    origin + Vec2::from_angle(angle) * distance,
                    world.player.radius,
                    world.width,
                    world.height,
                );
                world.decoys.push(Decoy {
                    pos,
                    shots_left: shots,
                    next_shot: 0,
                    interval: ms_to_ticks(interval_ms),
                    damage,
                });
            }
        }
        AbilityEffect::Chain { max_hops } => {
            color = Element::Lightning.color();
            chain_strike(world, origin, max_hops, def.base_damage);
        }
        AbilityEffect::Meteors { count, interval_ms } => {
            color = Element::Fire.color();
            for i in 0..count {
                world.schedule(i * ms_to_ticks(interval_ms), Deferred::Meteor { damage });
            }
        }
        AbilityEffect::Void { radius } => {
            strike_area(world, aim, radius, def.base_damage);
        }
        AbilityEffect::TimeBomb { fuse_ms, radius } => {
            let pos = clamp_to_arena(aim, 0.0, world.width, world.height);
            world.bombs.push(Bomb { pos, fuse: ms_to_ticks(fuse_ms), radius, damage: def.base_damage });
        }
        AbilityEffect::Laser { length, half_width, life } => {
            let dir = (aim - origin).normalized();
            let dir = if dir == Vec2::ZERO { Vec2::new(1.0, 0.0) } else { dir };
            let end = origin + dir * length;
            for e in &mut world.enemies {
                if distance_to_segment(e.pos, origin, end) < half_width + e.radius {
                    e.strike(def.base_damage);
                }
            }
            world.player.beam = Some(Beam { origin, end, life });
        }
        AbilityEffect::ClearRoom => {
            for e in &mut world.enemies {
                e.health = -OBLITERATE;
            }
        }
    }

    let rapid = world.player.modifiers.is_active(Modifier::RapidFire);
    let span = ability::cooldown_after_cast(id, tier, rapid);
    world.cooldowns[id as usize] = span;
    world.cooldown_spans[id as usize] = span;
    world.effects.cast(origin, color, world.lagging);
    debug!(ability = id.name(), "ability used");
    events.push(GameEvent::AbilityUsed { id });

    combat::sweep_dead_enemies(world, events);
    true
}

/// Direct damage to every enemy within `radius` of `center`.
fn strike_area(world: &mut WorldState, center: Vec2, radius: f32, amount: i32) {
    for e in &mut world.enemies {
        if within_radius(center, e.pos, radius) {
            e.strike(amount);
        }
    }
}

/// Hop nearest-next from `from` through up to `max_hops` distinct enemies.
fn chain_strike(world: &mut WorldState, from: Vec2, max_hops: usize, amount: i32) {
    let mut hit = vec![false; world.enemies.len()];
    let mut at = from;
    for _ in 0..max_hops {
        let next = world.enemies.iter().enumerate()
            .filter(|(i, _)| !hit[*i])
            .min_by(|(_, a), (_, b)| at.distance(a.pos).total_cmp(&at.distance(b.pos)))
            .map(|(i, _)| i);
        let Some(i) = next else { break };
        hit[i] = true;
        world.enemies[i].strike(amount);
        at = world.enemies[i].pos;
    }
}

// ══════════════════════════════════════════════════════════════
// Lingering helpers
// ══════════════════════════════════════════════════════════════

/// Let decoys fire at the nearest enemy on their interval.
pub fn tick_decoys(world: &mut WorldState) {
    let mut shots = Vec::new();
    for d in &mut world.decoys {
        if !d.tick() {
            continue;
        }
        let target = world.enemies.iter()
            .map(|e| e.pos)
            .min_by(|a, b| d.pos.distance(*a).total_cmp(&d.pos.distance(*b)));
        if let Some(t) = target {
            shots.push(Projectile {
                pos: d.pos,
                vel: d.pos.velocity_toward(t, DECOY_SHOT_SPEED),
                damage: d.damage,
                element: Element::Arcane,
                owner: Owner::Player,
                life: DECOY_SHOT_LIFE,
                radius: DECOY_SHOT_RADIUS,
            });
        }
    }
    world.decoys.retain(|d| !d.is_spent());
    for s in shots {
        world.push_projectile(s);
    }
}

/// Burn bomb fuses and detonate the ones that run out.
pub fn tick_bombs(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let mut blasts = Vec::new();
    world.bombs.retain_mut(|b| {
        if b.tick() {
            blasts.push((b.pos, b.radius, b.damage));
            false
        } else {
            true
        }
    });
    if blasts.is_empty() {
        return;
    }
    for (pos, radius, damage) in blasts {
        strike_area(world, pos, radius, damage);
        world.effects.blast(pos, world.lagging);
        events.push(GameEvent::BombDetonated { pos });
    }
    combat::sweep_dead_enemies(world, events);
}
