/// Spawning: enemies, bosses, keys, pickups, and the deferred-spawn queue.

use rand::Rng;

use crate::domain::bestiary::{self, BOSSES, BOSS_HITS_TO_KILL, BOSS_SPEED_FACTOR, ENEMIES};
use crate::domain::collision::{clamp_to_arena, Vec2};
use crate::domain::entity::{Element, Enemy, KeyItem, Owner, Pickup, Projectile, PICKUP_RADIUS};
use crate::domain::item::{FoodKind, ItemKind, PowerUpKind};
use super::world::{Deferred, WorldState};

/// Enemies appear this far outside a random arena edge.
const EDGE_OFFSET: f32 = 30.0;
/// Keys never spawn closer than this to an arena edge.
const KEY_MARGIN: f32 = 150.0;
const MAX_AMBIENT_PICKUPS: usize = 4;
const AMBIENT_CHANCE: f64 = 0.008;
const AMBIENT_FOOD_CHANCE: f64 = 0.7;
const DROP_FOOD_CHANCE: f64 = 0.6;

const METEOR_SPEED: f32 = 12.0;
const METEOR_DRIFT: f32 = 2.0;
const METEOR_RADIUS: f32 = 25.0;
const METEOR_LIFE: u32 = 200;

pub fn spawn_enemy(world: &mut WorldState) {
    let arch = &ENEMIES[world.rng.gen_range(0..ENEMIES.len())];
    let (health, speed) = bestiary::scaled_stats(arch, world.current_room);
    let (w, h) = (world.width, world.height);
    let pos = match world.rng.gen_range(0..4) {
        0 => Vec2::new(world.rng.gen_range(0.0..w), -EDGE_OFFSET),
        1 => Vec2::new(w + EDGE_OFFSET, world.rng.gen_range(0.0..h)),
        2 => Vec2::new(world.rng.gen_range(0.0..w), h + EDGE_OFFSET),
        _ => Vec2::new(-EDGE_OFFSET, world.rng.gen_range(0.0..h)),
    };
    let id = world.alloc_enemy_id();
    world.enemies.push(Enemy::new(id, arch.name, arch.color, pos, arch.radius, health, speed));
}

pub fn spawn_boss(world: &mut WorldState, variant: usize) {
    let arch = &BOSSES[variant % BOSSES.len()];
    let pos = Vec2::new(world.width / 4.0, world.height / 4.0);
    let id = world.alloc_enemy_id();
    world.enemies.push(Enemy::new_boss(
        id,
        &bestiary::boss_display_name(variant),
        arch.color,
        pos,
        arch.radius,
        BOSS_HITS_TO_KILL,
        arch.speed * BOSS_SPEED_FACTOR,
    ));
}

pub fn spawn_key(world: &mut WorldState) {
    let x = world.rng.gen_range(KEY_MARGIN..(world.width - KEY_MARGIN).max(KEY_MARGIN + 1.0));
    let y = world.rng.gen_range(KEY_MARGIN..(world.height - KEY_MARGIN).max(KEY_MARGIN + 1.0));
    world.keys.push(KeyItem::new(Vec2::new(x, y)));
}

/// A random food (with probability `food_chance`) or power-up.
pub fn random_item<R: Rng>(rng: &mut R, food_chance: f64) -> ItemKind {
    if rng.gen_bool(food_chance) {
        ItemKind::Food(FoodKind::ALL[rng.gen_range(0..FoodKind::ALL.len())])
    } else {
        ItemKind::PowerUp(PowerUpKind::ALL[rng.gen_range(0..PowerUpKind::ALL.len())])
    }
}

/// Chance that a slain enemy leaves something behind.
pub fn drop_chance(room: usize) -> f64 {
    (0.4 + room as f64 * 0.01).min(1.0)
}

/// Maybe drop a pickup where an enemy died. Never inside the boss arena.
pub fn roll_drop(world: &mut WorldState, pos: Vec2) {
    if world.in_boss_arena {
        return;
    }
    if !world.rng.gen_bool(drop_chance(world.current_room)) {
        return;
    }
    let kind = random_item(&mut world.rng, DROP_FOOD_CHANCE);
    let at = clamp_to_arena(pos, PICKUP_RADIUS, world.width, world.height);
    world.pickups.push(Pickup::new(at, kind));
}

/// Occasional free pickup while the room is quiet.
pub fn ambient_pickups(world: &mut WorldState) {
    if world.in_boss_arena || world.pickups.len() >= MAX_AMBIENT_PICKUPS {
        return;
    }
    if !world.rng.gen_bool(AMBIENT_CHANCE) {
        return;
    }
    let kind = random_item(&mut world.rng, AMBIENT_FOOD_CHANCE);
    let x = world.rng.gen_range(50.0..world.width - 50.0);
    let y = world.rng.gen_range(50.0..world.height - 50.0);
    world.pickups.push(Pickup::new(Vec2::new(x, y), kind));
}

fn spawn_meteor(world: &mut WorldState, damage: i32) {
    let x = world.rng.gen_range(METEOR_RADIUS..world.width - METEOR_RADIUS);
    let drift = world.rng.gen_range(-METEOR_DRIFT..=METEOR_DRIFT);
    world.push_projectile(Projectile {
        pos: Vec2::new(x, 0.0),
        vel: Vec2::new(drift, METEOR_SPEED),
        damage,
        element: Element::Arcane,
        owner: Owner::Player,
        life: METEOR_LIFE,
        radius: METEOR_RADIUS,
    });
}

/// Count down deferred work and run whatever is due this tick.
pub fn run_scheduled(world: &mut WorldState) {
    let mut due = Vec::new();
    world.scheduled.retain_mut(|s| {
        if s.delay == 0 {
            due.push(s.action);
            false
        } else {
            s.delay -= 1;
            true
        }
    });

    for action in due {
        match action {
            Deferred::SpawnEnemy => spawn_enemy(world),
            Deferred::SpawnKey => spawn_key(world),
            Deferred::Meteor { damage } => spawn_meteor(world, damage),
        }
    }
}
