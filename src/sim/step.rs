/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Aim and player movement (slow-frame compensation applied here)
///   2. Cooldowns, then the fire command
///   3. Scheduled spawns and meteors, decoys, bomb fuses
///   4. Combat: enemy chase, boss attacks, projectiles, hits, melee, deaths
///   5. Magnet drift, pickup and key collection, ambient pickups
///   6. Timer updates (modifiers, beam, particles, banner)
///   7. Game over / boss defeated / passage / victory
///
/// A paused world does not advance at all. Outside the live phases only
/// the upgrade and game-over countdowns run. Any phase change stops the
/// tick early so nothing resolves against a room that was just replaced.

use crate::domain::ability::AbilityId;
use crate::domain::collision::{circles_overlap, clamp_to_arena, Vec2};
use crate::domain::entity::{FireCommand, FrameInput, Modifier, MoveIntent};
use super::abilities;
use super::combat;
use super::event::GameEvent;
use super::progression;
use super::spawn;
use super::world::{Phase, WorldState};

/// Magnet pull range and per-tick drift.
const MAGNET_RANGE: f32 = 200.0;
const MAGNET_PULL: f32 = 5.0;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    if world.paused { return events; }

    match world.phase {
        Phase::UpgradeCountdown | Phase::GameOver => {
            tick_message(world);
            progression::tick_countdown(world, &mut events);
            return events;
        }
        phase if !phase.is_live() => return events,
        _ => {}
    }

    world.tick += 1;
    world.lagging = input.lagging;
    tick_message(world);

    resolve_aim(world, input.aim);
    resolve_player_movement(world, input.movement, input.lagging);
    abilities::tick_cooldowns(world);
    resolve_fire(world, input.fire, &mut events);

    spawn::run_scheduled(world);
    abilities::tick_decoys(world);
    abilities::tick_bombs(world, &mut events);

    combat::move_enemies(world);
    combat::resolve_boss_attacks(world, &mut events);
    combat::advance_projectiles(world);
    combat::resolve_projectile_hits(world, &mut events);
    combat::resolve_melee(world, &mut events);
    combat::sweep_dead_enemies(world, &mut events);

    resolve_magnet(world);
    resolve_pickups(world, &mut events);
    if resolve_keys(world, &mut events) { return events; }
    spawn::ambient_pickups(world);

    resolve_timers(world);

    if progression::check_game_over(world, &mut events) { return events; }
    if progression::check_boss_defeated(world, &mut events) { return events; }
    if progression::check_victory(world, &mut events) { return events; }
    progression::check_passage(world, &mut events);

    events
}

fn tick_message(world: &mut WorldState) {
    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 { world.message.clear(); }
    }
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

/// Explicit aim wins; otherwise lock on to the nearest enemy.
fn resolve_aim(world: &mut WorldState, aim: Option<Vec2>) {
    if let Some(p) = aim {
        world.player.aim = p;
        return;
    }
    let from = world.player.pos;
    let nearest = world.enemies.iter()
        .map(|e| e.pos)
        .min_by(|a, b| from.distance(*a).total_cmp(&from.distance(*b)));
    if let Some(p) = nearest {
        world.player.aim = p;
    }
}

fn resolve_player_movement(world: &mut WorldState, movement: MoveIntent, lagging: bool) {
    if movement.is_idle() { return; }
    let speed = world.player.speed(lagging);
    let next = world.player.pos + movement.displacement(speed);
    world.player.pos = clamp_to_arena(next, world.player.radius, world.width, world.height);
}

fn resolve_fire(world: &mut WorldState, fire: Option<FireCommand>, events: &mut Vec<GameEvent>) {
    match fire {
        Some(FireCommand::Slot(slot)) => { abilities::try_use_slot(world, slot, events); }
        Some(FireCommand::Lightning) => {
            abilities::try_use_ability(world, AbilityId::Lightning, events);
        }
        None => {}
    }
}

// ══════════════════════════════════════════════════════════════
// Collectibles
// ══════════════════════════════════════════════════════════════

fn resolve_magnet(world: &mut WorldState) {
    if !world.player.modifiers.is_active(Modifier::Magnet) { return; }
    let target = world.player.pos;
    for p in &mut world.pickups {
        if p.pos.distance(target) < MAGNET_RANGE {
            p.pos = p.pos.step_toward(target, MAGNET_PULL);
        }
    }
    for k in &mut world.keys {
        if k.pos.distance(target) < MAGNET_RANGE {
            k.pos = k.pos.step_toward(target, MAGNET_PULL);
        }
    }
}

/// Overlapping pickups go into the inventory, never applied directly.
fn resolve_pickups(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let p = world.player.pos;
    let r = world.player.radius;
    for item in &mut world.pickups {
        if !item.collected && circles_overlap(p, r, item.pos, item.radius) {
            item.collected = true;
            world.inventory.add(item.kind);
            world.effects.hit(item.pos, item.kind.color(), world.lagging);
            events.push(GameEvent::PickupCollected { kind: item.kind });
        }
    }
    world.pickups.retain(|item| !item.collected);
}

/// Returns true if a key raised a boss offer.
fn resolve_keys(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    let p = world.player.pos;
    let r = world.player.radius;
    let mut i = 0;
    while i < world.keys.len() {
        let k = &world.keys[i];
        if circles_overlap(p, r, k.pos, k.radius) {
            world.keys.remove(i);
            progression::collect_key(world, events);
            if world.phase != Phase::InRoom {
                return true;
            }
        } else {
            i += 1;
        }
    }
    false
}

// ══════════════════════════════════════════════════════════════
// Timers
// ══════════════════════════════════════════════════════════════

fn resolve_timers(world: &mut WorldState) {
    world.player.modifiers.tick();
    if let Some(beam) = &mut world.player.beam {
        beam.life = beam.life.saturating_sub(1);
        if beam.life == 0 {
            world.player.beam = None;
        }
    }
    world.effects.tick();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaConfig;
    use crate::domain::entity::{KeyItem, Owner, Pickup, LAG_SPEED_FACTOR};
    use crate::domain::item::{FoodKind, ItemKind};

    fn started() -> WorldState {
        let mut w = WorldState::new(ArenaConfig::default(), Some(2024));
        progression::start_game(&mut w, &mut vec![]);
        w
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn moving(dx: i8, dy: i8) -> FrameInput {
        FrameInput { movement: MoveIntent { dx, dy }, ..FrameInput::default() }
    }

    #[test]
    fn first_tick_spawns_room() {
        let mut w = started();
        step(&mut w, idle());
        assert_eq!(w.enemies.len(), 1);
        // the key may land on the player and be collected at once
        assert_eq!(w.keys.len() + w.keys_collected as usize, 1);
        assert_eq!(w.tick, 1);
    }

    #[test]
    fn boss_attacks_on_first_arena_tick() {
        let mut w = started();
        w.keys_collected = 5;
        progression::check_boss_offer(&mut w, &mut vec![]);
        assert!(progression::accept_boss(&mut w, &mut vec![]));

        let ev = step(&mut w, idle());
        assert!(ev.contains(&GameEvent::BossAttack));
        let shots = w.projectiles.iter().filter(|p| p.owner == Owner::Boss).count();
        assert_eq!(shots, 7);
    }

    #[test]
    fn movement_clamps_to_arena() {
        let mut w = started();
        step(&mut w, moving(1, 0));
        assert_eq!(w.player.pos, Vec2::new(405.0, 300.0));
        for _ in 0..200 {
            let ev = step(&mut w, moving(1, 0));
            // a passage on the right edge swaps the room
            if ev.iter().any(|e| matches!(e, GameEvent::RoomEntered { .. })) { return; }
        }
        assert_eq!(w.player.pos.x, 780.0);
    }

    #[test]
    fn slow_frames_move_farther() {
        let mut w = started();
        let lagging = FrameInput { lagging: true, ..moving(0, 1) };
        step(&mut w, lagging);
        assert!((w.player.pos.y - (300.0 + 5.0 * LAG_SPEED_FACTOR)).abs() < 1e-4);
    }

    #[test]
    fn pause_freezes_everything() {
        let mut w = started();
        w.player.modifiers.set(Modifier::Shield, 30);
        w.cooldowns[AbilityId::Ice as usize] = 400;
        assert!(progression::toggle_pause(&mut w));
        for _ in 0..100 {
            assert!(step(&mut w, moving(1, 1)).is_empty());
        }
        assert_eq!(w.tick, 0);
        assert_eq!(w.player.modifiers.remaining(Modifier::Shield), 30);
        assert_eq!(w.cooldown(AbilityId::Ice), 400);
        assert_eq!(w.scheduled.len(), w.rooms[0].enemy_quota + 1);
        assert_eq!(w.player.pos, w.center());
    }

    #[test]
    fn pickups_go_to_inventory() {
        let mut w = started();
        w.player.health = 100;
        let apple = ItemKind::Food(FoodKind::Apple);
        w.pickups.push(Pickup::new(w.player.pos, apple));
        let ev = step(&mut w, idle());
        assert!(ev.contains(&GameEvent::PickupCollected { kind: apple }));
        assert_eq!(w.inventory.count(apple), 1);
        assert_eq!(w.player.health, 100);
    }

    #[test]
    fn fifth_key_halts_for_offer() {
        let mut w = started();
        w.keys_collected = 4;
        w.keys.push(KeyItem::new(w.player.pos));
        let ev = step(&mut w, idle());
        assert!(ev.contains(&GameEvent::KeyCollected { total: 5 }));
        assert_eq!(w.phase, Phase::BossOffered);

        // nothing advances while the dialog is up
        let tick = w.tick;
        assert!(step(&mut w, moving(1, 0)).is_empty());
        assert_eq!(w.tick, tick);
    }

    #[test]
    fn fire_command_casts_equipped_slot() {
        let mut w = started();
        let fire = FrameInput { fire: Some(FireCommand::Slot(2)), aim: Some(Vec2::new(700.0, 300.0)), ..idle() };
        let ev = step(&mut w, fire);
        assert!(ev.contains(&GameEvent::AbilityUsed { id: AbilityId::Combined }));
        assert_eq!(w.projectiles.len(), 1);
        assert!(w.projectiles[0].vel.x > 0.0);

        let bolt = FrameInput { fire: Some(FireCommand::Lightning), ..idle() };
        assert!(!step(&mut w, bolt).contains(&GameEvent::AbilityUsed { id: AbilityId::Lightning }));
    }

    #[test]
    fn auto_aim_tracks_nearest_enemy() {
        let mut w = started();
        step(&mut w, idle());
        let target = w.enemies[0].pos;
        step(&mut w, idle());
        let now = w.enemies[0].pos;
        assert_ne!(target, now);
        // aim was taken before the enemy moved this tick
        assert_eq!(w.player.aim, target);
    }

    #[test]
    fn death_ends_the_game() {
        let mut w = started();
        w.player.health = 1;
        w.player.damage(5);
        let ev = step(&mut w, idle());
        assert!(ev.contains(&GameEvent::GameOver));
        assert_eq!(w.phase, Phase::GameOver);
        for _ in 0..180 {
            step(&mut w, idle());
        }
        assert_eq!(w.phase, Phase::Title);
    }

    #[test]
    fn health_bounds_hold_under_pressure() {
        let mut w = started();
        for _ in 0..600 {
            let ev = step(&mut w, FrameInput { fire: Some(FireCommand::Slot(0)), ..idle() });
            assert!(w.player.health >= 0 && w.player.health <= w.player.max_health);
            assert!(w.enemies.iter().all(|e| e.health >= 0 && e.health <= e.max_health));
            if ev.iter().any(|e| matches!(e, GameEvent::RoomEntered { .. } | GameEvent::GameOver)) { break; }
            if w.phase != Phase::InRoom { break; }
        }
    }

    #[test]
    fn magnet_pulls_items() {
        let mut w = started();
        w.player.modifiers.set(Modifier::Magnet, 100);
        let start = w.player.pos + Vec2::new(150.0, 0.0);
        w.pickups.push(Pickup::new(start, ItemKind::Food(FoodKind::Peach)));
        step(&mut w, idle());
        let pos = w.pickups.first().map(|p| p.pos);
        assert_eq!(pos, Some(start - Vec2::new(MAGNET_PULL, 0.0)));
    }
}
