/// Combat resolver.
///
/// Per tick, in order: enemies chase, bosses fire, projectiles advance and
/// expire, projectile hits land, melee contact lands, then the dead are
/// swept. `sweep_dead_enemies` is the only place enemies are removed, so
/// every kill (projectile, area effect, room clear) goes through it.

use crate::domain::collision::{circles_overlap, out_of_bounds, Vec2};
use crate::domain::entity::{Element, Modifier, Owner, Projectile};
use super::event::GameEvent;
use super::spawn;
use super::world::WorldState;

pub const MELEE_DAMAGE: i32 = 15;

const BOSS_ATTACK_PERIOD: u32 = 240;
const BOSS_SHOT_SPEED: f32 = 4.0;
const BOSS_SHOT_DAMAGE: i32 = 8;
const BOSS_SHOT_RADIUS: f32 = 15.0;
const BOSS_SHOT_LIFE: u32 = 120;

const BOSS_SPECIAL_PERIOD: u32 = 600;
const BOSS_BURST_COUNT: u32 = 6;
const BOSS_BURST_SPEED: f32 = 3.0;
const BOSS_BURST_DAMAGE: i32 = 5;
const BOSS_BURST_RADIUS: f32 = 12.0;
const BOSS_BURST_LIFE: u32 = 100;

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

pub fn move_enemies(world: &mut WorldState) {
    let target = world.player.pos;
    for e in &mut world.enemies {
        e.pos = e.pos.step_toward(target, e.effective_speed());
        e.tick_status();
    }
}

pub fn advance_projectiles(world: &mut WorldState) {
    let (w, h) = (world.width, world.height);
    world.projectiles.retain_mut(|p| p.tick() && !out_of_bounds(p.pos, w, h));
}

// ══════════════════════════════════════════════════════════════
// Boss attacks
// ══════════════════════════════════════════════════════════════

pub fn resolve_boss_attacks(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let target = world.player.pos;
    let mut shots: Vec<Projectile> = Vec::new();

    for e in &mut world.enemies {
        let origin = e.pos;
        let boss = match &mut e.boss {
            Some(b) => b,
            None => continue,
        };

        boss.attack_cooldown = boss.attack_cooldown.saturating_sub(1);
        if boss.attack_cooldown == 0 {
            boss.attack_cooldown = BOSS_ATTACK_PERIOD;
            shots.push(boss_shot(origin, origin.velocity_toward(target, BOSS_SHOT_SPEED),
                BOSS_SHOT_DAMAGE, BOSS_SHOT_RADIUS, BOSS_SHOT_LIFE));
        }

        boss.special_cooldown = boss.special_cooldown.saturating_sub(1);
        if boss.special_cooldown == 0 {
            boss.special_cooldown = BOSS_SPECIAL_PERIOD;
            for i in 0..BOSS_BURST_COUNT {
                let angle = i as f32 * std::f32::consts::TAU / BOSS_BURST_COUNT as f32;
                shots.push(boss_shot(origin, Vec2::from_angle(angle) * BOSS_BURST_SPEED,
                    BOSS_BURST_DAMAGE, BOSS_BURST_RADIUS, BOSS_BURST_LIFE));
            }
        }
    }

    if !shots.is_empty() {
        events.push(GameEvent::BossAttack);
    }
    for s in shots {
        world.push_projectile(s);
    }
}

fn boss_shot(pos: Vec2, vel: Vec2, damage: i32, radius: f32, life: u32) -> Projectile {
    Projectile { pos, vel, damage, element: Element::Boss, owner: Owner::Boss, life, radius }
}

// ══════════════════════════════════════════════════════════════
// Hits
// ══════════════════════════════════════════════════════════════

/// Land every projectile on its first overlapping target. Non-piercing:
/// a projectile that hits anything is spent.
pub fn resolve_projectile_hits(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let tick = world.tick;
    let lagging = world.lagging;
    let player_pos = world.player.pos;
    let player_radius = world.player.radius;
    let player_shielded = world.player.has_shield();
    let mut player_invincible = world.player.is_invincible();

    let mut spent = vec![false; world.projectiles.len()];
    let mut incoming: Vec<i32> = Vec::new();

    for (i, p) in world.projectiles.iter().enumerate() {
        match p.owner {
            Owner::Player => {
                let target = world.enemies.iter_mut()
                    .find(|e| !e.is_dead() && circles_overlap(p.pos, p.radius, e.pos, e.radius));
                if let Some(e) = target {
                    e.apply_hit(p.damage, tick);
                    world.effects.hit(e.pos, e.color, lagging);
                    events.push(GameEvent::EnemyHit { id: e.id, boss: e.is_boss() });
                    spent[i] = true;
                }
            }
            // An invincible player is passed through, not struck. The first
            // unshielded hit arms the window for the shots behind it.
            Owner::Boss => {
                if !player_invincible && circles_overlap(p.pos, p.radius, player_pos, player_radius) {
                    incoming.push(p.damage);
                    spent[i] = true;
                    player_invincible = !player_shielded;
                }
            }
        }
    }

    let mut idx = 0;
    world.projectiles.retain(|_| {
        let keep = !spent[idx];
        idx += 1;
        keep
    });

    for damage in incoming {
        hurt_player(world, damage, events);
    }
}

/// Enemy bodies touching the player deal a fixed melee hit.
pub fn resolve_melee(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.player.modifiers.is_active(Modifier::Ghost) {
        return;
    }
    let p = world.player.pos;
    let r = world.player.radius;
    let touching = world.enemies.iter()
        .filter(|e| circles_overlap(p, r, e.pos, e.radius))
        .count();
    for _ in 0..touching {
        hurt_player(world, MELEE_DAMAGE, events);
    }
}

/// The shared shield-or-damage branch. Returns true if health dropped.
pub fn hurt_player(world: &mut WorldState, damage: i32, events: &mut Vec<GameEvent>) -> bool {
    if world.player.is_invincible() {
        return false;
    }
    if world.player.has_shield() {
        world.effects.shield_block(world.player.pos, world.lagging);
        events.push(GameEvent::ShieldBlocked);
        return false;
    }
    world.player.damage(damage);
    world.player.arm_hit_window();
    world.effects.hurt(world.player.pos, world.lagging);
    events.push(GameEvent::PlayerHurt { damage });
    true
}

// ══════════════════════════════════════════════════════════════
// Death
// ══════════════════════════════════════════════════════════════

/// Remove every enemy at or below zero health, exactly once each.
/// Returns how many died.
pub fn sweep_dead_enemies(world: &mut WorldState, events: &mut Vec<GameEvent>) -> usize {
    let mut dead = Vec::new();
    world.enemies.retain(|e| {
        if e.is_dead() {
            dead.push((e.id, e.is_boss(), e.pos, e.color));
            false
        } else {
            true
        }
    });

    for &(id, boss, pos, color) in &dead {
        world.effects.death(pos, color, world.lagging);
        events.push(GameEvent::EnemyKilled { id, boss, pos });
        spawn::roll_drop(world, pos);
    }
    dead.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaConfig;
    use crate::domain::entity::{Enemy, Rgb};
    use crate::sim::world::Phase;

    fn world() -> WorldState {
        let mut w = WorldState::new(ArenaConfig::default(), Some(5));
        w.phase = Phase::InRoom;
        w
    }

    fn grunt(w: &mut WorldState, pos: Vec2, health: i32) -> u32 {
        let id = w.alloc_enemy_id();
        let mut e = Enemy::new(id, "Tank", Rgb::hex(0x00FF00), pos, 30.0, health, 1.0);
        e.frozen_ticks = u32::MAX;
        w.enemies.push(e);
        id
    }

    fn bolt(pos: Vec2, damage: i32, owner: Owner) -> Projectile {
        Projectile { pos, vel: Vec2::ZERO, damage, element: Element::Fire, owner, life: 50, radius: 12.0 }
    }

    fn boss_at(w: &mut WorldState, pos: Vec2) {
        spawn::spawn_boss(w, 0);
        if let Some(b) = w.enemies.last_mut() {
            b.pos = pos;
            b.frozen_ticks = u32::MAX;
        }
    }

    #[test]
    fn proportional_damage_floors() {
        let mut w = world();
        let at = Vec2::new(100.0, 100.0);
        grunt(&mut w, at, 50);
        w.push_projectile(bolt(at, 35, Owner::Player));
        let mut ev = vec![];
        resolve_projectile_hits(&mut w, &mut ev);
        assert_eq!(w.enemies[0].health, 15);
        assert!(w.projectiles.is_empty());

        w.push_projectile(bolt(at, 35, Owner::Player));
        resolve_projectile_hits(&mut w, &mut ev);
        assert_eq!(w.enemies[0].health, 0);
        assert_eq!(sweep_dead_enemies(&mut w, &mut ev), 1);
        assert!(w.enemies.is_empty());
    }

    #[test]
    fn projectile_hits_only_first_enemy() {
        let mut w = world();
        let at = Vec2::new(300.0, 300.0);
        grunt(&mut w, at, 100);
        grunt(&mut w, at, 100);
        w.push_projectile(bolt(at, 30, Owner::Player));
        resolve_projectile_hits(&mut w, &mut vec![]);
        let total: i32 = w.enemies.iter().map(|e| e.health).sum();
        assert_eq!(total, 170);
    }

    #[test]
    fn boss_dies_after_exactly_fourteen_hits() {
        let mut w = world();
        w.in_boss_arena = true;
        let at = Vec2::new(600.0, 450.0);
        boss_at(&mut w, at);
        let mut ev = vec![];

        for n in 1..=14 {
            // wildly varying damage makes no difference
            w.push_projectile(bolt(at, n * 97, Owner::Player));
            resolve_projectile_hits(&mut w, &mut ev);
            let died = sweep_dead_enemies(&mut w, &mut ev);
            if n < 14 {
                assert_eq!(w.enemies[0].health, 14 - n);
                assert_eq!(died, 0);
            } else {
                assert_eq!(died, 1);
            }
        }
        assert!(w.enemies.is_empty());
        let kills = ev.iter().filter(|e| matches!(e, GameEvent::EnemyKilled { boss: true, .. })).count();
        assert_eq!(kills, 1);
        // no drop inside the arena
        assert!(w.pickups.is_empty());
    }

    #[test]
    fn corpses_do_not_absorb_projectiles() {
        let mut w = world();
        let at = Vec2::new(300.0, 300.0);
        grunt(&mut w, at, 10);
        w.push_projectile(bolt(at, 30, Owner::Player));
        w.push_projectile(bolt(at, 30, Owner::Player));
        resolve_projectile_hits(&mut w, &mut vec![]);
        assert_eq!(w.projectiles.len(), 1);
    }

    #[test]
    fn melee_respects_hit_window() {
        let mut w = world();
        let p = w.player.pos;
        grunt(&mut w, p, 100);
        let mut ev = vec![];

        // three contacts, 20 ticks apart, all inside one 60-tick window
        for _ in 0..3 {
            resolve_melee(&mut w, &mut ev);
            for _ in 0..20 {
                w.player.modifiers.tick();
            }
        }
        assert_eq!(w.player.health, 135);
        let hurts = ev.iter().filter(|e| matches!(e, GameEvent::PlayerHurt { .. })).count();
        assert_eq!(hurts, 1);

        // once the window lapses the next contact lands
        for _ in 0..60 {
            w.player.modifiers.tick();
        }
        resolve_melee(&mut w, &mut ev);
        assert_eq!(w.player.health, 120);
    }

    #[test]
    fn shield_blocks_boss_projectile() {
        let mut w = world();
        w.player.modifiers.set(Modifier::Shield, 100);
        let p = w.player.pos;
        w.push_projectile(bolt(p, 8, Owner::Boss));
        let mut ev = vec![];
        resolve_projectile_hits(&mut w, &mut ev);
        assert_eq!(w.player.health, 150);
        assert!(w.projectiles.is_empty());
        assert_eq!(ev, vec![GameEvent::ShieldBlocked]);
    }

    #[test]
    fn boss_projectile_damages_and_arms_window() {
        let mut w = world();
        let p = w.player.pos;
        w.push_projectile(bolt(p, 8, Owner::Boss));
        w.push_projectile(bolt(p, 8, Owner::Boss));
        resolve_projectile_hits(&mut w, &mut vec![]);
        assert_eq!(w.player.health, 142);
        assert!(w.player.is_invincible());
        // the second shot arrives inside the hit window and flies on
        assert_eq!(w.projectiles.len(), 1);
    }

    #[test]
    fn boss_projectile_passes_invincible_player() {
        let mut w = world();
        w.player.arm_hit_window();
        let p = w.player.pos;
        w.push_projectile(bolt(p, 8, Owner::Boss));
        let mut ev = vec![];
        resolve_projectile_hits(&mut w, &mut ev);
        assert_eq!(w.player.health, 150);
        assert_eq!(w.projectiles.len(), 1);
        assert!(ev.is_empty());
    }

    #[test]
    fn boss_projectiles_ignore_enemies() {
        let mut w = world();
        let at = Vec2::new(100.0, 100.0);
        grunt(&mut w, at, 50);
        w.push_projectile(bolt(at, 8, Owner::Boss));
        resolve_projectile_hits(&mut w, &mut vec![]);
        assert_eq!(w.enemies[0].health, 50);
        assert_eq!(w.projectiles.len(), 1);
    }

    #[test]
    fn ghost_skips_melee() {
        let mut w = world();
        w.player.modifiers.set(Modifier::Ghost, 10);
        let p = w.player.pos;
        grunt(&mut w, p, 100);
        resolve_melee(&mut w, &mut vec![]);
        assert_eq!(w.player.health, 150);
    }

    #[test]
    fn health_never_negative() {
        let mut w = world();
        w.player.health = 5;
        assert!(hurt_player(&mut w, MELEE_DAMAGE, &mut vec![]));
        assert_eq!(w.player.health, 0);
    }

    #[test]
    fn boss_opens_fire_then_repeats_on_period() {
        let mut w = world();
        boss_at(&mut w, Vec2::new(100.0, 100.0));
        let mut ev = vec![];
        resolve_boss_attacks(&mut w, &mut ev);
        assert_eq!(w.projectiles.len(), 1 + BOSS_BURST_COUNT as usize);
        assert!(ev.contains(&GameEvent::BossAttack));

        for _ in 1..BOSS_ATTACK_PERIOD {
            resolve_boss_attacks(&mut w, &mut ev);
        }
        assert_eq!(w.projectiles.len(), 7);
        resolve_boss_attacks(&mut w, &mut ev);
        assert_eq!(w.projectiles.len(), 8);

        for _ in BOSS_ATTACK_PERIOD + 1..BOSS_SPECIAL_PERIOD {
            resolve_boss_attacks(&mut w, &mut ev);
        }
        // aimed shots on ticks 1, 241 and 481, bursts on ticks 1 and 601
        assert_eq!(w.projectiles.len(), 9);
        resolve_boss_attacks(&mut w, &mut ev);
        assert_eq!(w.projectiles.len(), 9 + BOSS_BURST_COUNT as usize);
        assert!(w.projectiles.iter().all(|p| p.owner == Owner::Boss));
    }

    #[test]
    fn projectiles_expire_out_of_bounds() {
        let mut w = world();
        let mut p = bolt(Vec2::new(795.0, 300.0), 10, Owner::Player);
        p.vel = Vec2::new(15.0, 0.0);
        w.push_projectile(p);
        w.push_projectile(bolt(Vec2::new(400.0, 300.0), 10, Owner::Player));
        advance_projectiles(&mut w);
        assert_eq!(w.projectiles.len(), 1);
    }

    #[test]
    fn enemies_chase_player() {
        let mut w = world();
        let id = w.alloc_enemy_id();
        w.enemies.push(Enemy::new(id, "Speed", Rgb::hex(0xFF1493), Vec2::new(0.0, 300.0), 15.0, 35, 3.5));
        move_enemies(&mut w);
        assert!((w.enemies[0].pos.x - 3.5).abs() < 1e-4);
        assert!((w.enemies[0].pos.y - 300.0).abs() < 1e-4);
    }
}
