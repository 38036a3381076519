/// Room & progression state machine.
///
/// ## Transition Table
///
/// ┌──────────────────┬──────────────────────────────────┬──────────────────┐
/// │ From              │ Trigger                           │ To               │
/// ├──────────────────┼──────────────────────────────────┼──────────────────┤
/// │ Title / any       │ start_game                        │ InRoom(0)        │
/// │ InRoom(i)         │ player inside passage trigger     │ InRoom(i+1)      │
/// │ InRoom(i)         │ keys % 5 == 0, not yet offered    │ BossOffered      │
/// │ BossOffered       │ accept_boss                       │ InBossArena      │
/// │ BossOffered       │ decline_boss                      │ InRoom(return)   │
/// │ InBossArena       │ boss removed by the death sweep   │ UpgradeChoice    │
/// │ UpgradeChoice     │ choose_upgrade(ice/fire/combined) │ UpgradeCountdown │
/// │ UpgradeCountdown  │ countdown reaches 0               │ InRoom(return)   │
/// │ live              │ player health <= 0                │ GameOver         │
/// │ GameOver          │ countdown reaches 0               │ Title            │
/// │ live              │ keys >= ROOM_COUNT                │ Victory          │
/// └──────────────────┴──────────────────────────────────┴──────────────────┘
///
/// Commands issued in the wrong phase are no-ops returning `false`.

use tracing::info;

use crate::domain::ability::{self, AbilityId};
use crate::domain::bestiary;
use crate::domain::collision::Vec2;
use crate::domain::entity::ms_to_ticks;
use crate::domain::item::ItemKind;
use super::event::GameEvent;
use super::rooms::ROOM_COUNT;
use super::spawn;
use super::world::{Deferred, Phase, WorldState};

pub const KEYS_PER_BOSS: u32 = 5;
/// Rooms per level bracket; crossing a bracket re-evaluates unlocks.
pub const ROOMS_PER_LEVEL: usize = 25;
pub const ENEMY_STAGGER_MS: u32 = 2500;
pub const KEY_STAGGER_MS: u32 = 2000;
/// Game-over and post-upgrade countdowns.
pub const COUNTDOWN_MS: u32 = 3000;

const ROOM_BANNER_TICKS: u32 = 120;

// ══════════════════════════════════════════════════════════════
// Session
// ══════════════════════════════════════════════════════════════

/// Start (or restart) a session from room 0.
pub fn start_game(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    world.reset();
    info!("new game");
    load_room(world, 0, None, events);
}

/// Pause or resume. Only live phases can be paused.
pub fn toggle_pause(world: &mut WorldState) -> bool {
    if !world.phase.is_live() {
        return false;
    }
    world.paused = !world.paused;
    true
}

// ══════════════════════════════════════════════════════════════
// Rooms
// ══════════════════════════════════════════════════════════════

/// Enter room `index`, placing the player at `spawn` (arena centre if none).
/// Clears every room-scoped entity and queues the room's staggered spawns.
pub fn load_room(world: &mut WorldState, index: usize, spawn: Option<Vec2>, events: &mut Vec<GameEvent>) -> bool {
    if index >= world.rooms.len() {
        return false;
    }
    world.clear_entities();
    world.current_room = index;
    world.return_room = index;
    world.in_boss_arena = false;
    world.paused = false;

    let level = index / ROOMS_PER_LEVEL + 1;
    if level > world.level {
        world.level = level;
        for id in ability::unlocked_by_room(index) {
            if world.unlocked.insert(id) {
                info!(ability = id.name(), room = index, "ability unlocked");
                events.push(GameEvent::AbilityUnlocked { id });
            }
        }
    }

    let (enemies, keys) = {
        let room = world.room();
        (room.enemy_quota, room.key_quota)
    };
    for i in 0..enemies as u32 {
        world.schedule(i * ms_to_ticks(ENEMY_STAGGER_MS), Deferred::SpawnEnemy);
    }
    for i in 0..keys as u32 {
        world.schedule(i * ms_to_ticks(KEY_STAGGER_MS), Deferred::SpawnKey);
    }

    match spawn {
        Some(p) => world.player.pos = p,
        None => world.center_player(),
    }
    world.phase = Phase::InRoom;

    let name = world.room().name.clone();
    info!(room = index, name = %name, enemies, "room loaded");
    world.set_message(&name, ROOM_BANNER_TICKS);
    events.push(GameEvent::RoomEntered { index });
    true
}

/// Walk through the current room's passage if the player stands inside it.
pub fn check_passage(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    if world.phase != Phase::InRoom {
        return false;
    }
    let pos = world.player.pos;
    let hit = world.room().passages.iter()
        .find(|p| p.trigger.contains(pos))
        .map(|p| (p.target_room, p.target_spawn));
    match hit {
        Some((room, at)) => load_room(world, room, Some(at), events),
        None => false,
    }
}

// ══════════════════════════════════════════════════════════════
// Keys & boss offer
// ══════════════════════════════════════════════════════════════

/// Count one collected key and raise a boss offer on the threshold.
pub fn collect_key(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    world.keys_collected += 1;
    events.push(GameEvent::KeyCollected { total: world.keys_collected });
    check_boss_offer(world, events);
}

pub fn check_boss_offer(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    let keys = world.keys_collected;
    if keys == 0 || keys % KEYS_PER_BOSS != 0 || world.boss_offered || world.in_boss_arena {
        return false;
    }
    if world.phase != Phase::InRoom {
        return false;
    }
    world.boss_offered = true;
    world.boss_variant = bestiary::boss_cycle(keys);
    world.return_room = world.current_room;
    world.phase = Phase::BossOffered;

    let boss = bestiary::boss_display_name(world.boss_variant);
    info!(boss = %boss, keys, "boss offered");
    events.push(GameEvent::BossOffered { boss, keys });
    true
}

pub fn accept_boss(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    if world.phase != Phase::BossOffered {
        return false;
    }
    world.clear_entities();
    world.in_boss_arena = true;
    world.keys_collected = 0;
    let variant = world.boss_variant;
    spawn::spawn_boss(world, variant);
    world.center_player();
    world.player.health = world.player.max_health;
    world.phase = Phase::InBossArena;

    let boss = bestiary::boss_display_name(world.boss_variant);
    info!(boss = %boss, "boss accepted");
    world.set_message(&boss, ROOM_BANNER_TICKS);
    events.push(GameEvent::BossArenaEntered { boss });
    true
}

pub fn decline_boss(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    if world.phase != Phase::BossOffered {
        return false;
    }
    world.keys_collected = 0;
    world.boss_offered = false;
    let room = world.return_room;
    info!(room, "boss declined");
    events.push(GameEvent::BossDeclined);
    load_room(world, room, None, events)
}

/// Arena cleared: halt and ask for an upgrade.
pub fn check_boss_defeated(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    if world.phase != Phase::InBossArena || world.boss().is_some() {
        return false;
    }
    world.phase = Phase::UpgradeChoice;
    info!("boss defeated");
    events.push(GameEvent::BossDefeated);
    events.push(GameEvent::UpgradeOffered);
    true
}

/// Permanently upgrade one base element and grant lightning.
pub fn choose_upgrade(world: &mut WorldState, id: AbilityId, events: &mut Vec<GameEvent>) -> bool {
    if world.phase != Phase::UpgradeChoice {
        return false;
    }
    let slot = match id.base_index() {
        Some(i) => i,
        None => return false,
    };
    world.upgrade_tiers[slot] += 1;
    let tier = world.upgrade_tiers[slot];
    world.lightning_unlocked = true;
    world.inventory.add(ItemKind::LightningScroll);
    world.boss_offered = false;
    world.countdown = ms_to_ticks(COUNTDOWN_MS);
    world.phase = Phase::UpgradeCountdown;

    info!(ability = id.name(), tier, "upgrade chosen");
    world.set_message(&format!("{} upgraded to tier {}", id.name(), tier), world.countdown);
    events.push(GameEvent::UpgradeChosen { id, tier });
    true
}

// ══════════════════════════════════════════════════════════════
// Terminal states
// ══════════════════════════════════════════════════════════════

pub fn check_game_over(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    if !world.player.is_dead() || matches!(world.phase, Phase::GameOver | Phase::Title) {
        return false;
    }
    world.phase = Phase::GameOver;
    world.paused = false;
    world.countdown = ms_to_ticks(COUNTDOWN_MS);
    info!(room = world.current_room, "game over");
    events.push(GameEvent::GameOver);
    true
}

/// Reachable only if the key counter is never reset, which the boss
/// offer always does.
pub fn check_victory(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    if world.keys_collected < ROOM_COUNT as u32 || world.phase == Phase::Victory {
        return false;
    }
    world.phase = Phase::Victory;
    info!(keys = world.keys_collected, "victory");
    events.push(GameEvent::Victory);
    true
}

/// Run the upgrade and game-over countdowns.
pub fn tick_countdown(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if !matches!(world.phase, Phase::UpgradeCountdown | Phase::GameOver) {
        return;
    }
    world.countdown = world.countdown.saturating_sub(1);
    if world.countdown > 0 {
        return;
    }
    match world.phase {
        Phase::UpgradeCountdown => {
            let room = world.return_room;
            load_room(world, room, None, events);
        }
        Phase::GameOver => {
            world.reset();
            info!("returned to title");
            events.push(GameEvent::ReturnedToTitle);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaConfig;
    use crate::domain::ability::Loadout;
    use crate::domain::entity::{Element, Owner, Projectile};
    use crate::domain::item::FoodKind;

    fn started() -> WorldState {
        let mut w = WorldState::new(ArenaConfig::default(), Some(99));
        start_game(&mut w, &mut vec![]);
        w
    }

    fn keys(w: &mut WorldState, n: u32, ev: &mut Vec<GameEvent>) {
        for _ in 0..n {
            collect_key(w, ev);
        }
    }

    fn offers(ev: &[GameEvent]) -> usize {
        ev.iter().filter(|e| matches!(e, GameEvent::BossOffered { .. })).count()
    }

    #[test]
    fn start_queues_room_spawns() {
        let w = started();
        assert_eq!(w.phase, Phase::InRoom);
        assert_eq!(w.current_room, 0);
        let quota = w.rooms[0].enemy_quota + w.rooms[0].key_quota;
        assert_eq!(w.scheduled.len(), quota);
        assert_eq!(w.player.pos, w.center());
    }

    #[test]
    fn keys_count_by_one_and_offer_once() {
        let mut w = started();
        let mut ev = vec![];
        keys(&mut w, 4, &mut ev);
        assert_eq!(w.keys_collected, 4);
        assert_eq!(offers(&ev), 0);

        collect_key(&mut w, &mut ev);
        assert_eq!(w.keys_collected, 5);
        assert_eq!(offers(&ev), 1);
        assert_eq!(w.phase, Phase::BossOffered);
        assert!(ev.contains(&GameEvent::BossOffered { boss: "Evolved Flame Demon".into(), keys: 5 }));

        // re-checking the same threshold never fires again
        assert!(!check_boss_offer(&mut w, &mut ev));
        assert_eq!(offers(&ev), 1);
    }

    #[test]
    fn decline_resets_keys_and_room() {
        let mut w = started();
        w.current_room = 3;
        let mut ev = vec![];
        keys(&mut w, 5, &mut ev);
        w.push_projectile(Projectile {
            pos: Vec2::ZERO, vel: Vec2::ZERO, damage: 1, element: Element::Ice,
            owner: Owner::Player, life: 9, radius: 1.0,
        });
        spawn::spawn_enemy(&mut w);
        spawn::spawn_key(&mut w);

        assert!(decline_boss(&mut w, &mut ev));
        assert_eq!(w.keys_collected, 0);
        assert!(!w.boss_offered);
        assert_eq!(w.phase, Phase::InRoom);
        assert_eq!(w.current_room, 3);
        assert!(w.enemies.is_empty() && w.keys.is_empty() && w.projectiles.is_empty());

        // the next offer waits for five fresh keys
        keys(&mut w, 4, &mut ev);
        assert_eq!(offers(&ev), 1);
        collect_key(&mut w, &mut ev);
        assert_eq!(offers(&ev), 2);
    }

    #[test]
    fn accept_enters_arena() {
        let mut w = started();
        w.player.health = 40;
        let mut ev = vec![];
        keys(&mut w, 5, &mut ev);
        assert!(accept_boss(&mut w, &mut ev));
        assert_eq!(w.phase, Phase::InBossArena);
        assert_eq!(w.keys_collected, 0);
        assert_eq!(w.player.health, 150);
        assert_eq!(w.player.pos, w.center());
        assert!(w.scheduled.is_empty());
        let boss = w.boss().map(|b| (b.health, b.name.clone()));
        assert_eq!(boss, Some((14, "Evolved Flame Demon".to_string())));
        // a second accept is a no-op
        assert!(!accept_boss(&mut w, &mut ev));
    }

    #[test]
    fn commands_in_wrong_phase_are_noops() {
        let mut w = started();
        let mut ev = vec![];
        assert!(!accept_boss(&mut w, &mut ev));
        assert!(!decline_boss(&mut w, &mut ev));
        assert!(!choose_upgrade(&mut w, AbilityId::Ice, &mut ev));
        assert!(ev.is_empty());
        assert_eq!(w.upgrade_tiers, [0, 0, 0]);
    }

    #[test]
    fn boss_win_upgrade_and_return() {
        let mut w = started();
        w.current_room = 7;
        let mut ev = vec![];
        keys(&mut w, 5, &mut ev);
        accept_boss(&mut w, &mut ev);

        w.enemies.clear();
        assert!(check_boss_defeated(&mut w, &mut ev));
        assert_eq!(w.phase, Phase::UpgradeChoice);
        assert!(ev.contains(&GameEvent::UpgradeOffered));

        assert!(!choose_upgrade(&mut w, AbilityId::Nova, &mut ev));
        assert!(choose_upgrade(&mut w, AbilityId::Fire, &mut ev));
        assert_eq!(w.tier(AbilityId::Fire), 1);
        assert!(w.lightning_unlocked);
        assert_eq!(w.inventory.count(ItemKind::LightningScroll), 1);
        assert_eq!(w.phase, Phase::UpgradeCountdown);

        for _ in 0..ms_to_ticks(COUNTDOWN_MS) - 1 {
            tick_countdown(&mut w, &mut ev);
        }
        assert_eq!(w.phase, Phase::UpgradeCountdown);
        tick_countdown(&mut w, &mut ev);
        assert_eq!(w.phase, Phase::InRoom);
        assert_eq!(w.current_room, 7);
        assert!(!w.in_boss_arena);
        assert!(!w.boss_offered);
    }

    #[test]
    fn passage_leads_to_next_room() {
        let mut w = started();
        let passage = w.rooms[0].passages[0].clone();
        w.player.pos = passage.trigger.center();
        let mut ev = vec![];
        assert!(check_passage(&mut w, &mut ev));
        assert_eq!(w.current_room, 1);
        assert_eq!(w.player.pos, passage.target_spawn);
        assert!(ev.contains(&GameEvent::RoomEntered { index: 1 }));
    }

    #[test]
    fn last_room_has_no_way_out() {
        let mut w = started();
        assert!(load_room(&mut w, ROOM_COUNT - 1, None, &mut vec![]));
        assert!(w.room().passages.is_empty());
        assert!(!load_room(&mut w, ROOM_COUNT, None, &mut vec![]));
        assert_eq!(w.current_room, ROOM_COUNT - 1);
    }

    #[test]
    fn level_bracket_unlocks_roster() {
        let mut w = started();
        let mut ev = vec![];
        load_room(&mut w, 24, None, &mut ev);
        assert!(!w.is_available(AbilityId::Teleport));
        assert_eq!(w.level, 1);
        load_room(&mut w, 25, None, &mut ev);
        assert!(w.is_available(AbilityId::Teleport));
        assert!(ev.contains(&GameEvent::AbilityUnlocked { id: AbilityId::Teleport }));
        assert_eq!(w.level, 2);

        load_room(&mut w, 50, None, &mut ev);
        assert_eq!(w.level, 3);
        assert!(w.is_available(AbilityId::TimeSlow));
        let unlocks = ev.iter().filter(|e| matches!(e, GameEvent::AbilityUnlocked { .. })).count();
        assert_eq!(unlocks, 2);
    }

    #[test]
    fn game_over_counts_down_to_title() {
        let mut w = started();
        w.player.health = 0;
        let mut ev = vec![];
        assert!(check_game_over(&mut w, &mut ev));
        assert!(!check_game_over(&mut w, &mut ev));
        for _ in 0..ms_to_ticks(COUNTDOWN_MS) {
            tick_countdown(&mut w, &mut ev);
        }
        assert_eq!(w.phase, Phase::Title);
        assert_eq!(ev.last(), Some(&GameEvent::ReturnedToTitle));
    }

    #[test]
    fn victory_at_room_count_keys() {
        let mut w = started();
        w.keys_collected = ROOM_COUNT as u32 - 1;
        let mut ev = vec![];
        assert!(!check_victory(&mut w, &mut ev));
        w.keys_collected += 1;
        assert!(check_victory(&mut w, &mut ev));
        assert_eq!(w.phase, Phase::Victory);
    }

    #[test]
    fn restart_round_trip() {
        let mut w = started();
        w.keys_collected = 3;
        w.current_room = 40;
        w.cooldowns[AbilityId::Fire as usize] = 300;
        w.inventory.add(ItemKind::Food(FoodKind::Cheese));
        w.loadout.unequip(0);
        w.upgrade_tiers = [1, 2, 0];

        let mut ev = vec![];
        start_game(&mut w, &mut ev);
        assert_eq!(w.keys_collected, 0);
        assert_eq!(w.current_room, 0);
        assert!(w.cooldowns.iter().all(|&c| c == 0));
        assert!(w.inventory.is_empty());
        assert_eq!(w.loadout, Loadout::default());
        assert_eq!(w.upgrade_tiers, [0, 0, 0]);
        assert_eq!(w.phase, Phase::InRoom);
    }

    #[test]
    fn pause_only_while_live() {
        let mut w = started();
        assert!(toggle_pause(&mut w));
        assert!(w.paused);
        assert!(toggle_pause(&mut w));
        w.phase = Phase::GameOver;
        assert!(!toggle_pause(&mut w));
        assert!(!w.paused);
    }
}
