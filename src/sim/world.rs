/// WorldState: the complete in-memory session.
///
/// Owned by the game loop and passed by `&mut` into every subsystem call.
/// Nothing lives in globals. `reset()` rebuilds a fresh session that keeps
/// only the arena, the generated rooms, and the random streams.
///
/// ## Timers
///
/// Every timed effect counts ticks on the entity it belongs to (player
/// modifiers, enemy slow/freeze, decoys, bombs) or sits in `scheduled`
/// (staggered spawns, meteors). All of them advance only inside `step`,
/// so pausing freezes them and room loads cancel them.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ArenaConfig;
use crate::domain::ability::{AbilityId, Loadout};
use crate::domain::collision::Vec2;
use crate::domain::entity::{Bomb, Decoy, Enemy, KeyItem, Pickup, Player, Projectile};
use super::effects::Effects;
use super::inventory::Inventory;
use super::rooms::{self, Room};

/// Oldest projectiles are dropped beyond this many.
pub const MAX_PROJECTILES: usize = 80;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    InRoom,
    /// Simulation halted until the player accepts or declines.
    BossOffered,
    InBossArena,
    /// Simulation halted until an element is picked.
    UpgradeChoice,
    /// Upgrade applied; counting down before the return room reloads.
    UpgradeCountdown,
    GameOver,
    Victory,
}

impl Phase {
    /// Phases in which `step` runs the full simulation.
    pub fn is_live(self) -> bool {
        matches!(self, Phase::InRoom | Phase::InBossArena)
    }
}

/// Work deferred by a number of ticks.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Deferred {
    SpawnEnemy,
    SpawnKey,
    Meteor { damage: i32 },
}

#[derive(Clone, Copy, Debug)]
pub struct Scheduled {
    pub delay: u32,
    pub action: Deferred,
}

pub struct WorldState {
    // ── Arena ──
    pub width: f32,
    pub height: f32,
    pub rooms: Vec<Room>,
    pub rng: StdRng,
    pub effects: Effects,

    // ── Entities ──
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub pickups: Vec<Pickup>,
    pub keys: Vec<KeyItem>,
    pub decoys: Vec<Decoy>,
    pub bombs: Vec<Bomb>,
    pub scheduled: Vec<Scheduled>,

    // ── Progression ──
    pub phase: Phase,
    pub paused: bool,
    pub current_room: usize,
    /// Room reloaded after a boss offer is declined or an upgrade is chosen.
    pub return_room: usize,
    pub keys_collected: u32,
    /// Set when a boss offer fires; cleared by decline or by the upgrade choice.
    pub boss_offered: bool,
    pub in_boss_arena: bool,
    /// Boss archetype picked when the offer was made.
    pub boss_variant: usize,
    /// `room / 25 + 1` of the highest room entered.
    pub level: usize,
    /// Ticks left on the upgrade or game-over countdown.
    pub countdown: u32,

    // ── Abilities ──
    pub cooldowns: [u32; AbilityId::COUNT],
    /// Length each cooldown was last armed with.
    pub cooldown_spans: [u32; AbilityId::COUNT],
    /// Permanent upgrade tiers for ice, fire, combined.
    pub upgrade_tiers: [u32; 3],
    pub lightning_unlocked: bool,
    /// Extended roster unlocked so far (base elements are always available).
    pub unlocked: BTreeSet<AbilityId>,
    pub loadout: Loadout,
    pub inventory: Inventory,

    // ── Meta ──
    pub tick: u64,
    pub lagging: bool,
    pub next_enemy_id: u32,
    pub message: String,
    pub message_timer: u32,
}

// ── Construction ──

impl WorldState {
    /// A new world on the title screen. `seed` fixes every random draw.
    pub fn new(arena: ArenaConfig, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let rooms = rooms::generate(&mut rng, arena.width, arena.height);
        let effects = Effects::new(rng.gen());
        Self::assemble(arena.width, arena.height, rooms, rng, effects)
    }

    fn assemble(width: f32, height: f32, rooms: Vec<Room>, rng: StdRng, effects: Effects) -> Self {
        let center = Vec2::new(width / 2.0, height / 2.0);
        WorldState {
            width,
            height,
            rooms,
            rng,
            effects,
            player: Player::new(center),
            enemies: vec![],
            projectiles: vec![],
            pickups: vec![],
            keys: vec![],
            decoys: vec![],
            bombs: vec![],
            scheduled: vec![],
            phase: Phase::Title,
            paused: false,
            current_room: 0,
            return_room: 0,
            keys_collected: 0,
            boss_offered: false,
            in_boss_arena: false,
            boss_variant: 0,
            level: 1,
            countdown: 0,
            cooldowns: [0; AbilityId::COUNT],
            cooldown_spans: [0; AbilityId::COUNT],
            upgrade_tiers: [0; 3],
            lightning_unlocked: false,
            unlocked: BTreeSet::new(),
            loadout: Loadout::default(),
            inventory: Inventory::default(),
            tick: 0,
            lagging: false,
            next_enemy_id: 1,
            message: String::new(),
            message_timer: 0,
        }
    }

    /// Replace the session with a fresh one on the title screen.
    pub fn reset(&mut self) {
        let rooms = std::mem::take(&mut self.rooms);
        let rng = std::mem::replace(&mut self.rng, StdRng::seed_from_u64(0));
        let mut effects = std::mem::replace(&mut self.effects, Effects::new(0));
        effects.clear();
        *self = Self::assemble(self.width, self.height, rooms, rng, effects);
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }
}

// ── Queries ──

impl WorldState {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn room(&self) -> &Room {
        &self.rooms[self.current_room.min(self.rooms.len().saturating_sub(1))]
    }

    pub fn cooldown(&self, id: AbilityId) -> u32 {
        self.cooldowns[id as usize]
    }

    pub fn tier(&self, id: AbilityId) -> u32 {
        id.base_index().map_or(0, |i| self.upgrade_tiers[i])
    }

    /// Can `id` be cast at all (ignoring cooldown)?
    pub fn is_available(&self, id: AbilityId) -> bool {
        match id {
            AbilityId::Ice | AbilityId::Fire | AbilityId::Combined => true,
            AbilityId::Lightning => self.lightning_unlocked,
            _ => self.unlocked.contains(&id),
        }
    }

    /// Abilities the player may equip: base elements plus unlocked extras.
    pub fn unlocked_roster(&self) -> Vec<AbilityId> {
        AbilityId::all()
            .filter(|&id| id != AbilityId::Lightning && self.is_available(id))
            .collect()
    }

    pub fn boss(&self) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.is_boss())
    }
}

// ── Mutation helpers ──

impl WorldState {
    /// Drop every room-scoped entity and pending timer.
    pub fn clear_entities(&mut self) {
        self.enemies.clear();
        self.projectiles.clear();
        self.pickups.clear();
        self.keys.clear();
        self.decoys.clear();
        self.bombs.clear();
        self.scheduled.clear();
        self.player.beam = None;
        self.effects.clear();
    }

    /// Add a projectile, evicting the oldest over the cap.
    pub fn push_projectile(&mut self, p: Projectile) {
        if self.projectiles.len() >= MAX_PROJECTILES {
            let excess = self.projectiles.len() + 1 - MAX_PROJECTILES;
            self.projectiles.drain(..excess);
        }
        self.projectiles.push(p);
    }

    pub fn schedule(&mut self, delay: u32, action: Deferred) {
        self.scheduled.push(Scheduled { delay, action });
    }

    pub fn alloc_enemy_id(&mut self) -> u32 {
        let id = self.next_enemy_id;
        self.next_enemy_id += 1;
        id
    }

    pub fn center_player(&mut self) {
        self.player.pos = self.center();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Element, Owner};

    fn world() -> WorldState {
        WorldState::new(ArenaConfig::default(), Some(7))
    }

    fn bolt(n: i32) -> Projectile {
        Projectile {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            damage: n,
            element: Element::Ice,
            owner: Owner::Player,
            life: 10,
            radius: 12.0,
        }
    }

    #[test]
    fn projectile_cap_drops_oldest() {
        let mut w = world();
        for i in 0..(MAX_PROJECTILES as i32 + 5) {
            w.push_projectile(bolt(i));
        }
        assert_eq!(w.projectiles.len(), MAX_PROJECTILES);
        assert_eq!(w.projectiles[0].damage, 5);
        assert_eq!(w.projectiles.last().map(|p| p.damage), Some(MAX_PROJECTILES as i32 + 4));
    }

    #[test]
    fn new_world_starts_on_title() {
        let w = world();
        assert_eq!(w.phase, Phase::Title);
        assert_eq!(w.rooms.len(), rooms::ROOM_COUNT);
        assert_eq!(w.player.pos, Vec2::new(400.0, 300.0));
        assert_eq!(w.unlocked_roster(), AbilityId::BASE.to_vec());
    }

    #[test]
    fn reset_keeps_rooms() {
        let mut w = world();
        let quota = w.rooms[5].enemy_quota;
        w.keys_collected = 4;
        w.current_room = 9;
        w.push_projectile(bolt(1));
        w.reset();
        assert_eq!(w.keys_collected, 0);
        assert_eq!(w.current_room, 0);
        assert!(w.projectiles.is_empty());
        assert_eq!(w.rooms.len(), rooms::ROOM_COUNT);
        assert_eq!(w.rooms[5].enemy_quota, quota);
    }

    #[test]
    fn lightning_needs_unlock() {
        let mut w = world();
        assert!(!w.is_available(AbilityId::Lightning));
        w.lightning_unlocked = true;
        assert!(w.is_available(AbilityId::Lightning));
        assert!(!w.is_available(AbilityId::Nova));
    }
}
