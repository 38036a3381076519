/// Ability registry: identifiers, static definitions, cooldown and damage
/// formulas, and the three-slot equip loadout.
///
/// The engine in `sim::abilities` dispatches on `AbilityEffect`; nothing in
/// this module touches the world.

use super::entity::{Element, Modifier};

/// Cooldown units removed per tick (one tick models ~16 ms).
pub const COOLDOWN_STEP: u32 = 16;
pub const LOADOUT_SLOTS: usize = 3;
/// Direct damage of the obliterating powers, far above any enemy health.
pub const OBLITERATE: i32 = 1000;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum AbilityId {
    Ice,
    Fire,
    Combined,
    Lightning,
    Teleport,
    TimeSlow,
    Shield,
    MultiShot,
    Heal,
    Freeze,
    Nova,
    Ghost,
    Magnet,
    Clones,
    ChainLightning,
    Meteor,
    Void,
    Phoenix,
    TimeBomb,
    Laser,
    BlackHole,
    GodMode,
    Nuclear,
    Reality,
}

impl AbilityId {
    pub const COUNT: usize = 24;
    pub const BASE: [AbilityId; 3] = [AbilityId::Ice, AbilityId::Fire, AbilityId::Combined];

    pub fn def(self) -> &'static AbilityDef {
        &ABILITIES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }

    /// Index into the upgrade tier table, for the three upgradeable elements.
    pub fn base_index(self) -> Option<usize> {
        match self {
            AbilityId::Ice => Some(0),
            AbilityId::Fire => Some(1),
            AbilityId::Combined => Some(2),
            _ => None,
        }
    }

    /// Part of the extended roster unlocked by room progress.
    pub fn is_extended(self) -> bool {
        !matches!(self, AbilityId::Ice | AbilityId::Fire | AbilityId::Combined | AbilityId::Lightning)
    }

    pub fn all() -> impl Iterator<Item = AbilityId> {
        ABILITIES.iter().map(|s| s.id)
    }
}

/// What casting an ability does.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AbilityEffect {
    /// One projectile toward the aim point.
    Aimed { speed: f32, life: u32, radius: f32, element: Element },
    /// `count` projectiles evenly spread around the caster.
    Radial { count: u32, speed: f32, life: u32, radius: f32, element: Element },
    Teleport,
    Buff { modifiers: &'static [Modifier], ms: u32 },
    SlowEnemies { ms: u32 },
    FreezeEnemies { ms: u32 },
    FullHeal,
    /// Strike every enemy within `radius` of the player.
    Nova { radius: f32 },
    Decoys { count: u32, distance: f32, shots: u32, interval_ms: u32 },
    /// Hop nearest-next through up to `max_hops` enemies.
    Chain { max_hops: usize },
    Meteors { count: u32, interval_ms: u32 },
    /// Strike every enemy within `radius` of the aim point.
    Void { radius: f32 },
    TimeBomb { fuse_ms: u32, radius: f32 },
    Laser { length: f32, half_width: f32, life: u32 },
    /// Every enemy in the room goes through the death path.
    ClearRoom,
}

#[derive(Clone, Copy, Debug)]
pub struct AbilityDef {
    pub id: AbilityId,
    pub name: &'static str,
    pub base_cooldown: u32,
    pub base_damage: i32,
    /// Room number (1-based) at which the ability becomes available.
    pub unlock_room: usize,
    pub effect: AbilityEffect,
}

const fn entry(id: AbilityId, name: &'static str, base_cooldown: u32, base_damage: i32, unlock_room: usize, effect: AbilityEffect) -> AbilityDef {
    AbilityDef { id, name, base_cooldown, base_damage, unlock_room, effect }
}

const AIMED_SPEED: f32 = 15.0;
const AIMED_LIFE: u32 = 120;

static ABILITIES: [AbilityDef; AbilityId::COUNT] = [
    entry(AbilityId::Ice, "Ice Shard", 400, 30, 0,
        AbilityEffect::Aimed { speed: AIMED_SPEED, life: AIMED_LIFE, radius: 12.0, element: Element::Ice }),
    entry(AbilityId::Fire, "Fireball", 400, 35, 0,
        AbilityEffect::Aimed { speed: AIMED_SPEED, life: AIMED_LIFE, radius: 12.0, element: Element::Fire }),
    entry(AbilityId::Combined, "Frostfire", 2000, 70, 0,
        AbilityEffect::Aimed { speed: AIMED_SPEED, life: AIMED_LIFE, radius: 15.0, element: Element::Combined }),
    entry(AbilityId::Lightning, "Lightning Storm", 1500, 100, 0,
        AbilityEffect::Radial { count: 8, speed: 18.0, life: 150, radius: 18.0, element: Element::Lightning }),
    entry(AbilityId::Teleport, "Teleport", 3000, 0, 25, AbilityEffect::Teleport),
    entry(AbilityId::TimeSlow, "Time Slow", 15_000, 0, 50, AbilityEffect::SlowEnemies { ms: 10_000 }),
    entry(AbilityId::Shield, "Aegis", 20_000, 0, 75,
        AbilityEffect::Buff { modifiers: &[Modifier::Shield, Modifier::Invincible], ms: 15_000 }),
    entry(AbilityId::MultiShot, "Multi Shot", 5000, 200, 100,
        AbilityEffect::Radial { count: 8, speed: 15.0, life: AIMED_LIFE, radius: 12.0, element: Element::Arcane }),
    entry(AbilityId::Heal, "Restore", 30_000, 0, 125, AbilityEffect::FullHeal),
    entry(AbilityId::Freeze, "Deep Freeze", 15_000, 0, 150, AbilityEffect::FreezeEnemies { ms: 8000 }),
    entry(AbilityId::Nova, "Nova", 8000, OBLITERATE, 175, AbilityEffect::Nova { radius: 200.0 }),
    entry(AbilityId::Ghost, "Ghost Form", 20_000, 0, 200,
        AbilityEffect::Buff { modifiers: &[Modifier::Ghost], ms: 12_000 }),
    entry(AbilityId::Magnet, "Magnet", 25_000, 0, 225,
        AbilityEffect::Buff { modifiers: &[Modifier::Magnet], ms: 20_000 }),
    entry(AbilityId::Clones, "Mirror Clones", 12_000, 200, 250,
        AbilityEffect::Decoys { count: 3, distance: 80.0, shots: 2, interval_ms: 300 }),
    entry(AbilityId::ChainLightning, "Chain Lightning", 6000, 500, 275, AbilityEffect::Chain { max_hops: 8 }),
    entry(AbilityId::Meteor, "Meteor Shower", 10_000, 750, 300, AbilityEffect::Meteors { count: 6, interval_ms: 200 }),
    entry(AbilityId::Void, "Void Rift", 8000, OBLITERATE, 325, AbilityEffect::Void { radius: 150.0 }),
    entry(AbilityId::Phoenix, "Phoenix", 30_000, 0, 350,
        AbilityEffect::Buff { modifiers: &[Modifier::Phoenix], ms: 15_000 }),
    entry(AbilityId::TimeBomb, "Time Bomb", 10_000, OBLITERATE, 375,
        AbilityEffect::TimeBomb { fuse_ms: 5000, radius: 200.0 }),
    entry(AbilityId::Laser, "Laser Beam", 6000, OBLITERATE, 400,
        AbilityEffect::Laser { length: 800.0, half_width: 30.0, life: 30 }),
    entry(AbilityId::BlackHole, "Black Hole", 30_000, OBLITERATE, 425, AbilityEffect::ClearRoom),
    entry(AbilityId::GodMode, "God Mode", 60_000, 0, 450,
        AbilityEffect::Buff { modifiers: &[Modifier::GodMode], ms: 30_000 }),
    entry(AbilityId::Nuclear, "Nuclear", 45_000, OBLITERATE, 475, AbilityEffect::ClearRoom),
    entry(AbilityId::Reality, "Reality Warp", 60_000, OBLITERATE, 500, AbilityEffect::ClearRoom),
];

// ══════════════════════════════════════════════════════════════
// Formulas
// ══════════════════════════════════════════════════════════════

/// Extra damage from permanent upgrade tiers.
pub fn upgrade_bonus(id: AbilityId, tier: u32) -> i32 {
    let per_tier = match id {
        AbilityId::Ice => 8,
        AbilityId::Fire => 10,
        AbilityId::Combined => 15,
        _ => 0,
    };
    per_tier * tier as i32
}

/// Cooldown multiplier once an element has been upgraded at least once.
pub fn reduction_factor(id: AbilityId, tier: u32) -> f32 {
    if tier == 0 {
        return 1.0;
    }
    match id {
        AbilityId::Ice | AbilityId::Fire => 0.7,
        AbilityId::Combined => 0.5,
        _ => 1.0,
    }
}

/// Cooldown armed by a successful cast.
pub fn cooldown_after_cast(id: AbilityId, tier: u32, rapid_fire: bool) -> u32 {
    let base = id.def().base_cooldown as f32 * reduction_factor(id, tier);
    let divisor = if rapid_fire { 2.0 } else { 1.0 };
    (base / divisor).round() as u32
}

/// Damage carried by a projectile, never below 1.
pub fn projectile_damage(id: AbilityId, tier: u32, flat_bonus: i32) -> i32 {
    (id.def().base_damage + upgrade_bonus(id, tier) + flat_bonus).max(1)
}

/// Extended abilities whose unlock threshold has been reached by `room` (0-based).
pub fn unlocked_by_room(room: usize) -> impl Iterator<Item = AbilityId> {
    AbilityId::all().filter(move |id| id.is_extended() && id.def().unlock_room <= room + 1)
}

// ══════════════════════════════════════════════════════════════
// Loadout
// ══════════════════════════════════════════════════════════════

/// Three fixed equip slots. Order is the fire-key order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Loadout {
    slots: [Option<AbilityId>; LOADOUT_SLOTS],
}

impl Default for Loadout {
    fn default() -> Self {
        Loadout { slots: [Some(AbilityId::Ice), Some(AbilityId::Fire), Some(AbilityId::Combined)] }
    }
}

impl Loadout {
    pub fn get(&self, slot: usize) -> Option<AbilityId> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn contains(&self, id: AbilityId) -> bool {
        self.slots.iter().any(|s| *s == Some(id))
    }

    /// Number of occupied slots.
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn slots(&self) -> &[Option<AbilityId>; LOADOUT_SLOTS] {
        &self.slots
    }

    /// Put `id` in the first free slot. Fails if full or already equipped.
    pub fn equip(&mut self, id: AbilityId) -> bool {
        if self.contains(id) {
            return false;
        }
        match self.slots.iter_mut().find(|s| s.is_none()) {
            Some(free) => {
                *free = Some(id);
                true
            }
            None => false,
        }
    }

    /// Free a slot, returning what was in it.
    pub fn unequip(&mut self, slot: usize) -> Option<AbilityId> {
        self.slots.get_mut(slot).and_then(|s| s.take())
    }
}
