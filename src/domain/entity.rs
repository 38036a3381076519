/// Entities: Player, Enemy, Projectile, Pickup, Key, plus the short-lived
/// helpers spawned by abilities (decoys, bombs, beams) and cosmetic particles.
///
/// Plain data with small state helpers. Every timed effect is a tick
/// counter owned by the entity it affects and decremented once per tick.

use super::collision::Vec2;
use super::item::ItemKind;

/// Simulation rate used to convert millisecond durations into tick counts.
pub const TICKS_PER_SECOND: u32 = 60;

pub fn ms_to_ticks(ms: u32) -> u32 {
    ms * TICKS_PER_SECOND / 1000
}

pub const PLAYER_RADIUS: f32 = 20.0;
pub const PLAYER_BASE_SPEED: f32 = 5.0;
pub const PLAYER_MAX_HEALTH: i32 = 150;
/// Invincibility window armed by a landed hit.
pub const HIT_WINDOW_MS: u32 = 1000;
/// Movement multiplier applied while frames run slow.
pub const LAG_SPEED_FACTOR: f32 = 1.8;
const DIAGONAL_FACTOR: f32 = 0.707;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn hex(v: u32) -> Self {
        Rgb { r: (v >> 16) as u8, g: (v >> 8) as u8, b: v as u8 }
    }
}

// ══════════════════════════════════════════════════════════════
// Input
// ══════════════════════════════════════════════════════════════

/// Four-axis movement intent. Each axis is -1, 0 or 1.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct MoveIntent {
    pub dx: i8,
    pub dy: i8,
}

impl MoveIntent {
    pub fn is_idle(self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    /// Per-tick displacement at `speed`, normalised on diagonals.
    pub fn displacement(self, speed: f32) -> Vec2 {
        let mut v = Vec2::new(self.dx.signum() as f32 * speed, self.dy.signum() as f32 * speed);
        if self.dx != 0 && self.dy != 0 {
            v = v * DIAGONAL_FACTOR;
        }
        v
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FireCommand {
    /// Fire the ability equipped in slot 0..3.
    Slot(usize),
    Lightning,
}

/// Frame input: movement is continuous, fire is edge-triggered.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub movement: MoveIntent,
    /// Aim point in arena coordinates; `None` keeps auto-aim.
    pub aim: Option<Vec2>,
    pub fire: Option<FireCommand>,
    /// Last frame took noticeably longer than a tick.
    pub lagging: bool,
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

/// Timed player modifiers.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Modifier {
    Speed,
    Damage,
    Shield,
    RapidFire,
    Invincible,
    Magnet,
    Ghost,
    GodMode,
    Phoenix,
}

impl Modifier {
    pub const COUNT: usize = 9;
    pub const ALL: [Modifier; Modifier::COUNT] = [
        Modifier::Speed, Modifier::Damage, Modifier::Shield, Modifier::RapidFire, Modifier::Invincible, Modifier::Magnet,
        Modifier::Ghost, Modifier::GodMode, Modifier::Phoenix,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Modifier::Speed => "Speed",
            Modifier::Damage => "Damage",
            Modifier::Shield => "Shield",
            Modifier::RapidFire => "Rapid Fire",
            Modifier::Invincible => "Invincible",
            Modifier::Magnet => "Magnet",
            Modifier::Ghost => "Ghost",
            Modifier::GodMode => "God Mode",
            Modifier::Phoenix => "Phoenix",
        }
    }
}

/// Remaining ticks per modifier. Zero means inactive.
#[derive(Clone, Debug, Default)]
pub struct Modifiers {
    remaining: [u32; Modifier::COUNT],
}

impl Modifiers {
    pub fn is_active(&self, m: Modifier) -> bool {
        self.remaining[m as usize] > 0
    }

    pub fn remaining(&self, m: Modifier) -> u32 {
        self.remaining[m as usize]
    }

    /// Overwrite the timer (power-up activation).
    pub fn set(&mut self, m: Modifier, ticks: u32) {
        self.remaining[m as usize] = ticks;
    }

    /// Extend the timer to at least `ticks`; never shortens a longer one.
    pub fn arm(&mut self, m: Modifier, ticks: u32) {
        let slot = &mut self.remaining[m as usize];
        *slot = (*slot).max(ticks);
    }

    pub fn tick(&mut self) {
        for r in &mut self.remaining {
            *r = r.saturating_sub(1);
        }
    }

    /// Active modifiers with their remaining ticks.
    pub fn active(&self) -> impl Iterator<Item = (Modifier, u32)> + '_ {
        Modifier::ALL
            .iter()
            .map(|&m| (m, self.remaining(m)))
            .filter(|&(_, r)| r > 0)
    }
}

/// A directed beam drawn for a few ticks after a laser cast.
#[derive(Clone, Copy, Debug)]
pub struct Beam {
    pub origin: Vec2,
    pub end: Vec2,
    pub life: u32,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Vec2,
    pub aim: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub radius: f32,
    pub modifiers: Modifiers,
    pub beam: Option<Beam>,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Player {
            pos,
            aim: pos + Vec2::new(1.0, 0.0),
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            radius: PLAYER_RADIUS,
            modifiers: Modifiers::default(),
            beam: None,
        }
    }

    pub fn speed(&self, lagging: bool) -> f32 {
        let mut s = PLAYER_BASE_SPEED;
        if self.modifiers.is_active(Modifier::Speed) { s += 3.0; }
        if lagging { s *= LAG_SPEED_FACTOR; }
        s
    }

    /// Flat damage added to every player projectile.
    pub fn damage_bonus(&self) -> i32 {
        if self.modifiers.is_active(Modifier::Damage) { 10 } else { 0 }
    }

    pub fn is_invincible(&self) -> bool {
        self.modifiers.is_active(Modifier::Invincible)
            || self.modifiers.is_active(Modifier::GodMode)
            || self.modifiers.is_active(Modifier::Phoenix)
    }

    pub fn has_shield(&self) -> bool {
        self.modifiers.is_active(Modifier::Shield)
    }

    /// Subtract health, floored at zero.
    pub fn damage(&mut self, amount: i32) {
        self.health = (self.health - amount.max(0)).max(0);
    }

    /// Add health, capped at max.
    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount.max(0)).min(self.max_health);
    }

    pub fn arm_hit_window(&mut self) {
        self.modifiers.arm(Modifier::Invincible, ms_to_ticks(HIT_WINDOW_MS));
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

// ══════════════════════════════════════════════════════════════
// Enemy
// ══════════════════════════════════════════════════════════════

/// How projectile hits reduce an enemy's health.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DamageModel {
    /// Health drops by the hit's damage.
    Proportional,
    /// Health is a hit counter: every hit removes exactly one.
    FixedHitCount,
}

/// Boss-only attack cooldowns in ticks. Both start at zero, so a fresh
/// boss opens with both attacks on its first tick.
#[derive(Clone, Debug, Default)]
pub struct BossState {
    pub attack_cooldown: u32,
    pub special_cooldown: u32,
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: u32,
    pub name: String,
    pub color: Rgb,
    pub pos: Vec2,
    pub radius: f32,
    pub health: i32,
    pub max_health: i32,
    pub speed: f32,
    pub damage_model: DamageModel,
    pub boss: Option<BossState>,
    pub slow_ticks: u32,
    pub frozen_ticks: u32,
    /// Tick of the last landed hit. Recorded only; nothing regenerates.
    pub last_hit_tick: Option<u64>,
}

/// Speed multiplier while time-slowed.
pub const SLOW_FACTOR: f32 = 0.3;

impl Enemy {
    pub fn new(id: u32, name: &str, color: Rgb, pos: Vec2, radius: f32, health: i32, speed: f32) -> Self {
        Enemy {
            id,
            name: name.to_string(),
            color,
            pos,
            radius,
            health,
            max_health: health,
            speed,
            damage_model: DamageModel::Proportional,
            boss: None,
            slow_ticks: 0,
            frozen_ticks: 0,
            last_hit_tick: None,
        }
    }

    pub fn new_boss(id: u32, name: &str, color: Rgb, pos: Vec2, radius: f32, hits: i32, speed: f32) -> Self {
        let mut e = Enemy::new(id, name, color, pos, radius, hits, speed);
        e.damage_model = DamageModel::FixedHitCount;
        e.boss = Some(BossState::default());
        e
    }

    pub fn is_boss(&self) -> bool {
        self.boss.is_some()
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Resolve a projectile hit through this enemy's damage model.
    /// Resulting health is clamped to `[0, max_health]`.
    pub fn apply_hit(&mut self, damage: i32, tick: u64) {
        let loss = match self.damage_model {
            DamageModel::Proportional => damage.abs(),
            DamageModel::FixedHitCount => 1,
        };
        self.health = (self.health - loss).clamp(0, self.max_health);
        self.last_hit_tick = Some(tick);
    }

    /// Direct area damage. Bypasses the damage model and is left
    /// unclamped so the death sweep sees it.
    pub fn strike(&mut self, amount: i32) {
        self.health -= amount;
    }

    pub fn effective_speed(&self) -> f32 {
        if self.frozen_ticks > 0 {
            0.0
        } else if self.slow_ticks > 0 {
            self.speed * SLOW_FACTOR
        } else {
            self.speed
        }
    }

    pub fn tick_status(&mut self) {
        self.slow_ticks = self.slow_ticks.saturating_sub(1);
        self.frozen_ticks = self.frozen_ticks.saturating_sub(1);
    }
}

// ══════════════════════════════════════════════════════════════
// Projectiles
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Element {
    Ice,
    Fire,
    Combined,
    Lightning,
    Boss,
    /// Radial volleys, decoy shots and meteors.
    Arcane,
}

impl Element {
    pub fn color(self) -> Rgb {
        match self {
            Element::Ice => Rgb::hex(0x00CED1),
            Element::Fire => Rgb::hex(0xFF4500),
            Element::Combined => Rgb::hex(0x9932CC),
            Element::Lightning => Rgb::hex(0xFFD700),
            Element::Boss => Rgb::hex(0xDC143C),
            Element::Arcane => Rgb::hex(0xFF69B4),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Owner {
    Player,
    Boss,
}

#[derive(Clone, Debug)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: i32,
    pub element: Element,
    pub owner: Owner,
    pub life: u32,
    pub radius: f32,
}

impl Projectile {
    /// Advance one tick. Returns false once the lifetime is spent.
    pub fn tick(&mut self) -> bool {
        self.pos += self.vel;
        self.life = self.life.saturating_sub(1);
        self.life > 0
    }
}

// ══════════════════════════════════════════════════════════════
// Collectibles
// ══════════════════════════════════════════════════════════════

pub const PICKUP_RADIUS: f32 = 25.0;
pub const KEY_RADIUS: f32 = 25.0;

#[derive(Clone, Debug)]
pub struct Pickup {
    pub pos: Vec2,
    pub kind: ItemKind,
    pub radius: f32,
    pub collected: bool,
}

impl Pickup {
    pub fn new(pos: Vec2, kind: ItemKind) -> Self {
        Pickup { pos, kind, radius: PICKUP_RADIUS, collected: false }
    }
}

#[derive(Clone, Debug)]
pub struct KeyItem {
    pub pos: Vec2,
    pub radius: f32,
    pub collected: bool,
}

impl KeyItem {
    pub fn new(pos: Vec2) -> Self {
        KeyItem { pos, radius: KEY_RADIUS, collected: false }
    }
}

// ══════════════════════════════════════════════════════════════
// Ability helpers
// ══════════════════════════════════════════════════════════════

/// A summoned copy of the player that fires a few aimed shots, then fades.
#[derive(Clone, Debug)]
pub struct Decoy {
    pub pos: Vec2,
    pub shots_left: u32,
    pub next_shot: u32,
    pub interval: u32,
    pub damage: i32,
}

impl Decoy {
    /// Count down to the next shot. Returns true when a shot is due.
    pub fn tick(&mut self) -> bool {
        if self.shots_left == 0 { return false; }
        if self.next_shot > 0 {
            self.next_shot -= 1;
            return false;
        }
        self.shots_left -= 1;
        self.next_shot = self.interval;
        true
    }

    pub fn is_spent(&self) -> bool {
        self.shots_left == 0
    }
}

/// A planted charge that detonates when its fuse reaches zero.
#[derive(Clone, Debug)]
pub struct Bomb {
    pub pos: Vec2,
    pub fuse: u32,
    pub radius: f32,
    pub damage: i32,
}

impl Bomb {
    /// Burn one tick of fuse. Returns true on detonation.
    pub fn tick(&mut self) -> bool {
        self.fuse = self.fuse.saturating_sub(1);
        self.fuse == 0
    }
}

/// Cosmetic particle. Never read by gameplay.
#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: u32,
    pub max_life: u32,
    pub color: Rgb,
}

impl Particle {
    pub fn tick(&mut self) -> bool {
        self.pos += self.vel;
        self.vel = self.vel * 0.95;
        self.life = self.life.saturating_sub(1);
        self.life > 0
    }

    /// Remaining life as 1.0 (fresh) .. 0.0 (gone).
    pub fn fade(&self) -> f32 {
        if self.max_life == 0 { return 0.0; }
        self.life as f32 / self.max_life as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_stays_in_bounds() {
        let mut p = Player::new(Vec2::new(400.0, 300.0));
        p.damage(500);
        assert_eq!(p.health, 0);
        p.heal(1000);
        assert_eq!(p.health, p.max_health);
        p.damage(-20); // negative damage is not healing
        assert_eq!(p.health, p.max_health);
    }

    #[test]
    fn proportional_hit_floors_at_zero() {
        let mut e = Enemy::new(1, "Shadow", Rgb::hex(0x4B0082), Vec2::ZERO, 25.0, 60, 1.5);
        e.apply_hit(35, 1);
        assert_eq!(e.health, 25);
        e.apply_hit(35, 2);
        assert_eq!(e.health, 0);
        assert!(e.is_dead());
        assert_eq!(e.last_hit_tick, Some(2));
    }

    #[test]
    fn fixed_hit_count_ignores_damage() {
        let mut b = Enemy::new_boss(1, "Evolved Flame Demon", Rgb::hex(0xFF4500), Vec2::ZERO, 48.0, 14, 1.9);
        b.apply_hit(9999, 1);
        assert_eq!(b.health, 13);
        b.apply_hit(1, 2);
        assert_eq!(b.health, 12);
    }

    #[test]
    fn arm_never_shortens() {
        let mut m = Modifiers::default();
        m.set(Modifier::Invincible, 300);
        m.arm(Modifier::Invincible, 60);
        assert_eq!(m.remaining(Modifier::Invincible), 300);
        m.set(Modifier::Invincible, 10);
        m.arm(Modifier::Invincible, 60);
        assert_eq!(m.remaining(Modifier::Invincible), 60);
    }

    #[test]
    fn modifiers_expire_by_ticks() {
        let mut m = Modifiers::default();
        m.set(Modifier::Shield, 2);
        m.tick();
        assert!(m.is_active(Modifier::Shield));
        m.tick();
        assert!(!m.is_active(Modifier::Shield));
        assert_eq!(m.active().count(), 0);
    }

    #[test]
    fn diagonal_is_normalised() {
        let d = MoveIntent { dx: 1, dy: -1 }.displacement(5.0);
        assert!((d.x - 3.535).abs() < 0.01);
        assert!((d.y + 3.535).abs() < 0.01);
        let s = MoveIntent { dx: 0, dy: 1 }.displacement(5.0);
        assert_eq!(s, Vec2::new(0.0, 5.0));
    }

    #[test]
    fn player_speed_stacks() {
        let mut p = Player::new(Vec2::ZERO);
        assert_eq!(p.speed(false), 5.0);
        p.modifiers.set(Modifier::Speed, 10);
        assert_eq!(p.speed(false), 8.0);
        assert!((p.speed(true) - 14.4).abs() < 1e-4);
    }

    #[test]
    fn frozen_beats_slowed() {
        let mut e = Enemy::new(1, "Tank", Rgb::hex(0x00FF00), Vec2::ZERO, 32.0, 120, 1.0);
        e.slow_ticks = 5;
        assert!((e.effective_speed() - 0.3).abs() < 1e-6);
        e.frozen_ticks = 1;
        assert_eq!(e.effective_speed(), 0.0);
        e.tick_status();
        assert!((e.effective_speed() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn decoy_fires_on_interval() {
        let mut d = Decoy { pos: Vec2::ZERO, shots_left: 2, next_shot: 0, interval: 3, damage: 200 };
        assert!(d.tick());
        assert!(!d.tick());
        assert!(!d.tick());
        assert!(!d.tick());
        assert!(d.tick());
        assert!(d.is_spent());
        assert!(!d.tick());
    }

    #[test]
    fn bomb_detonates_once_fuse_burns() {
        let mut b = Bomb { pos: Vec2::ZERO, fuse: 2, radius: 200.0, damage: 1000 };
        assert!(!b.tick());
        assert!(b.tick());
    }

    #[test]
    fn ms_conversion() {
        assert_eq!(ms_to_ticks(1000), 60);
        assert_eq!(ms_to_ticks(3000), 180);
        assert_eq!(ms_to_ticks(2500), 150);
    }
}
