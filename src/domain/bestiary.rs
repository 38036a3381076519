/// Enemy and boss archetype tables, plus the per-room scaling rule.

use super::entity::Rgb;

/// Health ceiling for scaled regular enemies.
pub const MAX_ENEMY_HEALTH: i32 = 180;
/// Every boss dies after exactly this many projectile hits.
pub const BOSS_HITS_TO_KILL: i32 = 14;
pub const BOSS_SPEED_FACTOR: f32 = 1.2;

#[derive(Clone, Copy, Debug)]
pub struct EnemyArchetype {
    pub name: &'static str,
    pub color: Rgb,
    pub radius: f32,
    pub speed: f32,
    pub health: i32,
}

#[derive(Clone, Copy, Debug)]
pub struct BossArchetype {
    pub name: &'static str,
    pub color: Rgb,
    pub radius: f32,
    pub speed: f32,
}

const fn enemy(name: &'static str, color: u32, radius: f32, speed: f32, health: i32) -> EnemyArchetype {
    EnemyArchetype { name, color: Rgb::hex(color), radius, speed, health }
}

const fn boss(name: &'static str, color: u32, radius: f32, speed: f32) -> BossArchetype {
    BossArchetype { name, color: Rgb::hex(color), radius, speed }
}

pub static ENEMIES: [EnemyArchetype; 10] = [
    enemy("Shadow", 0x4B0082, 25.0, 1.5, 60),
    enemy("Fire", 0xFF4500, 20.0, 2.5, 45),
    enemy("Ice", 0x00CED1, 28.0, 1.8, 75),
    enemy("Poison", 0x32CD32, 22.0, 2.2, 50),
    enemy("Magic", 0x9932CC, 26.0, 2.0, 65),
    enemy("Golden", 0xFFD700, 30.0, 1.2, 90),
    enemy("Pink", 0xFF69B4, 18.0, 3.0, 40),
    enemy("Tank", 0x00FF00, 32.0, 1.0, 120),
    enemy("Speed", 0xFF1493, 15.0, 3.5, 35),
    enemy("Elite", 0x8A2BE2, 35.0, 0.8, 150),
];

pub static BOSSES: [BossArchetype; 10] = [
    boss("Shadow Beast", 0x8B0000, 45.0, 1.5),
    boss("Flame Demon", 0xFF4500, 48.0, 1.6),
    boss("Ice Titan", 0x00CED1, 50.0, 1.3),
    boss("Thunder Lord", 0xFFD700, 42.0, 1.8),
    boss("Void Wraith", 0x4B0082, 40.0, 2.0),
    boss("Crystal Golem", 0x32CD32, 55.0, 1.2),
    boss("Blood Reaper", 0xDC143C, 46.0, 1.7),
    boss("Storm Dragon", 0x9932CC, 58.0, 1.4),
    boss("Chaos Overlord", 0xFF1493, 52.0, 1.5),
    boss("Nightmare King", 0x000000, 60.0, 1.3),
];

/// Room difficulty multiplier.
pub fn room_multiplier(room: usize) -> f64 {
    1.0 + room as f64 * 0.005
}

/// `(health, speed)` for an archetype spawned in `room`.
pub fn scaled_stats(arch: &EnemyArchetype, room: usize) -> (i32, f32) {
    let m = room_multiplier(room);
    let health = ((arch.health as f64 * m).floor() as i32).min(MAX_ENEMY_HEALTH);
    (health, (arch.speed as f64 * m) as f32)
}

/// Boss archetype index for a key count: `floor(keys / 5) mod 10`.
pub fn boss_cycle(keys: u32) -> usize {
    (keys as usize / 5) % BOSSES.len()
}

pub fn boss_display_name(variant: usize) -> String {
    format!("Evolved {}", BOSSES[variant % BOSSES.len()].name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_caps_health() {
        let elite = &ENEMIES[9];
        assert_eq!(scaled_stats(elite, 0), (150, 0.8));
        // 150 * 1.5 = 225 -> capped
        assert_eq!(scaled_stats(elite, 100).0, MAX_ENEMY_HEALTH);
        let shadow = &ENEMIES[0];
        let (h, s) = scaled_stats(shadow, 10);
        assert_eq!(h, 63);
        assert!((s - 1.575).abs() < 1e-5);
    }

    #[test]
    fn boss_cycle_wraps() {
        assert_eq!(boss_cycle(5), 1);
        assert_eq!(boss_cycle(10), 2);
        assert_eq!(boss_cycle(50), 0);
        assert_eq!(boss_cycle(0), 0);
        assert_eq!(boss_display_name(1), "Evolved Flame Demon");
    }
}
