/// Room generation: the fixed, linear sequence of themed rooms.
///
/// Rooms are generated once per world from the session RNG and never
/// change afterwards. Room `i` has at most one passage, to room `i + 1`;
/// the last room has none.

use rand::Rng;

use crate::domain::collision::{Rect, Vec2};
use crate::domain::entity::Rgb;

pub const ROOM_COUNT: usize = 1000;
/// Rooms with `index % BOSS_ROOM_PERIOD == BOSS_ROOM_PERIOD - 1` are boss-flavoured.
pub const BOSS_ROOM_PERIOD: usize = 100;
const MAX_ENEMY_QUOTA: usize = 8;
const MAX_BOSS_ROOM_QUOTA: usize = 12;
const PASSAGE_LONG: f32 = 100.0;
const PASSAGE_SHORT: f32 = 80.0;
/// How far inside the opposite edge the player appears after a passage.
const ENTRY_INSET: f32 = 100.0;

#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub name: &'static str,
    pub background: Rgb,
    pub accent: Rgb,
    pub particle: Rgb,
}

const fn theme(name: &'static str, bg: u32, accent: u32, particle: u32) -> Theme {
    Theme { name, background: Rgb::hex(bg), accent: Rgb::hex(accent), particle: Rgb::hex(particle) }
}

pub static THEMES: [Theme; 12] = [
    theme("Forest Clearing", 0x1B3A1B, 0x4CAF50, 0x8BC34A),
    theme("Ancient Ruins", 0x3E2723, 0x8D6E63, 0xBCAAA4),
    theme("Mystical Garden", 0x2E1B3A, 0x9C27B0, 0xE1BEE7),
    theme("Crystal Cavern", 0x0D2B3E, 0x00BCD4, 0x80DEEA),
    theme("Golden Temple", 0x3E3000, 0xFFC107, 0xFFE082),
    theme("Shadow Realm", 0x121212, 0x424242, 0x757575),
    theme("Emerald Grove", 0x003D1F, 0x00C853, 0x69F0AE),
    theme("Sapphire Lake", 0x0A1F44, 0x2962FF, 0x82B1FF),
    theme("Amethyst Cave", 0x2A0A3D, 0xAA00FF, 0xEA80FC),
    theme("Pearl Beach", 0x3D3A33, 0xFFF8E1, 0xFFFFFF),
    theme("Rainbow Valley", 0x1A1A2E, 0xFF4081, 0xFFEB3B),
    theme("Cosmic Space", 0x05051A, 0x3F51B5, 0xE8EAF6),
];

pub const BOSS_BACKGROUND: Rgb = Rgb::hex(0x8B0000);
pub const BOSS_PARTICLE: Rgb = Rgb::hex(0xFF0000);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];
}

#[derive(Clone, Debug)]
pub struct Passage {
    pub side: Side,
    pub trigger: Rect,
    pub target_room: usize,
    pub target_spawn: Vec2,
}

#[derive(Clone, Debug)]
pub struct Room {
    pub index: usize,
    pub name: String,
    pub theme: Theme,
    pub background: Rgb,
    pub particle: Rgb,
    pub enemy_quota: usize,
    pub key_quota: usize,
    pub passages: Vec<Passage>,
    pub is_boss_room: bool,
}

pub fn is_boss_room(index: usize) -> bool {
    index % BOSS_ROOM_PERIOD == BOSS_ROOM_PERIOD - 1
}

/// Build the whole room sequence for a `w` x `h` arena.
pub fn generate<R: Rng>(rng: &mut R, w: f32, h: f32) -> Vec<Room> {
    (0..ROOM_COUNT).map(|i| generate_room(rng, i, w, h)).collect()
}

fn generate_room<R: Rng>(rng: &mut R, index: usize, w: f32, h: f32) -> Room {
    let theme = THEMES[index % THEMES.len()];
    let jitter: i64 = rng.gen_range(-1..=1);
    let base = (1 + index / 50).min(MAX_ENEMY_QUOTA) as i64;
    let mut enemy_quota = (base + jitter).max(1) as usize;

    let passages = if index + 1 < ROOM_COUNT {
        let side = Side::ALL[rng.gen_range(0..Side::ALL.len())];
        vec![passage(side, index + 1, w, h)]
    } else {
        vec![]
    };

    let boss = is_boss_room(index);
    let (name, background, particle) = if boss {
        enemy_quota = (3 + (index / BOSS_ROOM_PERIOD) * 2).min(MAX_BOSS_ROOM_QUOTA);
        (format!("BOSS ROOM {}", index / BOSS_ROOM_PERIOD + 1), BOSS_BACKGROUND, BOSS_PARTICLE)
    } else {
        (format!("Room {} - {}", index + 1, theme.name), theme.background, theme.particle)
    };

    Room {
        index,
        name,
        theme,
        background,
        particle,
        enemy_quota,
        key_quota: 1,
        passages,
        is_boss_room: boss,
    }
}

/// Trigger rectangle on `side`, centred on that edge, and the spawn point
/// just inside the opposite edge of the destination room.
fn passage(side: Side, target_room: usize, w: f32, h: f32) -> Passage {
    let (trigger, target_spawn) = match side {
        Side::Top => (
            Rect::new(w / 2.0 - PASSAGE_LONG / 2.0, 0.0, PASSAGE_LONG, PASSAGE_SHORT),
            Vec2::new(w / 2.0, h - ENTRY_INSET),
        ),
        Side::Bottom => (
            Rect::new(w / 2.0 - PASSAGE_LONG / 2.0, h - PASSAGE_SHORT, PASSAGE_LONG, PASSAGE_SHORT),
            Vec2::new(w / 2.0, ENTRY_INSET),
        ),
        Side::Left => (
            Rect::new(0.0, h / 2.0 - PASSAGE_LONG / 2.0, PASSAGE_SHORT, PASSAGE_LONG),
            Vec2::new(w - ENTRY_INSET, h / 2.0),
        ),
        Side::Right => (
            Rect::new(w - PASSAGE_SHORT, h / 2.0 - PASSAGE_LONG / 2.0, PASSAGE_SHORT, PASSAGE_LONG),
            Vec2::new(ENTRY_INSET, h / 2.0),
        ),
    };
    Passage { side, trigger, target_room, target_spawn }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rooms() -> Vec<Room> {
        let mut rng = StdRng::seed_from_u64(42);
        generate(&mut rng, 800.0, 600.0)
    }

    #[test]
    fn sequence_is_linear() {
        let rooms = rooms();
        assert_eq!(rooms.len(), ROOM_COUNT);
        for r in &rooms[..ROOM_COUNT - 1] {
            assert_eq!(r.passages.len(), 1);
            assert_eq!(r.passages[0].target_room, r.index + 1);
        }
        assert!(rooms[ROOM_COUNT - 1].passages.is_empty());
    }

    #[test]
    fn quotas_in_range() {
        for r in rooms() {
            assert_eq!(r.key_quota, 1);
            if r.is_boss_room {
                assert!(r.enemy_quota >= 3 && r.enemy_quota <= MAX_BOSS_ROOM_QUOTA);
            } else {
                assert!(r.enemy_quota >= 1 && r.enemy_quota <= MAX_ENEMY_QUOTA + 1);
            }
        }
    }

    #[test]
    fn boss_rooms_every_hundred() {
        let rooms = rooms();
        assert!(rooms[99].is_boss_room);
        assert_eq!(rooms[99].name, "BOSS ROOM 1");
        assert_eq!(rooms[99].enemy_quota, 3);
        assert_eq!(rooms[999].enemy_quota, 12);
        assert!(!rooms[100].is_boss_room);
        assert_eq!(rooms[0].name, "Room 1 - Forest Clearing");
        assert_eq!(rooms[12].theme.name, "Forest Clearing");
    }

    #[test]
    fn spawn_lands_outside_destination_trigger_zone() {
        // Arriving must not immediately re-trigger the opposite edge.
        for side in Side::ALL {
            let p = passage(side, 1, 800.0, 600.0);
            assert!(!p.trigger.contains(p.target_spawn));
            assert!(p.target_spawn.x > 0.0 && p.target_spawn.x < 800.0);
            assert!(p.target_spawn.y > 0.0 && p.target_spawn.y < 600.0);
        }
    }

    #[test]
    fn same_seed_same_rooms() {
        let a = rooms();
        let b = rooms();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.enemy_quota, y.enemy_quota);
            assert_eq!(x.passages.first().map(|p| p.side), y.passages.first().map(|p| p.side));
        }
    }
}
