/// HUD read model: everything the presentation layer shows, gathered
/// in one pass so the renderer never reaches into world internals.

use crate::domain::ability::AbilityId;
use crate::domain::entity::{Modifier, TICKS_PER_SECOND};
use crate::domain::item::ItemKind;
use super::abilities::cooldown_ratio;
use super::rooms::ROOM_COUNT;
use super::world::{Phase, WorldState};

#[derive(Clone, Debug, PartialEq)]
pub struct SlotView {
    pub ability: Option<AbilityId>,
    /// 0.0 = ready, 1.0 = just fired.
    pub cooldown: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItemView {
    pub kind: ItemKind,
    pub symbol: char,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BossView {
    pub name: String,
    pub hits_left: i32,
    pub max_hits: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HudSnapshot {
    pub phase: Phase,
    pub paused: bool,
    pub health: i32,
    pub max_health: i32,
    pub keys: u32,
    pub room_index: usize,
    pub room_name: String,
    pub boss_room: bool,
    /// Fraction of the room sequence reached.
    pub progress: f32,
    pub level: usize,
    /// Active modifiers with whole seconds remaining (rounded up).
    pub modifiers: Vec<(Modifier, u32)>,
    pub slots: Vec<SlotView>,
    /// Cooldown of the lightning key, once unlocked.
    pub lightning: Option<f32>,
    pub inventory: Vec<ItemView>,
    pub unlocked: Vec<AbilityId>,
    pub boss: Option<BossView>,
    pub message: String,
    pub countdown_secs: u32,
}

pub fn snapshot(world: &WorldState) -> HudSnapshot {
    let room = world.room();
    HudSnapshot {
        phase: world.phase,
        paused: world.paused,
        health: world.player.health,
        max_health: world.player.max_health,
        keys: world.keys_collected,
        room_index: room.index,
        room_name: room.name.clone(),
        boss_room: room.is_boss_room,
        progress: (world.current_room + 1) as f32 / ROOM_COUNT as f32,
        level: world.level,
        modifiers: world.player.modifiers.active()
            .map(|(m, ticks)| (m, ticks.div_ceil(TICKS_PER_SECOND)))
            .collect(),
        slots: world.loadout.slots().iter()
            .map(|&ability| SlotView {
                ability,
                cooldown: ability.map_or(0.0, |id| cooldown_ratio(world, id)),
            })
            .collect(),
        lightning: world.lightning_unlocked.then(|| cooldown_ratio(world, AbilityId::Lightning)),
        inventory: world.inventory.entries()
            .map(|(kind, count)| ItemView { kind, symbol: kind.symbol(), count })
            .collect(),
        unlocked: world.unlocked_roster(),
        boss: world.boss().map(|b| BossView {
            name: b.name.clone(),
            hits_left: b.health.max(0),
            max_hits: b.max_health,
        }),
        message: world.message.clone(),
        countdown_secs: match world.phase {
            Phase::UpgradeCountdown | Phase::GameOver => world.countdown.div_ceil(TICKS_PER_SECOND),
            _ => 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaConfig;
    use crate::domain::item::FoodKind;
    use crate::sim::{abilities, progression};

    #[test]
    fn snapshot_reflects_world() {
        let mut w = WorldState::new(ArenaConfig::default(), Some(4));
        progression::start_game(&mut w, &mut vec![]);
        w.player.health = 99;
        w.player.modifiers.set(Modifier::Speed, 61);
        w.inventory.add(ItemKind::Food(FoodKind::Apple));
        w.inventory.add(ItemKind::Food(FoodKind::Apple));
        abilities::try_use_slot(&mut w, 1, &mut vec![]);

        let hud = snapshot(&w);
        assert_eq!(hud.health, 99);
        assert_eq!(hud.max_health, 150);
        assert_eq!(hud.room_index, 0);
        assert!(hud.room_name.starts_with("Room 1 - "));
        assert!(!hud.boss_room);
        assert_eq!(hud.modifiers, vec![(Modifier::Speed, 2)]);
        assert_eq!(hud.slots.len(), 3);
        assert_eq!(hud.slots[0].cooldown, 0.0);
        assert_eq!(hud.slots[1].cooldown, 1.0);
        assert_eq!(hud.lightning, None);
        assert_eq!(hud.inventory, vec![ItemView { kind: ItemKind::Food(FoodKind::Apple), symbol: ItemKind::Food(FoodKind::Apple).symbol(), count: 2 }]);
        assert_eq!(hud.unlocked, AbilityId::BASE.to_vec());
        assert!(hud.boss.is_none());
    }

    #[test]
    fn boss_rooms_are_flagged() {
        let mut w = WorldState::new(ArenaConfig::default(), Some(4));
        w.current_room = 99;
        let hud = snapshot(&w);
        assert_eq!(hud.room_index, 99);
        assert!(hud.boss_room);
        assert_eq!(hud.room_name, "BOSS ROOM 1");
    }

    #[test]
    fn boss_bar_counts_hits() {
        let mut w = WorldState::new(ArenaConfig::default(), Some(4));
        progression::start_game(&mut w, &mut vec![]);
        w.keys_collected = 5;
        progression::check_boss_offer(&mut w, &mut vec![]);
        progression::accept_boss(&mut w, &mut vec![]);
        if let Some(b) = w.enemies.first_mut() {
            b.apply_hit(50, 1);
        }
        let boss = snapshot(&w).boss;
        assert_eq!(boss.map(|b| (b.hits_left, b.max_hits)), Some((13, 14)));
    }
}
