/// Inventory & equip system.
///
/// Pickups land here as counts per item kind and stay inert until the
/// player activates a slot. Slots are positions in kind order, so the
/// numbering shown by the HUD matches `activate_item`.
///
/// Every rejected request (empty slot, full loadout, locked ability) is a
/// silent no-op that returns `false` and leaves the world untouched.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::ability::AbilityId;
use crate::domain::entity::ms_to_ticks;
use crate::domain::item::ItemKind;
use super::event::GameEvent;
use super::world::WorldState;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    items: BTreeMap<ItemKind, u32>,
}

impl Inventory {
    pub fn add(&mut self, kind: ItemKind) {
        *self.items.entry(kind).or_insert(0) += 1;
    }

    pub fn count(&self, kind: ItemKind) -> u32 {
        self.items.get(&kind).copied().unwrap_or(0)
    }

    /// Kind held in `slot`, if any.
    pub fn kind_at(&self, slot: usize) -> Option<ItemKind> {
        self.items.keys().nth(slot).copied()
    }

    /// Remove one of `kind`, deleting the entry when it reaches zero.
    pub fn take(&mut self, kind: ItemKind) -> bool {
        match self.items.get_mut(&kind) {
            Some(n) if *n > 1 => {
                *n -= 1;
                true
            }
            Some(_) => {
                self.items.remove(&kind);
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (ItemKind, u32)> + '_ {
        self.items.iter().map(|(&k, &n)| (k, n))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ══════════════════════════════════════════════════════════════
// World commands
// ══════════════════════════════════════════════════════════════

/// Use one item from inventory `slot`.
pub fn activate_item(world: &mut WorldState, slot: usize, events: &mut Vec<GameEvent>) -> bool {
    if !world.phase.is_live() || world.paused {
        return false;
    }
    let kind = match world.inventory.kind_at(slot) {
        Some(k) => k,
        None => return false,
    };

    match kind {
        ItemKind::Food(food) => {
            world.player.heal(food.heal());
        }
        ItemKind::PowerUp(power) => {
            let ticks = ms_to_ticks(power.duration_ms());
            for &m in power.modifiers() {
                world.player.modifiers.set(m, ticks);
            }
        }
        ItemKind::LightningScroll => {
            world.lightning_unlocked = true;
        }
    }
    world.inventory.take(kind);
    debug!(item = kind.name(), left = world.inventory.count(kind), "item activated");
    events.push(GameEvent::ItemActivated { kind });
    true
}

/// Equip an unlocked ability into the first free slot.
pub fn equip(world: &mut WorldState, id: AbilityId) -> bool {
    if id == AbilityId::Lightning || !world.is_available(id) {
        return false;
    }
    world.loadout.equip(id)
}

pub fn unequip(world: &mut WorldState, slot: usize) -> bool {
    world.loadout.unequip(slot).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaConfig;
    use crate::domain::entity::Modifier;
    use crate::domain::item::{FoodKind, PowerUpKind};
    use crate::sim::world::Phase;

    fn live_world() -> WorldState {
        let mut w = WorldState::new(ArenaConfig::default(), Some(11));
        w.phase = Phase::InRoom;
        w
    }

    #[test]
    fn food_heals_and_decrements() {
        let mut w = live_world();
        let apple = ItemKind::Food(FoodKind::Apple);
        w.inventory.add(apple);
        w.inventory.add(apple);
        w.player.health = 100;

        let mut ev = vec![];
        assert!(activate_item(&mut w, 0, &mut ev));
        assert_eq!(w.player.health, 115);
        assert_eq!(w.player.max_health, 150);
        assert_eq!(w.inventory.count(apple), 1);

        assert!(activate_item(&mut w, 0, &mut ev));
        assert_eq!(w.player.health, 130);
        assert_eq!(w.inventory.count(apple), 0);
        assert!(w.inventory.is_empty());
        assert_eq!(ev.len(), 2);
    }

    #[test]
    fn heal_caps_at_max() {
        let mut w = live_world();
        w.inventory.add(ItemKind::Food(FoodKind::Bread));
        w.player.health = 140;
        assert!(activate_item(&mut w, 0, &mut vec![]));
        assert_eq!(w.player.health, 150);
    }

    #[test]
    fn power_up_sets_modifier_duration() {
        let mut w = live_world();
        w.inventory.add(ItemKind::PowerUp(PowerUpKind::Invincibility));
        assert!(activate_item(&mut w, 0, &mut vec![]));
        assert_eq!(w.player.modifiers.remaining(Modifier::Invincible), ms_to_ticks(5000));
        assert!(w.player.has_shield());
        assert!(w.inventory.is_empty());
    }

    #[test]
    fn strong_power_ups_share_the_base_bonuses() {
        let mut w = live_world();
        w.inventory.add(ItemKind::PowerUp(PowerUpKind::DoubleDamage));
        w.inventory.add(ItemKind::PowerUp(PowerUpKind::MegaSpeed));
        assert!(activate_item(&mut w, 0, &mut vec![]));
        assert!(activate_item(&mut w, 0, &mut vec![]));
        assert_eq!(w.player.damage_bonus(), 10);
        assert_eq!(w.player.speed(false), 8.0);
        assert_eq!(w.player.modifiers.remaining(Modifier::Damage), ms_to_ticks(20_000));
        assert_eq!(w.player.modifiers.remaining(Modifier::Speed), ms_to_ticks(6_000));
    }

    #[test]
    fn scroll_unlocks_lightning() {
        let mut w = live_world();
        w.inventory.add(ItemKind::LightningScroll);
        assert!(activate_item(&mut w, 0, &mut vec![]));
        assert!(w.lightning_unlocked);
        assert_eq!(w.inventory.count(ItemKind::LightningScroll), 0);
    }

    #[test]
    fn empty_slot_is_noop() {
        let mut w = live_world();
        w.inventory.add(ItemKind::Food(FoodKind::Apple));
        w.player.health = 90;
        let before = w.inventory.clone();
        let mut ev = vec![];
        assert!(!activate_item(&mut w, 3, &mut ev));
        assert_eq!(w.inventory, before);
        assert_eq!(w.player.health, 90);
        assert!(ev.is_empty());
    }

    #[test]
    fn inactive_phase_is_noop() {
        let mut w = live_world();
        w.phase = Phase::BossOffered;
        w.inventory.add(ItemKind::Food(FoodKind::Apple));
        assert!(!activate_item(&mut w, 0, &mut vec![]));
        assert_eq!(w.inventory.count(ItemKind::Food(FoodKind::Apple)), 1);
    }

    #[test]
    fn equip_limits() {
        let mut w = live_world();
        // locked
        assert!(!equip(&mut w, AbilityId::Nova));
        w.unlocked.insert(AbilityId::Nova);
        // full
        let before = w.loadout.clone();
        assert!(!equip(&mut w, AbilityId::Nova));
        assert_eq!(w.loadout, before);

        assert!(unequip(&mut w, 2));
        assert!(!unequip(&mut w, 2));
        assert!(equip(&mut w, AbilityId::Nova));
        assert!(w.loadout.filled() <= 3);
        assert!(!equip(&mut w, AbilityId::Nova));
    }

    #[test]
    fn lightning_is_not_equippable() {
        let mut w = live_world();
        w.lightning_unlocked = true;
        unequip(&mut w, 0);
        assert!(!equip(&mut w, AbilityId::Lightning));
    }
}
