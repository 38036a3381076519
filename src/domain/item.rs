/// Collectible item catalogue: foods, timed power-ups and the lightning scroll.
///
/// Items are never applied on pickup. They go into the inventory and
/// carry their payload (heal amount or modifier duration) by kind.

use super::entity::{Modifier, Rgb};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum FoodKind {
    Apple,
    Banana,
    Orange,
    Grapes,
    Strawberry,
    Watermelon,
    Pineapple,
    Cherry,
    Peach,
    Lemon,
    Avocado,
    Carrot,
    Broccoli,
    Bread,
    Cheese,
}

impl FoodKind {
    pub const ALL: [FoodKind; 15] = [
        FoodKind::Apple, FoodKind::Banana, FoodKind::Orange, FoodKind::Grapes,
        FoodKind::Strawberry, FoodKind::Watermelon, FoodKind::Pineapple, FoodKind::Cherry,
        FoodKind::Peach, FoodKind::Lemon, FoodKind::Avocado, FoodKind::Carrot,
        FoodKind::Broccoli, FoodKind::Bread, FoodKind::Cheese,
    ];

    pub fn heal(self) -> i32 {
        match self {
            FoodKind::Apple => 15,
            FoodKind::Banana => 12,
            FoodKind::Orange => 18,
            FoodKind::Grapes => 10,
            FoodKind::Strawberry => 8,
            FoodKind::Watermelon => 25,
            FoodKind::Pineapple => 20,
            FoodKind::Cherry => 6,
            FoodKind::Peach => 14,
            FoodKind::Lemon => 5,
            FoodKind::Avocado => 30,
            FoodKind::Carrot => 16,
            FoodKind::Broccoli => 22,
            FoodKind::Bread => 35,
            FoodKind::Cheese => 28,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FoodKind::Apple => "Apple",
            FoodKind::Banana => "Banana",
            FoodKind::Orange => "Orange",
            FoodKind::Grapes => "Grapes",
            FoodKind::Strawberry => "Strawberry",
            FoodKind::Watermelon => "Watermelon",
            FoodKind::Pineapple => "Pineapple",
            FoodKind::Cherry => "Cherry",
            FoodKind::Peach => "Peach",
            FoodKind::Lemon => "Lemon",
            FoodKind::Avocado => "Avocado",
            FoodKind::Carrot => "Carrot",
            FoodKind::Broccoli => "Broccoli",
            FoodKind::Bread => "Bread",
            FoodKind::Cheese => "Cheese",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum PowerUpKind {
    Speed,
    Damage,
    Shield,
    RapidFire,
    DoubleDamage,
    Invincibility,
    MegaSpeed,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 7] = [
        PowerUpKind::Speed, PowerUpKind::Damage, PowerUpKind::Shield, PowerUpKind::RapidFire,
        PowerUpKind::DoubleDamage, PowerUpKind::Invincibility, PowerUpKind::MegaSpeed,
    ];

    pub fn duration_ms(self) -> u32 {
        match self {
            PowerUpKind::Speed => 10_000,
            PowerUpKind::Damage => 15_000,
            PowerUpKind::Shield => 12_000,
            PowerUpKind::RapidFire => 8_000,
            PowerUpKind::DoubleDamage => 20_000,
            PowerUpKind::Invincibility => 5_000,
            PowerUpKind::MegaSpeed => 6_000,
        }
    }

    /// Modifiers switched on by this power-up, all for `duration_ms`.
    pub fn modifiers(self) -> &'static [Modifier] {
        match self {
            PowerUpKind::Speed => &[Modifier::Speed],
            PowerUpKind::Damage => &[Modifier::Damage],
            PowerUpKind::Shield => &[Modifier::Shield],
            PowerUpKind::RapidFire => &[Modifier::RapidFire],
            PowerUpKind::DoubleDamage => &[Modifier::Damage],
            PowerUpKind::Invincibility => &[Modifier::Shield, Modifier::Invincible],
            PowerUpKind::MegaSpeed => &[Modifier::Speed],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PowerUpKind::Speed => "Speed Boost",
            PowerUpKind::Damage => "Damage Boost",
            PowerUpKind::Shield => "Shield",
            PowerUpKind::RapidFire => "Rapid Fire",
            PowerUpKind::DoubleDamage => "Double Damage",
            PowerUpKind::Invincibility => "Invincibility",
            PowerUpKind::MegaSpeed => "Mega Speed",
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            PowerUpKind::Speed => Rgb::hex(0x00BFFF),
            PowerUpKind::Damage => Rgb::hex(0xFF4500),
            PowerUpKind::Shield => Rgb::hex(0x4169E1),
            PowerUpKind::RapidFire => Rgb::hex(0xFFD700),
            PowerUpKind::DoubleDamage => Rgb::hex(0xDC143C),
            PowerUpKind::Invincibility => Rgb::hex(0xFFFFFF),
            PowerUpKind::MegaSpeed => Rgb::hex(0x00FF7F),
        }
    }
}

/// What an inventory slot or an arena pickup holds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ItemKind {
    Food(FoodKind),
    PowerUp(PowerUpKind),
    /// Granted by the post-boss upgrade; activating it unlocks the lightning storm.
    LightningScroll,
}

impl ItemKind {
    pub fn name(self) -> &'static str {
        match self {
            ItemKind::Food(f) => f.name(),
            ItemKind::PowerUp(p) => p.name(),
            ItemKind::LightningScroll => "Lightning Storm",
        }
    }

    /// Single-cell glyph for terminal display.
    pub fn symbol(self) -> char {
        match self {
            ItemKind::Food(FoodKind::Apple) => 'a',
            ItemKind::Food(FoodKind::Banana) => 'b',
            ItemKind::Food(FoodKind::Orange) => 'o',
            ItemKind::Food(FoodKind::Grapes) => 'g',
            ItemKind::Food(FoodKind::Strawberry) => 's',
            ItemKind::Food(FoodKind::Watermelon) => 'w',
            ItemKind::Food(FoodKind::Pineapple) => 'p',
            ItemKind::Food(FoodKind::Cherry) => 'c',
            ItemKind::Food(FoodKind::Peach) => 'e',
            ItemKind::Food(FoodKind::Lemon) => 'l',
            ItemKind::Food(FoodKind::Avocado) => 'v',
            ItemKind::Food(FoodKind::Carrot) => 'r',
            ItemKind::Food(FoodKind::Broccoli) => 'k',
            ItemKind::Food(FoodKind::Bread) => 'd',
            ItemKind::Food(FoodKind::Cheese) => 'h',
            ItemKind::PowerUp(PowerUpKind::Speed) => '»',
            ItemKind::PowerUp(PowerUpKind::Damage) => '†',
            ItemKind::PowerUp(PowerUpKind::Shield) => 'Ø',
            ItemKind::PowerUp(PowerUpKind::RapidFire) => '≡',
            ItemKind::PowerUp(PowerUpKind::DoubleDamage) => '‡',
            ItemKind::PowerUp(PowerUpKind::Invincibility) => '☼',
            ItemKind::PowerUp(PowerUpKind::MegaSpeed) => '»',
            ItemKind::LightningScroll => 'ϟ',
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            ItemKind::Food(_) => Rgb::hex(0x7CFC00),
            ItemKind::PowerUp(p) => p.color(),
            ItemKind::LightningScroll => Rgb::hex(0xFFFF00),
        }
    }

    pub fn is_food(self) -> bool {
        matches!(self, ItemKind::Food(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heal_table_matches_catalogue() {
        assert_eq!(FoodKind::Apple.heal(), 15);
        assert_eq!(FoodKind::Bread.heal(), 35);
        assert_eq!(FoodKind::Lemon.heal(), 5);
        assert!(FoodKind::ALL.iter().all(|f| f.heal() > 0));
    }

    #[test]
    fn invincibility_also_shields() {
        let m = PowerUpKind::Invincibility.modifiers();
        assert!(m.contains(&Modifier::Shield));
        assert!(m.contains(&Modifier::Invincible));
    }

    #[test]
    fn inventory_order_groups_food_first() {
        let mut kinds = vec![
            ItemKind::LightningScroll,
            ItemKind::PowerUp(PowerUpKind::Shield),
            ItemKind::Food(FoodKind::Cheese),
        ];
        kinds.sort();
        assert_eq!(kinds[0], ItemKind::Food(FoodKind::Cheese));
        assert_eq!(kinds[2], ItemKind::LightningScroll);
    }
}
