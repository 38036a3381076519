/// Events emitted during a simulation step or a command.
/// The presentation layer consumes these for dialogs and sound.

use crate::domain::ability::AbilityId;
use crate::domain::collision::Vec2;
use crate::domain::item::ItemKind;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    RoomEntered { index: usize },
    AbilityUsed { id: AbilityId },
    AbilityUnlocked { id: AbilityId },
    EnemyHit { id: u32, boss: bool },
    EnemyKilled { id: u32, boss: bool, pos: Vec2 },
    PlayerHurt { damage: i32 },
    ShieldBlocked,
    BossAttack,
    BombDetonated { pos: Vec2 },
    PickupCollected { kind: ItemKind },
    ItemActivated { kind: ItemKind },
    KeyCollected { total: u32 },
    /// Show the accept/decline dialog.
    BossOffered { boss: String, keys: u32 },
    BossDeclined,
    BossArenaEntered { boss: String },
    BossDefeated,
    /// Show the upgrade-choice dialog.
    UpgradeOffered,
    UpgradeChosen { id: AbilityId, tier: u32 },
    GameOver,
    Victory,
    ReturnedToTitle,
}
