pub mod abilities;
pub mod combat;
pub mod effects;
pub mod event;
pub mod hud;
pub mod inventory;
pub mod progression;
pub mod rooms;
pub mod spawn;
pub mod step;
pub mod world;
