pub mod ability;
pub mod bestiary;
pub mod collision;
pub mod entity;
pub mod item;
