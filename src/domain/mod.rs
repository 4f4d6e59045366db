pub mod entity;
pub mod grid;
pub mod hitbox;
pub mod mover;
pub mod path;
pub mod steering;
pub mod tile;
