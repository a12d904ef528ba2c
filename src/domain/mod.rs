//! Pure gameplay domain: geometry, tiles, collision, and the player
//! movement state machine. Nothing here touches IO or the frontend.

pub mod autotile;
pub mod collision;
pub mod input;
pub mod player;
pub mod tile;
pub mod timer;
pub mod vec2;
