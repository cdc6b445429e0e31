//! Physics module: bodies, collision detection and response
//!
//! Bodies are owned by the [`BodyRegistry`]; the quadtree only refers to
//! them by [`BodyId`]. Collision detection uses the tree as its broad phase
//! and resolves overlaps with a single elastic impulse per pair.

pub mod body;
pub mod collision;
pub mod spawn;

pub use body::{Body, BodyDesc, BodyId, BodyRegistry};
pub use collision::{apply_impulse, contact_normal, is_colliding, CollisionResolver, ResolveScope};
pub use spawn::{spawn_desc, SpawnCommand};
