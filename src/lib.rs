/*!
2D character/platform control layer over rapier2d collision detection.

This crate implements the contact-resolution side of a 2D platformer: it
classifies each character's contact state (on-floor / on-ceiling / on-wall)
every physics tick and selectively disables contact constraints so characters
can pass up through one-way platforms, drop down through them on request, and
pass through other characters on the same collision layer.

It deliberately does NOT simulate: [`world::PlatformWorld`] runs rapier's
collision detection only and exposes the resulting contact constraints (with
their enabled flags) to the embedding application, which owns movement and
collision response.

The code is split for clarity:

- settings:  world-space tolerances
- aabb:      axis-aligned bounding boxes used for all vertical-proximity tests
- flags:     generic bitmask container backing the grounding flags
- tag:       body roles (character / floor / one-way platform / generic)
- contact:   ephemeral contact constraints
- resolver:  per-character contact classification and one-way logic
- shapes:    collider and body definitions
- debug:     debug outline generation for collision geometry
- world:     step scheduler and physics world

All per-tick dispatch is single-threaded; resolver state must only be touched
from the thread driving [`world::PlatformWorld::step`].
*/

pub mod aabb;
pub mod contact;
pub mod debug;
pub mod error;
pub mod flags;
pub mod resolver;
pub mod settings;
pub mod shapes;
pub mod tag;
pub mod world;

// Re-export commonly used types.
pub use aabb::Aabb;
pub use contact::{ContactConstraint, ContactSide};
pub use error::AttachError;
pub use resolver::{CharacterState, DropThrough, GroundFlag};
pub use shapes::{CharacterDef, ShapeDef, StaticBodyDef};
pub use tag::{BodyRole, BodyTag};
pub use world::{CharacterHandle, PlatformWorld};

// Re-export rapier so downstream crates can use its types without depending
// on `rapier2d` directly.
pub use rapier2d;
