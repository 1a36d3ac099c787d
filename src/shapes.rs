//! Collider shape and body definitions.
//!
//! Canonical, engine-agnostic descriptions of the bodies the world builds:
//! static surfaces (floors, one-way platforms, generic obstacles) and
//! character bodies. The world maps these to rapier bodies/colliders, with the
//! role tag packed into the collider's `user_data`.

use rapier2d::prelude::*;

use crate::tag::{BodyRole, BodyTag};

/// Supported collider shapes.
///
/// Keep this intentionally small and deterministic. Extend as needed.
#[derive(Clone, Debug)]
pub enum ShapeDef {
    /// Axis-aligned box with given half-extents (meters), rotated by the body
    /// pose.
    Cuboid { half_extents: Vector<f32> },

    /// Ball (meters).
    Ball { radius: f32 },

    /// Y-aligned capsule (meters).
    CapsuleY { radius: f32, half_height: f32 },

    /// Rounded cuboid (meters). `border_radius` rounds all corners.
    RoundCuboid {
        half_extents: Vector<f32>,
        border_radius: f32,
    },
}

/// Definition of a static surface body.
///
/// Conventions
/// - Units are meters; `rotation` is an angle in radians.
/// - `id` is a stable unique identifier used to ensure deterministic
///   insertion order when building a world from a batch of defs.
#[derive(Clone, Debug)]
pub struct StaticBodyDef {
    pub id: u32,
    /// World-space translation.
    pub translation: Vector<f32>,
    /// World-space rotation angle (radians).
    pub rotation: f32,
    /// Collider shape parameters.
    pub shape: ShapeDef,
    /// Contact role; floors and one-way platforms participate in grounding.
    pub role: BodyRole,
}

impl StaticBodyDef {
    pub fn floor(id: u32, translation: Vector<f32>, shape: ShapeDef) -> Self {
        Self::with_role(id, translation, shape, BodyRole::Floor)
    }

    pub fn one_way_platform(id: u32, translation: Vector<f32>, shape: ShapeDef) -> Self {
        Self::with_role(id, translation, shape, BodyRole::OneWayPlatform)
    }

    pub fn generic(id: u32, translation: Vector<f32>, shape: ShapeDef) -> Self {
        Self::with_role(id, translation, shape, BodyRole::Generic)
    }

    pub fn with_role(id: u32, translation: Vector<f32>, shape: ShapeDef, role: BodyRole) -> Self {
        Self {
            id,
            translation,
            rotation: 0.0,
            shape,
            role,
        }
    }

    pub fn rotated(mut self, angle: f32) -> Self {
        self.rotation = angle;
        self
    }
}

/// Definition of a character body.
///
/// `identity` must be unique among attached characters; `layer` controls
/// character-vs-character pass-through (same layer never collides).
#[derive(Clone, Debug)]
pub struct CharacterDef {
    pub identity: u32,
    pub layer: u32,
    /// Starting world-space translation.
    pub translation: Vector<f32>,
    /// Collider shape parameters.
    pub shape: ShapeDef,
}

impl CharacterDef {
    pub fn new(identity: u32, layer: u32, translation: Vector<f32>, shape: ShapeDef) -> Self {
        Self {
            identity,
            layer,
            translation,
            shape,
        }
    }
}

/// Build a collider builder for a shape definition.
///
/// The caller attaches `user_data` (the packed [`BodyTag`]) and the parent
/// body; the collider itself is created with identity local transform.
pub fn builder_from_shape(shape: &ShapeDef) -> ColliderBuilder {
    match shape {
        ShapeDef::Cuboid { half_extents } => ColliderBuilder::cuboid(half_extents.x, half_extents.y),

        ShapeDef::Ball { radius } => ColliderBuilder::ball(*radius),

        ShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius),

        ShapeDef::RoundCuboid {
            half_extents,
            border_radius,
        } => ColliderBuilder::round_cuboid(half_extents.x, half_extents.y, *border_radius),
    }
}

/// Build a tagged collider from a static body definition.
pub fn collider_from_def(def: &StaticBodyDef) -> Collider {
    builder_from_shape(&def.shape)
        .user_data(BodyTag::surface(def.role).pack())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_collider_carries_its_role_tag() {
        let def = StaticBodyDef::one_way_platform(
            7,
            Vector::new(0.0, 10.0),
            ShapeDef::Cuboid {
                half_extents: Vector::new(2.0, 0.1),
            },
        );
        let collider = collider_from_def(&def);
        let tag = BodyTag::unpack(collider.user_data);
        assert_eq!(tag.role, BodyRole::OneWayPlatform);
        assert_eq!(tag.identity, 0);
    }
}
