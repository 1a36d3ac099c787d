use nalgebra as na;
use rapier2d::geometry::Aabb as ColliderAabb;

/// Common math aliases for clarity and consistency.
pub type Vec2 = na::Vector2<f32>;
pub type Point2 = na::Point2<f32>;

/// An axis-aligned bounding box defined by minimum and maximum corners.
///
/// All vertical-proximity tests in the contact resolver go through this type.
/// It is a snapshot: the world recomputes it from the collider shape and pose
/// whenever a contact is inspected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner (smallest x, y values).
    pub min: Point2,
    /// Maximum corner (largest x, y values).
    pub max: Point2,
}

impl Aabb {
    /// Creates an AABB from minimum and maximum corners.
    #[inline]
    pub const fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// Creates an AABB from a center point and half-extents.
    #[inline]
    pub fn from_center_half_extents(center: Point2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Returns the center of the AABB.
    #[inline]
    pub fn center(self) -> Point2 {
        na::center(&self.min, &self.max)
    }

    /// Returns the half-extents (half the size in each dimension).
    #[inline]
    pub fn half_extents(self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    /// Returns true if this AABB overlaps another AABB (touching counts).
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

impl From<ColliderAabb> for Aabb {
    #[inline]
    fn from(aabb: ColliderAabb) -> Self {
        Self {
            min: aabb.mins,
            max: aabb.maxs,
        }
    }
}
