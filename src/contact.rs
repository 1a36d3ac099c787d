//! Ephemeral contact constraints.
//!
//! A [`ContactConstraint`] is the resolver-facing snapshot of one narrow-phase
//! pair: both bodies' AABBs and tags plus a mutable `enabled` flag. The world
//! rebuilds these each step, carrying the `enabled` flag over for as long as
//! the pair stays in contact, which matches the wrapped engine's persistent
//! contact constraints: a disabled one-way contact stays disabled until the
//! bodies separate.

use crate::aabb::Aabb;
use crate::tag::{BodyRole, BodyTag};

/// One side of a contact: the body's AABB and tag at snapshot time.
#[derive(Debug, Clone, Copy)]
pub struct ContactSide {
    pub aabb: Aabb,
    pub tag: BodyTag,
}

/// A contact pair with its constraint-enabled flag.
///
/// The resolver only reads the sides and writes `enabled`; it never owns the
/// constraint.
#[derive(Debug, Clone, Copy)]
pub struct ContactConstraint {
    pub side1: ContactSide,
    pub side2: ContactSide,
    pub enabled: bool,
}

impl ContactConstraint {
    /// A freshly discovered contact starts enabled.
    #[inline]
    pub fn new(side1: ContactSide, side2: ContactSide) -> Self {
        Self {
            side1,
            side2,
            enabled: true,
        }
    }

    /// If exactly one side is the character with `identity`, returns
    /// `(character_side, other_side)`.
    ///
    /// Returns `None` for pairs not involving that character, which is the
    /// cheap-reject path for world-wide contact dispatch.
    #[inline]
    pub fn sides_for(&self, identity: u32) -> Option<(ContactSide, ContactSide)> {
        let is_char = |side: &ContactSide| {
            side.tag.role == BodyRole::Character && side.tag.identity == identity
        };
        match (is_char(&self.side1), is_char(&self.side2)) {
            (true, false) => Some((self.side1, self.side2)),
            (false, true) => Some((self.side2, self.side1)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aabb::Point2;

    fn side(role: BodyRole, identity: u32) -> ContactSide {
        ContactSide {
            aabb: Aabb::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)),
            tag: BodyTag::new(role, 0, identity),
        }
    }

    #[test]
    fn sides_for_orients_the_character_first() {
        let cc = ContactConstraint::new(side(BodyRole::Floor, 0), side(BodyRole::Character, 9));
        let (character, other) = cc.sides_for(9).unwrap();
        assert_eq!(character.tag.role, BodyRole::Character);
        assert_eq!(other.tag.role, BodyRole::Floor);
    }

    #[test]
    fn sides_for_rejects_unrelated_pairs() {
        let cc = ContactConstraint::new(side(BodyRole::Floor, 0), side(BodyRole::Generic, 0));
        assert!(cc.sides_for(9).is_none());

        // A different character's contact is also not ours.
        let cc = ContactConstraint::new(side(BodyRole::Character, 3), side(BodyRole::Floor, 0));
        assert!(cc.sides_for(9).is_none());
    }
}
