//! Body role tags.
//!
//! Every collider carries a [`BodyTag`] packed into its `user_data` word. The
//! resolver classifies contact partners by direct enum comparison on the
//! unpacked role, never by identity comparison on opaque data.

/// Role of a body in contact resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BodyRole {
    /// No special contact handling; skipped silently by the resolver.
    Generic = 0,
    /// A player/NPC body tracked by a contact resolver.
    Character = 1,
    /// A grounding surface; always solid.
    Floor = 2,
    /// A drop-through platform; solid only for characters standing on top.
    OneWayPlatform = 3,
}

/// Per-body tag data: role, collision layer, and (for characters) a unique
/// identity.
///
/// - `layer` partitions character bodies: two characters on the same layer
///   never collide with each other.
/// - `identity` distinguishes character bodies from one another; it must be
///   unique among attached characters (validated at attach time) and is zero
///   for non-character bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyTag {
    pub role: BodyRole,
    pub layer: u32,
    pub identity: u32,
}

impl BodyTag {
    #[inline]
    pub const fn new(role: BodyRole, layer: u32, identity: u32) -> Self {
        Self {
            role,
            layer,
            identity,
        }
    }

    /// Tag for a character body.
    #[inline]
    pub const fn character(layer: u32, identity: u32) -> Self {
        Self::new(BodyRole::Character, layer, identity)
    }

    /// Tag for a static surface body (floor, one-way platform, or generic).
    #[inline]
    pub const fn surface(role: BodyRole) -> Self {
        Self::new(role, 0, 0)
    }

    /// Packs the tag into a collider `user_data` word.
    ///
    /// Layout (low to high): role byte, layer u32, identity u32. The upper
    /// bits stay zero, so an untagged collider (`user_data == 0`) unpacks to a
    /// `Generic` tag.
    #[inline]
    pub fn pack(self) -> u128 {
        (self.role as u128) | ((self.layer as u128) << 8) | ((self.identity as u128) << 40)
    }

    /// Unpacks a tag from a collider `user_data` word.
    ///
    /// Unknown role bytes decode to `Generic`: foreign user data is treated as
    /// an untagged body, not an error.
    #[inline]
    pub fn unpack(word: u128) -> Self {
        let role = match (word & 0xff) as u8 {
            1 => BodyRole::Character,
            2 => BodyRole::Floor,
            3 => BodyRole::OneWayPlatform,
            _ => BodyRole::Generic,
        };
        Self {
            role,
            layer: ((word >> 8) & 0xffff_ffff) as u32,
            identity: ((word >> 40) & 0xffff_ffff) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_round_trips() {
        let samples = [
            BodyTag::character(0, 1),
            BodyTag::character(7, u32::MAX),
            BodyTag::new(BodyRole::Character, u32::MAX, 42),
            BodyTag::surface(BodyRole::Floor),
            BodyTag::surface(BodyRole::OneWayPlatform),
            BodyTag::surface(BodyRole::Generic),
        ];
        for tag in samples {
            assert_eq!(BodyTag::unpack(tag.pack()), tag);
        }
    }

    #[test]
    fn zero_word_is_generic() {
        let tag = BodyTag::unpack(0);
        assert_eq!(tag.role, BodyRole::Generic);
        assert_eq!(tag.layer, 0);
        assert_eq!(tag.identity, 0);
    }

    #[test]
    fn unknown_role_byte_is_generic() {
        let tag = BodyTag::unpack(0xfe);
        assert_eq!(tag.role, BodyRole::Generic);
    }
}
