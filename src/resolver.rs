//! Character contact resolution.
//!
//! This is the algorithmic heart of the crate: per-step classification of a
//! character's contact state (floor/ceiling/wall) and the selective disabling
//! of contact constraints against one-way platforms and same-layer characters.
//!
//! Call order per physics tick, on the simulation thread:
//! 1. [`CharacterState::begin_step`] once, against the contacts retained from
//!    the previous tick.
//! 2. [`CharacterState::on_contact`] once per contact pair discovered this
//!    tick, for every pair in the world (pairs not involving this character
//!    are rejected cheaply).
//!
//! The state is not synchronized; the world dispatches all calls from a single
//! thread.

use crate::contact::{ContactConstraint, ContactSide};
use crate::flags::{BitmaskFlags, FlagBitmask};
use crate::settings::GROUND_EPSILON;
use crate::tag::{BodyRole, BodyTag};

/// Grounding state flags derived each step from enabled contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GroundFlag {
    OnFloor = 0,
    OnCeiling = 1,
    OnWall = 2,
}

impl FlagBitmask for GroundFlag {
    type Storage = u8;

    fn bit_index(&self) -> u8 {
        *self as u8
    }
}

/// Drop-through request state.
///
/// The resolver only ever moves `ActiveUnhandled -> ActiveHandled` (when a
/// disable decision consumes the request). Returning to `Inactive` is the
/// input layer's responsibility via [`DropThrough::release`] (key-up), which
/// re-arms the next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropThrough {
    #[default]
    Inactive,
    ActiveUnhandled,
    ActiveHandled,
}

impl DropThrough {
    /// Activates the request. Idempotent while already active: re-arming
    /// requires a `release` first.
    pub fn request(&mut self) {
        if *self == DropThrough::Inactive {
            *self = DropThrough::ActiveUnhandled;
        }
    }

    /// Deactivates the request (external "released" signal).
    pub fn release(&mut self) {
        *self = DropThrough::Inactive;
    }

    /// Consumes an active request. No-op while inactive.
    pub fn mark_handled(&mut self) {
        if *self != DropThrough::Inactive {
            *self = DropThrough::ActiveHandled;
        }
    }

    /// True when a request is pending and not yet consumed.
    #[inline]
    pub fn is_armed(self) -> bool {
        self == DropThrough::ActiveUnhandled
    }
}

/// Resolver state for one character body.
///
/// Owned by the world; flags are mutated only during step dispatch and read by
/// the game-logic layer between ticks.
#[derive(Debug, Clone, Copy)]
pub struct CharacterState {
    tag: BodyTag,
    flags: BitmaskFlags<u8>,
    drop_through: DropThrough,
}

impl CharacterState {
    pub fn new(layer: u32, identity: u32) -> Self {
        Self {
            tag: BodyTag::character(layer, identity),
            flags: BitmaskFlags::new(),
            drop_through: DropThrough::Inactive,
        }
    }

    #[inline]
    pub fn tag(&self) -> BodyTag {
        self.tag
    }

    #[inline]
    pub fn identity(&self) -> u32 {
        self.tag.identity
    }

    #[inline]
    pub fn layer(&self) -> u32 {
        self.tag.layer
    }

    pub fn set_layer(&mut self, layer: u32) {
        self.tag.layer = layer;
    }

    #[inline]
    pub fn is_on_floor(&self) -> bool {
        self.flags.contains(GroundFlag::OnFloor)
    }

    #[inline]
    pub fn is_on_ceiling(&self) -> bool {
        self.flags.contains(GroundFlag::OnCeiling)
    }

    #[inline]
    pub fn is_on_wall(&self) -> bool {
        self.flags.contains(GroundFlag::OnWall)
    }

    #[inline]
    pub fn drop_through(&self) -> DropThrough {
        self.drop_through
    }

    /// Activates the drop-through request (e.g. bound to a "down" input).
    pub fn request_drop_through(&mut self) {
        self.drop_through.request();
    }

    /// Deactivates the drop-through request (key-up), re-arming it.
    pub fn release_drop_through(&mut self) {
        self.drop_through.release();
    }

    /// Step preamble: clears stale grounding state.
    ///
    /// Inspects the character's current contacts (as retained from the
    /// previous dispatch); if none is both enabled and against a floor or
    /// one-way-platform body, all three flags are cleared. Idempotent: the
    /// outcome is a pure function of the contact set passed in.
    pub fn begin_step<'a, I>(&mut self, contacts: I)
    where
        I: IntoIterator<Item = &'a ContactConstraint>,
    {
        let supported = contacts.into_iter().any(|cc| {
            cc.enabled
                && cc.sides_for(self.tag.identity).is_some_and(|(_, other)| {
                    matches!(other.tag.role, BodyRole::Floor | BodyRole::OneWayPlatform)
                })
        });
        if !supported {
            self.flags.clear_all();
        }
    }

    /// Per-contact resolution: one-way disabling, same-layer character
    /// pass-through, and grounding classification.
    ///
    /// Safe to call for every contact in the world; pairs not involving this
    /// character are ignored.
    pub fn on_contact(&mut self, contact: &mut ContactConstraint) {
        let Some((character, other)) = contact.sides_for(self.tag.identity) else {
            return;
        };

        match other.tag.role {
            BodyRole::Generic => return,
            BodyRole::Character => {
                // Two characters on the same layer pass through each other.
                // No grounding classification between characters.
                if other.tag.layer == self.tag.layer {
                    contact.enabled = false;
                }
                return;
            }
            BodyRole::OneWayPlatform => {
                if allow_one_way_up(&character, &other) || self.drop_through.is_armed() {
                    contact.enabled = false;
                    self.drop_through.mark_handled();
                }
            }
            BodyRole::Floor => {}
        }

        if contact.enabled {
            self.classify_grounding(&character, &other);
        }
    }

    /// Classifies an enabled grounding contact by vertical AABB separation.
    ///
    /// Floor takes priority over ceiling and wall for the rest of the step: a
    /// character cannot be floor+ceiling or floor+wall after one pass.
    fn classify_grounding(&mut self, character: &ContactSide, other: &ContactSide) {
        if (character.aabb.min.y - other.aabb.max.y).abs() < GROUND_EPSILON {
            self.flags.set(GroundFlag::OnFloor);
            self.flags.clear(GroundFlag::OnCeiling);
            self.flags.clear(GroundFlag::OnWall);
        } else if self.flags.contains(GroundFlag::OnFloor) {
            // Floor already found this step; later contacts cannot demote it.
        } else if (other.aabb.min.y - character.aabb.max.y).abs() < GROUND_EPSILON {
            self.flags.set(GroundFlag::OnCeiling);
            self.flags.clear(GroundFlag::OnWall);
        } else {
            self.flags.set(GroundFlag::OnWall);
            self.flags.clear(GroundFlag::OnCeiling);
        }
    }
}

/// True when the character approaches the platform from below: its AABB
/// bottom is strictly below the platform's AABB bottom.
///
/// The disable decision made on first touch persists for the life of the
/// contact pair, so a character jumping up through the platform passes cleanly
/// while one standing on top (bottom at the platform's top edge) keeps the
/// contact solid.
#[inline]
fn allow_one_way_up(character: &ContactSide, platform: &ContactSide) -> bool {
    character.aabb.min.y < platform.aabb.min.y
}
