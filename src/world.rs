//! Step scheduler and physics world.
//!
//! [`PlatformWorld`] owns the rapier body/collider sets and runs
//! collision-detection only: no dynamics pipeline, no integration. Each tick
//! it dispatches the contact resolver callbacks in a fixed order:
//!
//! 1. `begin_step` for every attached character, against the contact
//!    constraints retained from the previous tick (the wrapped engine's
//!    persistent constraints, with whatever enabled flags the resolvers left
//!    on them).
//! 2. Collision detection, then a rebuild of the constraint list. A pair that
//!    persists from the previous tick keeps its enabled flag; a pair that
//!    separated is forgotten.
//! 3. `on_contact` for every constraint, for every character.
//!
//! All of this happens synchronously inside [`PlatformWorld::step`], so the
//! single-threaded contract (and the "no detach mid-step" rule) is enforced by
//! the borrow checker: every mutation goes through `&mut self`.
//!
//! The embedding layer applies its own collision response; it can read the
//! resulting constraints (and their enabled flags) through
//! [`PlatformWorld::contacts`].

use std::collections::HashMap;

use rapier2d::na::{Translation2, UnitComplex};
use rapier2d::prelude::*;

use crate::aabb::Aabb;
use crate::contact::{ContactConstraint, ContactSide};
use crate::error::AttachError;
use crate::resolver::{CharacterState, DropThrough};
use crate::settings::CONTACT_PREDICTION;
use crate::shapes::{CharacterDef, StaticBodyDef, builder_from_shape, collider_from_def};
use crate::tag::BodyTag;

/// Handle to an attached character (wraps its identity tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharacterHandle(u32);

impl CharacterHandle {
    #[inline]
    pub fn identity(self) -> u32 {
        self.0
    }
}

struct CharacterEntry {
    state: CharacterState,
    body: RigidBodyHandle,
    collider: ColliderHandle,
}

/// A retained contact: the collider pair key plus the resolver-facing
/// constraint snapshot.
struct WorldContact {
    pair: (ColliderHandle, ColliderHandle),
    constraint: ContactConstraint,
}

/// In-memory rapier structures plus the character registry and retained
/// contacts.
pub struct PlatformWorld {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    pipeline: CollisionPipeline,
    // Removal bookkeeping only; this world runs no dynamics.
    islands: IslandManager,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    characters: Vec<CharacterEntry>,
    contacts: Vec<WorldContact>,
}

impl Default for PlatformWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformWorld {
    pub fn new() -> Self {
        Self {
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            pipeline: CollisionPipeline::new(),
            islands: IslandManager::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            characters: Vec::new(),
            contacts: Vec::new(),
        }
    }

    /// Build a world from a batch of static defs.
    ///
    /// The input is sorted by `id` before insertion so identical inputs build
    /// identical in-memory sets.
    pub fn with_statics(mut defs: Vec<StaticBodyDef>) -> Self {
        defs.sort_by_key(|d| d.id);
        let mut world = Self::new();
        for def in &defs {
            world.add_static(def);
        }
        world
    }

    /// Insert a static surface as a fixed rigid-body + tagged collider.
    pub fn add_static(&mut self, def: &StaticBodyDef) -> ColliderHandle {
        let iso = Isometry::from_parts(
            Translation2::from(def.translation),
            UnitComplex::new(def.rotation),
        );
        let rb = RigidBodyBuilder::fixed().pose(iso).build();
        let rb_handle = self.bodies.insert(rb);
        self.colliders
            .insert_with_parent(collider_from_def(def), rb_handle, &mut self.bodies)
    }

    /// Attach a character body and register it for step dispatch.
    ///
    /// Fails if another attached character already carries `def.identity`;
    /// identity tags are how the resolver recognizes its own side of a
    /// contact, so sharing one is a configuration error.
    pub fn attach_character(&mut self, def: &CharacterDef) -> Result<CharacterHandle, AttachError> {
        if self
            .characters
            .iter()
            .any(|c| c.state.identity() == def.identity)
        {
            return Err(AttachError::ConflictingIdentity {
                identity: def.identity,
            });
        }

        let state = CharacterState::new(def.layer, def.identity);
        let iso = Isometry::from_parts(Translation2::from(def.translation), UnitComplex::identity());
        let body = self.bodies.insert(RigidBodyBuilder::dynamic().pose(iso).build());
        let collider = builder_from_shape(&def.shape)
            .user_data(state.tag().pack())
            .build();
        let collider = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);

        log::debug!("attached character {} on layer {}", def.identity, def.layer);
        self.characters.push(CharacterEntry {
            state,
            body,
            collider,
        });
        Ok(CharacterHandle(def.identity))
    }

    /// Detach a character, removing its body, collider, registration, and any
    /// retained contacts. Must be called between ticks.
    ///
    /// Returns false (with a warning) for an unknown handle.
    pub fn detach_character(&mut self, handle: CharacterHandle) -> bool {
        let Some(idx) = self
            .characters
            .iter()
            .position(|c| c.state.identity() == handle.0)
        else {
            log::warn!("detach of unknown character {}", handle.0);
            return false;
        };
        let entry = self.characters.remove(idx);
        self.bodies.remove(
            entry.body,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.contacts
            .retain(|wc| wc.pair.0 != entry.collider && wc.pair.1 != entry.collider);
        log::debug!("detached character {}", handle.0);
        true
    }

    /// Run one physics tick: step preamble, collision detection, contact
    /// dispatch.
    pub fn step(&mut self) {
        // 1) Step preamble, against the constraints retained from last tick.
        for entry in &mut self.characters {
            entry
                .state
                .begin_step(self.contacts.iter().map(|wc| &wc.constraint));
        }

        // 2) Collision detection only (no dynamics). Updates the broad-phase
        //    BVH and the narrow-phase contact graph.
        let hooks = ();
        let events = ();
        self.pipeline.step(
            CONTACT_PREDICTION,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &hooks,
            &events,
        );

        // Rebuild the constraint list. Persisting pairs keep their enabled
        // flag; separated pairs are forgotten (so a later re-touch starts
        // enabled again).
        let previous: HashMap<(ColliderHandle, ColliderHandle), bool> = self
            .contacts
            .iter()
            .map(|wc| (wc.pair, wc.constraint.enabled))
            .collect();

        let mut fresh: Vec<WorldContact> = Vec::with_capacity(self.contacts.len());
        for pair in self.narrow_phase.contact_pairs() {
            if !pair.has_any_active_contact {
                continue;
            }
            let Some(side1) = self.snapshot(pair.collider1) else {
                continue;
            };
            let Some(side2) = self.snapshot(pair.collider2) else {
                continue;
            };
            let key = pair_key(pair.collider1, pair.collider2);
            let mut constraint = ContactConstraint::new(side1, side2);
            if let Some(&enabled) = previous.get(&key) {
                constraint.enabled = enabled;
            }
            fresh.push(WorldContact {
                pair: key,
                constraint,
            });
        }

        // 3) Narrow-phase dispatch: every constraint visits every character;
        //    the resolver rejects pairs that do not involve it.
        for wc in &mut fresh {
            for entry in &mut self.characters {
                entry.state.on_contact(&mut wc.constraint);
            }
        }

        self.contacts = fresh;
    }

    /// AABB + tag snapshot of one collider.
    fn snapshot(&self, handle: ColliderHandle) -> Option<ContactSide> {
        let collider = self.colliders.get(handle)?;
        Some(ContactSide {
            aabb: collider.compute_aabb().into(),
            tag: BodyTag::unpack(collider.user_data),
        })
    }

    fn entry(&self, handle: CharacterHandle) -> Option<&CharacterEntry> {
        self.characters
            .iter()
            .find(|c| c.state.identity() == handle.0)
    }

    fn entry_mut(&mut self, handle: CharacterHandle) -> Option<&mut CharacterEntry> {
        self.characters
            .iter_mut()
            .find(|c| c.state.identity() == handle.0)
    }

    /// True while the character's dominant enabled contact is a floor.
    pub fn is_on_floor(&self, handle: CharacterHandle) -> bool {
        self.entry(handle).is_some_and(|e| e.state.is_on_floor())
    }

    pub fn is_on_ceiling(&self, handle: CharacterHandle) -> bool {
        self.entry(handle).is_some_and(|e| e.state.is_on_ceiling())
    }

    pub fn is_on_wall(&self, handle: CharacterHandle) -> bool {
        self.entry(handle).is_some_and(|e| e.state.is_on_wall())
    }

    /// Activate the character's drop-through request (e.g. "down" pressed).
    pub fn request_drop_through(&mut self, handle: CharacterHandle) {
        if let Some(e) = self.entry_mut(handle) {
            e.state.request_drop_through();
        }
    }

    /// Deactivate the drop-through request ("down" released), re-arming it.
    pub fn release_drop_through(&mut self, handle: CharacterHandle) {
        if let Some(e) = self.entry_mut(handle) {
            e.state.release_drop_through();
        }
    }

    pub fn drop_through(&self, handle: CharacterHandle) -> Option<DropThrough> {
        self.entry(handle).map(|e| e.state.drop_through())
    }

    pub fn layer(&self, handle: CharacterHandle) -> Option<u32> {
        self.entry(handle).map(|e| e.state.layer())
    }

    /// Move the character to another collision layer. Takes effect on the
    /// next tick (contact snapshots re-read the tag each step).
    pub fn set_layer(&mut self, handle: CharacterHandle, layer: u32) {
        let Some(idx) = self
            .characters
            .iter()
            .position(|c| c.state.identity() == handle.0)
        else {
            return;
        };
        let entry = &mut self.characters[idx];
        entry.state.set_layer(layer);
        if let Some(collider) = self.colliders.get_mut(entry.collider) {
            collider.user_data = entry.state.tag().pack();
        }
    }

    pub fn character_collider(&self, handle: CharacterHandle) -> Option<ColliderHandle> {
        self.entry(handle).map(|e| e.collider)
    }

    pub fn character_translation(&self, handle: CharacterHandle) -> Option<Vector<f32>> {
        let entry = self.entry(handle)?;
        self.bodies.get(entry.body).map(|b| *b.translation())
    }

    /// Teleport the character; the embedding layer owns actual movement since
    /// this world integrates nothing.
    ///
    /// The new pose is written to the collider as well as the body. The
    /// collision pipeline only re-reads poses of colliders marked modified, so
    /// a body-only update would leave the collider (and every later tick's
    /// contacts) frozen at the old position.
    pub fn set_character_translation(&mut self, handle: CharacterHandle, translation: Vector<f32>) {
        let Some(entry) = self.entry(handle) else {
            return;
        };
        let (body, collider) = (entry.body, entry.collider);
        if let Some(b) = self.bodies.get_mut(body) {
            b.set_translation(translation, true);
        }
        if let Some(c) = self.colliders.get_mut(collider) {
            c.set_translation(translation);
        }
    }

    /// World-space AABB of the character's collider, recomputed on query.
    pub fn character_aabb(&self, handle: CharacterHandle) -> Option<Aabb> {
        let entry = self.entry(handle)?;
        self.snapshot(entry.collider).map(|side| side.aabb)
    }

    /// The constraints retained from the last dispatch, with the enabled
    /// flags the resolvers left on them. The embedding layer reads these to
    /// apply its own collision response.
    pub fn contacts(&self) -> impl Iterator<Item = &ContactConstraint> {
        self.contacts.iter().map(|wc| &wc.constraint)
    }

    /// Enabled flag of the retained constraint between two colliders, if they
    /// are currently in contact.
    pub fn contact_enabled(&self, a: ColliderHandle, b: ColliderHandle) -> Option<bool> {
        let key = pair_key(a, b);
        self.contacts
            .iter()
            .find(|wc| wc.pair == key)
            .map(|wc| wc.constraint.enabled)
    }
}

/// Order-independent pair key.
fn pair_key(a: ColliderHandle, b: ColliderHandle) -> (ColliderHandle, ColliderHandle) {
    if a.into_raw_parts() <= b.into_raw_parts() {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapeDef;

    fn slab(half_x: f32, half_y: f32) -> ShapeDef {
        ShapeDef::Cuboid {
            half_extents: Vector::new(half_x, half_y),
        }
    }

    /// Floor slab with top edge at y = 0.
    fn floor_def() -> StaticBodyDef {
        StaticBodyDef::floor(1, Vector::new(0.0, -0.5), slab(5.0, 0.5))
    }

    /// Character cuboid standing on the floor with a slight overlap, well
    /// inside the grounding epsilon.
    fn standing_character(identity: u32) -> CharacterDef {
        CharacterDef::new(identity, 0, Vector::new(0.0, 0.495), slab(0.5, 0.5))
    }

    /// The partner of `collider` in the world's single retained contact.
    fn other_collider(world: &PlatformWorld, collider: ColliderHandle) -> ColliderHandle {
        let wc = world.contacts.first().expect("a retained contact");
        if wc.pair.0 == collider {
            wc.pair.1
        } else {
            wc.pair.0
        }
    }

    #[test]
    fn duplicate_identity_is_rejected_at_attach() {
        let mut world = PlatformWorld::new();
        let a = standing_character(1);
        let mut b = standing_character(1);
        b.translation = Vector::new(3.0, 0.495);

        world.attach_character(&a).unwrap();
        let err = world.attach_character(&b).unwrap_err();
        assert_eq!(err, AttachError::ConflictingIdentity { identity: 1 });
    }

    #[test]
    fn character_on_floor_is_grounded_after_one_step() {
        let mut world = PlatformWorld::with_statics(vec![floor_def()]);
        let handle = world.attach_character(&standing_character(1)).unwrap();

        world.step();

        assert!(world.is_on_floor(handle));
        assert!(!world.is_on_ceiling(handle));
        assert!(!world.is_on_wall(handle));
    }

    #[test]
    fn grounding_clears_after_leaving_the_floor() {
        let mut world = PlatformWorld::with_statics(vec![floor_def()]);
        let handle = world.attach_character(&standing_character(1)).unwrap();
        world.step();
        assert!(world.is_on_floor(handle));

        world.set_character_translation(handle, Vector::new(0.0, 5.0));
        // The separation tick still sees last tick's supporting constraint in
        // its preamble; the flag clears on the following preamble.
        world.step();
        world.step();

        assert!(!world.is_on_floor(handle));
        assert!(!world.is_on_ceiling(handle));
        assert!(!world.is_on_wall(handle));
    }

    #[test]
    fn teleport_moves_the_collider_and_sheds_contacts() {
        let mut world = PlatformWorld::with_statics(vec![floor_def()]);
        let handle = world.attach_character(&standing_character(1)).unwrap();
        world.step();
        assert!(world.is_on_floor(handle));

        world.set_character_translation(handle, Vector::new(0.0, 5.0));
        let aabb = world.character_aabb(handle).unwrap();
        assert!((aabb.min.y - 4.5).abs() < 1.0e-4);

        // The moved pose must reach collision detection: the floor pair
        // separates and stays separated on every later tick.
        world.step();
        assert_eq!(world.contacts().count(), 0);
        for _ in 0..4 {
            world.step();
            assert_eq!(world.contacts().count(), 0);
            assert!(!world.is_on_floor(handle));
        }
    }

    #[test]
    fn one_way_platform_from_below_is_disabled_and_stays_disabled() {
        // Platform slab with AABB y in [10.0, 10.2].
        let platform = StaticBodyDef::one_way_platform(1, Vector::new(0.0, 10.1), slab(2.0, 0.1));
        let mut world = PlatformWorld::with_statics(vec![platform]);

        // Character overlapping the platform from below: bottom at 9.65.
        let character = CharacterDef::new(1, 0, Vector::new(0.0, 10.15), slab(0.5, 0.5));
        let handle = world.attach_character(&character).unwrap();
        let char_collider = world.character_collider(handle).unwrap();

        world.step();

        let platform_collider = other_collider(&world, char_collider);
        assert_eq!(
            world.contact_enabled(char_collider, platform_collider),
            Some(false)
        );
        assert!(!world.is_on_floor(handle));

        // Still overlapping next tick: the pair persists, so it stays
        // disabled even though the character's bottom has risen above the
        // platform's bottom edge.
        world.set_character_translation(handle, Vector::new(0.0, 10.55));
        world.step();
        assert_eq!(
            world.contact_enabled(char_collider, platform_collider),
            Some(false)
        );
    }

    #[test]
    fn drop_through_disables_the_standing_contact() {
        let platform = StaticBodyDef::one_way_platform(1, Vector::new(0.0, 10.1), slab(2.0, 0.1));
        let mut world = PlatformWorld::with_statics(vec![platform]);

        // Standing on top with a slight overlap: bottom at 10.195.
        let character = CharacterDef::new(1, 0, Vector::new(0.0, 10.695), slab(0.5, 0.5));
        let handle = world.attach_character(&character).unwrap();
        let char_collider = world.character_collider(handle).unwrap();

        world.step();
        assert!(world.is_on_floor(handle));
        let platform_collider = other_collider(&world, char_collider);
        assert_eq!(
            world.contact_enabled(char_collider, platform_collider),
            Some(true)
        );

        world.request_drop_through(handle);
        world.step();

        assert_eq!(
            world.contact_enabled(char_collider, platform_collider),
            Some(false)
        );
        assert_eq!(world.drop_through(handle), Some(DropThrough::ActiveHandled));

        // The stale floor flag clears on the next preamble.
        world.step();
        assert!(!world.is_on_floor(handle));
    }

    #[test]
    fn same_layer_characters_do_not_ground_on_each_other() {
        let mut world = PlatformWorld::new();
        let a = CharacterDef::new(1, 5, Vector::new(0.0, 0.0), slab(0.5, 0.5));
        let b = CharacterDef::new(2, 5, Vector::new(0.4, 0.0), slab(0.5, 0.5));
        let ha = world.attach_character(&a).unwrap();
        let hb = world.attach_character(&b).unwrap();
        let ca = world.character_collider(ha).unwrap();
        let cb = world.character_collider(hb).unwrap();

        world.step();

        assert_eq!(world.contact_enabled(ca, cb), Some(false));
        assert!(!world.is_on_wall(ha));
        assert!(!world.is_on_wall(hb));
    }

    #[test]
    fn detach_removes_registration_and_contacts() {
        let mut world = PlatformWorld::with_statics(vec![floor_def()]);
        let handle = world.attach_character(&standing_character(1)).unwrap();
        world.step();
        assert!(world.is_on_floor(handle));

        assert!(world.detach_character(handle));
        assert!(!world.is_on_floor(handle));
        assert_eq!(world.contacts().count(), 0);

        // The identity is free again.
        world.attach_character(&standing_character(1)).unwrap();
    }

    #[test]
    fn set_layer_updates_state_and_tag() {
        let mut world = PlatformWorld::new();
        let handle = world.attach_character(&standing_character(1)).unwrap();
        assert_eq!(world.layer(handle), Some(0));

        world.set_layer(handle, 9);
        assert_eq!(world.layer(handle), Some(9));

        let collider = world.character_collider(handle).unwrap();
        let tag = BodyTag::unpack(world.colliders.get(collider).unwrap().user_data);
        assert_eq!(tag.layer, 9);
        assert_eq!(tag.identity, 1);
    }
}
