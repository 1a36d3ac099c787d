/*!
Tolerances for contact classification.

These constants centralize the parameters used by the character contact
resolver and the world step. Keeping them together makes tuning easier and
helps ensure deterministic behavior across platforms.

Notes
- Distances are in world units (meters).
- Favor practical world-space tolerances over machine epsilon for robust behavior.
*/

/// Vertical proximity under which two AABB edges count as "touching" (meters).
///
/// Floor and ceiling tests compare with strict `<` against this value, so the
/// exact-epsilon boundary behaves the same for both tests.
pub const GROUND_EPSILON: f32 = 0.01;

/// Contact prediction distance passed to the collision pipeline (meters).
///
/// Zero means only genuinely touching/overlapping pairs produce contacts.
pub const CONTACT_PREDICTION: f32 = 0.0;

/// Number of segments used to approximate one full circle in debug outlines.
pub const OUTLINE_CIRCLE_SEGMENTS: u32 = 16;
