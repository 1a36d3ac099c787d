use thiserror::Error;

/// Errors surfaced when attaching a character to a world.
///
/// These are configuration-time programmer errors, validated once at attach
/// and never checked again in the per-step path.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AttachError {
    /// Two character bodies may not share one identity tag.
    #[error("a character with identity tag {identity} is already attached")]
    ConflictingIdentity { identity: u32 },
}
