//! Error types shared by the cache, atlas and glyph layers

use super::surface::SurfaceId;

/// Result type for render cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors raised by surface caches and atlas allocation
///
/// Allocation failures ([`CacheError::SizeExceeded`],
/// [`CacheError::CapacityExhausted`]) are meant to be handled by the immediate
/// caller, which should fall back to drawing uncached content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// Requested slot is empty or larger than the largest atlas allowed
    #[error("requested slot {width}x{height} is outside 1x1..={max_width}x{max_height}")]
    SizeExceeded {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Configured maximum atlas width
        max_width: u32,
        /// Configured maximum atlas height
        max_height: u32,
    },

    /// Eviction could not free enough contiguous space
    #[error("no room for a {width}x{height} slot in {max_atlas_num} atlases after eviction")]
    CapacityExhausted {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Configured maximum atlas count
        max_atlas_num: usize,
    },

    /// A value of the wrong shape was supplied where a live surface was expected
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Name of the expected type
        expected: &'static str,
        /// Description of the supplied value
        actual: String,
    },

    /// Drawing or reading through a surface that has been destroyed
    #[error("surface {0} has been destroyed")]
    SurfaceDestroyed(SurfaceId),
}
