//! Surface and resource factory capabilities
//!
//! A [`Surface`] is an owned 2D pixel buffer supplied by the host backend.
//! The cache layer never touches pixels itself; it only asks a surface for a
//! [`Renderer`] and hands surfaces to other renderers as blit sources.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::error::CacheResult;
use super::renderer::Renderer;

/// Identity of a surface instance
///
/// Two surfaces with identical dimensions are still different surfaces;
/// comparing ids is how callers tell a reused cache from a reallocated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    /// Allocate a process-unique id
    pub fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host-provided pixel buffer.
///
/// Once destroyed, a surface must refuse to hand out a renderer. Destroying
/// twice is a no-op.
pub trait Surface: fmt::Debug {
    /// Identity of this surface
    fn id(&self) -> SurfaceId;

    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// Whether [`Surface::destroy`] has been called
    fn destroyed(&self) -> bool;

    /// Release the backing storage
    fn destroy(&mut self);

    /// Drawing context bound to this surface
    ///
    /// # Errors
    /// [`CacheError::SurfaceDestroyed`](super::CacheError::SurfaceDestroyed)
    /// once the surface has been destroyed.
    fn renderer(&mut self) -> CacheResult<&mut dyn Renderer>;

    /// Backend-specific access, for hosts that need their concrete surface type
    fn as_any(&self) -> &dyn Any;
}

/// Creates surfaces on behalf of caches and atlases.
///
/// Surfaces must be returned in a cleared state.
pub trait ResourceFactory {
    /// Create a new surface of the given size
    fn create_surface(&self, width: u32, height: u32) -> Box<dyn Surface>;
}
