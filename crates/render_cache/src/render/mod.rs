//! Rendering capabilities consumed by the cache layer
//!
//! The traits here are the seam between cache bookkeeping and the host's
//! graphics backend:
//! - [`Surface`]: owned pixel buffer with a destroyed state
//! - [`Renderer`]: drawing context bound to a surface or to the screen
//! - [`ResourceFactory`]: creates cleared surfaces on demand
//! - [`Camera`]: view transform plus the identity used for cache validity

pub mod backends;
pub mod camera;
pub mod error;
pub mod renderer;
pub mod surface;

pub use camera::{Camera, CameraId};
pub use error::{CacheError, CacheResult};
pub use renderer::Renderer;
pub use surface::{ResourceFactory, Surface, SurfaceId};
