//! Cacheable entities
//!
//! - [`EntityCore`]: geometry, transform and change notification
//! - [`CacheableEntity`]: an entity that renders through a private bitmap cache
//! - [`Label`]: cached single-line text

pub mod cacheable;
pub mod core;
pub mod label;
pub mod state;

pub use cacheable::{CacheContent, CacheableEntity};
pub use self::core::{EntityCore, EntityId, ModifiedSink};
pub use label::{Label, LabelContent};
pub use state::EntityStateFlags;
