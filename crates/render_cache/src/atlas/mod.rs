//! Glyph atlas pool
//!
//! Small bitmaps are packed into a few large shared surfaces instead of one
//! surface each:
//! - [`ShelfPacker`]: free-space tracking inside one atlas
//! - [`SurfaceAtlas`]: a backing surface plus its packer
//! - [`SurfaceAtlasSet`]: bounded, shareable pool of atlases with eviction

pub mod atlas_set;
pub mod packer;
pub mod surface_atlas;

pub use atlas_set::{AtlasSetStats, AtlasSize, AtlasSlot, SurfaceAtlasSet};
pub use packer::{PackedRect, ShelfPacker};
pub use surface_atlas::SurfaceAtlas;
