//! # Render Cache
//!
//! Bitmap caching for 2D scene entities and a bounded glyph atlas pool.
//!
//! ## Features
//!
//! - **Cacheable entities**: paint once into a private surface, blit every frame
//! - **Camera-aware invalidation**: a cache filled for one camera is refilled for another
//! - **Glyph atlases**: shelf-packed shared surfaces with usage-based eviction
//! - **Shared pools**: several fonts can pack into one owner-controlled atlas set
//! - **Backend agnostic**: drawing goes through the [`Renderer`](render::Renderer) and
//!   [`Surface`](render::Surface) traits; a headless recording backend is included
//!
//! ## Quick Start
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use render_cache::prelude::*;
//! use render_cache::render::backends::{
//!     HeadlessGlyphFactory, HeadlessRenderer, HeadlessResourceFactory,
//! };
//!
//! let config = RenderCacheConfig::default();
//! let resources: Rc<dyn ResourceFactory> = Rc::new(HeadlessResourceFactory::new());
//! let font = DynamicFont::with_atlas_config(
//!     Box::new(HeadlessGlyphFactory::new(16.0)),
//!     config.atlas.clone(),
//!     resources.clone(),
//! )?;
//!
//! let mut label = Label::new("score: 0", Rc::new(RefCell::new(font)), resources, &config.entity);
//! let camera = Camera::new(800.0, 600.0);
//! let mut frame = HeadlessRenderer::new();
//!
//! label.render(&mut frame, Some(&camera));
//! label.render(&mut frame, Some(&camera));
//! assert_eq!(frame.draw_image_count(), 2);
//! # Ok::<(), ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;

pub mod atlas;
pub mod config;
pub mod entity;
pub mod foundation;
pub mod render;
pub mod text;

#[cfg(test)]
mod tests;

/// Common imports for render cache users
pub mod prelude {
    pub use crate::{
        atlas::{AtlasSetStats, AtlasSize, AtlasSlot, SurfaceAtlasSet},
        core::{Config, ConfigError, EntityCacheConfig, RenderCacheConfig, SurfaceAtlasSetConfig},
        entity::{CacheContent, CacheableEntity, EntityCore, EntityId, EntityStateFlags, Label},
        foundation::{
            collections::AtlasSlotKey,
            math::{CommonOffset, CommonRect, Matrix},
        },
        render::{
            CacheError, CacheResult, Camera, CameraId, Renderer, ResourceFactory, Surface,
            SurfaceId,
        },
        text::{DynamicFont, Glyph, GlyphBitmapInfo, GlyphFactory},
    };
}
