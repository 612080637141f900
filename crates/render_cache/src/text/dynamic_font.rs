//! Glyph cache backed by a shared atlas pool
//!
//! Glyphs are rasterized on first use into a slot of a [`SurfaceAtlasSet`].
//! The pool may evict a glyph's slot at any allocation, so every lookup
//! checks the slot handle and re-rasterizes evicted glyphs.

use std::collections::HashMap;
use std::rc::Rc;

use crate::atlas::SurfaceAtlasSet;
use crate::core::config::{ConfigError, SurfaceAtlasSetConfig};
use crate::foundation::collections::AtlasSlotKey;
use crate::render::ResourceFactory;

use super::glyph::{Glyph, GlyphFactory};

/// Width and height of a run of text
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextExtent {
    /// Sum of the glyph advances
    pub width: f64,
    /// Line height
    pub height: f64,
}

/// Per-font glyph cache
///
/// Glyph recency is measured in frames of the atlas pool. The host advances
/// it with [`SurfaceAtlasSet::tick`] once per frame, through
/// [`DynamicFont::atlases`] or any handle to the same pool; until then
/// eviction ranks glyphs by use count alone.
pub struct DynamicFont {
    factory: Box<dyn GlyphFactory>,
    atlases: SurfaceAtlasSet,
    glyphs: HashMap<char, Glyph>,
    destroyed: bool,
}

impl DynamicFont {
    /// Create a font drawing into `atlases`.
    ///
    /// Pass an owning set to give the font its own atlases, or a handle from
    /// [`SurfaceAtlasSet::share`] to pack several fonts into one pool.
    pub fn new(factory: Box<dyn GlyphFactory>, atlases: SurfaceAtlasSet) -> Self {
        let ownership = if atlases.is_owner() {
            "an owned"
        } else {
            "a shared"
        };
        log::debug!("Font {}px using {} atlas set", factory.font_size(), ownership);
        Self {
            factory,
            atlases,
            glyphs: HashMap::new(),
            destroyed: false,
        }
    }

    /// Create a font with a private atlas set
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] if the atlas configuration does not validate.
    pub fn with_atlas_config(
        factory: Box<dyn GlyphFactory>,
        config: SurfaceAtlasSetConfig,
        resources: Rc<dyn ResourceFactory>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(factory, SurfaceAtlasSet::new(config, resources)?))
    }

    /// Atlas pool holding this font's glyphs
    pub fn atlases(&self) -> &SurfaceAtlasSet {
        &self.atlases
    }

    /// Rasterizer behind this font
    pub fn factory(&self) -> &dyn GlyphFactory {
        self.factory.as_ref()
    }

    /// Number of glyphs with cached metrics
    pub fn cached_glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Look up a glyph, rasterizing it into the atlas pool if needed.
    ///
    /// Returns `None` only after [`DynamicFont::destroy`]. A glyph that
    /// could not get an atlas slot is returned without one and will be
    /// retried on the next lookup.
    pub fn glyph_for_character(&mut self, code: char) -> Option<Glyph> {
        if self.destroyed {
            return None;
        }

        if let Some(glyph) = self.glyphs.get(&code) {
            if glyph.is_empty() || glyph.is_surface_valid(&self.atlases) {
                return Some(*glyph);
            }
            if glyph.slot.is_some() {
                log::debug!("Glyph {:?} was evicted, rasterizing again", code);
            }
        }

        let info = self.factory.create(code);
        let mut glyph = Glyph::from_info(code, info);
        if !glyph.is_empty() {
            glyph.slot = self.rasterize(code, info.width, info.height);
        }
        self.glyphs.insert(code, glyph);
        Some(glyph)
    }

    fn rasterize(&self, code: char, width: u32, height: u32) -> Option<AtlasSlotKey> {
        let key = match self.atlases.allocate(width, height) {
            Ok(key) => key,
            Err(err) => {
                log::warn!("Glyph {:?} ({}x{}) left uncached: {}", code, width, height, err);
                return None;
            }
        };
        let slot = self.atlases.slot(key)?;

        let factory = self.factory.as_ref();
        let drawn = self.atlases.with_atlas_renderer(slot.atlas_index, |renderer| {
            renderer.begin();
            factory.render_glyph(code, renderer, f64::from(slot.x), f64::from(slot.y));
            renderer.end();
        });
        match drawn {
            Ok(()) => {
                log::trace!(
                    "Glyph {:?} cached in atlas {} at ({}, {})",
                    code,
                    slot.atlas_index,
                    slot.x,
                    slot.y
                );
                Some(key)
            }
            Err(err) => {
                log::warn!("Glyph {:?} could not be drawn into its atlas: {}", code, err);
                self.atlases.release(key);
                None
            }
        }
    }

    /// Measure a single line of text, caching every glyph on the way
    pub fn measure(&mut self, text: &str) -> TextExtent {
        let width = text
            .chars()
            .filter_map(|code| self.glyph_for_character(code))
            .map(|glyph| glyph.advance)
            .sum();
        TextExtent {
            width,
            height: self.factory.line_height(),
        }
    }

    /// Drop cached glyphs and destroy the atlas set if this font owns it.
    /// Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.glyphs.clear();
        self.atlases.destroy();
        self.destroyed = true;
    }
}

impl std::fmt::Debug for DynamicFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicFont")
            .field("font_size", &self.factory.font_size())
            .field("glyphs", &self.glyphs.len())
            .field("atlases", &self.atlases)
            .finish()
    }
}
