//! Glyph metrics and the rasterizer capability

use crate::atlas::SurfaceAtlasSet;
use crate::foundation::collections::AtlasSlotKey;
use crate::render::Renderer;

/// Metrics reported by a [`GlyphFactory`] for one character
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphBitmapInfo {
    /// Horizontal offset of the bitmap from the pen position
    pub offset_x: f64,
    /// Vertical offset of the bitmap from the top of the line
    pub offset_y: f64,
    /// Bitmap width in pixels
    pub width: u32,
    /// Bitmap height in pixels
    pub height: u32,
    /// Pen advance after this glyph
    pub advance: f64,
}

/// Rasterizes glyphs for a [`DynamicFont`](super::DynamicFont).
///
/// Shaping is out of scope: one character maps to one glyph.
pub trait GlyphFactory {
    /// Nominal font size in pixels
    fn font_size(&self) -> f64;

    /// Height of one line of text
    fn line_height(&self) -> f64 {
        self.font_size()
    }

    /// Metrics for `code`
    fn create(&self, code: char) -> GlyphBitmapInfo;

    /// Draw `code` with its bitmap's top-left corner at `(x, y)`
    fn render_glyph(&self, code: char, renderer: &mut dyn Renderer, x: f64, y: f64);
}

/// A character's metrics plus the atlas slot holding its pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// Character this glyph renders
    pub code: char,
    /// Horizontal offset from the pen position
    pub x: f64,
    /// Vertical offset from the top of the line
    pub y: f64,
    /// Bitmap width
    pub width: f64,
    /// Bitmap height
    pub height: f64,
    /// Pen advance
    pub advance: f64,
    /// Atlas slot, `None` for empty glyphs and glyphs that could not be cached
    pub slot: Option<AtlasSlotKey>,
}

impl Glyph {
    pub(crate) fn from_info(code: char, info: GlyphBitmapInfo) -> Self {
        Self {
            code,
            x: info.offset_x,
            y: info.offset_y,
            width: f64::from(info.width),
            height: f64::from(info.height),
            advance: info.advance,
            slot: None,
        }
    }

    /// Whether the glyph has no pixels to draw
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Whether the glyph's pixels are still present in `atlases`
    pub fn is_surface_valid(&self, atlases: &SurfaceAtlasSet) -> bool {
        self.slot.is_some_and(|key| atlases.slot(key).is_some())
    }
}
