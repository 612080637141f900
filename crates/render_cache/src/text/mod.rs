//! Dynamic glyph caching
//!
//! [`DynamicFont`] rasterizes glyphs on demand through a [`GlyphFactory`] and
//! keeps their pixels in a [`SurfaceAtlasSet`](crate::atlas::SurfaceAtlasSet).

pub mod dynamic_font;
pub mod glyph;

pub use dynamic_font::{DynamicFont, TextExtent};
pub use glyph::{Glyph, GlyphBitmapInfo, GlyphFactory};
