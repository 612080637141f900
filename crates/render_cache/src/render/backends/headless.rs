//! Headless recording backend
//!
//! Surfaces that keep no pixels and renderers that record every call as a
//! [`DrawCommand`]. Used by hosts without a GPU (servers replaying scenes,
//! snapshot tools) and as the backend for this crate's tests.

use std::any::Any;
use std::cell::Cell;

use crate::foundation::math::{utils, Matrix};
use crate::render::error::{CacheError, CacheResult};
use crate::render::renderer::Renderer;
use crate::render::surface::{ResourceFactory, Surface, SurfaceId};
use crate::text::{GlyphBitmapInfo, GlyphFactory};

/// A single recorded renderer call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// `begin()`
    Begin,
    /// `end()`
    End,
    /// `clear()`
    Clear,
    /// `draw_image(...)`
    DrawImage {
        /// Surface that was blitted
        source: SurfaceId,
        /// Source rectangle left edge
        src_x: f64,
        /// Source rectangle top edge
        src_y: f64,
        /// Source rectangle width
        width: f64,
        /// Source rectangle height
        height: f64,
        /// Destination left edge
        dest_x: f64,
        /// Destination top edge
        dest_y: f64,
    },
    /// `save()`
    Save,
    /// `restore()`
    Restore,
    /// `translate(x, y)`
    Translate {
        /// Horizontal offset
        x: f64,
        /// Vertical offset
        y: f64,
    },
    /// `transform(matrix)`
    Transform([f64; 6]),
}

/// Renderer that records calls instead of rasterizing
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    commands: Vec<DrawCommand>,
    save_depth: usize,
}

impl HeadlessRenderer {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// All commands recorded so far
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the log empty
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of recorded blits
    pub fn draw_image_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::DrawImage { .. }))
            .count()
    }

    /// Number of recorded clears
    pub fn clear_count(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Clear)).count()
    }

    /// Current `save()` nesting depth
    pub fn save_depth(&self) -> usize {
        self.save_depth
    }
}

impl Renderer for HeadlessRenderer {
    fn begin(&mut self) {
        self.commands.push(DrawCommand::Begin);
    }

    fn end(&mut self) {
        self.commands.push(DrawCommand::End);
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn draw_image(
        &mut self,
        source: &dyn Surface,
        src_x: f64,
        src_y: f64,
        width: f64,
        height: f64,
        dest_x: f64,
        dest_y: f64,
    ) {
        if source.destroyed() {
            log::warn!("Ignoring blit from destroyed surface {}", source.id());
            return;
        }
        self.commands.push(DrawCommand::DrawImage {
            source: source.id(),
            src_x,
            src_y,
            width,
            height,
            dest_x,
            dest_y,
        });
    }

    fn save(&mut self) {
        self.save_depth += 1;
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if self.save_depth == 0 {
            log::warn!("restore() without matching save()");
            return;
        }
        self.save_depth -= 1;
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::Translate { x, y });
    }

    fn transform(&mut self, matrix: &Matrix) {
        self.commands.push(DrawCommand::Transform(*matrix.values()));
    }
}

/// Surface that records what is drawn into it
#[derive(Debug)]
pub struct HeadlessSurface {
    id: SurfaceId,
    width: u32,
    height: u32,
    destroyed: bool,
    renderer: HeadlessRenderer,
}

impl HeadlessSurface {
    /// Create a cleared surface
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            id: SurfaceId::next(),
            width,
            height,
            destroyed: false,
            renderer: HeadlessRenderer::new(),
        }
    }

    /// Commands drawn into this surface
    pub fn commands(&self) -> &[DrawCommand] {
        self.renderer.commands()
    }

    /// Recording renderer bound to this surface
    pub fn recorder(&self) -> &HeadlessRenderer {
        &self.renderer
    }

    /// Downcast a trait object created by this backend
    pub fn downcast(surface: &dyn Surface) -> Option<&Self> {
        surface.as_any().downcast_ref::<Self>()
    }
}

impl Surface for HeadlessSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn destroyed(&self) -> bool {
        self.destroyed
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.renderer.take_commands();
        log::debug!("Destroyed headless surface {} ({}x{})", self.id, self.width, self.height);
    }

    fn renderer(&mut self) -> CacheResult<&mut dyn Renderer> {
        if self.destroyed {
            return Err(CacheError::SurfaceDestroyed(self.id));
        }
        Ok(&mut self.renderer)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Factory producing [`HeadlessSurface`]s
#[derive(Debug, Default)]
pub struct HeadlessResourceFactory {
    created: Cell<usize>,
}

impl HeadlessResourceFactory {
    /// Create a factory
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of surfaces created so far
    pub fn created_count(&self) -> usize {
        self.created.get()
    }
}

impl ResourceFactory for HeadlessResourceFactory {
    fn create_surface(&self, width: u32, height: u32) -> Box<dyn Surface> {
        self.created.set(self.created.get() + 1);
        log::trace!("Creating headless surface {}x{}", width, height);
        Box::new(HeadlessSurface::new(width, height))
    }
}

/// Monospace glyph source with box-shaped glyphs.
///
/// Every visible character is a `0.6 * font_size` by `font_size` box;
/// whitespace has no bitmap. Drawing a glyph records its position only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadlessGlyphFactory {
    font_size: f64,
}

impl HeadlessGlyphFactory {
    /// Create a factory for the given pixel size
    pub fn new(font_size: f64) -> Self {
        Self { font_size }
    }

    fn cell_size(&self) -> (u32, u32) {
        (
            utils::ceil_to_pixels(self.font_size * 3.0 / 5.0),
            utils::ceil_to_pixels(self.font_size),
        )
    }

    /// Advance of a visible glyph
    pub fn advance(&self) -> f64 {
        f64::from(self.cell_size().0 + 1)
    }

    /// Advance of a whitespace glyph
    pub fn space_advance(&self) -> f64 {
        (self.advance() / 2.0).floor()
    }
}

impl GlyphFactory for HeadlessGlyphFactory {
    fn font_size(&self) -> f64 {
        self.font_size
    }

    fn line_height(&self) -> f64 {
        self.font_size * 1.2
    }

    fn create(&self, code: char) -> GlyphBitmapInfo {
        if code.is_whitespace() {
            return GlyphBitmapInfo {
                advance: self.space_advance(),
                ..GlyphBitmapInfo::default()
            };
        }
        let (width, height) = self.cell_size();
        GlyphBitmapInfo {
            offset_x: 0.0,
            offset_y: (self.line_height() - f64::from(height)).max(0.0),
            width,
            height,
            advance: self.advance(),
        }
    }

    fn render_glyph(&self, _code: char, renderer: &mut dyn Renderer, x: f64, y: f64) {
        renderer.save();
        renderer.translate(x, y);
        renderer.restore();
    }
}
