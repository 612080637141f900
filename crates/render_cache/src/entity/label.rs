//! Single-line text entity
//!
//! A [`Label`] paints its text once into its cache by blitting glyph
//! regions out of its font's atlases, and then draws the cached line every
//! frame until the text changes.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::config::EntityCacheConfig;
use crate::render::{Camera, Renderer, ResourceFactory};
use crate::text::DynamicFont;

use super::cacheable::{CacheContent, CacheableEntity};
use super::core::EntityCore;

/// Text and font painted into a label's cache
#[derive(Debug)]
pub struct LabelContent {
    text: String,
    font: Rc<RefCell<DynamicFont>>,
}

impl LabelContent {
    /// Current text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Font the text is drawn with
    pub fn font(&self) -> &Rc<RefCell<DynamicFont>> {
        &self.font
    }
}

impl CacheContent for LabelContent {
    fn render_cache(&mut self, renderer: &mut dyn Renderer, _camera: Option<&Camera>) {
        let mut font = self.font.borrow_mut();
        let mut pen_x = 0.0;

        for code in self.text.chars() {
            let Some(glyph) = font.glyph_for_character(code) else {
                break;
            };

            let atlases = font.atlases();
            let slot = glyph
                .slot
                .filter(|key| atlases.touch(*key))
                .and_then(|key| atlases.slot(key));
            if let Some(slot) = slot {
                if let Some(surface) = atlases.atlas_surface(slot.atlas_index) {
                    renderer.draw_image(
                        &*surface,
                        f64::from(slot.x),
                        f64::from(slot.y),
                        glyph.width,
                        glyph.height,
                        pen_x + glyph.x,
                        glyph.y,
                    );
                }
            } else if !glyph.is_empty() {
                log::trace!("Skipping uncached glyph {:?}", code);
            }

            pen_x += glyph.advance;
        }
    }
}

/// Cached single-line text
///
/// Painting the cache touches every glyph slot it reads. Call
/// [`SurfaceAtlasSet::tick`](crate::atlas::SurfaceAtlasSet::tick) on the
/// font's pool once per frame so those touches count as recent use.
#[derive(Debug)]
pub struct Label {
    entity: CacheableEntity<LabelContent>,
}

impl Label {
    /// Create a label sized to its measured text
    pub fn new(
        text: impl Into<String>,
        font: Rc<RefCell<DynamicFont>>,
        resources: Rc<dyn ResourceFactory>,
        config: &EntityCacheConfig,
    ) -> Self {
        let text = text.into();
        let extent = font.borrow_mut().measure(&text);
        let core = EntityCore::new(resources).with_size(extent.width, extent.height);
        Self { entity: CacheableEntity::new(core, LabelContent { text, font }, config) }
    }

    /// Current text
    pub fn text(&self) -> &str {
        self.entity.content().text()
    }

    /// Replace the text, resizing the label and invalidating its cache
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.entity.content().text {
            return;
        }
        let extent = self.entity.content().font.borrow_mut().measure(&text);
        self.entity.content_mut().text = text;
        self.entity.core_mut().set_size(extent.width, extent.height);
        self.entity.invalidate();
    }

    /// Underlying cacheable entity
    pub fn entity(&self) -> &CacheableEntity<LabelContent> {
        &self.entity
    }

    /// Mutable underlying cacheable entity
    pub fn entity_mut(&mut self) -> &mut CacheableEntity<LabelContent> {
        &mut self.entity
    }

    /// Render with the label's transform applied
    pub fn render(&mut self, renderer: &mut dyn Renderer, camera: Option<&Camera>) -> bool {
        self.entity.render(renderer, camera)
    }

    /// Destroy the label's cache. The font is left alone.
    pub fn destroy(&mut self) {
        self.entity.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SurfaceAtlasSetConfig;
    use crate::render::backends::{
        DrawCommand, HeadlessGlyphFactory, HeadlessRenderer, HeadlessResourceFactory,
        HeadlessSurface,
    };
    use crate::render::Surface;
    use crate::text::GlyphFactory;

    type Fixture = (Rc<HeadlessResourceFactory>, Rc<RefCell<DynamicFont>>);

    fn setup(config: SurfaceAtlasSetConfig) -> Fixture {
        let resources = Rc::new(HeadlessResourceFactory::new());
        let font = DynamicFont::with_atlas_config(
            Box::new(HeadlessGlyphFactory::new(10.0)),
            config,
            resources.clone(),
        )
        .expect("valid config");
        (resources, Rc::new(RefCell::new(font)))
    }

    fn blits(surface: &dyn Surface) -> Vec<DrawCommand> {
        HeadlessSurface::downcast(surface)
            .expect("headless")
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::DrawImage { .. }))
            .cloned()
            .collect()
    }

    #[test]
    fn test_label_is_sized_to_text() {
        let (resources, font) = setup(SurfaceAtlasSetConfig::new());
        let label = Label::new("hi there", font, resources, &EntityCacheConfig::default());
        let glyphs = HeadlessGlyphFactory::new(10.0);
        assert_eq!(label.entity().core().width(), 7.0 * glyphs.advance() + glyphs.space_advance());
        assert_eq!(label.entity().core().height(), glyphs.line_height());
    }

    #[test]
    fn test_cache_blits_each_visible_glyph_from_its_atlas() {
        let (resources, font) = setup(SurfaceAtlasSetConfig::new());
        let mut label = Label::new("a b", font.clone(), resources, &EntityCacheConfig::default());
        let mut renderer = HeadlessRenderer::new();
        label.render(&mut renderer, None);

        let cache = label.entity().cache_surface().expect("cache");
        let blits = blits(cache);
        assert_eq!(blits.len(), 2);

        let atlas_id = font.borrow().atlases().atlas_surface(0).expect("atlas").id();
        let glyphs = HeadlessGlyphFactory::new(10.0);
        match &blits[1] {
            DrawCommand::DrawImage { source, dest_x, width, .. } => {
                assert_eq!(*source, atlas_id);
                assert_eq!(*dest_x, glyphs.advance() + glyphs.space_advance());
                assert_eq!(*width, 6.0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_set_text_resizes_and_repaints() {
        let (resources, font) = setup(SurfaceAtlasSetConfig::new());
        let mut label = Label::new("ab", font, resources.clone(), &EntityCacheConfig::default());
        let mut renderer = HeadlessRenderer::new();
        label.render(&mut renderer, None);
        let first = label.entity().cache_surface().map(|s| s.id());
        let created = resources.created_count();

        label.set_text("ab");
        assert!(label.entity().is_cached());

        label.set_text("abcd");
        assert!(!label.entity().is_cached());
        assert_eq!(label.text(), "abcd");
        label.render(&mut renderer, None);
        assert_ne!(label.entity().cache_surface().map(|s| s.id()), first);
        assert_eq!(resources.created_count(), created + 1);
        assert_eq!(blits(label.entity().cache_surface().expect("cache")).len(), 4);
    }

    #[test]
    fn test_uncacheable_glyphs_are_skipped() {
        let config = SurfaceAtlasSetConfig::new()
            .with_initial_atlas_size(4, 4)
            .with_max_atlas_size(4, 4);
        let (resources, font) = setup(config);
        let mut label = Label::new("xyz", font, resources, &EntityCacheConfig::default());
        let mut renderer = HeadlessRenderer::new();
        label.render(&mut renderer, None);
        assert!(blits(label.entity().cache_surface().expect("cache")).is_empty());
        assert_eq!(renderer.draw_image_count(), 1);
    }
}
