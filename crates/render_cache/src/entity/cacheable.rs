//! Entities that render through a private bitmap cache
//!
//! A [`CacheableEntity`] paints its content into an owned surface once and
//! then blits that surface every frame until it is invalidated. The cache is
//! also refilled whenever the entity is rendered through a different camera
//! than the one used for the last fill.

use crate::core::config::EntityCacheConfig;
use crate::render::{Camera, CameraId, Renderer, Surface};

use super::core::EntityCore;
use super::state::EntityStateFlags;

/// Visual content painted into an entity's cache
pub trait CacheContent {
    /// Paint the content into `renderer`, the drawing context of the cache
    /// surface, with the origin at the entity's top-left corner.
    fn render_cache(&mut self, renderer: &mut dyn Renderer, camera: Option<&Camera>);
}

/// An entity that owns a cache surface holding its last rendered bitmap
#[derive(Debug)]
pub struct CacheableEntity<C: CacheContent> {
    core: EntityCore,
    cache: Option<Box<dyn Surface>>,
    last_camera: Option<CameraId>,
    should_render_children: bool,
    content: C,
}

impl<C: CacheContent> CacheableEntity<C> {
    /// Wrap `content` with an empty cache
    pub fn new(core: EntityCore, content: C, config: &EntityCacheConfig) -> Self {
        Self {
            core,
            cache: None,
            last_camera: None,
            should_render_children: config.should_render_children,
            content,
        }
    }

    /// Geometry and state
    pub fn core(&self) -> &EntityCore {
        &self.core
    }

    /// Mutable geometry and state.
    ///
    /// Changing the size does not repaint the cache on its own; call
    /// [`CacheableEntity::invalidate`] afterwards.
    pub fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    /// Cached content
    pub fn content(&self) -> &C {
        &self.content
    }

    /// Mutable cached content. Changes show up after [`CacheableEntity::invalidate`].
    pub fn content_mut(&mut self) -> &mut C {
        &mut self.content
    }

    /// Current cache surface, if one has been allocated
    pub fn cache_surface(&self) -> Option<&dyn Surface> {
        self.cache.as_deref()
    }

    /// Whether the cache holds an up-to-date bitmap
    pub fn is_cached(&self) -> bool {
        self.core.flags().contains(EntityStateFlags::CACHED)
    }

    /// Camera used for the last render
    pub fn last_camera(&self) -> Option<CameraId> {
        self.last_camera
    }

    /// Whether children are still rendered after the cache is drawn
    pub fn should_render_children(&self) -> bool {
        self.should_render_children
    }

    /// Set whether children are rendered live on top of the cache
    pub fn set_should_render_children(&mut self, enabled: bool) {
        self.should_render_children = enabled;
    }

    /// Mark the cache stale. The repaint happens on the next render.
    pub fn invalidate(&mut self) {
        self.core.set_flags(EntityStateFlags::CACHED, false);
        self.core.modified();
    }

    /// Render the entity with its transform applied.
    ///
    /// Hidden entities draw nothing and report that children should be
    /// skipped too.
    pub fn render(&mut self, renderer: &mut dyn Renderer, camera: Option<&Camera>) -> bool {
        if self.core.hidden() || self.core.destroyed() {
            return false;
        }

        renderer.save();
        let matrix = self.core.matrix();
        if matrix.is_translation_only() {
            let [_, _, _, _, e, f] = *matrix.values();
            renderer.translate(e, f);
        } else {
            renderer.transform(&matrix);
        }
        let render_children = self.render_self(renderer, camera);
        renderer.restore();
        render_children
    }

    /// Refill the cache if needed, then blit it at the local origin.
    ///
    /// Returns whether children should still be rendered.
    pub fn render_self(&mut self, renderer: &mut dyn Renderer, camera: Option<&Camera>) -> bool {
        let camera_id = camera.map(Camera::id);
        if self.last_camera != camera_id {
            self.core.set_flags(EntityStateFlags::CACHED, false);
            self.last_camera = camera_id;
        }

        if !self.is_cached() {
            self.refill_cache(camera);
        }

        let (width, height) = self.core.pixel_size();
        if let Some(cache) = self.cache.as_deref() {
            if width > 0 && height > 0 && !cache.destroyed() {
                log::trace!("Blitting cache {} for entity {:?}", cache.id(), self.core.id());
                let (w, h) = (self.core.width(), self.core.height());
                renderer.draw_image(cache, 0.0, 0.0, w, h, 0.0, 0.0);
            }
        }

        self.should_render_children
    }

    fn refill_cache(&mut self, camera: Option<&Camera>) {
        let (width, height) = self.core.pixel_size();
        if width == 0 || height == 0 {
            self.destroy_cache();
            return;
        }

        let reuse = self.cache.as_ref().is_some_and(|cache| {
            !cache.destroyed() && cache.width() >= width && cache.height() >= height
        });
        if !reuse {
            self.destroy_cache();
            self.cache = Some(self.core.factory().create_surface(width, height));
            log::debug!("Allocated {}x{} cache for entity {:?}", width, height, self.core.id());
        }

        let Some(cache) = self.cache.as_mut() else {
            return;
        };
        match cache.renderer() {
            Ok(cache_renderer) => {
                cache_renderer.begin();
                if reuse {
                    cache_renderer.clear();
                }
                self.content.render_cache(cache_renderer, camera);
                cache_renderer.end();
                self.core.set_flags(EntityStateFlags::CACHED, true);
            }
            Err(err) => {
                log::warn!("Entity {:?} rendered without cache: {}", self.core.id(), err);
            }
        }
    }

    fn destroy_cache(&mut self) {
        if let Some(mut cache) = self.cache.take() {
            cache.destroy();
        }
    }

    /// Destroy the cache surface and the entity. Idempotent.
    pub fn destroy(&mut self) {
        self.destroy_cache();
        self.core.set_flags(EntityStateFlags::CACHED, false);
        self.core.destroy();
    }
}

impl<C: CacheContent> Drop for CacheableEntity<C> {
    fn drop(&mut self) {
        self.destroy_cache();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::{
        DrawCommand, HeadlessRenderer, HeadlessResourceFactory, HeadlessSurface,
    };
    use std::rc::Rc;

    /// Counts repaints and draws a single clear
    #[derive(Debug, Default)]
    struct Counter {
        repaints: usize,
        cameras: Vec<Option<CameraId>>,
    }

    impl CacheContent for Counter {
        fn render_cache(&mut self, renderer: &mut dyn Renderer, camera: Option<&Camera>) {
            self.repaints += 1;
            self.cameras.push(camera.map(Camera::id));
            renderer.translate(1.0, 1.0);
        }
    }

    fn entity(width: f64, height: f64) -> (Rc<HeadlessResourceFactory>, CacheableEntity<Counter>) {
        let factory = Rc::new(HeadlessResourceFactory::new());
        let core = EntityCore::new(factory.clone()).with_size(width, height);
        (factory, CacheableEntity::new(core, Counter::default(), &EntityCacheConfig::default()))
    }

    #[test]
    fn test_first_render_fills_and_blits() {
        let (factory, mut entity) = entity(10.5, 4.0);
        let mut renderer = HeadlessRenderer::new();
        assert!(entity.render_self(&mut renderer, None));

        assert_eq!(factory.created_count(), 1);
        assert_eq!(entity.content().repaints, 1);
        assert!(entity.is_cached());

        let cache = entity.cache_surface().expect("cache");
        assert_eq!((cache.width(), cache.height()), (11, 4));
        let recorded = HeadlessSurface::downcast(cache).expect("headless").commands();
        assert_eq!(
            recorded,
            &[DrawCommand::Begin, DrawCommand::Translate { x: 1.0, y: 1.0 }, DrawCommand::End]
        );
        assert_eq!(
            renderer.commands(),
            &[DrawCommand::DrawImage {
                source: cache.id(),
                src_x: 0.0,
                src_y: 0.0,
                width: 10.5,
                height: 4.0,
                dest_x: 0.0,
                dest_y: 0.0,
            }]
        );
    }

    #[test]
    fn test_shrinking_reuses_and_clears_surface() {
        let (factory, mut entity) = entity(50.0, 50.0);
        let mut renderer = HeadlessRenderer::new();
        entity.render_self(&mut renderer, None);
        let first = entity.cache_surface().map(Surface::id);

        entity.core_mut().set_size(20.0, 30.0);
        entity.invalidate();
        entity.render_self(&mut renderer, None);

        assert_eq!(entity.cache_surface().map(Surface::id), first);
        assert_eq!(factory.created_count(), 1);
        let cache = entity.cache_surface().expect("cache");
        let cache = HeadlessSurface::downcast(cache).expect("headless");
        assert_eq!(cache.recorder().clear_count(), 1);
        assert_eq!(entity.content().repaints, 2);
    }

    #[test]
    fn test_empty_entity_has_no_cache_and_no_blit() {
        let (factory, mut entity) = entity(0.0, 20.0);
        let mut renderer = HeadlessRenderer::new();
        entity.render_self(&mut renderer, None);
        assert!(entity.cache_surface().is_none());
        assert_eq!(factory.created_count(), 0);
        assert_eq!(renderer.draw_image_count(), 0);

        entity.core_mut().set_size(8.0, 8.0);
        entity.render_self(&mut renderer, None);
        assert!(entity.cache_surface().is_some());

        entity.core_mut().set_size(-1.0, 8.0);
        entity.invalidate();
        entity.render_self(&mut renderer, None);
        assert!(entity.cache_surface().is_none());
        assert_eq!(renderer.draw_image_count(), 1);
    }

    #[test]
    fn test_camera_identity_not_value_drives_repaint() {
        let (_factory, mut entity) = entity(10.0, 10.0);
        let mut renderer = HeadlessRenderer::new();
        let camera = Camera::new(100.0, 100.0);
        let twin = camera.duplicate();

        entity.render_self(&mut renderer, Some(&camera));
        entity.render_self(&mut renderer, Some(&camera));
        assert_eq!(entity.content().repaints, 1);

        entity.render_self(&mut renderer, Some(&twin));
        assert_eq!(entity.content().repaints, 2);
        assert_eq!(entity.last_camera(), Some(twin.id()));

        entity.render_self(&mut renderer, None);
        assert_eq!(entity.content().repaints, 3);
        assert_eq!(entity.content().cameras, vec![Some(camera.id()), Some(twin.id()), None]);
    }

    #[test]
    fn test_render_applies_transform_and_respects_hidden() {
        let (_factory, mut entity) = entity(10.0, 10.0);
        entity.core_mut().set_position(3.0, 4.0);
        let mut renderer = HeadlessRenderer::new();
        assert!(entity.render(&mut renderer, None));
        let commands = renderer.take_commands();
        assert_eq!(commands.first(), Some(&DrawCommand::Save));
        assert_eq!(commands.get(1), Some(&DrawCommand::Translate { x: 3.0, y: 4.0 }));
        assert_eq!(commands.last(), Some(&DrawCommand::Restore));

        entity.core_mut().set_angle(30.0);
        entity.render(&mut renderer, None);
        assert!(matches!(renderer.commands().get(1), Some(DrawCommand::Transform(_))));

        entity.core_mut().set_hidden(true);
        renderer.take_commands();
        assert!(!entity.render(&mut renderer, None));
        assert!(renderer.commands().is_empty());
    }

    #[test]
    fn test_children_flag_comes_from_config_and_setter() {
        let factory = Rc::new(HeadlessResourceFactory::new());
        let config = EntityCacheConfig::new().with_should_render_children(false);
        let mut entity = CacheableEntity::new(
            EntityCore::new(factory).with_size(4.0, 4.0),
            Counter::default(),
            &config,
        );
        let mut renderer = HeadlessRenderer::new();
        assert!(!entity.render_self(&mut renderer, None));
        entity.set_should_render_children(true);
        assert!(entity.render_self(&mut renderer, None));
    }

    #[test]
    fn test_destroy_releases_cache() {
        let (_factory, mut entity) = entity(10.0, 10.0);
        let mut renderer = HeadlessRenderer::new();
        entity.render_self(&mut renderer, None);
        entity.destroy();
        entity.destroy();
        assert!(entity.cache_surface().is_none());
        assert!(entity.core().destroyed());
        assert!(!entity.render(&mut renderer, None));
    }
}
