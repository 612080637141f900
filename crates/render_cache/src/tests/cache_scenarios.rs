//! Cache reuse, growth and camera scenarios for cacheable entities
//!
//! Exercises the full render path: entity core, cache surface allocation
//! through the resource factory and the blit onto the frame renderer.

use std::rc::Rc;

use crate::core::config::EntityCacheConfig;
use crate::entity::{CacheContent, CacheableEntity, EntityCore};
use crate::foundation::logging;
use crate::render::backends::{HeadlessRenderer, HeadlessResourceFactory};
use crate::render::{Camera, Renderer, Surface};

/// Content that counts how often it is painted
#[derive(Debug, Default)]
struct Painter {
    paints: usize,
}

impl CacheContent for Painter {
    fn render_cache(&mut self, renderer: &mut dyn Renderer, _camera: Option<&Camera>) {
        self.paints += 1;
        renderer.clear();
    }
}

fn entity(width: f64, height: f64) -> (Rc<HeadlessResourceFactory>, CacheableEntity<Painter>) {
    logging::init_for_tests();
    let factory = Rc::new(HeadlessResourceFactory::new());
    let core = EntityCore::new(factory.clone()).with_size(width, height);
    (factory, CacheableEntity::new(core, Painter::default(), &EntityCacheConfig::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growing_after_invalidate_reallocates() {
        let (_factory, mut entity) = entity(100.0, 200.0);
        let mut renderer = HeadlessRenderer::new();
        entity.render(&mut renderer, None);
        let original = entity.cache_surface().map(Surface::id).expect("cache created");

        entity.core_mut().set_width(200.0);
        entity.core_mut().set_height(300.0);
        entity.invalidate();
        entity.render(&mut renderer, None);

        let cache = entity.cache_surface().expect("cache");
        assert_ne!(cache.id(), original);
        assert!(cache.width() >= 200 && cache.height() >= 300);
        assert_eq!(entity.content().paints, 2);
    }

    #[test]
    fn test_rendering_twice_reuses_cache() {
        let (factory, mut entity) = entity(64.0, 32.0);
        let mut renderer = HeadlessRenderer::new();
        entity.render(&mut renderer, None);
        let first = entity.cache_surface().map(Surface::id);
        entity.render(&mut renderer, None);

        assert_eq!(entity.cache_surface().map(Surface::id), first);
        assert_eq!(factory.created_count(), 1);
        assert_eq!(entity.content().paints, 1);
        assert_eq!(renderer.draw_image_count(), 2);
    }

    #[test]
    fn test_growth_without_invalidate_keeps_old_bitmap() {
        let (factory, mut entity) = entity(10.0, 10.0);
        let mut renderer = HeadlessRenderer::new();
        entity.render(&mut renderer, None);
        entity.core_mut().set_size(40.0, 40.0);
        entity.render(&mut renderer, None);

        assert_eq!(factory.created_count(), 1);
        assert_eq!(entity.content().paints, 1);
    }

    #[test]
    fn test_new_camera_forces_repaint_of_same_surface() {
        let (factory, mut entity) = entity(16.0, 16.0);
        let mut renderer = HeadlessRenderer::new();
        let first = Camera::new(320.0, 240.0);
        let second = Camera::new(320.0, 240.0);

        entity.render(&mut renderer, Some(&first));
        let surface = entity.cache_surface().map(Surface::id);
        entity.render(&mut renderer, Some(&second));

        assert_eq!(entity.content().paints, 2);
        assert_eq!(entity.cache_surface().map(Surface::id), surface);
        assert_eq!(factory.created_count(), 1);
    }
}
