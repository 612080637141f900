//! A single shared surface subdivided into slots

use crate::render::{CacheError, CacheResult, Renderer, Surface};

use super::packer::{PackedRect, ShelfPacker};

/// One backing surface plus the free-space bookkeeping for it.
///
/// The surface size is fixed for the lifetime of the atlas; a set that needs
/// bigger atlases creates new ones. Usage counters live with the slot records
/// in [`SurfaceAtlasSet`](super::SurfaceAtlasSet) because slot handles are
/// global to the set.
#[derive(Debug)]
pub struct SurfaceAtlas {
    surface: Box<dyn Surface>,
    packer: ShelfPacker,
}

impl SurfaceAtlas {
    /// Wrap a live surface.
    ///
    /// # Errors
    /// [`CacheError::TypeMismatch`] if the surface is already destroyed or
    /// has no area.
    pub fn new(surface: Box<dyn Surface>, slot_padding: u32) -> CacheResult<Self> {
        if surface.destroyed() {
            return Err(CacheError::TypeMismatch {
                expected: "Surface",
                actual: format!("destroyed Surface {}", surface.id()),
            });
        }
        if surface.width() == 0 || surface.height() == 0 {
            return Err(CacheError::TypeMismatch {
                expected: "Surface",
                actual: format!("empty {}x{} Surface", surface.width(), surface.height()),
            });
        }

        let packer = ShelfPacker::new(surface.width(), surface.height(), slot_padding);
        Ok(Self { surface, packer })
    }

    /// Backing surface
    pub fn surface(&self) -> &(dyn Surface + 'static) {
        self.surface.as_ref()
    }

    /// Drawing context for the backing surface
    pub fn renderer(&mut self) -> CacheResult<&mut dyn Renderer> {
        self.surface.renderer()
    }

    /// Atlas width in pixels
    pub fn width(&self) -> u32 {
        self.packer.width()
    }

    /// Atlas height in pixels
    pub fn height(&self) -> u32 {
        self.packer.height()
    }

    /// Whether the backing surface is destroyed
    pub fn destroyed(&self) -> bool {
        self.surface.destroyed()
    }

    /// Whether a request of this size fits the atlas once emptied
    pub fn can_ever_fit(&self, width: u32, height: u32) -> bool {
        self.packer.can_ever_fit(width, height)
    }

    /// Whether no slot is reserved
    pub fn is_empty(&self) -> bool {
        self.packer.is_empty()
    }

    /// Number of reserved slots
    pub fn slot_count(&self) -> usize {
        self.packer.allocated_count()
    }

    /// Reserve a region. Returns `None` when the atlas is full or destroyed.
    pub fn allocate(&mut self, width: u32, height: u32) -> Option<PackedRect> {
        if self.destroyed() {
            return None;
        }
        self.packer.allocate(width, height)
    }

    /// How many of `regions`, released in order, must go before a
    /// `width` x `height` request fits.
    ///
    /// Works on a copy of the free-space bookkeeping; the atlas is left
    /// untouched. `None` if releasing all of them is not enough.
    pub fn releases_needed(
        &self,
        regions: &[PackedRect],
        width: u32,
        height: u32,
    ) -> Option<usize> {
        if self.destroyed() {
            return None;
        }
        let mut packer = self.packer.clone();
        for (released, region) in regions.iter().enumerate() {
            packer.release(*region);
            if packer.clone().allocate(width, height).is_some() {
                return Some(released + 1);
            }
        }
        None
    }

    /// Free a region previously returned by [`SurfaceAtlas::allocate`]
    pub fn release(&mut self, region: PackedRect) -> bool {
        self.packer.release(region)
    }

    /// Destroy the backing surface, releasing every slot with it
    pub fn destroy(&mut self) {
        self.surface.destroy();
        self.packer.clear();
    }
}
