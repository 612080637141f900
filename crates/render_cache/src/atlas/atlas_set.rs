//! Bounded pool of atlases with usage-based eviction
//!
//! A [`SurfaceAtlasSet`] routes slot requests to the first atlas with room,
//! creates atlases up to the configured ceiling and, once at the ceiling,
//! evicts the least valuable slots of a single atlas until the request fits.
//!
//! ## Eviction order
//!
//! Slots are ranked by, in order:
//! 1. the frame serial of their last use (older first),
//! 2. their use count (fewer first),
//! 3. their allocation sequence number (older first).
//!
//! The serial only advances through [`SurfaceAtlasSet::tick`], so slots used
//! in the same frame fall through to the use count. Hosts call `tick` once
//! per frame.
//!
//! Eviction first picks the atlas to make room in: the one whose most
//! valuable victim ranks lowest, then the one losing the fewest slots.
//! Only slots of that atlas are evicted.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::core::config::{ConfigError, SurfaceAtlasSetConfig};
use crate::foundation::collections::{AtlasSlotKey, HandleMap};
use crate::render::{CacheError, CacheResult, Renderer, ResourceFactory, Surface};

use super::packer::PackedRect;
use super::surface_atlas::SurfaceAtlas;

/// Width and height of an atlas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// A reserved region inside one atlas of a set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasSlot {
    /// Index of the atlas holding the slot, in creation order
    pub atlas_index: usize,
    /// Left edge of the usable region
    pub x: u32,
    /// Top edge of the usable region
    pub y: u32,
    /// Requested width
    pub width: u32,
    /// Requested height
    pub height: u32,
    /// Number of recorded uses, the allocation included
    pub use_count: u32,
    /// Frame serial of the last use
    pub last_used: u64,
    region: PackedRect,
    sequence: u64,
}

type EvictionRank = (u64, u32, u64);

impl AtlasSlot {
    fn eviction_rank(&self) -> EvictionRank {
        (self.last_used, self.use_count, self.sequence)
    }
}

/// Counters describing the state of an atlas set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AtlasSetStats {
    /// Atlases alive
    pub atlas_count: usize,
    /// Slots currently reserved
    pub slot_count: usize,
    /// Slots evicted since creation
    pub evictions: u64,
    /// Successful allocations since creation
    pub allocations: u64,
}

/// Slots to evict from one atlas, in eviction order
struct EvictionPlan {
    atlas_index: usize,
    victims: Vec<AtlasSlotKey>,
}

struct AtlasPool {
    config: SurfaceAtlasSetConfig,
    factory: Rc<dyn ResourceFactory>,
    atlases: Vec<SurfaceAtlas>,
    slots: HandleMap<AtlasSlotKey, AtlasSlot>,
    current_size: AtlasSize,
    serial: u64,
    next_sequence: u64,
    stats: AtlasSetStats,
    destroyed: bool,
}

impl AtlasPool {
    fn new(config: SurfaceAtlasSetConfig, factory: Rc<dyn ResourceFactory>) -> Self {
        let current_size = AtlasSize {
            width: config.initial_atlas_width,
            height: config.initial_atlas_height,
        };
        Self {
            config,
            factory,
            atlases: Vec::new(),
            slots: HandleMap::with_key(),
            current_size,
            serial: 0,
            next_sequence: 0,
            stats: AtlasSetStats::default(),
            destroyed: false,
        }
    }

    fn allocate(&mut self, width: u32, height: u32) -> CacheResult<AtlasSlotKey> {
        if self.destroyed {
            return Err(CacheError::TypeMismatch {
                expected: "SurfaceAtlasSet",
                actual: "destroyed SurfaceAtlasSet".to_string(),
            });
        }
        if width == 0
            || height == 0
            || width > self.config.max_atlas_width
            || height > self.config.max_atlas_height
        {
            return Err(CacheError::SizeExceeded {
                width,
                height,
                max_width: self.config.max_atlas_width,
                max_height: self.config.max_atlas_height,
            });
        }

        for index in 0..self.atlases.len() {
            if let Some(region) = self.atlases[index].allocate(width, height) {
                return Ok(self.record(index, region, width, height));
            }
        }

        self.grow_to_fit(width, height);

        // An empty atlas that still refused the request predates the last growth
        let empty_index = self.atlases.iter().position(SurfaceAtlas::is_empty);
        let fresh_index = if let Some(index) = empty_index {
            self.replace_atlas(index)?;
            Some(index)
        } else if self.atlases.len() < self.config.max_atlas_num {
            let atlas = self.create_atlas()?;
            self.atlases.push(atlas);
            Some(self.atlases.len() - 1)
        } else {
            None
        };
        if let Some(index) = fresh_index {
            if let Some(region) = self.atlases[index].allocate(width, height) {
                return Ok(self.record(index, region, width, height));
            }
        }

        self.evict_until_fits(width, height)
    }

    fn evict_until_fits(&mut self, width: u32, height: u32) -> CacheResult<AtlasSlotKey> {
        let exhausted = CacheError::CapacityExhausted {
            width,
            height,
            max_atlas_num: self.config.max_atlas_num,
        };
        let Some(plan) = self.plan_eviction(width, height) else {
            return Err(exhausted);
        };

        let index = plan.atlas_index;
        for key in plan.victims {
            let Some(victim) = self.slots.remove(key) else {
                continue;
            };
            self.atlases[index].release(victim.region);
            self.stats.evictions += 1;
            log::warn!(
                "Evicted {}x{} slot from atlas {} (uses: {}, last used: {}) for a {}x{} request",
                victim.width,
                victim.height,
                index,
                victim.use_count,
                victim.last_used,
                width,
                height
            );
        }

        if self.atlases[index].is_empty() && !self.atlases[index].can_ever_fit(width, height) {
            self.replace_atlas(index)?;
        }
        match self.atlases[index].allocate(width, height) {
            Some(region) => Ok(self.record(index, region, width, height)),
            None => Err(exhausted),
        }
    }

    /// Pick the atlas whose eviction costs the least for this request.
    ///
    /// Within an atlas, slots go in eviction order until the request fits,
    /// or all of them if the atlas predates growth and must be replaced.
    /// Atlases are compared by the most valuable slot they would lose, then
    /// by the number of slots lost. Slots in other atlases are left alone.
    fn plan_eviction(&self, width: u32, height: u32) -> Option<EvictionPlan> {
        let mut best: Option<((EvictionRank, usize), EvictionPlan)> = None;

        for (atlas_index, atlas) in self.atlases.iter().enumerate() {
            let mut candidates: Vec<(AtlasSlotKey, AtlasSlot)> = self
                .slots
                .iter()
                .filter(|(_, slot)| slot.atlas_index == atlas_index)
                .map(|(key, slot)| (key, *slot))
                .collect();
            if candidates.is_empty() {
                continue;
            }
            candidates.sort_by_key(|(_, slot)| slot.eviction_rank());

            let needed = if atlas.can_ever_fit(width, height) {
                let regions: Vec<PackedRect> =
                    candidates.iter().map(|(_, slot)| slot.region).collect();
                match atlas.releases_needed(&regions, width, height) {
                    Some(needed) => needed,
                    None => continue,
                }
            } else {
                candidates.len()
            };
            candidates.truncate(needed);

            let Some(worst) = candidates.last().map(|(_, slot)| slot.eviction_rank()) else {
                continue;
            };
            let cost = (worst, needed);
            if best.as_ref().is_some_and(|(best_cost, _)| *best_cost <= cost) {
                continue;
            }
            let victims = candidates.into_iter().map(|(key, _)| key).collect();
            best = Some((
                cost,
                EvictionPlan {
                    atlas_index,
                    victims,
                },
            ));
        }

        best.map(|(_, plan)| plan)
    }

    fn grow_to_fit(&mut self, width: u32, height: u32) {
        let before = self.current_size;
        while width > self.current_size.width {
            self.current_size.width =
                self.current_size.width.saturating_mul(2).min(self.config.max_atlas_width);
        }
        while height > self.current_size.height {
            self.current_size.height =
                self.current_size.height.saturating_mul(2).min(self.config.max_atlas_height);
        }
        if before != self.current_size {
            log::debug!(
                "Atlas size grows from {}x{} to {}x{}",
                before.width,
                before.height,
                self.current_size.width,
                self.current_size.height
            );
        }
    }

    fn create_atlas(&self) -> CacheResult<SurfaceAtlas> {
        let AtlasSize { width, height } = self.current_size;
        let surface = self.factory.create_surface(width, height);
        let atlas = SurfaceAtlas::new(surface, self.config.slot_padding)?;
        log::info!(
            "Created {}x{} atlas ({} of at most {})",
            atlas.width(),
            atlas.height(),
            self.atlases.len() + 1,
            self.config.max_atlas_num
        );
        Ok(atlas)
    }

    fn replace_atlas(&mut self, index: usize) -> CacheResult<()> {
        let replacement = self.create_atlas()?;
        let mut old = std::mem::replace(&mut self.atlases[index], replacement);
        old.destroy();
        log::debug!("Replaced {}x{} atlas {}", old.width(), old.height(), index);
        Ok(())
    }

    fn record(
        &mut self,
        atlas_index: usize,
        region: PackedRect,
        width: u32,
        height: u32,
    ) -> AtlasSlotKey {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.stats.allocations += 1;
        self.slots.insert(AtlasSlot {
            atlas_index,
            x: region.x,
            y: region.y,
            width,
            height,
            use_count: 1,
            last_used: self.serial,
            region,
            sequence,
        })
    }

    fn slot(&self, key: AtlasSlotKey) -> Option<AtlasSlot> {
        let slot = self.slots.get(key)?;
        if self.atlases.get(slot.atlas_index).is_some_and(SurfaceAtlas::destroyed) {
            return None;
        }
        Some(*slot)
    }

    fn touch(&mut self, key: AtlasSlotKey) -> bool {
        let serial = self.serial;
        match self.slots.get_mut(key) {
            Some(slot) => {
                slot.use_count = slot.use_count.saturating_add(1);
                slot.last_used = serial;
                log::trace!(
                    "Touched slot in atlas {} (uses: {})",
                    slot.atlas_index,
                    slot.use_count
                );
                true
            }
            None => false,
        }
    }

    fn release(&mut self, key: AtlasSlotKey) -> bool {
        match self.slots.remove(key) {
            Some(slot) => self.atlases[slot.atlas_index].release(slot.region),
            None => false,
        }
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        for atlas in &mut self.atlases {
            atlas.destroy();
        }
        self.slots.clear();
        self.destroyed = true;
        log::debug!("Destroyed atlas set with {} atlases", self.atlases.len());
    }

    fn stats(&self) -> AtlasSetStats {
        AtlasSetStats {
            atlas_count: self.atlases.len(),
            slot_count: self.slots.len(),
            ..self.stats
        }
    }
}

/// Who is responsible for destroying the pool's atlases
enum PoolRef {
    Owned(Rc<RefCell<AtlasPool>>),
    Borrowed(Rc<RefCell<AtlasPool>>),
}

/// Handle to a pool of glyph atlases.
///
/// Several consumers can share one pool: the handle created by
/// [`SurfaceAtlasSet::new`] owns the atlases, handles obtained through
/// [`SurfaceAtlasSet::share`] only borrow them. Destroying (or dropping) a
/// borrowed handle never touches the atlases.
///
/// All methods take `&self`; the pool is single-threaded and borrows are
/// released before each call returns. Calling back into the set from inside
/// [`SurfaceAtlasSet::with_atlas_renderer`] or while holding the guard from
/// [`SurfaceAtlasSet::atlas_surface`] panics.
pub struct SurfaceAtlasSet {
    pool: PoolRef,
}

impl SurfaceAtlasSet {
    /// Create an owning handle to a new, empty pool.
    ///
    /// No atlas is created until the first allocation.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] if the configuration does not validate.
    pub fn new(
        config: SurfaceAtlasSetConfig,
        factory: Rc<dyn ResourceFactory>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        log::debug!(
            "Atlas set: initial {}x{}, max {}x{}, up to {} atlases",
            config.initial_atlas_width,
            config.initial_atlas_height,
            config.max_atlas_width,
            config.max_atlas_height,
            config.max_atlas_num
        );
        let pool = AtlasPool::new(config, factory);
        Ok(Self {
            pool: PoolRef::Owned(Rc::new(RefCell::new(pool))),
        })
    }

    /// A non-owning handle to the same pool
    pub fn share(&self) -> Self {
        Self {
            pool: PoolRef::Borrowed(Rc::clone(self.cell())),
        }
    }

    /// Whether this handle destroys the atlases on [`SurfaceAtlasSet::destroy`]
    pub fn is_owner(&self) -> bool {
        matches!(self.pool, PoolRef::Owned(_))
    }

    /// Whether two handles refer to the same pool
    pub fn same_pool(&self, other: &Self) -> bool {
        Rc::ptr_eq(self.cell(), other.cell())
    }

    fn cell(&self) -> &Rc<RefCell<AtlasPool>> {
        match &self.pool {
            PoolRef::Owned(pool) | PoolRef::Borrowed(pool) => pool,
        }
    }

    /// Reserve a `width` x `height` slot.
    ///
    /// May evict other slots when every atlas is full and the atlas ceiling
    /// has been reached. Evicted handles stop resolving through
    /// [`SurfaceAtlasSet::slot`]. The returned slot is never evicted by the
    /// call that creates it.
    ///
    /// # Errors
    /// - [`CacheError::SizeExceeded`] for empty requests or requests larger
    ///   than the maximum atlas size
    /// - [`CacheError::CapacityExhausted`] if eviction cannot make room
    /// - [`CacheError::TypeMismatch`] if the pool has been destroyed
    pub fn allocate(&self, width: u32, height: u32) -> CacheResult<AtlasSlotKey> {
        self.cell().borrow_mut().allocate(width, height)
    }

    /// Look up a live slot
    pub fn slot(&self, key: AtlasSlotKey) -> Option<AtlasSlot> {
        self.cell().borrow().slot(key)
    }

    /// Record a use of a slot. Returns `false` if the slot is gone.
    pub fn touch(&self, key: AtlasSlotKey) -> bool {
        self.cell().borrow_mut().touch(key)
    }

    /// Free a slot explicitly. Returns `false` if the slot is gone.
    pub fn release(&self, key: AtlasSlotKey) -> bool {
        self.cell().borrow_mut().release(key)
    }

    /// Advance the frame serial used for recency ranking
    pub fn tick(&self) {
        self.cell().borrow_mut().serial += 1;
    }

    /// Size used for the next atlas the set creates
    pub fn get_atlas_used_size(&self) -> AtlasSize {
        self.cell().borrow().current_size
    }

    /// Configured atlas ceiling
    pub fn get_max_atlas_num(&self) -> usize {
        self.cell().borrow().config.max_atlas_num
    }

    /// Number of atlases created so far
    pub fn atlas_count(&self) -> usize {
        self.cell().borrow().atlases.len()
    }

    /// Backing surface of an atlas
    pub fn atlas_surface(&self, atlas_index: usize) -> Option<Ref<'_, dyn Surface>> {
        Ref::filter_map(self.cell().borrow(), |pool| {
            pool.atlases.get(atlas_index).map(SurfaceAtlas::surface)
        })
        .ok()
    }

    /// Run `f` with a drawing context for an atlas surface
    ///
    /// # Errors
    /// [`CacheError::TypeMismatch`] for an unknown atlas index, or
    /// [`CacheError::SurfaceDestroyed`] if the atlas has been destroyed.
    pub fn with_atlas_renderer<R>(
        &self,
        atlas_index: usize,
        f: impl FnOnce(&mut dyn Renderer) -> R,
    ) -> CacheResult<R> {
        let mut pool = self.cell().borrow_mut();
        let atlas_count = pool.atlases.len();
        let atlas = pool.atlases.get_mut(atlas_index).ok_or_else(|| CacheError::TypeMismatch {
            expected: "atlas index",
            actual: format!("{atlas_index} (set has {atlas_count} atlases)"),
        })?;
        Ok(f(atlas.renderer()?))
    }

    /// Current counters
    pub fn stats(&self) -> AtlasSetStats {
        self.cell().borrow().stats()
    }

    /// Whether the pool has been destroyed
    pub fn is_destroyed(&self) -> bool {
        self.cell().borrow().destroyed
    }

    /// Destroy the atlases if this handle owns them. Idempotent.
    pub fn destroy(&self) {
        match &self.pool {
            PoolRef::Owned(pool) => pool.borrow_mut().destroy(),
            PoolRef::Borrowed(_) => log::trace!("Ignoring destroy() on a borrowed atlas set"),
        }
    }
}

impl Drop for SurfaceAtlasSet {
    fn drop(&mut self) {
        if let PoolRef::Owned(pool) = &self.pool {
            if let Ok(mut pool) = pool.try_borrow_mut() {
                pool.destroy();
            }
        }
    }
}

impl std::fmt::Debug for SurfaceAtlasSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceAtlasSet")
            .field("owner", &self.is_owner())
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::{HeadlessResourceFactory, HeadlessSurface};

    fn factory() -> Rc<HeadlessResourceFactory> {
        Rc::new(HeadlessResourceFactory::new())
    }

    fn set_with(config: SurfaceAtlasSetConfig) -> SurfaceAtlasSet {
        SurfaceAtlasSet::new(config, factory()).expect("valid config")
    }

    fn size(width: u32, height: u32) -> AtlasSize {
        AtlasSize { width, height }
    }

    fn small_config() -> SurfaceAtlasSetConfig {
        SurfaceAtlasSetConfig::new()
            .with_initial_atlas_size(64, 64)
            .with_max_atlas_size(64, 64)
            .with_max_atlas_num(2)
            .with_slot_padding(0)
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = SurfaceAtlasSet::new(small_config().with_max_atlas_num(0), factory());
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_size_exceeded() {
        let set = set_with(small_config());
        assert!(matches!(
            set.allocate(0, 10),
            Err(CacheError::SizeExceeded { width: 0, .. })
        ));
        assert!(matches!(
            set.allocate(65, 10),
            Err(CacheError::SizeExceeded { max_width: 64, .. })
        ));
        assert!(matches!(
            set.allocate(10, 65),
            Err(CacheError::SizeExceeded { max_height: 64, .. })
        ));
        assert_eq!(set.atlas_count(), 0);
    }

    #[test]
    fn test_atlases_are_created_lazily_and_in_order() {
        let factory = factory();
        let set = SurfaceAtlasSet::new(small_config(), factory.clone()).expect("set");
        assert_eq!(factory.created_count(), 0);

        let first = set.allocate(64, 64).expect("first");
        let second = set.allocate(64, 64).expect("second");
        assert_eq!(set.slot(first).map(|s| s.atlas_index), Some(0));
        assert_eq!(set.slot(second).map(|s| s.atlas_index), Some(1));
        assert_eq!(factory.created_count(), 2);
    }

    #[test]
    fn test_eviction_prefers_stale_then_rarely_used_then_oldest() {
        let set = set_with(small_config().with_max_atlas_num(1));
        let a = set.allocate(32, 32).expect("a");
        let b = set.allocate(32, 32).expect("b");
        let c = set.allocate(32, 32).expect("c");
        let d = set.allocate(32, 32).expect("d");

        set.tick();
        set.touch(a);
        set.touch(c);
        set.touch(d);
        set.touch(d);

        // b was not used this frame
        let e = set.allocate(32, 32).expect("e");
        assert!(set.slot(b).is_none());

        // a and c tie on recency and use count, a is older
        set.touch(e);
        let f = set.allocate(32, 32).expect("f");
        assert!(set.slot(a).is_none());
        assert!(set.slot(c).is_some());
        assert!(set.slot(d).is_some());
        assert!(set.slot(f).is_some());
        assert_eq!(set.stats().evictions, 2);
    }

    #[test]
    fn test_eviction_stays_within_one_atlas() {
        let set = set_with(small_config());
        let first: Vec<_> = (0..4).map(|_| set.allocate(32, 32).expect("first atlas")).collect();
        let second: Vec<_> = (0..4).map(|_| set.allocate(32, 32).expect("second atlas")).collect();
        assert!(second.iter().all(|key| set.slot(*key).map(|s| s.atlas_index) == Some(1)));

        // Recency alternates between the two atlases
        for (a, b) in first.iter().zip(&second) {
            set.tick();
            set.touch(*a);
            set.touch(*b);
        }

        let whole = set.allocate(64, 64).expect("whole atlas");
        assert_eq!(set.slot(whole).map(|s| s.atlas_index), Some(0));
        assert!(first.iter().all(|key| set.slot(*key).is_none()));
        assert!(second.iter().all(|key| set.slot(*key).is_some()));
        assert_eq!(set.stats().evictions, 4);
    }

    #[test]
    fn test_eviction_prefers_atlas_with_stale_slots() {
        let set = set_with(small_config());
        let first: Vec<_> = (0..4).map(|_| set.allocate(32, 32).expect("first atlas")).collect();
        let second: Vec<_> = (0..4).map(|_| set.allocate(32, 32).expect("second atlas")).collect();

        set.tick();
        for key in &first {
            set.touch(*key);
        }
        set.touch(second[1]);

        // second[0] is the stalest slot and frees enough room alone
        let extra = set.allocate(32, 32).expect("extra");
        assert_eq!(set.slot(extra).map(|s| s.atlas_index), Some(1));
        assert!(set.slot(second[0]).is_none());
        assert!(first.iter().chain(&second[1..]).all(|key| set.slot(*key).is_some()));
        assert_eq!(set.stats().evictions, 1);
    }

    #[test]
    fn test_eviction_replaces_atlas_too_small_after_growth() {
        let config = SurfaceAtlasSetConfig::new()
            .with_initial_atlas_size(32, 32)
            .with_max_atlas_size(128, 128)
            .with_max_atlas_num(1)
            .with_slot_padding(0);
        let set = set_with(config);
        let small = set.allocate(16, 16).expect("small");
        assert_eq!(set.get_atlas_used_size(), size(32, 32));

        let big = set.allocate(100, 40).expect("big");
        assert!(set.slot(small).is_none());
        assert_eq!(set.get_atlas_used_size(), size(128, 64));
        let slot = set.slot(big).expect("big slot");
        assert_eq!(slot.atlas_index, 0);
        let surface = set.atlas_surface(0).expect("atlas");
        assert_eq!((surface.width(), surface.height()), (128, 64));
    }

    #[test]
    fn test_empty_atlas_is_replaced_instead_of_evicting() {
        let config = SurfaceAtlasSetConfig::new()
            .with_initial_atlas_size(32, 32)
            .with_max_atlas_size(64, 64)
            .with_max_atlas_num(1)
            .with_slot_padding(0);
        let set = set_with(config);
        let slot = set.allocate(16, 16).expect("small");
        assert!(set.release(slot));
        assert!(!set.release(slot));

        let big = set.allocate(48, 48).expect("big");
        assert_eq!(set.slot(big).map(|s| s.atlas_index), Some(0));
        assert_eq!(set.stats().evictions, 0);
        assert_eq!(set.atlas_count(), 1);
    }

    /// Hands out surfaces smaller than requested
    struct UndersizedFactory;

    impl ResourceFactory for UndersizedFactory {
        fn create_surface(&self, _width: u32, _height: u32) -> Box<dyn Surface> {
            Box::new(HeadlessSurface::new(16, 16))
        }
    }

    #[test]
    fn test_capacity_exhausted_when_eviction_cannot_help() {
        let config = SurfaceAtlasSetConfig::new()
            .with_initial_atlas_size(32, 32)
            .with_max_atlas_size(32, 32)
            .with_max_atlas_num(1);
        let set = SurfaceAtlasSet::new(config, Rc::new(UndersizedFactory)).expect("set");
        let kept = set.allocate(8, 8).expect("fits the undersized atlas");

        let result = set.allocate(20, 20);
        let exhausted = CacheError::CapacityExhausted {
            width: 20,
            height: 20,
            max_atlas_num: 1,
        };
        assert_eq!(result, Err(exhausted));
        assert!(set.slot(kept).is_none());
        assert_eq!(set.stats().evictions, 1);
    }

    #[test]
    fn test_release_and_touch_unknown_key() {
        let set = set_with(small_config());
        let key = set.allocate(8, 8).expect("key");
        assert!(set.release(key));
        assert!(!set.touch(key));
        assert!(set.slot(key).is_none());
        assert_eq!(set.stats().slot_count, 0);
    }

    #[test]
    fn test_destroyed_pool_refuses_allocation() {
        let set = set_with(small_config());
        let key = set.allocate(8, 8).expect("key");
        set.destroy();
        set.destroy();
        assert!(set.is_destroyed());
        assert!(set.slot(key).is_none());
        assert!(matches!(set.allocate(8, 8), Err(CacheError::TypeMismatch { .. })));
        assert!(set.atlas_surface(0).expect("kept for inspection").destroyed());
    }

    #[test]
    fn test_with_atlas_renderer_unknown_index() {
        let set = set_with(small_config());
        let result = set.with_atlas_renderer(3, |_| ());
        assert!(matches!(result, Err(CacheError::TypeMismatch { expected: "atlas index", .. })));
    }

    #[test]
    fn test_dropping_owner_destroys_shared_pool() {
        let owner = set_with(small_config());
        let shared = owner.share();
        shared.allocate(8, 8).expect("allocate through shared handle");
        assert!(owner.same_pool(&shared));
        assert!(!shared.is_owner());

        drop(owner);
        assert!(shared.is_destroyed());
        assert!(shared.atlas_surface(0).expect("atlas").destroyed());
    }
}
