//! Entity geometry, state and change notification
//!
//! [`EntityCore`] is the part of a scene entity the cache layer needs:
//! where the entity is, how big it is, how it is transformed, and who to tell
//! when it changes. Scene-graph structure lives with the host.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::math::{utils, CommonOffset, CommonRect, Matrix};
use crate::render::ResourceFactory;

use super::state::EntityStateFlags;

/// Entity identifier passed to the modified sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Callback notified whenever an entity's appearance changes
pub type ModifiedSink = Box<dyn FnMut(EntityId)>;

/// Geometry, state flags and collaborators shared by every entity kind
pub struct EntityCore {
    id: EntityId,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    scale_x: f64,
    scale_y: f64,
    angle: f64,
    anchor_x: f64,
    anchor_y: f64,
    flags: EntityStateFlags,
    matrix: Cell<Option<Matrix>>,
    factory: Rc<dyn ResourceFactory>,
    on_modified: Option<ModifiedSink>,
    destroyed: bool,
}

impl EntityCore {
    /// Create an empty entity at the origin with unit scale
    pub fn new(factory: Rc<dyn ResourceFactory>) -> Self {
        Self {
            id: EntityId::next(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            anchor_x: 0.0,
            anchor_y: 0.0,
            flags: EntityStateFlags::empty(),
            matrix: Cell::new(None),
            factory,
            on_modified: None,
            destroyed: false,
        }
    }

    /// Builder pattern: Set position
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Builder pattern: Set size
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Builder pattern: Set the modified sink
    pub fn with_modified_sink(mut self, sink: impl FnMut(EntityId) + 'static) -> Self {
        self.on_modified = Some(Box::new(sink));
        self
    }

    /// Entity identifier
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Factory used for cache surfaces
    pub fn factory(&self) -> &Rc<dyn ResourceFactory> {
        &self.factory
    }

    /// Replace the modified sink
    pub fn set_modified_sink(&mut self, sink: Option<ModifiedSink>) {
        self.on_modified = sink;
    }

    /// Current state flags
    pub fn flags(&self) -> EntityStateFlags {
        self.flags
    }

    /// Set or clear state flags without notifying anyone
    pub fn set_flags(&mut self, flags: EntityStateFlags, enabled: bool) {
        self.flags.set(flags, enabled);
    }

    /// Mark the entity as visually changed and notify the sink
    pub fn modified(&mut self) {
        self.flags.insert(EntityStateFlags::MODIFIED);
        if let Some(sink) = self.on_modified.as_mut() {
            sink(self.id);
        }
    }

    /// Clear the modified flag, returning whether it was set
    pub fn take_modified(&mut self) -> bool {
        let was_modified = self.flags.contains(EntityStateFlags::MODIFIED);
        self.flags.remove(EntityStateFlags::MODIFIED);
        was_modified
    }

    /// Whether the entity is skipped during rendering
    pub fn hidden(&self) -> bool {
        self.flags.contains(EntityStateFlags::HIDDEN)
    }

    /// Hide or show the entity
    pub fn set_hidden(&mut self, hidden: bool) {
        if self.hidden() != hidden {
            self.flags.set(EntityStateFlags::HIDDEN, hidden);
            self.modified();
        }
    }

    /// Horizontal position
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Vertical position
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Logical width
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Logical height
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Horizontal scale
    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    /// Vertical scale
    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    /// Rotation in degrees, clockwise-positive
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Horizontal anchor, as a fraction of the width
    pub fn anchor_x(&self) -> f64 {
        self.anchor_x
    }

    /// Vertical anchor, as a fraction of the height
    pub fn anchor_y(&self) -> f64 {
        self.anchor_y
    }

    /// Move the entity
    pub fn set_position(&mut self, x: f64, y: f64) {
        if self.x != x || self.y != y {
            self.x = x;
            self.y = y;
            self.geometry_changed();
        }
    }

    /// Resize the entity.
    ///
    /// The cache is not invalidated; callers that need the new size painted
    /// invalidate explicitly.
    pub fn set_size(&mut self, width: f64, height: f64) {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.geometry_changed();
        }
    }

    /// Set the width
    pub fn set_width(&mut self, width: f64) {
        self.set_size(width, self.height);
    }

    /// Set the height
    pub fn set_height(&mut self, height: f64) {
        self.set_size(self.width, height);
    }

    /// Set the scale factors
    pub fn set_scale(&mut self, scale_x: f64, scale_y: f64) {
        if self.scale_x != scale_x || self.scale_y != scale_y {
            self.scale_x = scale_x;
            self.scale_y = scale_y;
            self.geometry_changed();
        }
    }

    /// Set the rotation in degrees
    pub fn set_angle(&mut self, angle: f64) {
        if self.angle != angle {
            self.angle = angle;
            self.geometry_changed();
        }
    }

    /// Set the anchor, as fractions of the size
    pub fn set_anchor(&mut self, anchor_x: f64, anchor_y: f64) {
        if self.anchor_x != anchor_x || self.anchor_y != anchor_y {
            self.anchor_x = anchor_x;
            self.anchor_y = anchor_y;
            self.geometry_changed();
        }
    }

    fn geometry_changed(&mut self) {
        self.matrix.set(None);
        self.modified();
    }

    /// Local-to-parent transform, recomputed lazily after geometry changes
    pub fn matrix(&self) -> Matrix {
        if let Some(matrix) = self.matrix.get() {
            return matrix;
        }
        let mut matrix = Matrix::identity();
        matrix.update(
            self.width,
            self.height,
            self.scale_x,
            self.scale_y,
            self.angle,
            self.x,
            self.y,
            self.anchor_x,
            self.anchor_y,
        );
        self.matrix.set(Some(matrix));
        matrix
    }

    /// Map a parent-space point into entity-local space
    pub fn parent_to_local(&self, point: CommonOffset) -> CommonOffset {
        let mut inverse = Matrix::identity();
        inverse.update_by_inverse(
            self.width,
            self.height,
            self.scale_x,
            self.scale_y,
            self.angle,
            self.x,
            self.y,
            self.anchor_x,
            self.anchor_y,
        );
        inverse.multiply_point(point)
    }

    /// Axis-aligned bounds of the transformed entity in parent space
    pub fn calculate_bounding_rect(&self) -> CommonRect {
        let matrix = self.matrix();
        let corners = [
            CommonOffset::new(0.0, 0.0),
            CommonOffset::new(self.width, 0.0),
            CommonOffset::new(0.0, self.height),
            CommonOffset::new(self.width, self.height),
        ];
        CommonRect::enclosing(corners.into_iter().map(|corner| matrix.multiply_point(corner)))
            .unwrap_or_default()
    }

    /// Size rounded up to whole pixels, as used for cache surfaces
    pub fn pixel_size(&self) -> (u32, u32) {
        (utils::ceil_to_pixels(self.width), utils::ceil_to_pixels(self.height))
    }

    /// Whether [`EntityCore::destroy`] has run
    pub fn destroyed(&self) -> bool {
        self.destroyed
    }

    /// Detach from the host. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.on_modified = None;
        log::debug!("Destroyed entity {:?}", self.id);
    }
}

impl fmt::Debug for EntityCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityCore")
            .field("id", &self.id)
            .field("position", &(self.x, self.y))
            .field("size", &(self.width, self.height))
            .field("scale", &(self.scale_x, self.scale_y))
            .field("angle", &self.angle)
            .field("anchor", &(self.anchor_x, self.anchor_y))
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
