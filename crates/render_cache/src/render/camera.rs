//! # 2D Camera
//!
//! Cameras matter to the render cache only through their identity: a cached
//! bitmap filled for one camera is stale for every other camera, even one with
//! identical numeric fields. [`CameraId`] makes that identity explicit.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::math::{CommonOffset, Matrix};

use super::renderer::Renderer;

/// Opaque camera identity used for cache validity checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraId(u64);

impl CameraId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// 2D camera looking at a region of the scene
///
/// The camera is deliberately not `Clone`: a copy would share the identity of
/// the original and cached entities could not tell the two views apart. Use
/// [`Camera::duplicate`] to get a numerically equal camera with a fresh identity.
#[derive(Debug)]
pub struct Camera {
    id: CameraId,

    /// Horizontal position of the anchor point in scene space
    pub x: f64,

    /// Vertical position of the anchor point in scene space
    pub y: f64,

    /// Viewport width
    pub width: f64,

    /// Viewport height
    pub height: f64,

    /// Horizontal zoom factor
    pub scale_x: f64,

    /// Vertical zoom factor
    pub scale_y: f64,

    /// Rotation in degrees, clockwise-positive
    pub angle: f64,

    /// Anchor as a fraction of the viewport size
    pub anchor_x: f64,

    /// Anchor as a fraction of the viewport size
    pub anchor_y: f64,
}

impl Camera {
    /// Create a camera with an identity view of a `width` x `height` viewport
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            id: CameraId::next(),
            x: 0.0,
            y: 0.0,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            anchor_x: 0.0,
            anchor_y: 0.0,
        }
    }

    /// Identity of this camera instance
    pub fn id(&self) -> CameraId {
        self.id
    }

    /// A camera with the same view parameters but a distinct identity
    pub fn duplicate(&self) -> Self {
        Self {
            id: CameraId::next(),
            ..*self
        }
    }

    /// Scene-to-viewport transform.
    ///
    /// The camera's own placement is inverted, so moving the camera right
    /// moves the scene left on screen.
    pub fn view_matrix(&self) -> Matrix {
        let mut matrix = Matrix::identity();
        matrix.update_by_inverse(
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
        matrix
    }

    /// Map a viewport point back into scene space
    pub fn viewport_to_scene(&self, point: CommonOffset) -> CommonOffset {
        self.view_matrix().multiply_inverse_for_point(point)
    }

    /// Apply the view transform to a renderer before drawing the scene
    pub fn apply_transform_to_renderer(&self, renderer: &mut dyn Renderer) {
        renderer.transform(&self.view_matrix());
        log::trace!("Camera {:?} applied view transform", self.id);
    }
}
