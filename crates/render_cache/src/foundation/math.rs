//! Math utilities and types
//!
//! Provides the 2D affine transform used to place cached bitmaps on screen,
//! together with the rectangle and point types that flow through bounding-box
//! calculations.

use approx::{AbsDiffEq, RelativeEq};

pub use nalgebra::Matrix3;

/// 3x3 homogeneous matrix type
pub type Mat3 = Matrix3<f64>;

/// A point in entity-local or screen space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CommonOffset {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl CommonOffset {
    /// Create a new offset
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle described by its edges
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CommonRect {
    /// Left edge
    pub left: f64,
    /// Top edge
    pub top: f64,
    /// Right edge
    pub right: f64,
    /// Bottom edge
    pub bottom: f64,
}

impl CommonRect {
    /// Create a rectangle from its edges
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Smallest rectangle enclosing every point, or `None` for an empty input
    pub fn enclosing(points: impl IntoIterator<Item = CommonOffset>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let init = Self::new(first.x, first.y, first.x, first.y);
        Some(points.fold(init, |rect, p| Self {
            left: rect.left.min(p.x),
            top: rect.top.min(p.y),
            right: rect.right.max(p.x),
            bottom: rect.bottom.max(p.y),
        }))
    }

    /// Rectangle width
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Rectangle height
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// 2D affine transform.
///
/// Stores the six coefficients `[a, b, c, d, e, f]` of
///
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
///
/// Angles are in degrees and positive angles rotate clockwise in the y-down
/// screen space the renderer works in. Anchors are fractions of the entity
/// size, not pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    values: [f64; 6],
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    /// Coefficients of the identity transform
    pub const IDENTITY: [f64; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

    /// Create an identity matrix
    pub const fn identity() -> Self {
        Self {
            values: Self::IDENTITY,
        }
    }

    /// Create a matrix from raw coefficients
    pub const fn from_values(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self {
            values: [a, b, c, d, e, f],
        }
    }

    /// Raw coefficients `[a, b, c, d, e, f]`
    pub const fn values(&self) -> &[f64; 6] {
        &self.values
    }

    /// Reset to a pure translation by `(x, y)`
    pub fn reset(&mut self, x: f64, y: f64) {
        self.values = [1.0, 0.0, 0.0, 1.0, x, y];
    }

    /// Whether the linear part is the identity, so applying the matrix only translates
    pub fn is_translation_only(&self) -> bool {
        let [a, b, c, d, _, _] = self.values;
        a == 1.0 && b == 0.0 && c == 0.0 && d == 1.0
    }

    /// Determinant of the linear part
    pub fn determinant(&self) -> f64 {
        let [a, b, c, d, _, _] = self.values;
        a * d - b * c
    }

    /// Recompute the matrix from entity geometry.
    ///
    /// Composes, outermost first: translate to `(x, y)`, rotate by `angle`
    /// degrees, scale by `(scale_x, scale_y)`, translate by
    /// `(-anchor_x * width, -anchor_y * height)`.
    ///
    /// # Arguments
    /// * `width`, `height` - Entity size, used to resolve the anchor
    /// * `scale_x`, `scale_y` - Scale factors
    /// * `angle` - Rotation in degrees, clockwise-positive
    /// * `x`, `y` - Position of the anchor point in parent space
    /// * `anchor_x`, `anchor_y` - Anchor as a fraction of the size
    pub fn update(
        &mut self,
        width: f64,
        height: f64,
        scale_x: f64,
        scale_y: f64,
        angle: f64,
        x: f64,
        y: f64,
        anchor_x: f64,
        anchor_y: f64,
    ) {
        let (sin, cos) = utils::deg_to_rad(angle).sin_cos();
        let a = cos * scale_x;
        let b = sin * scale_x;
        let c = sin * scale_y;
        let d = cos * scale_y;
        let w = anchor_x * width;
        let h = anchor_y * height;
        self.values = [a, b, -c, d, -w * a + h * c + x, -w * b - h * d + y];
    }

    /// Recompute the exact inverse of [`Matrix::update`] for the same arguments.
    ///
    /// Used to map screen coordinates back into entity-local space. A zero
    /// scale factor yields non-finite coefficients.
    pub fn update_by_inverse(
        &mut self,
        width: f64,
        height: f64,
        scale_x: f64,
        scale_y: f64,
        angle: f64,
        x: f64,
        y: f64,
        anchor_x: f64,
        anchor_y: f64,
    ) {
        let (sin, cos) = utils::deg_to_rad(angle).sin_cos();
        let a = cos / scale_x;
        let b = sin / scale_y;
        let c = sin / scale_x;
        let d = cos / scale_y;
        let w = anchor_x * width;
        let h = anchor_y * height;
        self.values = [a, -b, c, d, -a * x - c * y + w, b * x - d * y + h];
    }

    /// `self = self * other`, so `other` is applied first (child-then-parent)
    pub fn multiply(&mut self, other: &Self) {
        self.values = Self::compose(&self.values, &other.values);
    }

    /// `self = other * self`
    pub fn multiply_left(&mut self, other: &Self) {
        self.values = Self::compose(&other.values, &self.values);
    }

    /// Non-mutating `self * other`
    pub fn multiply_new(&self, other: &Self) -> Self {
        Self {
            values: Self::compose(&self.values, &other.values),
        }
    }

    /// Transform a point
    pub fn multiply_point(&self, point: CommonOffset) -> CommonOffset {
        let [a, b, c, d, e, f] = self.values;
        CommonOffset {
            x: a * point.x + c * point.y + e,
            y: b * point.x + d * point.y + f,
        }
    }

    /// Map a point through the inverse of this matrix without building it
    pub fn multiply_inverse_for_point(&self, point: CommonOffset) -> CommonOffset {
        let [a, b, c, d, e, f] = self.values;
        let det = self.determinant();
        CommonOffset {
            x: (d * point.x - c * point.y + (c * f - d * e)) / det,
            y: (-b * point.x + a * point.y + (b * e - a * f)) / det,
        }
    }

    /// Scale the output of this transform (`self = S(x, y) * self`)
    pub fn scale(&mut self, x: f64, y: f64) {
        let m = &mut self.values;
        m[0] *= x;
        m[1] *= y;
        m[2] *= x;
        m[3] *= y;
        m[4] *= x;
        m[5] *= y;
    }

    /// Convert to a homogeneous 3x3 matrix
    pub fn to_homogeneous(&self) -> Mat3 {
        let [a, b, c, d, e, f] = self.values;
        Mat3::new(
            a, c, e,
            b, d, f,
            0.0, 0.0, 1.0,
        )
    }

    /// Build from a homogeneous 3x3 matrix, ignoring the projective row
    pub fn from_homogeneous(m: &Mat3) -> Self {
        Self::from_values(m[(0, 0)], m[(1, 0)], m[(0, 1)], m[(1, 1)], m[(0, 2)], m[(1, 2)])
    }

    fn compose(lhs: &[f64; 6], rhs: &[f64; 6]) -> [f64; 6] {
        let [l0, l1, l2, l3, l4, l5] = *lhs;
        let [r0, r1, r2, r3, r4, r5] = *rhs;
        [
            l0 * r0 + l2 * r1,
            l1 * r0 + l3 * r1,
            l0 * r2 + l2 * r3,
            l1 * r2 + l3 * r3,
            l0 * r4 + l2 * r5 + l4,
            l1 * r4 + l3 * r5 + l5,
        ]
    }
}

impl AbsDiffEq for Matrix {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.values
            .iter()
            .zip(other.values.iter())
            .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl RelativeEq for Matrix {
    fn default_max_relative() -> f64 {
        f64::EPSILON
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.values
            .iter()
            .zip(other.values.iter())
            .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}

/// Math utility functions
pub mod utils {
    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f64) -> f64 {
        degrees.to_radians()
    }

    /// Round a logical size up to whole pixels, treating non-positive sizes as empty
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn ceil_to_pixels(size: f64) -> u32 {
        if size.is_finite() && size > 0.0 {
            size.ceil().min(f64::from(u32::MAX)) as u32
        } else {
            0
        }
    }
}
