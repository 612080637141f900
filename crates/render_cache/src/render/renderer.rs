//! Drawing capability implemented by the host rendering backend

use crate::foundation::math::Matrix;

use super::surface::Surface;

/// Immediate-mode drawing context.
///
/// Cache code only ever draws by blitting surfaces; everything else
/// (shapes, text shaping, pixel formats) belongs to the backend.
pub trait Renderer {
    /// Start a batch of drawing into the target
    fn begin(&mut self);

    /// Finish the current batch
    fn end(&mut self);

    /// Clear the whole target to transparent
    fn clear(&mut self);

    /// Copy the `width` x `height` region at `(src_x, src_y)` of `source` to
    /// `(dest_x, dest_y)` in the current transform
    fn draw_image(
        &mut self,
        source: &dyn Surface,
        src_x: f64,
        src_y: f64,
        width: f64,
        height: f64,
        dest_x: f64,
        dest_y: f64,
    );

    /// Push the current transform state
    fn save(&mut self);

    /// Pop the most recently saved transform state
    fn restore(&mut self);

    /// Translate the current transform
    fn translate(&mut self, x: f64, y: f64);

    /// Multiply the current transform by `matrix`
    fn transform(&mut self, matrix: &Matrix);
}
