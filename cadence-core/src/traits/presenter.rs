//! Presenter trait for rendering classification output

use crate::health::HealthStatus;
use crate::inference::Label;

/// Placement on the output surface (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point {
    pub x: i8,
    pub y: i8,
}

impl Point {
    /// Create a point
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }
}

/// Output surface for labels, images and status
///
/// Fire-and-forget: implementations swallow their own transport errors.
/// The pipeline never relies on a presenter call succeeding.
pub trait Presenter {
    /// Clear the output surface
    fn clear(&mut self);

    /// Render a label's name at a position
    fn show_label(&mut self, label: Label, at: Point);

    /// Render a raw image at a position
    fn show_image(&mut self, image: &[u8], at: Point);

    /// Render the pipeline health indicator
    ///
    /// Default implementation ignores the status.
    fn show_status(&mut self, _status: HealthStatus, _at: Point) {}
}
