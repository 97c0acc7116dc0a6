//! Core domain types for Digitpad.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

mod geometry;
mod prediction;
mod snapshot;

pub use geometry::{PagePosition, SurfaceOffset, SurfacePoint};
pub use prediction::{
    DIGIT_CLASSES, Digit, DigitRangeError, PredictionResult, PredictionShapeError, RawPrediction,
    format_percentage,
};
pub use snapshot::{Snapshot, SnapshotDecodeError};

/// Width of the drawing surface in pixels.
pub const SURFACE_WIDTH: u32 = 250;
/// Height of the drawing surface in pixels.
pub const SURFACE_HEIGHT: u32 = 250;

/// UI configuration options derived from config/environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
    pub reduced_motion: bool,
}
