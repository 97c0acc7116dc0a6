//! Freehand drawing surface.
//!
//! A fixed-size grayscale bitmap that starts white and receives black,
//! round-capped strokes. Gestures are reported in page coordinates and
//! mapped into bitmap pixels through the current [`SurfaceOffset`].
//!
//! The surface has no timer and no network access; finishing a stroke is
//! reported to the caller as [`GestureOutcome::StrokeFinished`] and the
//! caller decides when to take a [`Snapshot`].

use thiserror::Error;

use digitpad_types::{
    PagePosition, SURFACE_HEIGHT, SURFACE_WIDTH, Snapshot, SurfaceOffset, SurfacePoint,
};

pub const INK: u8 = 0;
pub const PAPER: u8 = 255;

/// Pointer payload as delivered by the host.
///
/// Touch hosts report every changed contact; only the first is used.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureInput {
    Mouse(PagePosition),
    Touch { changed_touches: Vec<PagePosition> },
}

impl GestureInput {
    #[must_use]
    pub fn mouse(x: f32, y: f32) -> Self {
        Self::Mouse(PagePosition::new(x, y))
    }

    /// The contact that drives the stroke, if the event carries one.
    #[must_use]
    pub fn position(&self) -> Option<PagePosition> {
        match self {
            Self::Mouse(position) => Some(*position),
            Self::Touch { changed_touches } => changed_touches.first().copied(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Event had no effect on the surface.
    Ignored,
    /// A stroke started or grew.
    Drawing,
    /// The active stroke ended; the bitmap is ready to be exported.
    StrokeFinished,
}

impl GestureOutcome {
    /// Whether the host should swallow the event instead of scrolling or
    /// selecting.
    #[must_use]
    pub fn suppresses_default(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] png::EncodingError),
}

// ============================================================================
// Bitmap
// ============================================================================

/// 8-bit grayscale raster, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    #[must_use]
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![PAPER; width as usize * height as usize],
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(self.index(x, y)).copied()
    }

    #[must_use]
    pub fn is_inked(&self, x: u32, y: u32) -> bool {
        self.pixel(x, y).is_some_and(|value| value < 128)
    }

    #[must_use]
    pub fn ink_count(&self) -> usize {
        self.pixels.iter().filter(|value| **value < 128).count()
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|value| *value == PAPER)
    }

    pub fn fill(&mut self, value: u8) {
        self.pixels.fill(value);
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Paint a capsule: every pixel whose center lies within `radius` of
    /// the segment `a`-`b`. A zero-length segment paints a disc.
    pub fn stamp_segment(&mut self, a: SurfacePoint, b: SurfacePoint, radius: f32, value: u8) {
        if radius <= 0.0 || self.width == 0 || self.height == 0 {
            return;
        }
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        let left = (a.x.min(b.x) - radius).floor().clamp(0.0, max_x);
        let right = (a.x.max(b.x) + radius).ceil().clamp(0.0, max_x);
        let top = (a.y.min(b.y) - radius).floor().clamp(0.0, max_y);
        let bottom = (a.y.max(b.y) + radius).ceil().clamp(0.0, max_y);
        // Entire capsule lies off one edge.
        if a.x.max(b.x) + radius < 0.0
            || a.y.max(b.y) + radius < 0.0
            || a.x.min(b.x) - radius > max_x + 1.0
            || a.y.min(b.y) - radius > max_y + 1.0
        {
            return;
        }

        let radius_sq = radius * radius;
        for y in (top as u32)..=(bottom as u32) {
            for x in (left as u32)..=(right as u32) {
                let center = SurfacePoint::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_sq_to_segment(center, a, b) <= radius_sq {
                    let index = self.index(x, y);
                    self.pixels[index] = value;
                }
            }
        }
    }

    /// Encode as an 8-bit grayscale PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, png::EncodingError> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Grayscale);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.pixels)?;
            writer.finish()?;
        }
        Ok(out)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("ink", &self.ink_count())
            .finish()
    }
}

fn distance_sq_to_segment(p: SurfacePoint, a: SurfacePoint, b: SurfacePoint) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0)
    };
    let dx = p.x - (a.x + t * abx);
    let dy = p.y - (a.y + t * aby);
    dx * dx + dy * dy
}

// ============================================================================
// DrawingSurface
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct ActiveStroke {
    last: SurfacePoint,
}

/// Bitmap plus the in-progress stroke.
#[derive(Debug, Clone)]
pub struct DrawingSurface {
    bitmap: Bitmap,
    offset: SurfaceOffset,
    stroke_width: f32,
    active: Option<ActiveStroke>,
}

impl DrawingSurface {
    #[must_use]
    pub fn new(stroke_width: f32) -> Self {
        Self {
            bitmap: Bitmap::blank(SURFACE_WIDTH, SURFACE_HEIGHT),
            offset: SurfaceOffset::identity(SURFACE_WIDTH, SURFACE_HEIGHT),
            stroke_width,
            active: None,
        }
    }

    #[must_use]
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    #[must_use]
    pub fn offset(&self) -> SurfaceOffset {
        self.offset
    }

    /// Re-measure where the surface sits on the page.
    pub fn set_offset(&mut self, offset: SurfaceOffset) {
        self.offset = offset;
    }

    #[must_use]
    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    /// Whether the event lands on the surface.
    #[must_use]
    pub fn hit(&self, input: &GestureInput) -> bool {
        input
            .position()
            .is_some_and(|position| self.offset.contains(position))
    }

    /// Begin a new stroke at the event position.
    ///
    /// A start while already drawing discards the old path and begins again.
    pub fn on_gesture_start(&mut self, input: &GestureInput) -> GestureOutcome {
        let Some(point) = self.map(input) else {
            return GestureOutcome::Ignored;
        };
        self.bitmap.stamp_segment(point, point, self.stroke_width / 2.0, INK);
        self.active = Some(ActiveStroke { last: point });
        GestureOutcome::Drawing
    }

    /// Extend the active stroke to the event position.
    pub fn on_gesture_move(&mut self, input: &GestureInput) -> GestureOutcome {
        let Some(active) = self.active.as_mut() else {
            return GestureOutcome::Ignored;
        };
        let Some(position) = input.position() else {
            return GestureOutcome::Ignored;
        };
        let point = self.offset.to_surface(position);
        self.bitmap.stamp_segment(active.last, point, self.stroke_width / 2.0, INK);
        active.last = point;
        GestureOutcome::Drawing
    }

    /// Finish the active stroke. Ending without one is a no-op.
    pub fn on_gesture_end(&mut self) -> GestureOutcome {
        if self.active.take().is_some() {
            GestureOutcome::StrokeFinished
        } else {
            GestureOutcome::Ignored
        }
    }

    /// Repaint white and abandon any stroke in progress.
    pub fn clear(&mut self) {
        self.bitmap.fill(PAPER);
        self.active = None;
    }

    /// Encode the current bitmap. Pure with respect to the surface.
    pub fn snapshot(&self) -> Result<Snapshot, SnapshotError> {
        let png = self.bitmap.encode_png()?;
        Ok(Snapshot::from_png(&png))
    }

    fn map(&self, input: &GestureInput) -> Option<SurfacePoint> {
        input
            .position()
            .map(|position| self.offset.to_surface(position))
    }
}
