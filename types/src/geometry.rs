//! Coordinate spaces for gesture input.
//!
//! Input arrives in page coordinates (terminal cells, or client pixels for
//! other hosts). The drawing surface works in its own pixel space, so every
//! position is translated by subtracting the surface's on-page offset and
//! scaling into bitmap pixels.

/// A position in page (client) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PagePosition {
    pub x: f32,
    pub y: f32,
}

impl PagePosition {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A position in surface-local pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfacePoint {
    pub x: f32,
    pub y: f32,
}

impl SurfacePoint {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx.hypot(dy)
    }
}

/// Where the surface sits on the page and how page units map to pixels.
///
/// `scale_x`/`scale_y` are pixels per page unit. A browser-style host uses
/// `1.0`; the terminal host uses roughly `250 / cells` since one cell covers
/// many bitmap pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceOffset {
    pub left: f32,
    pub top: f32,
    /// Extent of the surface in page units.
    pub width: f32,
    pub height: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl SurfaceOffset {
    /// Identity layout: surface at the page origin, one page unit per pixel.
    #[must_use]
    pub fn identity(width: u32, height: u32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: width as f32,
            height: height as f32,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Layout for a surface drawn into a `width`×`height` page region at
    /// (`left`, `top`) that must cover a `pixels_w`×`pixels_h` bitmap.
    #[must_use]
    pub fn fitted(
        left: f32,
        top: f32,
        width: f32,
        height: f32,
        pixels_w: u32,
        pixels_h: u32,
    ) -> Self {
        let scale_x = if width > 0.0 { pixels_w as f32 / width } else { 1.0 };
        let scale_y = if height > 0.0 { pixels_h as f32 / height } else { 1.0 };
        Self {
            left,
            top,
            width,
            height,
            scale_x,
            scale_y,
        }
    }

    /// Translate a page position into surface-local pixels.
    #[must_use]
    pub fn to_surface(&self, position: PagePosition) -> SurfacePoint {
        SurfacePoint {
            x: (position.x - self.left) * self.scale_x,
            y: (position.y - self.top) * self.scale_y,
        }
    }

    /// Whether a page position falls on the surface.
    #[must_use]
    pub fn contains(&self, position: PagePosition) -> bool {
        position.x >= self.left
            && position.y >= self.top
            && position.x < self.left + self.width
            && position.y < self.top + self.height
    }
}
