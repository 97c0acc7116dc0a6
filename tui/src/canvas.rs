//! Drawing surface rendered as Braille dots on a ratatui canvas.
//!
//! Each terminal cell shows a 2×4 block of dots; each dot samples the
//! bitmap pixel under its center. In ASCII mode a cell is either ink or
//! blank.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::symbols::Marker;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::widgets::canvas::{Canvas, Context, Points};

use digitpad_engine::Bitmap;

use crate::theme::Palette;

const DOTS_X: u32 = 2;
const DOTS_Y: u32 = 4;
const ASCII_INK: char = '#';

/// Largest square-looking cell grid that fits `available`.
///
/// Terminal cells are roughly twice as tall as wide, so the grid is twice
/// as many columns as rows.
#[must_use]
pub fn fit_grid(available: Rect) -> (u16, u16) {
    let rows = available.height.min(available.width / 2);
    (rows * 2, rows)
}

/// Whether the dot at (`gx`, `gy`) of a `dots_w`×`dots_h` grid covers ink.
fn dot_inked(bitmap: &Bitmap, gx: u32, gy: u32, dots_w: u32, dots_h: u32) -> bool {
    let x = ((gx * 2 + 1) * bitmap.width()) / (dots_w * 2);
    let y = ((gy * 2 + 1) * bitmap.height()) / (dots_h * 2);
    bitmap.is_inked(x, y)
}

/// Inked dots for a `cols`×`rows` cell grid in canvas coordinates: one unit
/// per dot, origin at the bottom-left.
#[must_use]
pub fn inked_dots(bitmap: &Bitmap, cols: u16, rows: u16) -> Vec<(f64, f64)> {
    let dots_w = u32::from(cols) * DOTS_X;
    let dots_h = u32::from(rows) * DOTS_Y;
    let mut dots = Vec::new();
    for gy in 0..dots_h {
        for gx in 0..dots_w {
            if dot_inked(bitmap, gx, gy, dots_w, dots_h) {
                dots.push((f64::from(gx), f64::from(dots_h - 1 - gy)));
            }
        }
    }
    dots
}

/// ASCII rendition: a cell is inked when any of its dots is.
#[must_use]
pub fn ascii_lines(bitmap: &Bitmap, cols: u16, rows: u16) -> Vec<String> {
    let dots_w = u32::from(cols) * DOTS_X;
    let dots_h = u32::from(rows) * DOTS_Y;
    (0..u32::from(rows))
        .map(|row| {
            (0..u32::from(cols))
                .map(|col| {
                    let inked = (0..DOTS_Y).any(|dy| {
                        (0..DOTS_X).any(|dx| {
                            dot_inked(bitmap, col * DOTS_X + dx, row * DOTS_Y + dy, dots_w, dots_h)
                        })
                    });
                    if inked { ASCII_INK } else { ' ' }
                })
                .collect()
        })
        .collect()
}

fn surface_canvas<'a>(
    dots: &'a [(f64, f64)],
    cols: u16,
    rows: u16,
    palette: &Palette,
) -> Canvas<'a, impl Fn(&mut Context<'_>) + 'a> {
    let ink = palette.ink;
    Canvas::default()
        .background_color(palette.paper)
        .marker(Marker::Braille)
        .x_bounds([0.0, f64::from(u32::from(cols) * DOTS_X - 1)])
        .y_bounds([0.0, f64::from(u32::from(rows) * DOTS_Y - 1)])
        .paint(move |ctx| {
            ctx.draw(&Points {
                coords: dots,
                color: ink,
            });
        })
}

pub(crate) fn draw_surface(
    frame: &mut Frame,
    bitmap: &Bitmap,
    area: Rect,
    palette: &Palette,
    ascii: bool,
) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    if ascii {
        let lines: Vec<Line> = ascii_lines(bitmap, area.width, area.height)
            .into_iter()
            .map(Line::from)
            .collect();
        let paper = Style::default().fg(palette.ink).bg(palette.paper);
        frame.render_widget(Paragraph::new(lines).style(paper), area);
        return;
    }
    let dots = inked_dots(bitmap, area.width, area.height);
    frame.render_widget(surface_canvas(&dots, area.width, area.height, palette), area);
}
