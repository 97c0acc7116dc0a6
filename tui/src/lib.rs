//! TUI rendering for Digitpad using ratatui.

mod canvas;
mod input;
mod panel;
mod theme;

pub use canvas::{ascii_lines, fit_grid, inked_dots};
pub use input::{InputPump, apply_event, cell_center, handle_events, pointer_event};
pub use panel::{bar_row, face_lines};
pub use theme::{Glyphs, Palette, glyphs, palette, styles};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use digitpad_engine::{App, HitBox, SURFACE_HEIGHT, SURFACE_WIDTH, SurfaceOffset, ToastLevel};

pub const TITLE: &str = "Digit Recognizer";
pub const SUBTITLE: &str = "Draw a digit and see if the model can recognize it";
pub const CLEAR_LABEL: &str = "[ Clear ]";
/// Drawing guidance shown under the surface.
pub const HINT: &str = "draw big and centered, release to predict";

const PANEL_MIN_WIDTH: u16 = 28;
const BARS_HEIGHT: u16 = 12;
const MAX_TOASTS: usize = 3;

/// Main draw function.
///
/// Publishes the surface and Clear button positions back to the app so
/// pointer events can be hit-tested against what is on screen.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);

    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(1),    // Body
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], &palette);

    let body = chunks[1];
    let canvas_budget = Rect {
        width: body.width.saturating_sub(PANEL_MIN_WIDTH + 1).saturating_sub(2),
        height: body.height.saturating_sub(2 + 2),
        ..body
    };
    let (cols, rows) = fit_grid(canvas_budget);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(cols + 2),
            Constraint::Length(1),
            Constraint::Min(PANEL_MIN_WIDTH.min(body.width)),
        ])
        .split(body);

    draw_drawing_column(frame, app, columns[0], cols, rows, &palette, &glyphs);
    draw_panel_column(frame, app, columns[2], &palette, &glyphs);
    draw_status_bar(frame, app, chunks[2], &palette, &glyphs);
    draw_toasts(frame, app, chunks[1], &palette);
}

fn draw_header(frame: &mut Frame, area: Rect, palette: &Palette) {
    let lines = vec![
        Line::from(Span::styled(TITLE, styles::title(palette))),
        Line::from(Span::styled(
            SUBTITLE,
            Style::default().fg(palette.text_secondary),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn draw_drawing_column(
    frame: &mut Frame,
    app: &mut App,
    area: Rect,
    cols: u16,
    rows: u16,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::border(palette));
    let frame_area = Rect {
        x: area.x,
        y: area.y,
        width: (cols + 2).min(area.width),
        height: (rows + 2).min(area.height),
    };
    let surface_area = block.inner(frame_area);
    frame.render_widget(block, frame_area);

    app.set_surface_layout(SurfaceOffset::fitted(
        f32::from(surface_area.x),
        f32::from(surface_area.y),
        f32::from(surface_area.width),
        f32::from(surface_area.height),
        SURFACE_WIDTH,
        SURFACE_HEIGHT,
    ));
    canvas::draw_surface(
        frame,
        app.surface().bitmap(),
        surface_area,
        palette,
        app.ui_options().ascii_only,
    );

    let below = frame_area.y + frame_area.height;
    let bottom = area.y + area.height;
    if below < bottom {
        let hint = Line::from(vec![
            Span::styled(glyphs.bullet, styles::key_hint(palette)),
            Span::raw(" "),
            Span::styled(HINT, styles::key_hint(palette)),
        ]);
        frame.render_widget(
            Paragraph::new(hint),
            Rect::new(area.x, below, area.width, 1),
        );
    }

    let button_row = below + 1;
    if button_row < bottom {
        let width = (CLEAR_LABEL.len() as u16).min(area.width);
        let button = Rect::new(area.x, button_row, width, 1);
        frame.render_widget(
            Paragraph::new(Span::styled(CLEAR_LABEL, styles::button(palette))),
            button,
        );
        app.set_clear_button(Some(HitBox {
            left: f32::from(button.x),
            top: f32::from(button.y),
            width: f32::from(button.width),
            height: f32::from(button.height),
        }));
    } else {
        app.set_clear_button(None);
    }
}

fn draw_panel_column(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(BARS_HEIGHT),
            Constraint::Min(0),
        ])
        .split(area);

    let prediction = app.prediction();
    panel::draw_prediction(frame, prediction, rows[0], palette);
    panel::draw_bars(frame, prediction, rows[1], palette, glyphs);

    if app.is_loading() {
        let covered = Rect {
            height: rows[0].height + rows[1].height,
            ..rows[0]
        };
        panel::draw_loader(frame, app.loader_frame(), covered, palette, glyphs);
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let line = Line::from(vec![
        Span::styled(app.endpoint().to_string(), styles::key_hint(palette)),
        Span::styled(format!("  {}  ", glyphs.bullet), styles::key_hint(palette)),
        Span::styled("c", styles::key_highlight(palette)),
        Span::styled(" clear  ", styles::key_hint(palette)),
        Span::styled("q", styles::key_highlight(palette)),
        Span::styled(" quit", styles::key_hint(palette)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_toasts(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let mut bottom = area.y + area.height;
    for toast in app.toasts().iter().rev().take(MAX_TOASTS) {
        let width = (toast.text().chars().count() as u16 + 4).min(area.width);
        if bottom < area.y + 3 || width == 0 {
            break;
        }
        let rect = Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: bottom - 3,
            width,
            height: 3,
        };
        let color = match toast.level() {
            ToastLevel::Error => palette.error,
            ToastLevel::Info => palette.info,
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(palette.bg_panel));
        let text = Span::styled(
            toast.text().to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        );
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block),
            rect,
        );
        bottom -= 3;
    }
}
