//! Prediction panel: top digit, per-class bars and the loading face.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use digitpad_engine::{DIGIT_CLASSES, LoaderFrame, PredictionResult, bar_ratio, format_percentage};

use crate::theme::{Glyphs, Palette, styles};

/// Width reserved for the percentage column, e.g. ` 100.00%`.
const PERCENT_WIDTH: usize = 8;
/// Width of the digit label and the space after it.
const LABEL_WIDTH: usize = 2;

/// One bar row: `N ████░░░  95.00%`.
#[must_use]
pub fn bar_row(digit: usize, probability: f64, width: usize, glyphs: &Glyphs) -> String {
    let bar_width = width.saturating_sub(LABEL_WIDTH + PERCENT_WIDTH);
    let filled = (bar_ratio(probability) * bar_width as f64).round() as usize;
    let filled = filled.min(bar_width);
    let mut row = String::with_capacity(width * 3);
    row.push_str(&digit.to_string());
    row.push(' ');
    row.extend(std::iter::repeat_n(glyphs.bar_full, filled));
    row.extend(std::iter::repeat_n(glyphs.bar_empty, bar_width - filled));
    let percentage = format_percentage(probability);
    row.push_str(&format!("{percentage:>width$}", width = PERCENT_WIDTH));
    row
}

/// Face lines for the loading overlay.
#[must_use]
pub fn face_lines(frame: LoaderFrame, glyphs: &Glyphs) -> [String; 2] {
    let eye = if frame.eyes_open {
        glyphs.eye_open
    } else {
        glyphs.eye_closed
    };
    let mouth = format!("\\{}/", "_".repeat(1 + usize::from(frame.smile) * 2));
    [format!("{eye}   {eye}"), mouth]
}

pub(crate) fn draw_prediction(
    frame: &mut Frame,
    prediction: &PredictionResult,
    area: Rect,
    palette: &Palette,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::border(palette))
        .title(Span::styled(" Prediction ", styles::title(palette)));
    let digit = Span::styled(
        prediction.prediction_label(),
        Style::default()
            .fg(palette.text_primary)
            .add_modifier(Modifier::BOLD),
    );
    let paragraph = Paragraph::new(Line::from(digit))
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, area);
}

pub(crate) fn draw_bars(
    frame: &mut Frame,
    prediction: &PredictionResult,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::border(palette))
        .title(Span::styled(" Probabilities ", styles::title(palette)));
    let inner_width = usize::from(block.inner(area).width);

    let top = prediction.prediction().map(|digit| usize::from(digit.get()));
    let lines: Vec<Line> = prediction
        .probabilities()
        .iter()
        .enumerate()
        .take(DIGIT_CLASSES)
        .map(|(digit, probability)| {
            let style = if top == Some(digit) {
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.text_secondary)
            };
            Line::from(Span::styled(
                bar_row(digit, *probability, inner_width, glyphs),
                style,
            ))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

pub(crate) fn draw_loader(
    frame: &mut Frame,
    loader: LoaderFrame,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    // Dim everything underneath, then float the face over the middle.
    let dim = Style::default()
        .fg(palette.primary_dim)
        .add_modifier(Modifier::DIM);
    frame.render_widget(Block::default().style(dim), area);

    let width = 17_u16.min(area.width);
    let height = 6_u16.min(area.height);
    let overlay = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    };
    let [eyes, mouth] = face_lines(loader, glyphs);
    let face = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(Span::styled(eyes, face)),
        Line::from(Span::styled(mouth, face)),
        Line::from(Span::styled("Predicting...", styles::key_hint(palette))),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.primary))
        .style(Style::default().bg(palette.bg_panel));

    frame.render_widget(Clear, overlay);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block),
        overlay,
    );
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use digitpad_engine::UiOptions;

    use crate::theme::glyphs;

    fn ascii() -> Glyphs {
        glyphs(UiOptions {
            ascii_only: true,
            ..UiOptions::default()
        })
    }

    #[test]
    fn bar_row_fills_proportionally() {
        let row = bar_row(8, 0.95, 30, &ascii());
        assert_eq!(row, "8 ###################-  95.00%");
        assert_eq!(row.chars().count(), 30);
    }

    #[test]
    fn empty_bar_is_all_track() {
        let row = bar_row(0, 0.0, 20, &ascii());
        assert_eq!(row, "0 ----------   0.00%");
    }

    #[test]
    fn full_bar_fits_hundred_percent() {
        let row = bar_row(3, 1.0, 20, &ascii());
        assert_eq!(row, "3 ########## 100.00%");
    }

    #[test]
    fn narrow_area_keeps_label_and_percentage() {
        let row = bar_row(5, 0.5, 4, &ascii());
        assert_eq!(row, "5   50.00%");
    }

    #[test]
    fn face_blinks_and_smiles() {
        let open = face_lines(
            LoaderFrame {
                eyes_open: true,
                smile: 0,
            },
            &ascii(),
        );
        assert_eq!(open, ["o   o".to_string(), "\\_/".to_string()]);

        let closed = face_lines(
            LoaderFrame {
                eyes_open: false,
                smile: 2,
            },
            &ascii(),
        );
        assert_eq!(closed, ["-   -".to_string(), "\\_____/".to_string()]);
    }

    #[test]
    fn loader_dims_the_whole_panel() {
        let palette = Palette::standard();
        let glyphs = ascii();
        let mut terminal = Terminal::new(TestBackend::new(30, 15)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                draw_bars(frame, &PredictionResult::neutral(), area, &palette, &glyphs);
                draw_loader(frame, LoaderFrame::RESTING, area, &palette, &glyphs);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        // Bar row for digit 0, outside the face box, stays readable but dimmed.
        let corner = &buffer[(1, 1)];
        assert_eq!(corner.symbol(), "0");
        assert!(corner.modifier.contains(Modifier::DIM));
        assert_eq!(corner.fg, palette.primary_dim);

        let rendered: String = (0..15)
            .flat_map(|y| (0..30).map(move |x| (x, y)))
            .map(|(x, y)| buffer[(x, y)].symbol().to_string())
            .collect();
        assert!(rendered.contains("Predicting..."));
    }
}
