//! Color theme and glyphs for Digitpad TUI.
//!
//! Purple accent on a dark ink background, with an optional high-contrast
//! override.

use ratatui::style::{Color, Modifier, Style};

use digitpad_engine::UiOptions;

mod colors {
    use super::Color;

    // === Backgrounds ===
    pub const BG_DARK: Color = Color::Rgb(24, 20, 33);
    pub const BG_PANEL: Color = Color::Rgb(34, 28, 48);
    pub const BG_BORDER: Color = Color::Rgb(88, 74, 120);

    // === Drawing surface ===
    pub const PAPER: Color = Color::Rgb(245, 243, 250);
    pub const INK: Color = Color::Rgb(20, 18, 26);

    // === Foregrounds ===
    pub const TEXT_PRIMARY: Color = Color::Rgb(232, 226, 245);
    pub const TEXT_SECONDARY: Color = Color::Rgb(190, 180, 214);
    pub const TEXT_MUTED: Color = Color::Rgb(125, 116, 148);

    // === Brand ===
    pub const PRIMARY: Color = Color::Rgb(147, 51, 234);
    pub const PRIMARY_DIM: Color = Color::Rgb(107, 70, 170);
    pub const ACCENT: Color = Color::Rgb(192, 132, 252);

    pub const ERROR: Color = Color::Rgb(248, 113, 113);
    pub const INFO: Color = Color::Rgb(125, 211, 252);
}

/// Resolved theme palette used by the UI.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_dark: Color,
    pub bg_panel: Color,
    pub bg_border: Color,
    pub paper: Color,
    pub ink: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub accent: Color,
    pub error: Color,
    pub info: Color,
}

impl Palette {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            bg_dark: colors::BG_DARK,
            bg_panel: colors::BG_PANEL,
            bg_border: colors::BG_BORDER,
            paper: colors::PAPER,
            ink: colors::INK,
            text_primary: colors::TEXT_PRIMARY,
            text_secondary: colors::TEXT_SECONDARY,
            text_muted: colors::TEXT_MUTED,
            primary: colors::PRIMARY,
            primary_dim: colors::PRIMARY_DIM,
            accent: colors::ACCENT,
            error: colors::ERROR,
            info: colors::INFO,
        }
    }

    #[must_use]
    pub fn high_contrast() -> Self {
        Self {
            bg_dark: Color::Black,
            bg_panel: Color::Black,
            bg_border: Color::White,
            paper: Color::White,
            ink: Color::Black,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            text_muted: Color::Gray,
            primary: Color::Magenta,
            primary_dim: Color::Magenta,
            accent: Color::Yellow,
            error: Color::Red,
            info: Color::Cyan,
        }
    }
}

#[must_use]
pub fn palette(options: UiOptions) -> Palette {
    if options.high_contrast {
        Palette::high_contrast()
    } else {
        Palette::standard()
    }
}

/// ASCII/Unicode glyphs.
#[derive(Debug, Clone, Copy)]
pub struct Glyphs {
    pub bar_full: char,
    pub bar_empty: char,
    pub eye_open: &'static str,
    pub eye_closed: &'static str,
    pub bullet: &'static str,
}

#[must_use]
pub fn glyphs(options: UiOptions) -> Glyphs {
    if options.ascii_only {
        Glyphs {
            bar_full: '#',
            bar_empty: '-',
            eye_open: "o",
            eye_closed: "-",
            bullet: "*",
        }
    } else {
        Glyphs {
            bar_full: '█',
            bar_empty: '░',
            eye_open: "●",
            eye_closed: "─",
            bullet: "•",
        }
    }
}

/// Pre-defined styles for common UI elements.
pub mod styles {
    use super::{Modifier, Palette, Style};

    #[must_use]
    pub fn title(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn border(palette: &Palette) -> Style {
        Style::default().fg(palette.bg_border)
    }

    #[must_use]
    pub fn button(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.text_primary)
            .bg(palette.primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_hint(palette: &Palette) -> Style {
        Style::default().fg(palette.text_muted)
    }

    #[must_use]
    pub fn key_highlight(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use digitpad_engine::UiOptions;

    use super::{glyphs, palette};

    #[test]
    fn ascii_only_avoids_box_drawing() {
        let options = UiOptions {
            ascii_only: true,
            ..UiOptions::default()
        };
        let glyphs = glyphs(options);
        assert!(glyphs.bar_full.is_ascii());
        assert!(glyphs.bar_empty.is_ascii());
        assert!(glyphs.eye_open.is_ascii());
        assert!(glyphs.bullet.is_ascii());
    }

    #[test]
    fn high_contrast_uses_plain_colors() {
        let options = UiOptions {
            high_contrast: true,
            ..UiOptions::default()
        };
        assert_eq!(palette(options).ink, ratatui::style::Color::Black);
    }
}
