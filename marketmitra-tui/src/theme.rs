//! Colour tokens for the MarketMitra dashboard.
//!
//! # Color Palette
//! - **Accent**: electric cyan (focus, headings)
//! - **Budget**: plot blue (Change_% series)
//! - **Market**: plot orange (Stock_Performance_% series)
//! - **Returns**: teal (returns-only chart)
//! - **Positive / Negative**: gains and losses in tables
//! - **Warning**: neon orange (config warnings, blocking messages)
//! - **Muted**: steel blue (hints, secondary text)

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub accent: Color,
    pub budget: Color,
    pub market: Color,
    pub returns: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub neutral: Color,
    pub muted: Color,
    pub text_primary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::onehorn()
    }
}

impl Theme {
    pub const fn onehorn() -> Self {
        Self {
            accent: Color::Rgb(0, 255, 255),
            budget: Color::Rgb(31, 119, 180),
            market: Color::Rgb(255, 127, 14),
            returns: Color::Rgb(0, 184, 148),
            positive: Color::Rgb(0, 255, 128),
            negative: Color::Rgb(255, 20, 147),
            warning: Color::Rgb(255, 140, 0),
            neutral: Color::Rgb(147, 112, 219),
            muted: Color::Rgb(100, 149, 237),
            text_primary: Color::White,
        }
    }

    /// Gains green, losses pink, zero counts as a gain.
    pub fn value_color(&self, value: f64) -> Color {
        if value >= 0.0 {
            self.positive
        } else {
            self.negative
        }
    }
}

const THEME: Theme = Theme::onehorn();

pub fn accent() -> Style {
    Style::default().fg(THEME.accent)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(THEME.muted)
}

pub fn neutral() -> Style {
    Style::default().fg(THEME.neutral)
}

pub fn warning() -> Style {
    Style::default().fg(THEME.warning)
}

pub fn negative() -> Style {
    Style::default().fg(THEME.negative)
}

pub fn text() -> Style {
    Style::default().fg(THEME.text_primary)
}

/// Green/pink by sign; muted when the value is absent.
pub fn value_style(value: Option<f64>) -> Style {
    match value {
        Some(v) => Style::default().fg(THEME.value_color(v)),
        None => muted(),
    }
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_colors() {
        let theme = Theme::default();
        assert_eq!(theme.value_color(12.5), theme.positive);
        assert_eq!(theme.value_color(-0.01), theme.negative);
        assert_eq!(theme.value_color(0.0), theme.positive);
    }

    #[test]
    fn absent_values_are_muted() {
        assert_eq!(value_style(None), muted());
        assert_eq!(value_style(Some(-3.0)).fg, Some(Theme::default().negative));
    }
}
