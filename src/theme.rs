use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub foreground: Color,
    pub foreground_dim: Color,
    pub border: Color,
    pub selection_bg: Color,
    pub primary: Color,
    pub error: Color,
    pub headline: Color,
    pub date: Color,
    pub source: Color,
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub spinner: Color,
}

impl Theme {
    pub fn for_variant(variant: ThemeVariant) -> Self {
        match variant {
            ThemeVariant::Dark => Self::dark(),
            ThemeVariant::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            foreground: Color::Rgb(0xe6, 0xe1, 0xdc),
            foreground_dim: Color::Rgb(0x8a, 0x84, 0x7e),
            border: Color::Rgb(0x4a, 0x44, 0x40),
            selection_bg: Color::Rgb(0x3a, 0x22, 0x22),
            primary: Color::Rgb(0xe0, 0x4e, 0x39),
            error: Color::Rgb(0xff, 0x6b, 0x6b),
            headline: Color::Rgb(0xf5, 0xf0, 0xea),
            date: Color::Rgb(0x9c, 0xa3, 0xaf),
            source: Color::Rgb(0x7d, 0xb4, 0xe6),
            status_bar_bg: Color::Rgb(0xe0, 0x4e, 0x39),
            status_bar_fg: Color::Rgb(0x14, 0x12, 0x10),
            spinner: Color::Rgb(0xf2, 0xc1, 0x4e),
        }
    }

    pub fn light() -> Self {
        Self {
            foreground: Color::Rgb(0x1f, 0x29, 0x37),
            foreground_dim: Color::Rgb(0x6b, 0x72, 0x80),
            border: Color::Rgb(0xd1, 0xd5, 0xdb),
            selection_bg: Color::Rgb(0xfe, 0xe2, 0xe2),
            primary: Color::Rgb(0xb9, 0x1c, 0x1c),
            error: Color::Rgb(0xdc, 0x26, 0x26),
            headline: Color::Rgb(0x0f, 0x17, 0x2a),
            date: Color::Rgb(0x64, 0x74, 0x8b),
            source: Color::Rgb(0x1e, 0x40, 0xaf),
            status_bar_bg: Color::Rgb(0xb9, 0x1c, 0x1c),
            status_bar_fg: Color::White,
            spinner: Color::Rgb(0xb4, 0x53, 0x09),
        }
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.foreground_dim)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn headline_style(&self) -> Style {
        Style::default()
            .fg(self.headline)
            .add_modifier(Modifier::BOLD)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
