//! Dark and light palettes, picked from config or the terminal background.

use ratatui::style::Color;
use xbridge_core::ThemeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Resolve the configured preference. `System` asks the terminal, which
    /// must happen before raw mode is enabled.
    pub fn resolve(preference: ThemeConfig) -> Self {
        match preference {
            ThemeConfig::Dark => Theme::Dark,
            ThemeConfig::Light => Theme::Light,
            ThemeConfig::System => Self::detect(),
        }
    }

    fn detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) => {
                let theme = Self::from_luma(luma);
                tracing::debug!("Terminal luma {:.2}, using {:?} theme", luma, theme);
                theme
            }
            Err(e) => {
                tracing::debug!("Terminal background unknown ({}), using dark theme", e);
                Theme::Dark
            }
        }
    }

    fn from_luma(luma: f32) -> Self {
        if luma > 0.5 { Theme::Light } else { Theme::Dark }
    }

    pub fn is_dark(&self) -> bool {
        *self == Theme::Dark
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Dark => Palette::dark(),
            Theme::Light => Palette::light(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub border: Color,
    pub muted: Color,
    pub primary: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    /// Highlighted list row.
    pub selection: Color,
    /// Sidebar markers.
    pub step_done: Color,
    pub step_active: Color,
    pub step_pending: Color,
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            fg: Color::White,
            bg: Color::Reset,
            border: Color::DarkGray,
            muted: Color::DarkGray,
            primary: Color::Cyan,
            accent: Color::Rgb(254, 192, 4),
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            selection: Color::LightBlue,
            step_done: Color::Green,
            step_active: Color::Rgb(254, 192, 4),
            step_pending: Color::Gray,
        }
    }

    pub fn light() -> Self {
        Self {
            fg: Color::Black,
            bg: Color::Reset,
            border: Color::Gray,
            muted: Color::Gray,
            primary: Color::Rgb(0, 110, 140),
            accent: Color::Rgb(176, 120, 0),
            success: Color::Rgb(0, 128, 0),
            warning: Color::Rgb(184, 134, 11),
            error: Color::Rgb(178, 34, 34),
            selection: Color::Rgb(70, 130, 180),
            step_done: Color::Rgb(0, 128, 0),
            step_active: Color::Rgb(176, 120, 0),
            step_pending: Color::DarkGray,
        }
    }
}
