//! Colors and styles for the picker.
//!
//! Both schemes are derived from a small palette; components only read the
//! resolved [`Theme`].
//!
//! ```
//! use pf_tui::Theme;
//! use pf_core::ColorScheme;
//!
//! let theme = Theme::from_scheme(ColorScheme::Light);
//! assert_eq!(theme, Theme::light());
//! ```

use pf_core::ColorScheme;
use ratatui::style::{Color, Modifier, Style};

/// Base colors a theme is derived from.
#[derive(Debug, Clone, Copy)]
struct Palette {
    text: Color,
    muted: Color,
    accent: Color,
    directory: Color,
    marker: Color,
    error: Color,
    surface: Color,
    raised: Color,
    selection: Color,
    selection_text: Color,
    rule: Color,
}

const DARK: Palette = Palette {
    text: Color::Rgb(214, 218, 224),
    muted: Color::Rgb(118, 124, 136),
    accent: Color::Rgb(97, 175, 239),
    directory: Color::Rgb(86, 182, 194),
    marker: Color::Rgb(152, 195, 121),
    error: Color::Rgb(224, 108, 117),
    surface: Color::Rgb(30, 33, 39),
    raised: Color::Rgb(44, 49, 58),
    selection: Color::Rgb(62, 68, 81),
    selection_text: Color::White,
    rule: Color::Rgb(76, 82, 99),
};

const LIGHT: Palette = Palette {
    text: Color::Rgb(56, 58, 66),
    muted: Color::Rgb(128, 131, 140),
    accent: Color::Rgb(64, 120, 242),
    directory: Color::Rgb(1, 132, 188),
    marker: Color::Rgb(80, 161, 79),
    error: Color::Rgb(202, 18, 67),
    surface: Color::Rgb(250, 250, 250),
    raised: Color::Rgb(229, 229, 230),
    selection: Color::Rgb(208, 216, 235),
    selection_text: Color::Black,
    rule: Color::Rgb(160, 161, 167),
};

/// Resolved colors and styles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// File candidates.
    pub file_fg: Color,
    /// Directory candidates.
    pub directory_fg: Color,
    /// The `+` add-project-folder marker.
    pub marker_fg: Color,

    /// Regular text.
    pub fg: Color,
    /// Secondary text.
    pub dimmed_fg: Color,
    /// Highlights and key names.
    pub accent: Color,
    /// Errors.
    pub error_fg: Color,
    /// Background of the help overlay.
    pub overlay_bg: Color,

    /// Unfocused borders.
    pub border_style: Style,
    /// The input border.
    pub focused_border_style: Style,
    /// The candidate under the cursor.
    pub highlight_style: Style,
    /// Header line and block titles.
    pub header_style: Style,
    /// Status line.
    pub status_bar_style: Style,
}

impl Theme {
    fn from_palette(p: Palette) -> Self {
        Self {
            file_fg: p.text,
            directory_fg: p.directory,
            marker_fg: p.marker,
            fg: p.text,
            dimmed_fg: p.muted,
            accent: p.accent,
            error_fg: p.error,
            overlay_bg: p.surface,
            border_style: Style::new().fg(p.rule),
            focused_border_style: Style::new().fg(p.accent),
            highlight_style: Style::new()
                .fg(p.selection_text)
                .bg(p.selection)
                .add_modifier(Modifier::BOLD),
            header_style: Style::new().fg(p.accent).add_modifier(Modifier::BOLD),
            status_bar_style: Style::new().fg(p.text).bg(p.raised),
        }
    }

    /// Light text on a dark background.
    #[must_use]
    pub fn dark() -> Self {
        Self::from_palette(DARK)
    }

    /// Dark text on a light background.
    #[must_use]
    pub fn light() -> Self {
        Self::from_palette(LIGHT)
    }

    /// Theme for a configured scheme; `Auto` means dark.
    #[must_use]
    pub fn from_scheme(scheme: ColorScheme) -> Self {
        match scheme {
            ColorScheme::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for a candidate name.
    #[must_use]
    pub fn candidate_style(&self, is_directory: bool) -> Style {
        Style::new().fg(if is_directory {
            self.directory_fg
        } else {
            self.file_fg
        })
    }

    /// Regular text.
    #[must_use]
    pub fn base_style(&self) -> Style {
        Style::new().fg(self.fg)
    }

    /// Secondary text.
    #[must_use]
    pub fn dimmed_style(&self) -> Style {
        Style::new().fg(self.dimmed_fg)
    }

    /// Key names and other highlights.
    #[must_use]
    pub fn accent_style(&self) -> Style {
        Style::new().fg(self.accent)
    }

    /// Error text.
    #[must_use]
    pub fn error_style(&self) -> Style {
        Style::new().fg(self.error_fg)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
