//! Theming system for pteprep

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// A color theme for the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,

    // Background colors
    pub bg_primary: Color,
    pub bg_secondary: Color,

    // Foreground colors
    pub fg_primary: Color,
    pub fg_secondary: Color,
    pub fg_muted: Color,

    // Accent colors
    pub accent_primary: Color,
    pub accent_secondary: Color,

    // Semantic colors
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,

    // UI elements
    pub border: Color,
    pub border_focused: Color,
    pub selection: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::night()
    }
}

impl Theme {
    /// The default dark theme
    pub fn night() -> Self {
        Self {
            name: "Night".to_string(),
            bg_primary: Color::Rgb(0x16, 0x16, 0x1e),
            bg_secondary: Color::Rgb(0x1f, 0x23, 0x35),
            fg_primary: Color::Rgb(0xc0, 0xca, 0xf5),
            fg_secondary: Color::Rgb(0xa9, 0xb1, 0xd6),
            fg_muted: Color::Rgb(0x56, 0x5f, 0x89),
            accent_primary: Color::Rgb(0x7a, 0xa2, 0xf7),
            accent_secondary: Color::Rgb(0xbb, 0x9a, 0xf7),
            success: Color::Rgb(0x9e, 0xce, 0x6a),
            warning: Color::Rgb(0xe0, 0xaf, 0x68),
            error: Color::Rgb(0xf7, 0x76, 0x8e),
            info: Color::Rgb(0x7d, 0xcf, 0xff),
            border: Color::Rgb(0x3b, 0x42, 0x61),
            border_focused: Color::Rgb(0x7a, 0xa2, 0xf7),
            selection: Color::Rgb(0x28, 0x3b, 0x5d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_theme_is_night() {
        assert_eq!(Theme::default().name, "Night");
    }

    #[test]
    fn theme_round_trips_through_serde() {
        let theme = Theme::night();
        let json = serde_json::to_string(&theme).unwrap();
        let back: Theme = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, theme.name);
    }
}
