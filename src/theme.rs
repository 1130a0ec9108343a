//! Theme colors, optionally overridden from the `[theme]` config section

use ratatui::style::Color;

use crate::config::ThemeConfig;

/// Theme colors for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub accent: Color,     // Focused borders, key hints
    pub success: Color,    // Headline result
    pub warning: Color,    // Status messages
    pub danger: Color,     // Input errors
    pub text: Color,       // Primary text
    pub text_dim: Color,   // Notes, axis labels
    pub inactive: Color,   // Unfocused borders
    pub header: Color,     // Field labels
    pub curve: Color,      // Sensitivity curve line
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired
        Self {
            accent: Color::Rgb(250, 179, 135),
            success: Color::Rgb(166, 218, 149),
            warning: Color::Rgb(249, 226, 175),
            danger: Color::Rgb(243, 139, 168),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(137, 180, 250),
            curve: Color::Rgb(148, 226, 213),
        }
    }
}

impl Theme {
    /// Build a theme from config overrides; bad or missing entries keep the default
    pub fn from_config(config: &ThemeConfig) -> Self {
        let base = Self::default();
        let pick = |name: &str, value: &Option<String>, fallback: Color| -> Color {
            match value.as_deref() {
                None => fallback,
                Some(raw) => Self::parse_hex_color(raw).unwrap_or_else(|| {
                    tracing::warn!("Ignoring invalid theme color {} = {:?}", name, raw);
                    fallback
                }),
            }
        };

        Self {
            accent: pick("accent", &config.accent, base.accent),
            success: pick("success", &config.success, base.success),
            warning: pick("warning", &config.warning, base.warning),
            danger: pick("danger", &config.danger, base.danger),
            text: pick("text", &config.text, base.text),
            text_dim: pick("text_dim", &config.text_dim, base.text_dim),
            inactive: pick("inactive", &config.inactive, base.inactive),
            header: pick("header", &config.header, base.header),
            curve: pick("curve", &config.curve, base.curve),
        }
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Theme::parse_hex_color("#FFC107"), Some(Color::Rgb(255, 193, 7)));
        assert_eq!(Theme::parse_hex_color("fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(Theme::parse_hex_color("#12345"), None);
        assert_eq!(Theme::parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_overrides_and_fallbacks() {
        let config = ThemeConfig {
            accent: Some("#000".to_string()),
            curve: Some("not-a-color".to_string()),
            ..ThemeConfig::default()
        };
        let theme = Theme::from_config(&config);

        assert_eq!(theme.accent, Color::Rgb(0, 0, 0));
        assert_eq!(theme.curve, Theme::default().curve);
        assert_eq!(theme.text, Theme::default().text);
    }
}
