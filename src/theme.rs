//! Theme colors, with optional hex overrides from the `[theme]` config table

use ratatui::style::Color;
use std::collections::BTreeMap;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,         // Focused field borders, submit button
    pub danger: Color,         // Validation messages
    pub success: Color,        // Final balance line
    pub text: Color,           // Primary text
    pub text_dim: Color,       // Labels, hints
    pub inactive: Color,       // Unfocused borders
    pub header: Color,         // Title
    pub line: Color,           // Balance line
    pub fill: Color,           // Area under the line
    pub point: Color,          // Point markers
    pub tooltip_bg: Color,
    pub tooltip_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Rgb(54, 162, 235),
            danger: Color::Rgb(243, 139, 168),
            success: Color::Rgb(166, 218, 149),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(245, 194, 231),
            line: Color::Rgb(54, 162, 235),
            // rgba(54, 162, 235, 0.2) over a dark background
            fill: Color::Rgb(22, 52, 77),
            point: Color::Rgb(255, 255, 255),
            tooltip_bg: Color::Rgb(40, 40, 40),
            tooltip_fg: Color::Rgb(255, 255, 255),
        }
    }
}

impl Theme {
    /// Defaults with any valid overrides applied. Unknown slots and bad
    /// colors are logged and skipped.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut theme = Self::default();

        for (slot, value) in overrides {
            let Some(color) = Self::parse_hex_color(value) else {
                tracing::warn!("Ignoring theme.{}: {:?} is not a hex color", slot, value);
                continue;
            };

            let target = match slot.as_str() {
                "accent" => &mut theme.accent,
                "danger" => &mut theme.danger,
                "success" => &mut theme.success,
                "text" => &mut theme.text,
                "text_dim" => &mut theme.text_dim,
                "inactive" => &mut theme.inactive,
                "header" => &mut theme.header,
                "line" => &mut theme.line,
                "fill" => &mut theme.fill,
                "point" => &mut theme.point,
                "tooltip_bg" => &mut theme.tooltip_bg,
                "tooltip_fg" => &mut theme.tooltip_fg,
                _ => {
                    tracing::warn!("Unknown theme slot: {}", slot);
                    continue;
                }
            };
            *target = color;
        }

        theme
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
