//! Color roles and the light/dark palettes.
//!
//! A theme is a plain lookup table. Switching palettes does not repaint
//! anything by itself; the host asks for a new highlight pass.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic tag attached to a highlighted span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorRole {
    Keyword,
    Builtin,
    Comment,
    Strings,
    Params,
    Ending,
    Functions,
}

impl ColorRole {
    pub const ALL: [ColorRole; 7] = [
        ColorRole::Keyword,
        ColorRole::Builtin,
        ColorRole::Comment,
        ColorRole::Strings,
        ColorRole::Params,
        ColorRole::Ending,
        ColorRole::Functions,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColorRole::Keyword => "keyword",
            ColorRole::Builtin => "builtin",
            ColorRole::Comment => "comment",
            ColorRole::Strings => "strings",
            ColorRole::Params => "params",
            ColorRole::Ending => "ending",
            ColorRole::Functions => "functions",
        }
    }
}

impl fmt::Display for ColorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A packed ARGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const fn argb(value: u32) -> Self {
        Self(value)
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Display for Color {
    /// Formats as `#aarrggbb`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08x}", self.0)
    }
}

/// Colors for each [`ColorRole`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxColors {
    pub keyword: Color,
    pub builtin: Color,
    pub comment: Color,
    pub strings: Color,
    pub params: Color,
    pub ending: Color,
    pub functions: Color,
}

/// Colors of the editing surface around the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorColors {
    /// Caret line shading
    pub line_shadow: Color,
    pub line_number: Color,
    pub background: Color,
    pub text: Color,
}

/// Editor theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub is_dark: bool,
    pub syntax: SyntaxColors,
    pub editor: EditorColors,
}

impl Theme {
    /// The light palette.
    pub fn light() -> Self {
        Self {
            name: "Light".to_string(),
            is_dark: false,
            syntax: SyntaxColors {
                keyword: Color(0xfff9_2672),
                builtin: Color(0xff72_b000),
                comment: Color(0xffa0_a0a0),
                strings: Color(0xffed_5c00),
                params: Color(0xff64_cbf4),
                ending: Color(0xff9a_79dd),
                functions: Color(0xffed_5c00),
            },
            editor: EditorColors {
                line_shadow: Color(0x1000_0000),
                line_number: Color(0xffa0_a0a0),
                background: Color(0xfff8_f8f8),
                text: Color(0xff22_2222),
            },
        }
    }

    /// The dark palette.
    pub fn dark() -> Self {
        Self {
            name: "Dark".to_string(),
            is_dark: true,
            syntax: SyntaxColors {
                keyword: Color(0xfff9_2672),
                builtin: Color(0xffa6_e22e),
                comment: Color(0xff75_715e),
                strings: Color(0xffe6_db74),
                params: Color(0xff64_cbf4),
                ending: Color(0xff9a_79dd),
                functions: Color(0xffed_5c00),
            },
            editor: EditorColors {
                line_shadow: Color(0x10ff_ffff),
                line_number: Color(0xffd3_d3d3),
                background: Color(0xff22_2222),
                text: Color(0xfff8_f8f8),
            },
        }
    }

    /// Picks the palette for a dark-mode preference.
    pub fn for_dark_mode(dark: bool) -> Self {
        if dark { Self::dark() } else { Self::light() }
    }

    /// Looks up the color for a role.
    pub fn color(&self, role: ColorRole) -> Color {
        let syntax = &self.syntax;
        match role {
            ColorRole::Keyword => syntax.keyword,
            ColorRole::Builtin => syntax.builtin,
            ColorRole::Comment => syntax.comment,
            ColorRole::Strings => syntax.strings,
            ColorRole::Params => syntax.params,
            ColorRole::Ending => syntax.ending,
            ColorRole::Functions => syntax.functions,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

/// Looks up a role in the light or dark palette.
pub fn color_for(role: ColorRole, is_dark: bool) -> Color {
    Theme::for_dark_mode(is_dark).color(role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palettes_share_accents() {
        for role in [ColorRole::Keyword, ColorRole::Params, ColorRole::Ending, ColorRole::Functions] {
            assert_eq!(color_for(role, true), color_for(role, false));
        }
        assert_ne!(
            color_for(ColorRole::Comment, true),
            color_for(ColorRole::Comment, false)
        );
    }

    #[test]
    fn test_color_channels() {
        let color = Color::argb(0x10ff_8000);
        assert_eq!(color.alpha(), 0x10);
        assert_eq!(color.red(), 0xff);
        assert_eq!(color.green(), 0x80);
        assert_eq!(color.blue(), 0x00);
        assert_eq!(color.to_string(), "#10ff8000");
    }

    #[test]
    fn test_dark_mode_selection() {
        assert!(Theme::for_dark_mode(true).is_dark);
        assert_eq!(Theme::default(), Theme::light());
    }
}
