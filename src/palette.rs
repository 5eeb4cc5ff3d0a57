//! Colors and themes.

use image::Rgba;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Build a color from a CSS-style alpha in `0.0..=1.0`.
    pub fn with_alpha(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        Self::rgba(r, g, b, alpha_to_u8(alpha))
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

impl From<Color> for Rgba<u8> {
    fn from(color: Color) -> Self {
        color.to_rgba()
    }
}

fn alpha_to_u8(alpha: f32) -> u8 {
    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Named dashboard colors.
pub struct Palette;

impl Palette {
    pub const RED: Color = Color::opaque(0xD2, 0x26, 0x30);
    pub const DARK_RED: Color = Color::opaque(0x97, 0x1c, 0x22);
    pub const GRAY: Color = Color::opaque(0x93, 0x95, 0x97);
    pub const DARK_GRAY: Color = Color::opaque(0x58, 0x58, 0x5B);
    pub const DARKER_GRAY: Color = Color::opaque(0x11, 0x11, 0x11);
    pub const BLUE: Color = Color::opaque(0x00, 0x77, 0xC8);
    pub const DARK_BLUE: Color = Color::opaque(0x00, 0x4d, 0x80);
    pub const BLACK: Color = Color::opaque(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::opaque(0xF4, 0xF2, 0xFF);
    pub const ORANGE: Color = Color::opaque(0xfc, 0xa5, 0x03);
    pub const DARK_ORANGE: Color = Color::opaque(0xbf, 0x7e, 0x04);
    pub const PURPLE: Color = Color::opaque(0x74, 0x66, 0xF1);
    pub const DARK_PURPLE: Color = Color::opaque(0x43, 0x3b, 0x87);
    pub const GRAY_PURPLE: Color = Color::opaque(0x29, 0x30, 0x45);
}

/// Named palette descriptor for dashboard chrome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    pub id: String,
    pub component_background: Color,
    pub font: Color,
    pub control: Color,
    pub control_hover: Color,
}

pub const THEME_IDS: [&str; 2] = ["dark", "light"];

impl Theme {
    pub fn dark() -> Self {
        Self {
            id: "dark".to_string(),
            component_background: Palette::GRAY_PURPLE,
            font: Palette::WHITE,
            control: Palette::PURPLE,
            control_hover: Palette::DARK_PURPLE,
        }
    }

    pub fn light() -> Self {
        Self {
            id: "light".to_string(),
            component_background: Palette::WHITE,
            font: Palette::DARKER_GRAY,
            control: Palette::BLUE,
            control_hover: Palette::DARK_BLUE,
        }
    }

    pub fn builtin(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }
}
