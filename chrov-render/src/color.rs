//! Colors, palettes and sequential colormaps.

use chrov_core::{ChrovError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An opaque RGB color; transparency is carried separately as alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const DARK_GRAY: Color = Color::rgb(0xa9, 0xa9, 0xa9);
    pub const GAINSBORO: Color = Color::rgb(0xdc, 0xdc, 0xdc);
    /// Default centromere color
    pub const CENTROMERE: Color = Color::rgb(0xdb, 0xc1, 0xc1);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear blend towards `other`; `t` is clamped to `[0, 1]`
    pub fn mix(&self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color::rgb(lerp(self.r, other.r), lerp(self.g, other.g), lerp(self.b, other.b))
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

// Parse a hex color like "#RRGGBB" or "#RGB"
fn parse_hex(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#')?.as_bytes();
    let nibble = |b: u8| (b as char).to_digit(16).map(|v| v as u8);
    match hex.len() {
        6 => {
            let byte = |i: usize| Some(nibble(hex[i])? * 16 + nibble(hex[i + 1])?);
            Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?))
        }
        3 => {
            let digit = |i: usize| nibble(hex[i]).map(|v| v * 17);
            Some(Color::rgb(digit(0)?, digit(1)?, digit(2)?))
        }
        _ => None,
    }
}

impl FromStr for Color {
    type Err = ChrovError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(color) = parse_hex(s) {
            return Ok(color);
        }
        let color = match s.to_ascii_lowercase().as_str() {
            "k" | "black" => Color::BLACK,
            "w" | "white" => Color::WHITE,
            "r" | "red" => Color::rgb(255, 0, 0),
            "g" | "green" => Color::rgb(0, 128, 0),
            "b" | "blue" => Color::rgb(0, 0, 255),
            "gray" | "grey" => Color::rgb(128, 128, 128),
            "darkgray" | "darkgrey" => Color::DARK_GRAY,
            "lightgray" | "lightgrey" => Color::rgb(0xd3, 0xd3, 0xd3),
            "whitesmoke" => Color::rgb(0xf5, 0xf5, 0xf5),
            "gainsboro" => Color::GAINSBORO,
            "lightcoral" => Color::rgb(0xf0, 0x80, 0x80),
            "orange" => Color::rgb(0xff, 0xa5, 0x00),
            _ => return Err(ChrovError::config(format!("unknown color: {:?}", s))),
        };
        Ok(color)
    }
}

impl TryFrom<String> for Color {
    type Error = ChrovError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Categorical palette (tab10)
pub const PALETTE: [Color; 10] = [
    Color::rgb(0x1f, 0x77, 0xb4),
    Color::rgb(0xff, 0x7f, 0x0e),
    Color::rgb(0x2c, 0xa0, 0x2c),
    Color::rgb(0xd6, 0x27, 0x28),
    Color::rgb(0x94, 0x67, 0xbd),
    Color::rgb(0x8c, 0x56, 0x4b),
    Color::rgb(0xe3, 0x77, 0xc2),
    Color::rgb(0x7f, 0x7f, 0x7f),
    Color::rgb(0xbc, 0xbd, 0x22),
    Color::rgb(0x17, 0xbe, 0xcf),
];

/// `n` categorical colors, cycling through [`PALETTE`]
pub fn ncolors(n: usize) -> Vec<Color> {
    (0..n).map(|i| PALETTE[i % PALETTE.len()]).collect()
}

/// Sequential colormap for heatmap cells
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    Greys,
    Reds,
    Viridis,
}

const VIRIDIS: [Color; 5] = [
    Color::rgb(0x44, 0x01, 0x54),
    Color::rgb(0x3b, 0x52, 0x8b),
    Color::rgb(0x21, 0x91, 0x8c),
    Color::rgb(0x5e, 0xc9, 0x62),
    Color::rgb(0xfd, 0xe7, 0x25),
];

impl Colormap {
    /// Color at `t` in `[0, 1]`
    pub fn at(&self, t: f64) -> Color {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        match self {
            Colormap::Greys => Color::WHITE.mix(Color::BLACK, t),
            Colormap::Reds => Color::rgb(0xff, 0xf5, 0xf0).mix(Color::rgb(0x67, 0x00, 0x0d), t),
            Colormap::Viridis => {
                let pos = t * (VIRIDIS.len() - 1) as f64;
                let i = (pos.floor() as usize).min(VIRIDIS.len() - 2);
                VIRIDIS[i].mix(VIRIDIS[i + 1], pos - i as f64)
            }
        }
    }
}

impl FromStr for Colormap {
    type Err = ChrovError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "greys" | "grays" => Ok(Colormap::Greys),
            "reds" => Ok(Colormap::Reds),
            "viridis" => Ok(Colormap::Viridis),
            other => Err(ChrovError::config(format!("unknown colormap: {:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colors() {
        assert_eq!("#dbc1c1".parse::<Color>().unwrap(), Color::CENTROMERE);
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("k".parse::<Color>().unwrap(), Color::BLACK);
        assert_eq!("darkgray".parse::<Color>().unwrap(), Color::DARK_GRAY);
        assert!("not-a-color".parse::<Color>().unwrap_err().is_config());
    }

    #[test]
    fn test_non_ascii_hex_is_rejected() {
        assert!("#a\u{e9}123".parse::<Color>().unwrap_err().is_config());
        assert!("#a\u{e9}".parse::<Color>().unwrap_err().is_config());
        assert!("#12345g".parse::<Color>().is_err());
    }

    #[test]
    fn test_colormap_endpoints() {
        assert_eq!(Colormap::Greys.at(0.0), Color::WHITE);
        assert_eq!(Colormap::Greys.at(1.0), Color::BLACK);
        assert_eq!(Colormap::Viridis.at(1.0), VIRIDIS[4]);
        assert_eq!(Colormap::Viridis.at(f64::NAN), VIRIDIS[0]);
    }

    #[test]
    fn test_ncolors_cycles() {
        let colors = ncolors(12);
        assert_eq!(colors[10], colors[0]);
    }
}
