use crate::error::{CoreError, Result};
use std::fmt;
use std::str::FromStr;

/// 8-bit RGB colour parsed from `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` (leading `#` optional).
    pub fn parse(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidColor(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| CoreError::InvalidColor(hex.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Parses `hex`, falling back to `fallback` with a warning.
    pub fn parse_or(hex: &str, fallback: Rgb) -> Self {
        Self::parse(hex).unwrap_or_else(|e| {
            tracing::warn!("{e}, using {fallback}");
            fallback
        })
    }

    /// Channels in `0.0..=1.0`, as PDF colour operators expect.
    pub fn to_unit(self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }

    /// Linear blend: `t = 0` is `self`, `t = 1` is `other`.
    pub fn mix(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(lerp(self.r, other.r), lerp(self.g, other.g), lerp(self.b, other.b))
    }

    /// Lighter tint used for card backgrounds.
    pub fn tint(self, amount: f32) -> Rgb {
        self.mix(Rgb::WHITE, amount)
    }

    /// Black or white, whichever reads better on this colour.
    pub fn contrasting_text(self) -> Rgb {
        let luma = 0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32;
        if luma > 150.0 {
            Rgb::BLACK
        } else {
            Rgb::WHITE
        }
    }
}

impl FromStr for Rgb {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Rgb::parse(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgb::parse("#4caf50").unwrap(), Rgb::new(0x4c, 0xaf, 0x50));
        assert_eq!(Rgb::parse("F44336").unwrap(), Rgb::new(0xf4, 0x43, 0x36));
        assert_eq!(Rgb::parse("#2196f3").unwrap().to_string(), "#2196f3");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "#fff", "#12345g", "red", "#1234567"] {
            assert!(matches!(Rgb::parse(bad), Err(CoreError::InvalidColor(_))), "{bad}");
        }
        assert_eq!(Rgb::parse_or("nope", Rgb::WHITE), Rgb::WHITE);
    }

    #[test]
    fn test_mix_and_contrast() {
        assert_eq!(Rgb::BLACK.mix(Rgb::WHITE, 0.0), Rgb::BLACK);
        assert_eq!(Rgb::BLACK.mix(Rgb::WHITE, 1.0), Rgb::WHITE);
        assert_eq!(Rgb::new(0xfb, 0xbf, 0x24).contrasting_text(), Rgb::BLACK);
        assert_eq!(Rgb::new(0x1e, 0x40, 0xaf).contrasting_text(), Rgb::WHITE);
    }
}
