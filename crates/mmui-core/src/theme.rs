//! Theme mode and seed-based palette generation

use std::fmt;

use serde::{Serialize, Serializer};

/// Accent seed used until the system reports one
pub const DEFAULT_SEED: &str = "#6750A4";

/// User's theme choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Follow the system dark-mode signal
    #[default]
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    /// Parse a persisted value; anything unknown means `Auto`
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "light" => ThemeMode::Light,
            "dark" => ThemeMode::Dark,
            _ => ThemeMode::Auto,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Auto => "auto",
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// Effective darkness given the system signal
    pub fn is_dark(&self, system_dark: bool) -> bool {
        match self {
            ThemeMode::Auto => system_dark,
            ThemeMode::Light => false,
            ThemeMode::Dark => true,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of the document-level theme attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeAttr {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#RRGGBB`, `RRGGBB` or `#AARRGGBB` (alpha is dropped)
    pub fn parse_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        let hex = match hex.len() {
            6 => hex,
            8 => hex.get(2..)?,
            _ => return None,
        };
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    fn to_hsl(self) -> (f64, f64, f64) {
        let r = self.0 as f64 / 255.0;
        let g = self.1 as f64 / 255.0;
        let b = self.2 as f64 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if (max - min).abs() < f64::EPSILON {
            return (0.0, 0.0, l);
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        (h / 6.0, s, l)
    }

    fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        if s <= 0.0 {
            let v = to_channel(l);
            return Rgb(v, v, v);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Rgb(
            to_channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
            to_channel(hue_to_rgb(p, q, h)),
            to_channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
        )
    }

    /// Relative lightness in `[0, 1]`
    pub fn lightness(self) -> f64 {
        self.to_hsl().2
    }
}

fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn to_channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Tonal color roles derived from one seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub primary: Rgb,
    pub on_primary: Rgb,
    pub primary_container: Rgb,
    pub on_primary_container: Rgb,
    pub surface: Rgb,
    pub on_surface: Rgb,
    pub outline: Rgb,
}

impl Palette {
    /// Generate roles for light or dark surfaces; an unparsable seed uses
    /// [`DEFAULT_SEED`]
    pub fn generate(seed: &str, dark: bool) -> Self {
        let seed = Rgb::parse_hex(seed)
            .or_else(|| Rgb::parse_hex(DEFAULT_SEED))
            .unwrap_or(Rgb(0x67, 0x50, 0xa4));
        let (h, s, _) = seed.to_hsl();
        let neutral = s * 0.12;
        let tone = |sat: f64, l: f64| Rgb::from_hsl(h, sat, l);

        if dark {
            Self {
                primary: tone(s, 0.80),
                on_primary: tone(s, 0.20),
                primary_container: tone(s, 0.30),
                on_primary_container: tone(s, 0.90),
                surface: tone(neutral, 0.06),
                on_surface: tone(neutral, 0.90),
                outline: tone(neutral, 0.60),
            }
        } else {
            Self {
                primary: tone(s, 0.40),
                on_primary: tone(s, 1.0),
                primary_container: tone(s, 0.90),
                on_primary_container: tone(s, 0.10),
                surface: tone(neutral, 0.98),
                on_surface: tone(neutral, 0.10),
                outline: tone(neutral, 0.50),
            }
        }
    }
}

/// What the display surfaces render with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppliedTheme {
    pub attribute: ThemeAttr,
    pub palette: Palette,
}

impl AppliedTheme {
    pub fn compute(dark: bool, seed: &str) -> Self {
        Self {
            attribute: if dark { ThemeAttr::Dark } else { ThemeAttr::Light },
            palette: Palette::generate(seed, dark),
        }
    }
}

impl Default for AppliedTheme {
    fn default() -> Self {
        Self::compute(false, DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_mode_parse() {
        assert_eq!(ThemeMode::parse("dark"), ThemeMode::Dark);
        assert_eq!(ThemeMode::parse("light"), ThemeMode::Light);
        assert_eq!(ThemeMode::parse("auto"), ThemeMode::Auto);
        assert_eq!(ThemeMode::parse("solarized"), ThemeMode::Auto);
    }

    #[test]
    fn test_is_dark() {
        assert!(ThemeMode::Auto.is_dark(true));
        assert!(!ThemeMode::Auto.is_dark(false));
        assert!(ThemeMode::Dark.is_dark(false));
        assert!(!ThemeMode::Light.is_dark(true));
    }

    #[test]
    fn test_parse_hex_variants() {
        assert_eq!(Rgb::parse_hex("#6750A4"), Some(Rgb(0x67, 0x50, 0xa4)));
        assert_eq!(Rgb::parse_hex("6750a4"), Some(Rgb(0x67, 0x50, 0xa4)));
        assert_eq!(Rgb::parse_hex("#FF6750A4"), Some(Rgb(0x67, 0x50, 0xa4)));
        assert_eq!(Rgb::parse_hex("#675"), None);
        assert_eq!(Rgb::parse_hex("#zz50a4"), None);
    }

    #[test]
    fn test_hsl_round_trip_is_close() {
        let seed = Rgb(0x67, 0x50, 0xa4);
        let (h, s, l) = seed.to_hsl();
        let back = Rgb::from_hsl(h, s, l);
        assert!((back.0 as i16 - seed.0 as i16).abs() <= 1);
        assert!((back.1 as i16 - seed.1 as i16).abs() <= 1);
        assert!((back.2 as i16 - seed.2 as i16).abs() <= 1);
    }

    #[test]
    fn test_dark_palette_has_lighter_primary() {
        let light = Palette::generate(DEFAULT_SEED, false);
        let dark = Palette::generate(DEFAULT_SEED, true);
        assert!(dark.primary.lightness() > light.primary.lightness());
        assert!(dark.surface.lightness() < light.surface.lightness());
    }

    #[test]
    fn test_invalid_seed_uses_default() {
        assert_eq!(
            Palette::generate("not-a-color", true),
            Palette::generate(DEFAULT_SEED, true)
        );
    }

    #[test]
    fn test_applied_theme_attribute() {
        assert_eq!(AppliedTheme::compute(true, DEFAULT_SEED).attribute, ThemeAttr::Dark);
        assert_eq!(AppliedTheme::default().attribute, ThemeAttr::Light);
    }

    #[test]
    fn test_rgb_display() {
        assert_eq!(Rgb(0x67, 0x50, 0xa4).to_string(), "#6750a4");
    }
}
