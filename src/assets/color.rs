use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{ImprintError, ImprintResult};

/// Straight-alpha RGBA8 color parsed from a template color string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Construct from straight-alpha channels.
    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Premultiplied form used by surfaces.
    pub fn to_premul(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }

    pub(crate) fn to_paint(self) -> vello_cpu::peniko::Color {
        vello_cpu::peniko::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

/// Parse `RRGGBB` (opaque) or `RRGGBBAA`; a leading `#` is accepted.
pub fn parse_color(s: &str) -> ImprintResult<Color> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> ImprintResult<u8> {
        let invalid = || ImprintError::validation(format!("invalid hex byte \"{pair}\""));
        // from_str_radix alone would accept a leading '+'.
        if !pair.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        u8::from_str_radix(pair, 16).map_err(|_| invalid())
    }

    if !s.is_ascii() {
        return Err(ImprintError::validation(format!(
            "unknown color format \"{s}\""
        )));
    }

    match s.len() {
        6 => Ok(Color::rgba(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            255,
        )),
        8 => Ok(Color::rgba(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        )),
        _ => Err(ImprintError::validation(format!(
            "unknown color format \"{s}\" (expected RRGGBB or RRGGBBAA)"
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
