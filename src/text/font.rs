use std::sync::Arc;

use skrifa::MetadataProvider;
use skrifa::instance::{LocationRef, Size};

use crate::assets::color::{Color, parse_color};
use crate::assets::resources::Resources;
use crate::fonts::registry::{FontProgram, FontRegistry};
use crate::foundation::error::{ImprintError, ImprintResult};

/// Font reference as written in a template: family name, pixel size, color string.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextFontDef {
    /// Registry name; the file is `<font_dir>/<name>.ttf` or the resource `<name>.ttf`.
    pub name: String,
    /// Pixel size.
    pub size: f32,
    /// `RRGGBB` or `RRGGBBAA`.
    pub color: String,
}

/// A [`TextFontDef`] bound to a shared font program and a decoded color.
#[derive(Debug)]
pub struct TextFont {
    size: f32,
    color: Color,
    program: Arc<FontProgram>,
}

impl TextFont {
    /// Resolve `def`, preferring embedded `<name>.ttf` bytes from `resources` over the registry's
    /// font directory.
    pub fn resolve(
        def: &TextFontDef,
        fonts: &FontRegistry,
        resources: &Resources,
    ) -> ImprintResult<Self> {
        if !(def.size.is_finite() && def.size > 0.0) {
            return Err(ImprintError::validation(format!(
                "font '{}' size must be finite and > 0, got {}",
                def.name, def.size
            )));
        }
        let color = parse_color(&def.color)?;
        let program = match resources.get(&format!("{}.ttf", def.name)) {
            Some(bytes) => fonts.register(&def.name, bytes)?,
            None => fonts.get(&def.name)?,
        };
        Ok(Self {
            size: def.size,
            color,
            program,
        })
    }

    /// Pixel size.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Fill color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Shared program.
    pub fn program(&self) -> &Arc<FontProgram> {
        &self.program
    }

    /// Metrics view of the program at this font's size.
    pub(crate) fn face(&self) -> ImprintResult<TextFace<'_>> {
        let font = self.program.font_ref()?;
        Ok(TextFace {
            charmap: font.charmap(),
            metrics: font.glyph_metrics(Size::new(self.size), LocationRef::default()),
        })
    }
}

/// Per-glyph metrics in pixels; `ascent` and `descent` are both measured away from the baseline.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RuneMetrics {
    /// Extent above the baseline.
    pub ascent: f32,
    /// Extent below the baseline.
    pub descent: f32,
    /// Horizontal advance.
    pub advance: f32,
}

pub(crate) struct TextFace<'a> {
    charmap: skrifa::charmap::Charmap<'a>,
    metrics: skrifa::metrics::GlyphMetrics<'a>,
}

impl TextFace<'_> {
    /// Glyph id and metrics for `ch`; `None` when the font cannot lay it out.
    pub(crate) fn measure(&self, ch: char) -> Option<(u32, RuneMetrics)> {
        let gid = self.charmap.map(ch)?;
        let advance = self.metrics.advance_width(gid)?;
        // Ink bounds are y-up; blank glyphs such as spaces have none.
        let (ascent, descent) = self
            .metrics
            .bounds(gid)
            .map(|b| (b.y_max.max(0.0), (-b.y_min).max(0.0)))
            .unwrap_or((0.0, 0.0));
        Some((
            gid.to_u32(),
            RuneMetrics {
                ascent,
                descent,
                advance,
            },
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/font.rs"]
mod tests;
