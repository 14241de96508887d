//! Span resolution, greedy line wrapping, and arrangement of runes into draw origins.
//!
//! Layout is transient: it borrows the block's fonts and is rebuilt on every render because the
//! parameter map changes between calls.

use std::ops::Range;
use std::sync::Arc;

use crate::foundation::core::Rect;
use crate::foundation::error::{ImprintError, ImprintResult};
use crate::text::font::{RuneMetrics, TextFont};
use crate::text::template::{RenderParams, SpanTemplate};

/// Horizontal placement of each line inside the block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    /// Flush with the block's left edge.
    Left,
    /// Centered in the block width.
    #[default]
    Center,
    /// Flush with the block's right edge.
    Right,
}

/// Vertical placement of the group of lines inside the block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    /// First line band starts at the block top.
    #[default]
    Top,
    /// Lines centered as a unit.
    Middle,
    /// Last line band ends at the block bottom.
    Bottom,
}

fn default_max_lines() -> usize {
    1
}

/// Line policy of a text block.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Alignment {
    /// Height of every line band in pixels.
    pub line_height: f32,
    /// Upper bound on emitted lines; overflow is dropped.
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
    /// Horizontal placement.
    #[serde(default)]
    pub horizontal: HAlign,
    /// Vertical placement.
    #[serde(default)]
    pub vertical: VAlign,
}

impl Alignment {
    pub(crate) fn validate(&self) -> ImprintResult<()> {
        if !(self.line_height.is_finite() && self.line_height > 0.0) {
            return Err(ImprintError::validation(format!(
                "line_height must be finite and > 0, got {}",
                self.line_height
            )));
        }
        Ok(())
    }
}

/// One templated span with an optional font override.
#[derive(Debug)]
pub struct TextSpan {
    /// Parsed text.
    pub template: SpanTemplate,
    /// Overrides the block font when set.
    pub font: Option<Arc<TextFont>>,
}

/// One laid-out character.
#[derive(Clone, Copy, Debug)]
pub struct Rune<'f> {
    /// Source character.
    pub ch: char,
    /// Glyph id in `font`.
    pub glyph_id: u32,
    /// Effective font; runs are split on pointer changes.
    pub font: &'f TextFont,
    /// Metrics at the font's size.
    pub metrics: RuneMetrics,
    /// Baseline origin, assigned by arrangement.
    pub x: f32,
    /// Baseline origin, assigned by arrangement.
    pub y: f32,
}

/// Runes partitioned into lines and positioned.
#[derive(Debug)]
pub struct TextLayout<'f> {
    runes: Vec<Rune<'f>>,
    lines: Vec<Range<usize>>,
}

impl<'f> TextLayout<'f> {
    /// Run every layout stage for a block.
    pub fn build(
        spans: &'f [TextSpan],
        block_font: &'f TextFont,
        params: &RenderParams,
        bounds: Rect,
        alignment: &Alignment,
    ) -> ImprintResult<Self> {
        let mut runes = resolve_runes(spans, block_font, params)?;
        let lines = wrap_lines(&runes, bounds.width() as f32, alignment.max_lines);
        runes.truncate(lines.last().map_or(0, |l| l.end));
        arrange(&mut runes, &lines, bounds, alignment);
        tracing::debug!(
            runes = runes.len(),
            lines = lines.len(),
            "text layout complete"
        );
        Ok(Self { runes, lines })
    }

    /// Runes of every emitted line, in document order.
    pub fn runes(&self) -> &[Rune<'f>] {
        &self.runes
    }

    /// Number of emitted lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Iterate lines as rune slices.
    pub fn lines(&self) -> impl Iterator<Item = &[Rune<'f>]> + '_ {
        self.lines.iter().map(|r| &self.runes[r.clone()])
    }

    /// Concatenated characters of line `i`.
    pub fn line_text(&self, i: usize) -> Option<String> {
        self.lines
            .get(i)
            .map(|r| self.runes[r.clone()].iter().map(|r| r.ch).collect())
    }
}

/// Substitute params and decompose every span into metrics-tagged runes.
pub fn resolve_runes<'f>(
    spans: &'f [TextSpan],
    block_font: &'f TextFont,
    params: &RenderParams,
) -> ImprintResult<Vec<Rune<'f>>> {
    let mut runes = Vec::new();
    for (i, span) in spans.iter().enumerate() {
        let text = span.template.render(params)?;
        let font: &TextFont = span.font.as_deref().unwrap_or(block_font);
        let face = font.face()?;
        for ch in text.chars() {
            let (glyph_id, metrics) = face.measure(ch).ok_or_else(|| {
                ImprintError::render(format!(
                    "span resolution: no glyph metrics for {ch:?} (span {i}, font '{}')",
                    font.program().name()
                ))
            })?;
            runes.push(Rune {
                ch,
                glyph_id,
                font,
                metrics,
                x: 0.0,
                y: 0.0,
            });
        }
    }
    Ok(runes)
}

/// Greedy width-budget wrapping.
///
/// A line takes runes while its advance sum stays strictly below `width`. Stops after
/// `max_lines` lines, when runes run out, or when the next rune alone does not fit.
pub fn wrap_lines(runes: &[Rune<'_>], width: f32, max_lines: usize) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut pos = 0;
    while lines.len() < max_lines && pos < runes.len() {
        let start = pos;
        let mut used = 0.0f32;
        while pos < runes.len() && used + runes[pos].metrics.advance < width {
            used += runes[pos].metrics.advance;
            pos += 1;
        }
        if pos == start {
            break;
        }
        lines.push(start..pos);
    }
    lines
}

/// Assign a baseline origin to every rune of `lines`.
pub fn arrange(runes: &mut [Rune<'_>], lines: &[Range<usize>], bounds: Rect, alignment: &Alignment) {
    let (x0, y0) = (bounds.x0 as f32, bounds.y0 as f32);
    let (width, height) = (bounds.width() as f32, bounds.height() as f32);
    let band = alignment.line_height;
    let content = band * lines.len() as f32;

    let top = match alignment.vertical {
        VAlign::Top => y0,
        VAlign::Middle => y0 + (height - content) / 2.0,
        VAlign::Bottom => y0 + height - content,
    };

    for (i, range) in lines.iter().enumerate() {
        let line = &mut runes[range.clone()];
        let mut ascent = 0.0f32;
        let mut descent = 0.0f32;
        let mut advance = 0.0f32;
        for r in line.iter() {
            ascent = ascent.max(r.metrics.ascent);
            descent = descent.max(r.metrics.descent);
            advance += r.metrics.advance;
        }

        let band_top = top + band * i as f32;
        let baseline = band_top + (band - (ascent + descent)) / 2.0 + ascent;
        let mut x = match alignment.horizontal {
            HAlign::Left => x0,
            HAlign::Center => x0 + (width - advance) / 2.0,
            HAlign::Right => x0 + width - advance,
        };
        for r in line.iter_mut() {
            r.x = x;
            r.y = baseline;
            x += r.metrics.advance;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
