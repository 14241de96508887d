use vello_cpu::kurbo::Shape as _;

use crate::foundation::core::Rect;
use crate::foundation::error::{ImprintError, ImprintResult};
use crate::render::surface::Surface;
use crate::text::font::TextFont;
use crate::text::layout::TextLayout;

/// A maximal run of consecutive same-font runes on one line; one draw call each.
#[derive(Debug)]
pub struct GlyphBatch<'f> {
    /// Shared font of every glyph in the run.
    pub font: &'f TextFont,
    /// Characters of the run.
    pub text: String,
    /// Baseline origin of the first glyph.
    pub origin: (f32, f32),
    /// Positioned glyphs.
    pub glyphs: Vec<vello_cpu::Glyph>,
}

impl<'f> TextLayout<'f> {
    /// Font runs of this layout, one per draw call.
    pub fn batches(&self) -> Vec<GlyphBatch<'f>> {
        batches(self)
    }
}

/// Group laid-out runes into font runs; a new line or a font pointer change starts a batch.
pub fn batches<'f>(layout: &TextLayout<'f>) -> Vec<GlyphBatch<'f>> {
    let mut out: Vec<GlyphBatch<'f>> = Vec::new();
    for line in layout.lines() {
        let mut current: Option<GlyphBatch<'f>> = None;
        for r in line {
            let same_font = current
                .as_ref()
                .is_some_and(|b| std::ptr::eq(b.font, r.font));
            if !same_font {
                out.extend(current.take());
                current = Some(GlyphBatch {
                    font: r.font,
                    text: String::new(),
                    origin: (r.x, r.y),
                    glyphs: Vec::new(),
                });
            }
            if let Some(batch) = current.as_mut() {
                batch.text.push(r.ch);
                batch.glyphs.push(vello_cpu::Glyph {
                    id: r.glyph_id,
                    x: r.x,
                    y: r.y,
                });
            }
        }
        out.extend(current);
    }
    out
}

/// Fill every batch with its font color, clipped to `clip`, and composite onto `dst`.
///
/// vello_cpu renders into a fresh buffer, so the glyphs go to a layer covering only
/// `clip` within the surface, which is then premul-over'd at its offset.
pub fn draw_batches(dst: &mut Surface, clip: Rect, batches: &[GlyphBatch<'_>]) -> ImprintResult<()> {
    if batches.is_empty() {
        return Ok(());
    }
    let x0 = clip.x0.floor().clamp(0.0, f64::from(dst.width())) as u32;
    let y0 = clip.y0.floor().clamp(0.0, f64::from(dst.height())) as u32;
    let x1 = clip.x1.ceil().clamp(0.0, f64::from(dst.width())) as u32;
    let y1 = clip.y1.ceil().clamp(0.0, f64::from(dst.height())) as u32;
    if x1 <= x0 || y1 <= y0 {
        return Ok(());
    }
    let (lw, lh) = (x1 - x0, y1 - y0);
    let w = u16::try_from(lw)
        .map_err(|_| ImprintError::render(format!("draw: clip width {lw} exceeds u16")))?;
    let h = u16::try_from(lh)
        .map_err(|_| ImprintError::render(format!("draw: clip height {lh} exceeds u16")))?;

    let (ox, oy) = (f64::from(x0), f64::from(y0));
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    let clip_path =
        vello_cpu::kurbo::Rect::new(clip.x0 - ox, clip.y0 - oy, clip.x1 - ox, clip.y1 - oy)
            .to_path(0.1);
    ctx.push_clip_layer(&clip_path);
    let (gx, gy) = (x0 as f32, y0 as f32);
    for batch in batches {
        ctx.set_paint(batch.font.color().to_paint());
        ctx.glyph_run(batch.font.program().data())
            .font_size(batch.font.size())
            .fill_glyphs(batch.glyphs.iter().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x - gx,
                y: g.y - gy,
            }));
    }
    ctx.pop_layer();
    ctx.flush();

    let mut layer = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut layer);
    dst.composite_layer_at(x0, y0, lw, lh, layer.data_as_u8_slice())
        .map_err(|e| match e {
            ImprintError::Render(msg) => ImprintError::render(format!("draw: {msg}")),
            other => other,
        })
}

#[cfg(test)]
#[path = "../../tests/unit/text/draw.rs"]
mod tests;
