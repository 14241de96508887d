use std::sync::Arc;

use crate::components::protocol::{Component, InitCtx, RenderCtx};
use crate::foundation::core::Rect;
use crate::foundation::error::{ImprintError, ImprintResult};
use crate::render::surface::Surface;
use crate::text::draw::{batches, draw_batches};
use crate::text::font::{TextFont, TextFontDef};
use crate::text::layout::{Alignment, TextLayout, TextSpan};
use crate::text::template::{RenderParams, SpanTemplate};

/// One span as written in a template.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextSpanDef {
    /// Literal text, optionally with `{{.key}}` directives.
    pub text: String,
    /// Overrides the block font for this span.
    #[serde(default)]
    pub font: Option<TextFontDef>,
}

/// Wrapped, aligned multi-span text inside a rectangle.
#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextBlock {
    bounds: Rect,
    spans: Vec<TextSpanDef>,
    alignment: Alignment,
    #[serde(default)]
    font: Option<TextFontDef>,
    #[serde(skip)]
    bound: Option<BoundText>,
}

#[derive(Debug)]
struct BoundText {
    font: TextFont,
    spans: Vec<TextSpan>,
}

impl TextBlock {
    /// Block with a default font; call [`Component::init`] before rendering.
    pub fn new(
        bounds: Rect,
        spans: Vec<TextSpanDef>,
        alignment: Alignment,
        font: TextFontDef,
    ) -> Self {
        Self {
            bounds,
            spans,
            alignment,
            font: Some(font),
            bound: None,
        }
    }

    /// Bounding and clip rectangle.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Resolve spans against `params` and lay them out without drawing.
    pub fn layout<'a>(&'a self, params: &RenderParams) -> ImprintResult<TextLayout<'a>> {
        let bound = self
            .bound
            .as_ref()
            .ok_or_else(|| ImprintError::render("text block rendered before init"))?;
        TextLayout::build(
            &bound.spans,
            &bound.font,
            params,
            self.bounds,
            &self.alignment,
        )
    }
}

impl Component for TextBlock {
    fn init(&mut self, ctx: &InitCtx<'_>) -> ImprintResult<()> {
        let def = self
            .font
            .as_ref()
            .ok_or_else(|| ImprintError::validation("text block is missing 'font'"))?;
        self.alignment.validate()?;
        let font = TextFont::resolve(def, ctx.fonts, ctx.resources)?;

        let mut spans = Vec::with_capacity(self.spans.len());
        for span in &self.spans {
            let font = span
                .font
                .as_ref()
                .map(|d| TextFont::resolve(d, ctx.fonts, ctx.resources).map(Arc::new))
                .transpose()?;
            spans.push(TextSpan {
                template: SpanTemplate::parse(&span.text)?,
                font,
            });
        }
        self.bound = Some(BoundText { font, spans });
        Ok(())
    }

    fn render(
        &self,
        dst: &mut Surface,
        params: &RenderParams,
        _ctx: &RenderCtx<'_>,
    ) -> ImprintResult<()> {
        let layout = self.layout(params)?;
        let runs = batches(&layout);
        tracing::debug!(
            lines = layout.line_count(),
            batches = runs.len(),
            "text block laid out"
        );
        draw_batches(dst, self.bounds, &runs)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/components/text_block.rs"]
mod tests;
