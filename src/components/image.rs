use crate::assets::decode::{PreparedImage, decode_resource};
use crate::components::protocol::{Component, InitCtx, RenderCtx};
use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{ImprintError, ImprintResult};
use crate::render::surface::Surface;
use crate::text::template::RenderParams;

/// Unscaled image at a fixed point.
///
/// `source` names an embedded resource, or, when no such resource exists, a remote URL resolved
/// through the image cache on every render.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixedImage {
    point: Point,
    source: String,
    #[serde(skip)]
    embedded: Option<PreparedImage>,
}

impl FixedImage {
    /// Image drawn with its top-left corner at `point`.
    pub fn new(point: Point, source: impl Into<String>) -> Self {
        Self {
            point,
            source: source.into(),
            embedded: None,
        }
    }

    /// `true` when `init` bound an embedded resource.
    pub fn is_embedded(&self) -> bool {
        self.embedded.is_some()
    }
}

impl Component for FixedImage {
    fn init(&mut self, ctx: &InitCtx<'_>) -> ImprintResult<()> {
        if let Some(bytes) = ctx.resources.get(&self.source) {
            let img = decode_resource(bytes).map_err(|e| {
                ImprintError::validation(format!("embedded image '{}': {e}", self.source))
            })?;
            self.embedded = Some(img);
        }
        Ok(())
    }

    fn render(
        &self,
        dst: &mut Surface,
        _params: &RenderParams,
        ctx: &RenderCtx<'_>,
    ) -> ImprintResult<()> {
        match &self.embedded {
            Some(img) => dst.draw_image(img, self.point),
            None => {
                let img = ctx.images.resolve(&self.source)?;
                dst.draw_image(&img, self.point);
            }
        }
        Ok(())
    }
}

/// Remote image named by a render parameter, with a `clip` region scaled into `bounds`.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClipImage {
    bounds: Rect,
    source: String,
    clip: Rect,
}

impl ClipImage {
    /// `source` is the parameter key whose value is the image URL.
    pub fn new(bounds: Rect, source: impl Into<String>, clip: Rect) -> Self {
        Self {
            bounds,
            source: source.into(),
            clip,
        }
    }
}

impl Component for ClipImage {
    fn init(&mut self, _ctx: &InitCtx<'_>) -> ImprintResult<()> {
        Ok(())
    }

    fn render(
        &self,
        dst: &mut Surface,
        params: &RenderParams,
        ctx: &RenderCtx<'_>,
    ) -> ImprintResult<()> {
        let url = params
            .get(&self.source)
            .ok_or_else(|| {
                ImprintError::render(format!(
                    "clip_image source: missing parameter '{}'",
                    self.source
                ))
            })?;
        let img = ctx.images.resolve(url)?;
        let full = Rect::new(0.0, 0.0, f64::from(img.width), f64::from(img.height));
        dst.draw_image_scaled(&img, self.clip.intersect(full), self.bounds);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/components/image.rs"]
mod tests;
