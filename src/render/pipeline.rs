use crate::assets::color::Color;
use crate::assets::decode::PreparedImage;
use crate::components::protocol::{Component, RenderCtx};
use crate::foundation::core::Canvas;
use crate::foundation::error::{ImprintError, ImprintResult};
use crate::render::surface::Surface;
use crate::text::template::RenderParams;

/// Image stretched over the canvas before any component draws.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackgroundImage {
    /// Decoded from the template's resources at load time.
    Embedded(PreparedImage),
    /// Resolved through the image cache on each render.
    Remote(String),
}

/// Template background; the color is painted first when both are set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Background {
    /// Solid fill.
    pub color: Option<Color>,
    /// Stretched image.
    pub image: Option<BackgroundImage>,
}

impl Background {
    /// `true` when nothing is painted.
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.image.is_none()
    }

    fn paint(&self, dst: &mut Surface, ctx: &RenderCtx<'_>) -> ImprintResult<()> {
        if let Some(color) = self.color {
            dst.fill(color.to_premul());
        }
        match &self.image {
            Some(BackgroundImage::Embedded(img)) => dst.draw_image_stretched(img),
            Some(BackgroundImage::Remote(url)) => {
                let img = ctx.images.resolve(url)?;
                dst.draw_image_stretched(&img);
            }
            None => {}
        }
        Ok(())
    }
}

/// A render that failed part way; `surface` holds whatever was painted before the failure.
#[derive(thiserror::Error, Debug)]
#[error("{error}")]
pub struct PartialRender {
    /// Partially painted output.
    pub surface: Surface,
    /// What stopped the render.
    #[source]
    pub error: ImprintError,
}

impl PartialRender {
    /// Drop the partial surface and keep the error.
    pub fn into_error(self) -> ImprintError {
        self.error
    }
}

/// Paint `background`, then every component in declaration order onto one fresh surface.
///
/// The first failure stops the loop; component failures carry the component's index.
pub fn render_components(
    canvas: Canvas,
    background: &Background,
    components: &[Box<dyn Component>],
    params: &RenderParams,
    ctx: &RenderCtx<'_>,
) -> Result<Surface, PartialRender> {
    let mut surface = Surface::new(canvas);
    if let Err(error) = background.paint(&mut surface, ctx) {
        return Err(PartialRender { surface, error });
    }
    for (index, component) in components.iter().enumerate() {
        if let Err(e) = component.render(&mut surface, params, ctx) {
            tracing::debug!(index, error = %e, "component render failed");
            return Err(PartialRender {
                surface,
                error: e.in_component(index),
            });
        }
    }
    Ok(surface)
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
