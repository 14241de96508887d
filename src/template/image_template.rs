use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::assets::color::parse_color;
use crate::assets::decode::decode_resource;
use crate::assets::resources::Resources;
use crate::components::protocol::{Component, InitCtx, RenderCtx};
use crate::components::registry::ComponentRegistry;
use crate::fonts::registry::FontRegistry;
use crate::foundation::core::Canvas;
use crate::foundation::error::{ImprintError, ImprintResult};
use crate::render::pipeline::{Background, BackgroundImage, PartialRender, render_components};
use crate::render::surface::Surface;
use crate::template::model::TemplateDef;
use crate::text::template::RenderParams;

/// A loaded, immutable image template.
///
/// Construction runs every component's `init`; the raw JSON records are not retained. A template
/// is `Send + Sync` and may be rendered from many threads at once.
#[derive(Debug)]
pub struct Template {
    canvas: Canvas,
    background: Background,
    components: Vec<Box<dyn Component>>,
}

impl Template {
    /// Parse template JSON from a reader.
    pub fn from_reader<R: std::io::Read>(
        r: R,
        resources: Resources,
        registry: &ComponentRegistry,
        fonts: &FontRegistry,
    ) -> ImprintResult<Self> {
        let def: TemplateDef = serde_json::from_reader(r)
            .map_err(|e| ImprintError::serde(format!("parse template JSON: {e}")))?;
        Self::from_def(def, resources, registry, fonts)
    }

    /// Parse template JSON from a file on disk.
    pub fn from_path(
        path: impl AsRef<Path>,
        resources: Resources,
        registry: &ComponentRegistry,
        fonts: &FontRegistry,
    ) -> ImprintResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ImprintError::validation(format!("open template JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f), resources, registry, fonts)
    }

    pub(crate) fn from_def(
        def: TemplateDef,
        mut resources: Resources,
        registry: &ComponentRegistry,
        fonts: &FontRegistry,
    ) -> ImprintResult<Self> {
        let canvas = Canvas::new(def.width, def.height)?;
        if def.components.is_empty() {
            return Err(ImprintError::validation("template has no components"));
        }
        resources.extend_strings(&def.resources);

        let color = def
            .background_color
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| {
                parse_color(s).map_err(|e| {
                    ImprintError::validation(format!("background_color \"{s}\": {e}"))
                })
            })
            .transpose()?;
        let image = match def.background_image.as_deref().filter(|s| !s.is_empty()) {
            None => None,
            Some(key) => Some(match resources.get(key) {
                Some(bytes) => BackgroundImage::Embedded(decode_resource(bytes).map_err(|e| {
                    ImprintError::validation(format!("background_image '{key}': {e}"))
                })?),
                None => BackgroundImage::Remote(key.to_owned()),
            }),
        };

        let ctx = InitCtx {
            resources: &resources,
            fonts,
        };
        let mut components = Vec::with_capacity(def.components.len());
        for (index, record) in def.components.into_iter().enumerate() {
            let mut component = registry.build(index, record)?;
            component
                .init(&ctx)
                .map_err(|e| e.in_component(index))?;
            components.push(component);
        }
        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            components = components.len(),
            "template loaded"
        );

        Ok(Self {
            canvas,
            background: Background { color, image },
            components,
        })
    }

    /// Assemble a template from already constructed components, running their `init`.
    pub fn from_parts(
        canvas: Canvas,
        background: Background,
        mut components: Vec<Box<dyn Component>>,
        resources: &Resources,
        fonts: &FontRegistry,
    ) -> ImprintResult<Self> {
        if components.is_empty() {
            return Err(ImprintError::validation("template has no components"));
        }
        let ctx = InitCtx { resources, fonts };
        for (index, component) in components.iter_mut().enumerate() {
            component
                .init(&ctx)
                .map_err(|e| e.in_component(index))?;
        }
        Ok(Self {
            canvas,
            background,
            components,
        })
    }

    /// Output dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Background painted before the components.
    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Always `false` for a loaded template.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Render against `params`, keeping the partial surface on failure.
    pub fn render(
        &self,
        params: &RenderParams,
        ctx: &RenderCtx<'_>,
    ) -> Result<Surface, PartialRender> {
        render_components(
            self.canvas,
            &self.background,
            &self.components,
            params,
            ctx,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/image_template.rs"]
mod tests;
