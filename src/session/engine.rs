use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::resources::Resources;
use crate::cache::remote::{ImageCacheOpts, RemoteImageCache};
use crate::components::protocol::RenderCtx;
use crate::components::registry::ComponentRegistry;
use crate::fonts::registry::FontRegistry;
use crate::foundation::error::ImprintResult;
use crate::render::pipeline::PartialRender;
use crate::render::surface::Surface;
use crate::template::image_template::Template;
use crate::text::template::RenderParams;

/// Options for [`Engine::new`].
#[derive(Clone, Debug)]
pub struct EngineOpts {
    /// Directory holding `<name>.ttf` font files.
    pub font_dir: PathBuf,
    /// Remote image cache settings.
    pub image_cache: ImageCacheOpts,
}

impl Default for EngineOpts {
    fn default() -> Self {
        Self {
            font_dir: PathBuf::from("data/fonts"),
            image_cache: ImageCacheOpts::default(),
        }
    }
}

impl EngineOpts {
    /// Return options with a different font directory.
    pub fn with_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dir = dir.into();
        self
    }

    /// Return options with different image cache settings.
    pub fn with_image_cache(mut self, opts: ImageCacheOpts) -> Self {
        self.image_cache = opts;
        self
    }
}

/// Owns the component registry and the shared caches; loads and renders templates.
///
/// Cheap to share across threads behind an `Arc`: every render is independent apart from the
/// font registry and the image cache.
#[derive(Debug)]
pub struct Engine {
    registry: ComponentRegistry,
    fonts: Arc<FontRegistry>,
    images: Arc<RemoteImageCache>,
}

impl Engine {
    /// Engine with built-in components, a font registry on `opts.font_dir`, and an HTTP-backed
    /// image cache.
    pub fn new(opts: EngineOpts) -> ImprintResult<Self> {
        Ok(Self::with_parts(
            ComponentRegistry::with_builtins(),
            Arc::new(FontRegistry::new(opts.font_dir)),
            Arc::new(RemoteImageCache::new(opts.image_cache)?),
        ))
    }

    /// Engine over explicitly constructed parts.
    pub fn with_parts(
        registry: ComponentRegistry,
        fonts: Arc<FontRegistry>,
        images: Arc<RemoteImageCache>,
    ) -> Self {
        Self {
            registry,
            fonts,
            images,
        }
    }

    /// Component registry used when loading templates.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Shared font registry.
    pub fn fonts(&self) -> &Arc<FontRegistry> {
        &self.fonts
    }

    /// Shared image cache.
    pub fn images(&self) -> &Arc<RemoteImageCache> {
        &self.images
    }

    /// Load a template from JSON text.
    pub fn load_template_json(&self, json: &str) -> ImprintResult<Template> {
        self.load_template_json_with(json, Resources::new())
    }

    /// Load a template from JSON text with pre-seeded resources.
    pub fn load_template_json_with(
        &self,
        json: &str,
        resources: Resources,
    ) -> ImprintResult<Template> {
        Template::from_reader(Cursor::new(json), resources, &self.registry, &self.fonts)
    }

    /// Load a template JSON file.
    pub fn load_template_path(&self, path: impl AsRef<Path>) -> ImprintResult<Template> {
        Template::from_path(path, Resources::new(), &self.registry, &self.fonts)
    }

    /// Render `template` with `params`.
    #[tracing::instrument(skip_all, fields(width = template.canvas().width, height = template.canvas().height))]
    pub fn render(
        &self,
        template: &Template,
        params: &RenderParams,
    ) -> Result<Surface, PartialRender> {
        let ctx = RenderCtx {
            images: &self.images,
        };
        let out = template.render(params, &ctx);
        if let Err(e) = &out {
            tracing::debug!(error = %e.error, "render failed");
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/engine.rs"]
mod tests;
