use crate::assets::resources::Resources;
use crate::cache::remote::RemoteImageCache;
use crate::fonts::registry::FontRegistry;
use crate::foundation::error::ImprintResult;
use crate::render::surface::Surface;
use crate::text::template::RenderParams;

/// Static inputs available while a template is being loaded.
#[derive(Clone, Copy, Debug)]
pub struct InitCtx<'a> {
    /// Embedded resources of the template.
    pub resources: &'a Resources,
    /// Shared font programs.
    pub fonts: &'a FontRegistry,
}

/// Shared collaborators available while rendering.
#[derive(Clone, Copy, Debug)]
pub struct RenderCtx<'a> {
    /// Shared remote image cache.
    pub images: &'a RemoteImageCache,
}

/// A drawable template element.
///
/// `init` runs once at load time against static resources; `render` runs once per render call
/// against the shared destination surface. Components never see each other's state, and a
/// loaded template may be rendered from several threads at once.
pub trait Component: Send + Sync + std::fmt::Debug {
    /// Bind static resources (fonts, embedded images) and validate configuration.
    fn init(&mut self, ctx: &InitCtx<'_>) -> ImprintResult<()>;

    /// Paint onto `dst` using this call's parameters.
    fn render(
        &self,
        dst: &mut Surface,
        params: &RenderParams,
        ctx: &RenderCtx<'_>,
    ) -> ImprintResult<()>;
}
