//! Imprint renders parameterized raster images from declarative templates.
//!
//! A template fixes the canvas size, an optional background, and an ordered list of components
//! (fixed images, clipped remote images, multi-span text blocks). Rendering substitutes a flat
//! string parameter map and paints every component in declaration order:
//!
//! - Build an [`Engine`] (or inject a [`FontRegistry`] and [`RemoteImageCache`] of your own)
//! - Load a [`Template`] from JSON
//! - Call [`Engine::render`] per request and encode the returned [`Surface`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod cache;
mod components;
mod fonts;
mod foundation;
mod render;
mod session;
mod template;
mod text;

pub use crate::foundation::core::{Canvas, Point, Rect, Rgba8Premul};
pub use crate::foundation::error::{FetchError, ImprintError, ImprintResult};
pub use crate::foundation::logging::init_logging;

pub use crate::assets::color::{Color, parse_color};
pub use crate::assets::decode::{PreparedImage, decode_data_uri, decode_image, decode_resource};
pub use crate::assets::resources::Resources;

pub use crate::cache::fetch::{HttpFetcher, ImageFetcher};
pub use crate::cache::remote::{ImageCacheOpts, RemoteImageCache};
pub use crate::fonts::registry::{FontProgram, FontRegistry};

pub use crate::components::image::{ClipImage, FixedImage};
pub use crate::components::protocol::{Component, InitCtx, RenderCtx};
pub use crate::components::registry::{ComponentFactory, ComponentRegistry, decode_component};
pub use crate::components::text_block::{TextBlock, TextSpanDef};

pub use crate::render::pipeline::{Background, BackgroundImage, PartialRender};
pub use crate::render::surface::Surface;

pub use crate::session::engine::{Engine, EngineOpts};
pub use crate::template::image_template::Template;

pub use crate::text::draw::GlyphBatch;
pub use crate::text::font::{RuneMetrics, TextFont, TextFontDef};
pub use crate::text::layout::{Alignment, HAlign, Rune, TextLayout, TextSpan, VAlign};
pub use crate::text::template::{RenderParams, SpanTemplate};
