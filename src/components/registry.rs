use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::components::image::{ClipImage, FixedImage};
use crate::components::protocol::Component;
use crate::components::text_block::TextBlock;
use crate::foundation::error::{ImprintError, ImprintResult};

/// Builds an uninitialized component from its JSON record (without the `type` key).
pub type ComponentFactory = fn(serde_json::Value) -> ImprintResult<Box<dyn Component>>;

/// Maps a component `type` tag to its factory.
///
/// Nothing registers itself implicitly: start from [`ComponentRegistry::with_builtins`] and call
/// [`ComponentRegistry::register`] for custom kinds before loading templates.
#[derive(Clone, Debug, Default)]
pub struct ComponentRegistry {
    factories: HashMap<String, ComponentFactory>,
}

impl ComponentRegistry {
    /// Registry with no component kinds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `fixed_image`, `clip_image` and `text_block`.
    pub fn with_builtins() -> Self {
        let mut r = Self::new();
        r.register("fixed_image", decode_component::<FixedImage>);
        r.register("clip_image", decode_component::<ClipImage>);
        r.register("text_block", decode_component::<TextBlock>);
        r
    }

    /// Register `factory` under `tag`, returning the factory it replaced.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        factory: ComponentFactory,
    ) -> Option<ComponentFactory> {
        self.factories.insert(tag.into(), factory)
    }

    /// `true` when `tag` is known.
    pub fn contains(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    /// Construct the component described by `record`, declared at position `index`.
    pub fn build(
        &self,
        index: usize,
        record: serde_json::Value,
    ) -> ImprintResult<Box<dyn Component>> {
        let serde_json::Value::Object(mut fields) = record else {
            return Err(ImprintError::validation(format!(
                "component {index} must be a JSON object"
            )));
        };
        let tag = match fields.remove("type") {
            None => {
                return Err(ImprintError::validation(format!(
                    "component {index} is missing 'type'"
                )));
            }
            Some(serde_json::Value::String(tag)) => tag,
            Some(other) => {
                return Err(ImprintError::validation(format!(
                    "component {index} 'type' must be a string, got {other}"
                )));
            }
        };
        let factory = self.factories.get(&tag).ok_or_else(|| {
            ImprintError::validation(format!("component {index} has unknown type '{tag}'"))
        })?;
        factory(serde_json::Value::Object(fields)).map_err(|e| match e {
            ImprintError::Validation(msg) => {
                ImprintError::validation(format!("component {index} ({tag}): {msg}"))
            }
            other => other.in_component(index),
        })
    }
}

/// Factory for any component kind that deserializes straight from its record.
pub fn decode_component<C>(record: serde_json::Value) -> ImprintResult<Box<dyn Component>>
where
    C: Component + DeserializeOwned + 'static,
{
    let c: C = serde_json::from_value(record)
        .map_err(|e| ImprintError::validation(format!("decode: {e}")))?;
    Ok(Box::new(c))
}

#[cfg(test)]
#[path = "../../tests/unit/components/registry.rs"]
mod tests;
