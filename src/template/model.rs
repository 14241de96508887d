use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Template document as it appears on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TemplateDef {
    pub(crate) width: u32,
    pub(crate) height: u32,
    #[serde(default)]
    pub(crate) background_color: Option<String>,
    #[serde(default)]
    pub(crate) background_image: Option<String>,
    /// Raw component records; each carries a `type` tag.
    #[serde(default)]
    pub(crate) components: Vec<serde_json::Value>,
    #[serde(default)]
    pub(crate) resources: BTreeMap<String, String>,
}
