pub(crate) mod image_template;
pub(crate) mod model;
