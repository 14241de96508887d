pub(crate) mod image;
pub(crate) mod protocol;
pub(crate) mod registry;
pub(crate) mod text_block;
