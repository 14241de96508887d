pub(crate) mod draw;
pub(crate) mod font;
pub(crate) mod layout;
pub(crate) mod template;
