//! Card layout, drawing surfaces and the pass-ordered composer.

pub(crate) mod canvas;
pub(crate) mod composer;
pub(crate) mod layout;
pub(crate) mod spec;
