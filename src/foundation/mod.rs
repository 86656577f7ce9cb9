//! Error taxonomy, colors and small value types shared by every stage.

pub(crate) mod color;
pub(crate) mod core;
pub(crate) mod error;
