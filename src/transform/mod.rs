//! Deterministic image transforms: smart-crop resize, proportional scale, circular mask.

pub(crate) mod attention;
pub(crate) mod codec;
pub(crate) mod mask;
pub(crate) mod resize;
