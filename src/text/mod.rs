//! Composite font faces and the per-size face cache.

pub(crate) mod cache;
pub(crate) mod face;
