//! ogcard renders social-preview cards: fixed-layout raster images combining a title,
//! an author line, an avatar, a background and a footer with a logo and labels.
//!
//! # Pipeline overview
//!
//! 1. **Validate**: a [`RenderSpec`] is checked and its resource fields are classified into
//!    [`ResourceLocator`]s (remote URL or bare asset name).
//! 2. **Fetch**: every locator is fetched concurrently by [`fetch_all`]; the batch is
//!    all-or-nothing and bounded by a [`CancelToken`].
//! 3. **Transform**: images are smart-cropped ([`fit_resize`]), scaled ([`scale_to_height`])
//!    or masked ([`circular_mask`]).
//! 4. **Compose**: the [`Composer`] draws its passes in a fixed order onto a [`Canvas`],
//!    shaping text with faces from the shared [`FontCache`].
//!
//! The result is an [`image::RgbaImage`]; encoding and writing it is left to the caller
//! (the `ogcard` binary writes PNG or JPEG).
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **No partial output**: any failure aborts the render.
//! - **Sandboxed local assets**: local names are reduced to a basename under one root.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod compose;
mod fetch;
mod foundation;
mod text;
mod transform;

pub use compose::canvas::{Canvas, CpuCanvas};
pub use compose::composer::Composer;
pub use compose::layout::{
    AUTHOR_COLOR, BORDER, DEFAULT_BACKGROUND, FooterLayout, GAP, MARGIN, MAX_TITLE_CHARS,
    PADDING, TITLE_LINE_HEIGHT, footer_layout,
};
pub use compose::spec::{
    AVATAR_KEY, BACKGROUND_KEY, Background, LOGO_KEY, RenderSpec, truncate_title,
};
pub use fetch::batch::{ResourceBundle, fetch_all};
pub use fetch::cancel::CancelToken;
pub use fetch::fetcher::{
    DefaultFetcher, HttpFetcher, LocalAssets, MAX_BODY_BYTES, ResourceFetcher,
};
pub use fetch::locator::{ResourceLocator, local_basename};
pub use foundation::color::{is_hex_color, parse_hex_color};
pub use foundation::core::{Point, Rect, Rgba8};
pub use foundation::error::{CardError, CardResult};
pub use text::cache::{FontCache, FontHandle, FontProvider, FontSet, FontSource};
pub use text::face::{
    CompositeFace, GlyphRun, PlacedGlyph, TextFace, TextLayout, TextStyle, TextWeight,
};
pub use transform::attention::{CropWindow, choose_crop, crop_size};
pub use transform::codec::{decode_rgba8, encode_png, probe_dimensions};
pub use transform::mask::circular_mask;
pub use transform::resize::{fit_resize, scale_to_height, scaled_width};
