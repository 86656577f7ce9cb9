use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use anyhow::Context;

use crate::foundation::error::{CardError, CardResult};
use crate::text::face::{CompositeFace, TextFace};

/// Shared handle to a built composite face.
pub type FontHandle = Arc<CompositeFace>;

/// Where one constituent font comes from.
#[derive(Clone, Debug)]
pub enum FontSource {
    /// A font file on disk, read on every face build.
    Path(PathBuf),
    /// Font bytes already in memory.
    Bytes {
        /// Name used in error messages.
        name: String,
        /// Raw font file contents.
        data: Arc<Vec<u8>>,
    },
}

impl FontSource {
    /// In-memory source.
    pub fn bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self::Bytes {
            name: name.into(),
            data: Arc::new(data),
        }
    }

    /// Human-readable name for logs and errors.
    pub fn label(&self) -> String {
        match self {
            Self::Path(p) => p.display().to_string(),
            Self::Bytes { name, .. } => name.clone(),
        }
    }

    fn read(&self) -> CardResult<Vec<u8>> {
        match self {
            Self::Path(p) => std::fs::read(p)
                .with_context(|| format!("read font '{}'", p.display()))
                .map_err(|e| CardError::font(format!("{e:#}"))),
            Self::Bytes { data, .. } => Ok(data.as_ref().clone()),
        }
    }
}

/// Ordered font sources merged into every composite face.
///
/// The first source is the primary text face, followed by its bold companion, the
/// symbol fallback and finally the emoji fallback.
#[derive(Clone, Debug)]
pub struct FontSet {
    sources: Vec<FontSource>,
}

impl FontSet {
    /// Primary regular face file name.
    pub const REGULAR_FILE: &'static str = "DejaVuSans.ttf";
    /// Bold companion file name.
    pub const BOLD_FILE: &'static str = "DejaVuSans-Bold.ttf";
    /// Symbol fallback file name.
    pub const SYMBOL_FILE: &'static str = "DejaVuMathTeXGyre.ttf";
    /// Emoji fallback file name (monochrome outlines).
    pub const EMOJI_FILE: &'static str = "NotoEmoji-Regular.ttf";

    /// Explicit, ordered source list.
    pub fn new(sources: Vec<FontSource>) -> Self {
        Self { sources }
    }

    /// Directory of the fonts shipped with the crate.
    pub fn bundled_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("assets")
            .join("fonts")
    }

    /// Regular, bold, symbol and emoji faces looked up by their standard names in `dir`.
    ///
    /// Every file is required; a missing one fails the first [`FontCache::load`].
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(
            [
                Self::REGULAR_FILE,
                Self::BOLD_FILE,
                Self::SYMBOL_FILE,
                Self::EMOJI_FILE,
            ]
                .into_iter()
                .map(|f| FontSource::Path(dir.join(f)))
                .collect(),
        )
    }

    /// Append a further fallback face after the standard ones.
    pub fn with_source(mut self, source: FontSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Sources in fallback order.
    pub fn sources(&self) -> &[FontSource] {
        &self.sources
    }
}

impl Default for FontSet {
    fn default() -> Self {
        Self::from_dir(Self::bundled_dir())
    }
}

/// Supplies text faces by point size.
pub trait FontProvider: Send + Sync {
    /// Face for `size`, built on first use.
    fn load(&self, size: f32) -> CardResult<Arc<dyn TextFace>>;
}

/// Lazily built, never evicted composite faces keyed by point size.
///
/// Concurrent first loads of one size may each build a face; the first one inserted is
/// kept and returned to every caller.
#[derive(Debug)]
pub struct FontCache {
    set: FontSet,
    faces: RwLock<HashMap<u32, FontHandle>>,
    source_loads: AtomicUsize,
}

impl Default for FontCache {
    fn default() -> Self {
        Self::new(FontSet::default())
    }
}

impl FontCache {
    /// Empty cache over `set`.
    pub fn new(set: FontSet) -> Self {
        Self {
            set,
            faces: RwLock::new(HashMap::new()),
            source_loads: AtomicUsize::new(0),
        }
    }

    /// Sources every face is built from.
    pub fn font_set(&self) -> &FontSet {
        &self.set
    }

    /// Face for `size`, building it on the first request.
    #[tracing::instrument(skip(self))]
    pub fn load(&self, size: f32) -> CardResult<FontHandle> {
        if !size.is_finite() || size <= 0.0 {
            return Err(CardError::font(format!(
                "font size must be finite and > 0, got {size}"
            )));
        }
        let key = size.to_bits();

        if let Some(face) = self
            .faces
            .read()
            .map_err(|_| CardError::font("font cache lock poisoned"))?
            .get(&key)
        {
            return Ok(Arc::clone(face));
        }

        let fonts = self
            .set
            .sources()
            .iter()
            .map(|src| {
                self.source_loads.fetch_add(1, Ordering::Relaxed);
                Ok((src.label(), src.read()?))
            })
            .collect::<CardResult<Vec<_>>>()?;
        let built = Arc::new(CompositeFace::build(size, fonts)?);

        let mut faces = self
            .faces
            .write()
            .map_err(|_| CardError::font("font cache lock poisoned"))?;
        let kept = Arc::clone(faces.entry(key).or_insert_with(|| Arc::clone(&built)));
        if Arc::ptr_eq(&kept, &built) {
            tracing::info!(size, families = ?kept.families(), "built composite face");
        }
        Ok(kept)
    }

    /// How many font source reads happened so far.
    pub fn source_loads(&self) -> usize {
        self.source_loads.load(Ordering::Relaxed)
    }

    /// Number of cached faces.
    pub fn len(&self) -> usize {
        self.faces.read().map(|f| f.len()).unwrap_or(0)
    }

    /// True when no face has been built yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FontProvider for FontCache {
    fn load(&self, size: f32) -> CardResult<Arc<dyn TextFace>> {
        let face: Arc<dyn TextFace> = FontCache::load(self, size)?;
        Ok(face)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/cache.rs"]
mod tests;
