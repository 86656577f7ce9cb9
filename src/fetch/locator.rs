use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::foundation::error::{CardError, CardResult};

/// Where a pictorial resource comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResourceLocator {
    /// Absolute `http`/`https` URL.
    Remote(Url),
    /// Bare file name resolved under the sandboxed asset root.
    Local(String),
}

impl ResourceLocator {
    /// Classify a caller-supplied string.
    ///
    /// Anything that parses as an absolute URL must use `http` or `https`. Everything
    /// else is a local asset name reduced to its last path segment.
    pub fn parse(raw: &str) -> CardResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CardError::locator("empty locator"));
        }

        match Url::parse(raw) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(Self::Remote(url)),
                other => Err(CardError::locator(format!(
                    "unsupported URL scheme \"{other}\" in \"{raw}\""
                ))),
            },
            Err(_) => local_basename(raw).map(Self::Local),
        }
    }

    /// True for [`ResourceLocator::Remote`].
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl FromStr for ResourceLocator {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ResourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{url}"),
            Self::Local(name) => write!(f, "asset:{name}"),
        }
    }
}

/// Reduce a local locator to a bare file name.
///
/// Backslashes count as separators, `../` runs are dropped, and only the final
/// segment survives.
pub fn local_basename(raw: &str) -> CardResult<String> {
    let normalized = raw.replace('\\', "/").replace("../", "");
    let name = normalized
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        return Err(CardError::locator(format!(
            "\"{raw}\" does not name an asset file"
        )));
    }
    Ok(name.to_owned())
}

#[cfg(test)]
#[path = "../../tests/unit/fetch/locator.rs"]
mod tests;
