use std::fmt::Display;

/// Convenience result type used across ogcard.
pub type CardResult<T> = Result<T, CardError>;

/// Top-level error taxonomy returned by every stage of a card render.
///
/// Each variant carries a human-readable message that already includes the stage and
/// resource it came from (see [`CardError::context`]).
#[derive(thiserror::Error, Debug)]
pub enum CardError {
    /// Malformed or unsafe resource locator.
    #[error("locator error: {0}")]
    Locator(String),

    /// Network or file I/O failure, bad HTTP status, or oversize body.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Bytes are not a decodable image.
    #[error("decode error: {0}")]
    Decode(String),

    /// Resize, crop, scale or encode failure.
    #[error("transform error: {0}")]
    Transform(String),

    /// Invalid render spec field (bad hex color, out-of-range value, ...).
    #[error("config error: {0}")]
    Config(String),

    /// A required font resource failed to load or parse.
    #[error("font error: {0}")]
    Font(String),

    /// Canvas setup or drawing failure.
    #[error("render error: {0}")]
    Render(String),

    /// The caller cancelled the operation or its deadline passed.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CardError {
    /// Build a [`CardError::Locator`] value.
    pub fn locator(msg: impl Into<String>) -> Self {
        Self::Locator(msg.into())
    }

    /// Build a [`CardError::Fetch`] value.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Build a [`CardError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`CardError::Transform`] value.
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform(msg.into())
    }

    /// Build a [`CardError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`CardError::Font`] value.
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`CardError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CardError::Cancelled`] value.
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Prefix the message with `ctx` while keeping the error kind.
    pub fn context(self, ctx: impl Display) -> Self {
        match self {
            Self::Locator(m) => Self::Locator(format!("{ctx}: {m}")),
            Self::Fetch(m) => Self::Fetch(format!("{ctx}: {m}")),
            Self::Decode(m) => Self::Decode(format!("{ctx}: {m}")),
            Self::Transform(m) => Self::Transform(format!("{ctx}: {m}")),
            Self::Config(m) => Self::Config(format!("{ctx}: {m}")),
            Self::Font(m) => Self::Font(format!("{ctx}: {m}")),
            Self::Render(m) => Self::Render(format!("{ctx}: {m}")),
            Self::Cancelled(m) => Self::Cancelled(format!("{ctx}: {m}")),
            Self::Other(e) => Self::Other(e.context(ctx.to_string())),
        }
    }

    /// True for [`CardError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
