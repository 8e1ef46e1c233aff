use crate::render::TextureError;
use crate::text::FontError;

use super::FontId;

/// Errors reported by [`Batcher`](super::Batcher) and
/// [`NamedBatcher`](super::NamedBatcher).
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("start() called while a batch is already started")]
    AlreadyStarted,

    #[error("finish() called without a matching start()")]
    NotStarted,

    #[error("no texture registered under {0:?}")]
    UnknownTexture(String),

    #[error("no font registered under {0:?}")]
    UnknownFont(String),

    #[error("font id {0:?} does not belong to this batcher")]
    InvalidFontId(FontId),

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error(transparent)]
    Font(#[from] FontError),
}
