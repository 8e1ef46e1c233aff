use std::path::PathBuf;

/// Errors produced while loading fonts or building font atlases.
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("failed to parse font: {0}")]
    Parse(String),

    #[error("no installed font matches family {0:?}")]
    NotFound(String),

    #[error("failed to read font file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("fallback character {0:?} has no glyph in this font")]
    MissingFallback(char),

    #[error("glyphs do not fit in a {max}x{max} atlas")]
    AtlasOverflow { max: u32 },

    #[error("invalid font size {0}")]
    InvalidSize(f32),
}
