//! Immediate-mode 2D batching.
//!
//! [`Batcher`] turns primitives into one vertex/index stream per frame and
//! splits it into batches on graphics state changes. [`NamedBatcher`] adds
//! string identifiers for textures and fonts.

mod batcher;
mod error;
mod named;
mod shapes;
mod text;

pub use batcher::{BatchStats, Batcher, FontId};
pub use error::BatchError;
pub use named::NamedBatcher;
