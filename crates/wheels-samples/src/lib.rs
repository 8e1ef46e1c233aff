//! Sample programs for `wheels-engine`.
//!
//! Each sample keeps its per-frame drawing in a function over a
//! [`NamedBatcher`](wheels_engine::batch::NamedBatcher) and a
//! [`Renderer`](wheels_engine::render::Renderer), so it runs the same against
//! the GPU renderer and the headless one.

pub mod cli;
pub mod font;
pub mod shapes;
pub mod texture;

use wheels_engine::batch::BatchStats;

/// Identifier of the 1x1 white texture used for plain shapes.
pub const BLANK: &str = "blank";

/// Prints batch diagnostics the way the samples report their first frame.
pub fn print_stats(stats: BatchStats) {
    println!("Vertices: {}", stats.vertices_submitted);
    println!("Indices: {}", stats.indices_submitted);
    println!("Batches: {}", stats.batch_count);
}
