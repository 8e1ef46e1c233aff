use anyhow::Result;
use clap::Parser;

use wheels_engine::logging::init_logging;
use wheels_engine::window::Runtime;
use wheels_samples::cli::WindowArgs;
use wheels_samples::shapes::{ShapesSample, TITLE};

/// Draws filled and outlined shapes and a spinning square.
#[derive(Parser)]
#[command(name = "shapes")]
struct Cli {
    #[command(flatten)]
    window: WindowArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.window.logging());

    Runtime::run(
        cli.window.runtime_config(TITLE),
        cli.window.gpu_init(),
        ShapesSample::new(),
    )
}
