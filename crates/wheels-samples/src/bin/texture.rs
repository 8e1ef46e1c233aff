use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use wheels_engine::logging::init_logging;
use wheels_engine::window::Runtime;
use wheels_samples::cli::WindowArgs;
use wheels_samples::texture::{TextureSample, TITLE};

/// Clears the window every frame and reports the first frame's batch stats.
#[derive(Parser)]
#[command(name = "texture")]
struct Cli {
    #[command(flatten)]
    window: WindowArgs,

    /// Image drawn as a sprite (PNG, JPEG or BMP)
    #[arg(long, value_name = "FILE")]
    image: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.window.logging());

    Runtime::run(
        cli.window.runtime_config(TITLE),
        cli.window.gpu_init(),
        TextureSample::new(cli.image),
    )
}
