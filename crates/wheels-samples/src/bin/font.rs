use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use wheels_engine::logging::init_logging;
use wheels_engine::window::Runtime;
use wheels_samples::cli::WindowArgs;
use wheels_samples::font::{FontSample, FontSource, TITLE};

/// Renders plain and rotated text from a font atlas.
#[derive(Parser)]
#[command(name = "font")]
struct Cli {
    #[command(flatten)]
    window: WindowArgs,

    /// Font file to use instead of an installed family
    #[arg(long, value_name = "FILE", conflicts_with = "family")]
    font: Option<PathBuf>,

    /// Installed font family; may be given several times, first match wins
    #[arg(long)]
    family: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.window.logging());

    let source = match (cli.font, cli.family) {
        (Some(path), _) => FontSource::File(path),
        (None, families) if !families.is_empty() => FontSource::Families(families),
        _ => FontSource::default(),
    };

    Runtime::run(
        cli.window.runtime_config(TITLE),
        cli.window.gpu_init(),
        FontSample::new(source),
    )
}
