use clap::Args;
use winit::dpi::{LogicalPosition, LogicalSize};

use wheels_engine::device::GpuInit;
use wheels_engine::logging::LoggingConfig;
use wheels_engine::window::RuntimeConfig;

/// Window and device flags shared by all samples.
#[derive(Debug, Clone, Args)]
pub struct WindowArgs {
    /// Window width in logical pixels
    #[arg(long, default_value_t = 960.0)]
    pub width: f64,

    /// Window height in logical pixels
    #[arg(long, default_value_t = 540.0)]
    pub height: f64,

    /// Present without waiting for vertical sync
    #[arg(long)]
    pub no_vsync: bool,

    /// Enable graphics backend validation
    #[arg(long)]
    pub debug: bool,

    /// Log filter in env_logger syntax (overrides RUST_LOG)
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,
}

impl WindowArgs {
    pub fn runtime_config(&self, title: &str) -> RuntimeConfig {
        RuntimeConfig {
            title: title.to_string(),
            position: Some(LogicalPosition::new(100.0, 100.0)),
            initial_size: LogicalSize::new(self.width, self.height),
            ..RuntimeConfig::default()
        }
    }

    pub fn gpu_init(&self) -> GpuInit {
        GpuInit {
            debug: self.debug,
            vsync: !self.no_vsync,
            ..GpuInit::default()
        }
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            env_filter: self.log.clone(),
            ..LoggingConfig::default()
        }
    }
}
