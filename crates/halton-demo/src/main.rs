mod app;
mod camera;
mod compositor;
mod config;
mod hud;
mod scene;
mod settings;
mod temporal;

use halton_engine::device::GpuInit;
use halton_engine::logging::{init_logging, LoggingConfig};
use halton_engine::window::Runtime;

use crate::app::DemoApp;
use crate::config::DemoConfig;

fn main() {
    init_logging(LoggingConfig::default());

    let config = DemoConfig::from_env();
    log::info!("assets: {}", config.asset_dir.display());

    let runtime_config = config.runtime_config();
    if let Err(e) = Runtime::run(runtime_config, GpuInit::default(), DemoApp::new(config)) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
