pub use log::{trace, debug, info, warn, error};

/// Install the process-wide logger with the engine defaults.
///
/// `RUST_LOG` still overrides anything set here.
pub fn initialize() -> Result<(), anyhow::Error> {
    initialize_with_level(log::LevelFilter::Info)
}

pub fn initialize_with_level(level: log::LevelFilter) -> Result<(), anyhow::Error> {
    env_logger::builder()
        .filter_level(level)
        .filter_module("wgpu_core", log::LevelFilter::Warn)
        .filter_module("wgpu_hal", log::LevelFilter::Error)
        .filter_module("naga", log::LevelFilter::Error)
        .parse_default_env()
        .try_init()?;

    Ok(())
}
