mod platform;

use std::path::PathBuf;

use engine_logging::{engine_info, engine_warn};
use platform::config::{load_config, AppConfig, DEFAULT_CONFIG_FILE};

fn main() -> anyhow::Result<()> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let loaded = load_config(&path);
    let config = match &loaded {
        Ok(Some(config)) => config.clone(),
        Ok(None) | Err(_) => AppConfig::default(),
    };

    engine_logging::initialize(
        config.log.destination,
        config.log.level_filter(),
        &config.log.file,
    );
    match loaded {
        Ok(Some(_)) => engine_info!("Loaded config from {:?}", path),
        Ok(None) => engine_info!("No config at {:?}, using defaults", path),
        Err(err) => {
            engine_warn!("{}; using defaults", err);
            eprintln!("warning: {err}; using defaults");
        }
    }

    platform::run_app(config)
}
