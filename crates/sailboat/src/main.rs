use std::path::PathBuf;

use ocean_sim::SceneConfig;
use sailboat::app::run;
use sailboat::SailScene;

fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("SAILBOAT_CONFIG"))
        .map(PathBuf::from)
}

fn main() {
    env_logger::init();

    let config = match config_path() {
        Some(path) => match SceneConfig::load(&path) {
            Ok(config) => {
                log::info!("Loaded scene config from {}", path.display());
                config
            }
            Err(e) => {
                log::error!("Failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => SceneConfig::default(),
    };

    if let Err(e) = run::<SailScene>(config) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
