use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use heightmap_engine::logging::{init_logging, LoggingConfig};
use heightmap_engine::window::Runtime;

mod app;
mod config;

use app::Viewer;
use config::ViewerConfig;

/// Renders a heightmap image as an interactive 3D terrain.
///
/// Left drag spins, right drag pans, the wheel zooms. W/S switch between
/// wireframe and filled, F/N between full screen and windowed, Escape quits.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Heightmap image; red drives elevation, RGB colours the vertex.
    image: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(LoggingConfig::default());

    let config = ViewerConfig::from_env();
    let viewer = Viewer::load(&args.image, &config)?;

    Runtime::run(config.runtime.clone(), config.gpu_init(), viewer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn image_argument_is_required() {
        assert!(Args::try_parse_from(["heightmap-viewer"]).is_err());
        let args = Args::try_parse_from(["heightmap-viewer", "terrain.png"]).unwrap();
        assert_eq!(args.image, PathBuf::from("terrain.png"));
    }
}
