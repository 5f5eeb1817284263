use std::ffi::OsString;
use std::path::PathBuf;

use winit::dpi::LogicalSize;

use heightmap_engine::camera::CameraConfig;
use heightmap_engine::device::GpuInit;
use heightmap_engine::mesh::GridExtents;
use heightmap_engine::render::TerrainConfig;
use heightmap_engine::window::RuntimeConfig;

/// Overrides [`ViewerConfig::shader_dir`].
pub const SHADER_DIR_ENV: &str = "HEIGHTMAP_SHADER_DIR";

/// Shaders shipped with this crate.
const DEFAULT_SHADER_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/shaders");

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub extents: GridExtents,
    pub shader_dir: PathBuf,
    pub camera: CameraConfig,
    pub terrain: TerrainConfig,
    pub runtime: RuntimeConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig {
            title: "Heightmap Viewer".to_string(),
            initial_size: LogicalSize::new(720.0, 576.0),
        };
        let camera = CameraConfig {
            initial_aspect: (runtime.initial_size.width / runtime.initial_size.height) as f32,
            ..CameraConfig::default()
        };

        Self {
            extents: GridExtents::new(40.0, 40.0),
            shader_dir: PathBuf::from(DEFAULT_SHADER_DIR),
            camera,
            terrain: TerrainConfig::default(),
            runtime,
        }
    }
}

impl ViewerConfig {
    /// Defaults, with the shader directory taken from `HEIGHTMAP_SHADER_DIR` if set.
    pub fn from_env() -> Self {
        Self::default().with_shader_dir_override(std::env::var_os(SHADER_DIR_ENV))
    }

    fn with_shader_dir_override(mut self, dir: Option<OsString>) -> Self {
        if let Some(dir) = dir.filter(|d| !d.is_empty()) {
            log::debug!("{SHADER_DIR_ENV} overrides shader directory");
            self.shader_dir = PathBuf::from(dir);
        }
        self
    }

    /// Wireframe is optional: requested, but startup does not depend on it.
    pub fn gpu_init(&self) -> GpuInit {
        GpuInit {
            optional_features: wgpu::Features::POLYGON_MODE_LINE,
            ..GpuInit::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ViewerConfig::default();
        assert_eq!(c.extents, GridExtents::new(40.0, 40.0));
        assert!(c.shader_dir.ends_with("shaders"));
        assert_eq!(c.camera.initial_aspect, 720.0 / 576.0);
        assert_eq!(c.terrain.sample_count, 4);
    }

    #[test]
    fn env_override_replaces_shader_dir() {
        let c = ViewerConfig::default().with_shader_dir_override(Some("/tmp/custom".into()));
        assert_eq!(c.shader_dir, PathBuf::from("/tmp/custom"));
    }

    #[test]
    fn empty_override_is_ignored() {
        let c = ViewerConfig::default().with_shader_dir_override(Some(OsString::new()));
        assert_eq!(c.shader_dir, PathBuf::from(DEFAULT_SHADER_DIR));
    }

    #[test]
    fn wireframe_is_optional() {
        let init = ViewerConfig::default().gpu_init();
        assert!(init.optional_features.contains(wgpu::Features::POLYGON_MODE_LINE));
        assert!(init.required_features.is_empty());
    }
}
