//! GPU rendering subsystem.
//!
//! `shader` loads and validates the WGSL stage sources; `terrain` owns the GPU
//! copy of a grid mesh and draws it each frame.

mod ctx;
pub mod shader;
pub mod terrain;

pub use ctx::{RenderCtx, RenderTarget};
pub use shader::{ShaderError, ShaderSources};
pub use terrain::{TerrainConfig, TerrainRenderer};
