//! Heightmap engine crate.
//!
//! Heightmap meshing and camera state (pure, testable without a GPU), plus the
//! wgpu/winit runtime that draws them.

pub mod camera;
pub mod mesh;

pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod render;
pub mod window;
