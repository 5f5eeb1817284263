use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain a pixel buffer from disk.
#[derive(Debug, Error)]
pub enum HeightmapError {
    #[error("failed to decode heightmap image: {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Failure to build a grid mesh from a pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MeshError {
    #[error("heightmap must be at least 2x2 pixels, got {width}x{height}")]
    Degenerate { width: u32, height: u32 },

    #[error("grid extents must be finite and positive, got {width}x{depth}")]
    InvalidExtents { width: f32, depth: f32 },

    #[error("heightmap of {width}x{height} pixels does not fit 32-bit indices")]
    TooLarge { width: u32, height: u32 },
}
