//! Heightmap meshing.
//!
//! Turns a decoded image into a vertex list and a triangle-strip index list.
//! Nothing in here touches the GPU; the render layer uploads the result as-is.

mod error;
mod grid;
mod heightmap;

pub use error::{HeightmapError, MeshError};
pub use grid::{build_grid, GridExtents, GridMesh, GridVertex, ELEVATION_SCALE, RESTART_OFFSET};
pub use heightmap::Heightmap;
