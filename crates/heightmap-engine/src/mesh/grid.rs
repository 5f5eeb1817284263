use bytemuck::{Pod, Zeroable};

use super::error::MeshError;
use super::heightmap::Heightmap;

/// World-space height of a fully red pixel.
pub const ELEVATION_SCALE: f32 = 4.0;

/// Added to the vertex count to form the row restart sentinel.
pub const RESTART_OFFSET: u32 = 9999;

/// World-space footprint of the grid, centred on the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GridExtents {
    /// Size along X.
    pub width: f32,
    /// Size along Z.
    pub depth: f32,
}

impl GridExtents {
    pub const fn new(width: f32, depth: f32) -> Self {
        Self { width, depth }
    }

    fn is_valid(self) -> bool {
        self.width.is_finite() && self.depth.is_finite() && self.width > 0.0 && self.depth > 0.0
    }
}

/// Interleaved vertex record, laid out for direct upload.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GridVertex {
    pub position: [f32; 3],
    pub colour: [f32; 3],
}

/// Vertex and strip index lists for one heightmap.
///
/// Rows are emitted as `(row, row below)` index pairs; every row, the last one
/// included, is terminated by [`GridMesh::restart_index`].
#[derive(Debug, Clone, PartialEq)]
pub struct GridMesh {
    vertices: Vec<GridVertex>,
    indices: Vec<u32>,
    restart_index: u32,
    columns: u32,
    rows: u32,
}

impl GridMesh {
    pub fn vertices(&self) -> &[GridVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Sentinel separating strips; strictly greater than any vertex index.
    pub fn restart_index(&self) -> u32 {
        self.restart_index
    }

    /// Source image size as `(columns, rows)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Number of restart-terminated strips.
    pub fn strip_count(&self) -> usize {
        self.indices
            .iter()
            .filter(|&&i| i == self.restart_index)
            .count()
    }

    /// Index list with the sentinel rewritten to `restart`.
    ///
    /// GPU APIs with a fixed restart value (wgpu: `u32::MAX` for `Uint32`) need this
    /// before upload.
    pub fn remapped_indices(&self, restart: u32) -> Vec<u32> {
        self.indices
            .iter()
            .map(|&i| if i == self.restart_index { restart } else { i })
            .collect()
    }
}

/// `w * h + RESTART_OFFSET`, or `TooLarge` if that overflows a `u32` index.
fn restart_sentinel(w: u32, h: u32) -> Result<u32, MeshError> {
    w.checked_mul(h)
        .and_then(|n| n.checked_add(RESTART_OFFSET))
        .ok_or(MeshError::TooLarge { width: w, height: h })
}

/// Builds the grid mesh for `heightmap` spread over `extents`.
///
/// Vertex `row * W + col` sits at `x = -width/2 + col * width/(W-1)`,
/// `z = -depth/2 + row * depth/(H-1)` and `y = ELEVATION_SCALE * red`.
pub fn build_grid(heightmap: &Heightmap, extents: GridExtents) -> Result<GridMesh, MeshError> {
    let (w, h) = (heightmap.width(), heightmap.height());
    if w < 2 || h < 2 {
        return Err(MeshError::Degenerate { width: w, height: h });
    }
    if !extents.is_valid() {
        return Err(MeshError::InvalidExtents {
            width: extents.width,
            depth: extents.depth,
        });
    }

    let restart_index = restart_sentinel(w, h)?;

    let x_step = extents.width / (w - 1) as f32;
    let z_step = extents.depth / (h - 1) as f32;
    let x0 = -extents.width / 2.0;
    let z0 = -extents.depth / 2.0;

    let mut vertices = Vec::with_capacity((w as usize) * (h as usize));
    for row in 0..h {
        let z = z0 + row as f32 * z_step;
        for col in 0..w {
            let x = x0 + col as f32 * x_step;
            let colour = heightmap.rgb(col, row);
            vertices.push(GridVertex {
                position: [x, colour[0] * ELEVATION_SCALE, z],
                colour,
            });
        }
    }

    let per_row = 2 * (w as usize - 1) + 1;
    let mut indices = Vec::with_capacity(per_row * (h as usize - 1));
    for row in 0..h - 1 {
        for col in 0..w - 1 {
            indices.push(row * w + col);
            indices.push((row + 1) * w + col);
        }
        indices.push(restart_index);
    }

    log::debug!(
        "grid mesh built: {} vertices, {} indices, restart {}",
        vertices.len(),
        indices.len(),
        restart_index
    );

    Ok(GridMesh {
        vertices,
        indices,
        restart_index,
        columns: w,
        rows: h,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    const EPS: f32 = 1e-5;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() <= EPS
    }

    fn gradient(w: u32, h: u32) -> Heightmap {
        Heightmap::from_rgb(RgbImage::from_fn(w, h, |x, y| {
            Rgb([((x * 37 + y * 11) % 256) as u8, (y * 5 % 256) as u8, 200])
        }))
    }

    fn black(w: u32, h: u32) -> Heightmap {
        Heightmap::from_rgb(RgbImage::new(w, h))
    }

    // ── degenerate input ──────────────────────────────────────────────────

    #[test]
    fn single_column_is_rejected() {
        let err = build_grid(&black(1, 5), GridExtents::new(2.0, 2.0)).unwrap_err();
        assert_eq!(err, MeshError::Degenerate { width: 1, height: 5 });
    }

    #[test]
    fn single_row_is_rejected() {
        let err = build_grid(&black(5, 1), GridExtents::new(2.0, 2.0)).unwrap_err();
        assert_eq!(err, MeshError::Degenerate { width: 5, height: 1 });
    }

    #[test]
    fn non_positive_extents_are_rejected() {
        let hm = black(3, 3);
        assert!(matches!(
            build_grid(&hm, GridExtents::new(0.0, 2.0)),
            Err(MeshError::InvalidExtents { .. })
        ));
        assert!(matches!(
            build_grid(&hm, GridExtents::new(2.0, f32::NAN)),
            Err(MeshError::InvalidExtents { .. })
        ));
    }

    #[test]
    fn sentinel_overflow_is_too_large() {
        assert_eq!(restart_sentinel(2, 2), Ok(10003));
        assert_eq!(
            restart_sentinel(65536, 65536),
            Err(MeshError::TooLarge { width: 65536, height: 65536 })
        );
        // Fits as a product but not once the offset is added.
        assert_eq!(
            restart_sentinel(u32::MAX, 1),
            Err(MeshError::TooLarge { width: u32::MAX, height: 1 })
        );
    }

    // ── counts ────────────────────────────────────────────────────────────

    #[test]
    fn counts_match_image_size() {
        for (w, h) in [(2, 2), (3, 2), (2, 7), (5, 4), (16, 9)] {
            let mesh = build_grid(&gradient(w, h), GridExtents::new(40.0, 40.0)).unwrap();
            let (w, h) = (w as usize, h as usize);

            assert_eq!(mesh.vertices().len(), w * h);
            assert_eq!(mesh.strip_count(), h - 1);

            let pairs = mesh.indices().len() - mesh.strip_count();
            assert_eq!(pairs, 2 * (w - 1) * (h - 1));
            assert_eq!(mesh.indices().len(), (h - 1) * (2 * (w - 1) + 1));
        }
    }

    #[test]
    fn every_row_ends_with_restart() {
        let mesh = build_grid(&gradient(4, 3), GridExtents::new(1.0, 1.0)).unwrap();
        let per_row = 2 * 3 + 1;
        for row in mesh.indices().chunks(per_row) {
            assert_eq!(row.len(), per_row);
            assert_eq!(*row.last().unwrap(), mesh.restart_index());
            assert!(row[..per_row - 1].iter().all(|&i| i != mesh.restart_index()));
        }
        assert_eq!(mesh.indices().last().copied(), Some(mesh.restart_index()));
    }

    #[test]
    fn restart_exceeds_every_vertex_index() {
        let mesh = build_grid(&gradient(7, 5), GridExtents::new(1.0, 1.0)).unwrap();
        let max_vertex = mesh.vertices().len() as u32 - 1;

        assert_eq!(mesh.restart_index(), 7 * 5 + RESTART_OFFSET);
        assert!(mesh.restart_index() > max_vertex);
        assert!(
            mesh.indices()
                .iter()
                .filter(|&&i| i != mesh.restart_index())
                .all(|&i| i <= max_vertex)
        );
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn x_spans_width_and_z_spans_depth() {
        let (w, h) = (6, 4);
        let mesh = build_grid(&gradient(w, h), GridExtents::new(40.0, 10.0)).unwrap();
        let v = mesh.vertices();

        for row in 0..h as usize {
            let first = v[row * w as usize].position;
            let last = v[row * w as usize + w as usize - 1].position;
            assert!(approx(first[0], -20.0));
            assert!(approx(last[0], 20.0));
        }
        assert!(approx(v[0].position[2], -5.0));
        assert!(approx(v[v.len() - 1].position[2], 5.0));
    }

    #[test]
    fn elevation_is_scaled_red() {
        let hm = gradient(5, 5);
        let mesh = build_grid(&hm, GridExtents::new(1.0, 1.0)).unwrap();

        for (i, vertex) in mesh.vertices().iter().enumerate() {
            let (col, row) = (i as u32 % 5, i as u32 / 5);
            let rgb = hm.rgb(col, row);
            assert!(approx(vertex.position[1], ELEVATION_SCALE * rgb[0]));
            assert_eq!(vertex.colour, rgb);
        }
    }

    #[test]
    fn strip_pairs_current_row_with_row_below() {
        let mesh = build_grid(&black(3, 3), GridExtents::new(1.0, 1.0)).unwrap();
        let r = mesh.restart_index();
        assert_eq!(mesh.indices(), &[0, 3, 1, 4, r, 3, 6, 4, 7, r]);
    }

    #[test]
    fn black_two_by_two() {
        let mesh = build_grid(&black(2, 2), GridExtents::new(2.0, 2.0)).unwrap();

        let corners: Vec<[f32; 3]> = mesh.vertices().iter().map(|v| v.position).collect();
        assert_eq!(
            corners,
            vec![
                [-1.0, 0.0, -1.0],
                [1.0, 0.0, -1.0],
                [-1.0, 0.0, 1.0],
                [1.0, 0.0, 1.0],
            ]
        );
        assert_eq!(mesh.restart_index(), 10003);
        assert_eq!(mesh.indices(), &[0, 2, 10003]);
        assert_eq!(mesh.dimensions(), (2, 2));
    }

    // ── upload helpers ────────────────────────────────────────────────────

    #[test]
    fn remap_only_touches_sentinel() {
        let mesh = build_grid(&black(3, 2), GridExtents::new(1.0, 1.0)).unwrap();
        assert_eq!(mesh.remapped_indices(u32::MAX), vec![0, 3, 1, 4, u32::MAX]);
    }
}
