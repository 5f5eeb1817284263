use std::path::Path;

use image::RgbImage;

use super::error::HeightmapError;

/// Immutable row-major RGB pixel buffer.
///
/// Red drives elevation; the full triple is carried through as vertex colour.
#[derive(Debug, Clone)]
pub struct Heightmap {
    pixels: RgbImage,
}

impl Heightmap {
    /// Decodes an image file (any format enabled on the `image` crate) into RGB8.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HeightmapError> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|source| HeightmapError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        let heightmap = Self::from_rgb(decoded.to_rgb8());
        log::info!(
            "heightmap {} loaded ({}x{} px)",
            path.display(),
            heightmap.width(),
            heightmap.height()
        );
        Ok(heightmap)
    }

    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Returns the pixel at `(x, y)` with each channel normalized to `[0, 1]`.
    ///
    /// Panics if the coordinate is out of bounds.
    #[inline]
    pub fn rgb(&self, x: u32, y: u32) -> [f32; 3] {
        let [r, g, b] = self.pixels.get_pixel(x, y).0;
        [unorm(r), unorm(g), unorm(b)]
    }
}

#[inline]
fn unorm(channel: u8) -> f32 {
    f32::from(channel) / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn rgb_is_normalized() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(1, 0, Rgb([255, 0, 51]));
        let hm = Heightmap::from_rgb(img);

        assert_eq!(hm.rgb(0, 0), [0.0, 0.0, 0.0]);
        assert_eq!(hm.rgb(1, 0), [1.0, 0.0, 0.2]);
    }

    #[test]
    fn open_missing_file_reports_path() {
        let err = Heightmap::open("does/not/exist.png").unwrap_err();
        let HeightmapError::Decode { path, .. } = &err;
        assert_eq!(path, Path::new("does/not/exist.png"));
        assert!(err.to_string().contains("does/not/exist.png"));
    }
}
