use image::GrayImage;
use serde::Serialize;

/// Intensity value a contour cell carries when read as signed "white"
pub const WHITE_PIXEL_VAL: i32 = -1;
/// Intensity value a contour cell carries when read as 8-bit maximum
pub const BLACK_PIXEL_VAL: i32 = 255;

/// A grid cell: coordinates plus the intensity it was read with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Pixel {
    pub x: i32,
    pub y: i32,
    pub val: i32,
}

impl Pixel {
    pub fn new(x: i32, y: i32, val: i32) -> Self {
        Self { x, y, val }
    }
}

/// Read-only view of a rectangular grid of integer intensities
pub trait IntensityGrid {
    /// (width, height)
    fn size(&self) -> (u32, u32);

    fn intensity(&self, x: u32, y: u32) -> i32;
}

impl IntensityGrid for GrayImage {
    fn size(&self) -> (u32, u32) {
        self.dimensions()
    }

    #[inline]
    fn intensity(&self, x: u32, y: u32) -> i32 {
        i32::from(self.get_pixel(x, y)[0])
    }
}

/// The two intensities that mark a cell as part of the triangle outline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContourMarkers {
    pub white: i32,
    pub black: i32,
}

impl ContourMarkers {
    pub fn new(values: [i32; 2]) -> Self {
        Self {
            white: values[0],
            black: values[1],
        }
    }

    #[inline]
    pub fn is_contour(&self, value: i32) -> bool {
        value == self.white || value == self.black
    }
}

impl Default for ContourMarkers {
    fn default() -> Self {
        Self {
            white: WHITE_PIXEL_VAL,
            black: BLACK_PIXEL_VAL,
        }
    }
}

/// Collect every contour cell of the grid.
///
/// Columns are scanned left to right and each column top to bottom, so the
/// output order is fixed for a given grid. An empty result is not an error
/// here; the bounding box stage rejects it.
pub fn scan_contour<G: IntensityGrid + ?Sized>(grid: &G, markers: ContourMarkers) -> Vec<Pixel> {
    let (width, height) = grid.size();
    let mut pixels = Vec::new();

    for x in 0..width {
        for y in 0..height {
            let value = grid.intensity(x, y);
            if markers.is_contour(value) {
                pixels.push(Pixel::new(x as i32, y as i32, value));
            }
        }
    }

    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn keeps_only_marker_values() {
        let mut grid = GrayImage::new(4, 3);
        grid.put_pixel(1, 0, Luma([255]));
        grid.put_pixel(2, 2, Luma([128]));
        grid.put_pixel(3, 1, Luma([255]));

        let pixels = scan_contour(&grid, ContourMarkers::default());

        assert_eq!(pixels, vec![Pixel::new(1, 0, 255), Pixel::new(3, 1, 255)]);
    }

    #[test]
    fn scans_column_major() {
        let grid = GrayImage::from_pixel(2, 2, Luma([255]));
        let pixels = scan_contour(&grid, ContourMarkers::default());
        let coords: Vec<(i32, i32)> = pixels.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(coords, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn blank_grid_has_no_contour() {
        let grid = GrayImage::new(28, 28);
        assert!(scan_contour(&grid, ContourMarkers::default()).is_empty());
    }

    #[test]
    fn custom_markers() {
        let mut grid = GrayImage::new(3, 1);
        grid.put_pixel(0, 0, Luma([10]));
        grid.put_pixel(2, 0, Luma([255]));

        let pixels = scan_contour(&grid, ContourMarkers::new([10, 20]));
        assert_eq!(pixels, vec![Pixel::new(0, 0, 10)]);
    }
}
