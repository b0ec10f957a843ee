use crate::bounding_box::BoundingBox;
use crate::contour::Pixel;

/// Canonical width all feature coordinates are rescaled to
pub const BASELINE_WIDTH: u32 = 50;

/// Maps coordinates from a native image size onto the canonical baseline,
/// keeping the aspect ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    original_width: u32,
    original_height: u32,
    baseline_width: u32,
    normalized_height: u32,
}

impl Normalizer {
    pub fn new(original_width: u32, original_height: u32, baseline_width: u32) -> Self {
        Self {
            original_width,
            original_height,
            baseline_width,
            normalized_height: normalized_height(original_width, original_height, baseline_width),
        }
    }

    /// Canonical (width, height) of the source image
    pub fn normalized_dimensions(&self) -> (u32, u32) {
        (self.baseline_width, self.normalized_height)
    }

    pub fn normalize_pixel(&self, pixel: &Pixel) -> Pixel {
        if self.original_width == self.baseline_width {
            return *pixel;
        }

        let ratio_x = f64::from(self.baseline_width) / f64::from(self.original_width);
        let ratio_y = f64::from(self.normalized_height) / f64::from(self.original_height);

        Pixel::new(
            (f64::from(pixel.x) * ratio_x).round() as i32,
            (f64::from(pixel.y) * ratio_y).round() as i32,
            pixel.val,
        )
    }

    /// Both corners go through the same mapping as single pixels
    pub fn normalize_bounding_box(&self, bbox: &BoundingBox) -> BoundingBox {
        let max = self.normalize_pixel(&Pixel::new(bbox.max_x, bbox.max_y, 0));
        let min = self.normalize_pixel(&Pixel::new(bbox.min_x, bbox.min_y, 0));
        BoundingBox::new(max.x, min.x, max.y, min.y)
    }
}

/// `round(height / width * baseline_width)`
pub fn normalized_height(width: u32, height: u32, baseline_width: u32) -> u32 {
    let aspect = f64::from(height) / f64::from(width);
    (aspect * f64::from(baseline_width)).round() as u32
}
