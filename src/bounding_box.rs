use serde::Serialize;
use std::fmt;

use crate::contour::Pixel;
use crate::errors::ExtractionError;

/// Axis-aligned extrema of a contour pixel set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub max_x: i32,
    pub min_x: i32,
    pub max_y: i32,
    pub min_y: i32,
}

impl BoundingBox {
    pub fn new(max_x: i32, min_x: i32, max_y: i32, min_y: i32) -> Self {
        Self { max_x, min_x, max_y, min_y }
    }

    /// Values in feature-table column order
    pub fn values(&self) -> [i32; 4] {
        [self.max_x, self.min_x, self.max_y, self.min_y]
    }

    pub fn width(&self) -> u32 {
        (self.max_x - self.min_x + 1) as u32
    }

    pub fn height(&self) -> u32 {
        (self.max_y - self.min_y + 1) as u32
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BoundingBox(maxX={}, minX={}, maxY={}, minY={})",
            self.max_x, self.min_x, self.max_y, self.min_y
        )
    }
}

/// Calculate the bounding box of a contour pixel set
pub fn bounding_box(pixels: &[Pixel]) -> Result<BoundingBox, ExtractionError> {
    let first = pixels.first().ok_or(ExtractionError::EmptyContour)?;

    let bbox = pixels.iter().fold(
        BoundingBox::new(first.x, first.x, first.y, first.y),
        |acc, p| BoundingBox {
            max_x: acc.max_x.max(p.x),
            min_x: acc.min_x.min(p.x),
            max_y: acc.max_y.max(p.y),
            min_y: acc.min_y.min(p.y),
        },
    );

    Ok(bbox)
}
