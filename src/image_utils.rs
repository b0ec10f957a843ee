use bresenham::Bresenham;
use image::{imageops, GrayImage, Luma, Rgb, RgbImage};
use imageproc::contrast::{otsu_level, threshold};
use imageproc::gradients::sobel_gradients;

use crate::bounding_box::bounding_box;
use crate::contour::{scan_contour, ContourMarkers, Pixel};
use crate::feature_extraction::PrincipalPoints;

/// Colour of the triangle drawn through the principal points
pub const DEBUG_EDGE_COLOR: [u8; 3] = [0, 160, 255];
/// Colour of the principal point markers
pub const DEBUG_POINT_COLOR: [u8; 3] = [255, 0, 255];

/// Resize an image to `width` columns, keeping the aspect ratio.
/// Images no larger than `width` in either direction are returned as is.
pub fn resize_to_width(image: &GrayImage, width: u32) -> GrayImage {
    let (w, h) = image.dimensions();
    if w <= width && h <= width {
        return image.clone();
    }

    let height = ((f64::from(h) * f64::from(width) / f64::from(w)).round() as u32).max(1);
    imageops::resize(image, width, height, imageops::FilterType::Triangle)
}

/// Automatic two-level threshold (Otsu); output pixels are 0 or 255
pub fn binarize(image: &GrayImage) -> GrayImage {
    let level = otsu_level(image);
    threshold(image, level)
}

/// Sobel gradient magnitude clamped to 8 bits.
/// On a binarized image every boundary cell saturates at 255.
pub fn find_edges(image: &GrayImage) -> GrayImage {
    let gradients = sobel_gradients(image);
    let (width, height) = gradients.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let magnitude = gradients.get_pixel(x, y)[0];
        Luma([magnitude.min(255) as u8])
    })
}

/// Resize (optional), binarize and edge-filter a grayscale image
pub fn preprocess(image: &GrayImage, resize_width: Option<u32>) -> GrayImage {
    let resized = match resize_width {
        Some(width) => resize_to_width(image, width),
        None => image.clone(),
    };
    find_edges(&binarize(&resized))
}

/// Crop to the contour's bounding box, keeping `bottom_margin` extra rows
/// below it so the lower edge is not cut off. `None` if there is no contour.
pub fn crop_to_contour(
    image: &GrayImage,
    markers: ContourMarkers,
    bottom_margin: u32,
) -> Option<GrayImage> {
    let contour = scan_contour(image, markers);
    let bbox = bounding_box(&contour).ok()?;
    let (_, height) = image.dimensions();

    let x = bbox.min_x as u32;
    let y = bbox.min_y as u32;
    let crop_height = (bbox.height() + bottom_margin).min(height - y);

    Some(imageops::crop_imm(image, x, y, bbox.width(), crop_height).to_image())
}

/// Check if a point is inside the image bounds
#[inline]
pub fn in_bounds(x: i32, y: i32, width: u32, height: u32) -> bool {
    x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height
}

/// Colour copy of `image` with the triangle through `points` drawn in and
/// each point marked with a `point_size` square
pub fn create_debug_image(image: &GrayImage, points: &PrincipalPoints, point_size: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut debug_image = RgbImage::from_fn(width, height, |x, y| {
        let v = image.get_pixel(x, y)[0];
        Rgb([v, v, v])
    });

    let pixels = points.pixels();
    for (i, start) in pixels.iter().enumerate() {
        let end = pixels[(i + 1) % pixels.len()];
        let line = Bresenham::new(
            (start.x as isize, start.y as isize),
            (end.x as isize, end.y as isize),
        );
        for (x, y) in line {
            if in_bounds(x as i32, y as i32, width, height) {
                debug_image.put_pixel(x as u32, y as u32, Rgb(DEBUG_EDGE_COLOR));
            }
        }
    }

    let radius = (point_size / 2) as i32;
    for p in pixels {
        for dy in 0..point_size as i32 {
            for dx in 0..point_size as i32 {
                let px = p.x - radius + dx;
                let py = p.y - radius + dy;
                if in_bounds(px, py, width, height) {
                    debug_image.put_pixel(px as u32, py as u32, Rgb(DEBUG_POINT_COLOR));
                }
            }
        }
    }

    debug_image
}

/// One text row per grid row: `O` where a point sits, blank elsewhere
pub fn render_contour_ascii(points: &[Pixel], width: u32, height: u32) -> Vec<String> {
    let mut rows = vec![vec![' '; width as usize]; height as usize];
    for p in points {
        if in_bounds(p.x, p.y, width, height) {
            rows[p.y as usize][p.x as usize] = 'O';
        }
    }
    rows.into_iter()
        .map(|row| format!("[{}]", row.into_iter().collect::<String>()))
        .collect()
}
