// src/feature_extraction.rs - Contour -> bounding box / principal point features

use serde::{Deserialize, Serialize};

use crate::bounding_box::{bounding_box, BoundingBox};
use crate::candidates::select_candidates;
use crate::contour::{scan_contour, ContourMarkers, IntensityGrid, Pixel};
use crate::errors::ExtractionError;
use crate::normalize::{Normalizer, BASELINE_WIDTH};
use crate::tolerance::{merge_candidates, ToleranceSchedule, ToleranceSettings};

/// Which feature vector a batch produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureMode {
    BoundingBox,
    PrincipalPoints,
}

/// Three pixels approximating the vertices of one triangle.
/// No geometric ordering is implied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrincipalPoints([Pixel; 3]);

impl PrincipalPoints {
    pub fn new(points: [Pixel; 3]) -> Self {
        Self(points)
    }

    pub fn pixels(&self) -> &[Pixel; 3] {
        &self.0
    }

    /// `[p1x, p1y, p2x, p2y, p3x, p3y]`
    pub fn values(&self) -> [i32; 6] {
        let [a, b, c] = self.0;
        [a.x, a.y, b.x, b.y, c.x, c.y]
    }

    pub fn map(&self, f: impl Fn(&Pixel) -> Pixel) -> Self {
        let [a, b, c] = &self.0;
        Self([f(a), f(b), f(c)])
    }
}

/// Feature vector of one image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureVector {
    BoundingBox(BoundingBox),
    PrincipalPoints(PrincipalPoints),
}

impl FeatureVector {
    pub fn mode(&self) -> FeatureMode {
        match self {
            FeatureVector::BoundingBox(_) => FeatureMode::BoundingBox,
            FeatureVector::PrincipalPoints(_) => FeatureMode::PrincipalPoints,
        }
    }

    /// Numeric columns in feature-table order
    pub fn values(&self) -> Vec<i32> {
        match self {
            FeatureVector::BoundingBox(bbox) => bbox.values().to_vec(),
            FeatureVector::PrincipalPoints(points) => points.values().to_vec(),
        }
    }
}

/// Parameters of the extraction stages
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionSettings {
    pub markers: ContourMarkers,
    pub tolerance: ToleranceSettings,
    pub baseline_width: u32,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            markers: ContourMarkers::default(),
            tolerance: ToleranceSettings::default(),
            baseline_width: BASELINE_WIDTH,
        }
    }
}

/// Principal points of one image plus what it took to get them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointExtraction {
    /// In canonical baseline coordinates
    pub points: PrincipalPoints,
    /// In the grid's own coordinates
    pub native_points: PrincipalPoints,
    pub contour_len: usize,
    pub candidate_count: usize,
    pub tolerance: u32,
    pub escalations: u32,
}

/// Grid -> contour -> bounding box -> candidates -> merged -> normalized
pub fn extract_principal_points<G: IntensityGrid + ?Sized>(
    grid: &G,
    settings: &ExtractionSettings,
) -> Result<PointExtraction, ExtractionError> {
    let (width, height) = grid.size();
    let contour = scan_contour(grid, settings.markers);
    let bbox = bounding_box(&contour)?;

    let schedule = ToleranceSchedule::new(width, height, settings.tolerance);
    let candidates = select_candidates(&contour, &bbox, schedule.current())?;
    let merged = merge_candidates(&candidates, schedule)?;

    let native_points = PrincipalPoints::new(merged.points);
    let normalizer = Normalizer::new(width, height, settings.baseline_width);

    Ok(PointExtraction {
        points: native_points.map(|p| normalizer.normalize_pixel(p)),
        native_points,
        contour_len: contour.len(),
        candidate_count: candidates.len(),
        tolerance: merged.tolerance,
        escalations: merged.escalations,
    })
}

/// Normalized bounding box of the grid's contour
pub fn extract_bounding_box<G: IntensityGrid + ?Sized>(
    grid: &G,
    settings: &ExtractionSettings,
) -> Result<BoundingBox, ExtractionError> {
    let (width, height) = grid.size();
    let contour = scan_contour(grid, settings.markers);
    let bbox = bounding_box(&contour)?;
    Ok(Normalizer::new(width, height, settings.baseline_width).normalize_bounding_box(&bbox))
}

pub fn extract_features<G: IntensityGrid + ?Sized>(
    grid: &G,
    mode: FeatureMode,
    settings: &ExtractionSettings,
) -> Result<FeatureVector, ExtractionError> {
    match mode {
        FeatureMode::BoundingBox => extract_bounding_box(grid, settings).map(FeatureVector::BoundingBox),
        FeatureMode::PrincipalPoints => {
            extract_principal_points(grid, settings).map(|e| FeatureVector::PrincipalPoints(e.points))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tolerance::{distance, tolerance_for};
    use bresenham::Bresenham;
    use image::{GrayImage, Luma};

    /// Closed polygon outline at intensity 255
    fn outline(width: u32, height: u32, corners: &[(i32, i32)]) -> GrayImage {
        let mut grid = GrayImage::new(width, height);
        for (i, &start) in corners.iter().enumerate() {
            let end = corners[(i + 1) % corners.len()];
            let line = Bresenham::new(
                (start.0 as isize, start.1 as isize),
                (end.0 as isize, end.1 as isize),
            );
            for (x, y) in line.chain(std::iter::once((end.0 as isize, end.1 as isize))) {
                grid.put_pixel(x as u32, y as u32, Luma([255]));
            }
        }
        grid
    }

    fn near(p: &Pixel, x: i32, y: i32, slack: i32) -> bool {
        (p.x - x).abs() <= slack && (p.y - y).abs() <= slack
    }

    #[test]
    fn equilateral_outline_on_28x28() {
        let grid = outline(28, 28, &[(14, 2), (2, 26), (26, 26)]);
        let extraction = extract_principal_points(&grid, &ExtractionSettings::default()).unwrap();

        // (14,2), (2,26), (26,26) on the 50-wide baseline
        let expected = [(25, 4), (4, 46), (46, 46)];
        for (x, y) in expected {
            let hits = extraction.points.pixels().iter().filter(|p| near(p, x, y, 4)).count();
            assert_eq!(hits, 1, "corner ({}, {}) in {:?}", x, y, extraction.points);
        }
    }

    #[test]
    fn well_separated_points_exceed_initial_tolerance() {
        let grid = outline(60, 45, &[(5, 40), (30, 3), (55, 40)]);
        let extraction = extract_principal_points(&grid, &ExtractionSettings::default()).unwrap();

        let initial = tolerance_for(60, 45, 3);
        let [a, b, c] = extraction.native_points.pixels();
        for (p, q) in [(a, b), (b, c), (a, c)] {
            assert!(distance(p, q) > initial, "{:?} {:?}", p, q);
        }
    }

    #[test]
    fn extraction_is_deterministic() {
        let grid = outline(40, 30, &[(3, 27), (20, 2), (36, 20)]);
        let settings = ExtractionSettings::default();
        let first = extract_principal_points(&grid, &settings).unwrap();
        for _ in 0..5 {
            assert_eq!(extract_principal_points(&grid, &settings).unwrap(), first);
        }
    }

    #[test]
    fn blank_grid_is_rejected() {
        let grid = GrayImage::new(28, 28);
        let settings = ExtractionSettings::default();
        assert_eq!(
            extract_principal_points(&grid, &settings),
            Err(ExtractionError::EmptyContour)
        );
        assert_eq!(
            extract_features(&grid, FeatureMode::BoundingBox, &settings),
            Err(ExtractionError::EmptyContour)
        );
    }

    #[test]
    fn single_segment_has_too_few_candidates() {
        let grid = outline(28, 28, &[(3, 3), (20, 3)]);
        assert_eq!(
            extract_principal_points(&grid, &ExtractionSettings::default()),
            Err(ExtractionError::InsufficientCandidates { found: 2 })
        );
    }

    #[test]
    fn bounding_box_is_normalized() {
        let grid = outline(100, 40, &[(10, 4), (80, 4), (80, 30)]);
        let features = extract_features(&grid, FeatureMode::BoundingBox, &ExtractionSettings::default()).unwrap();
        assert_eq!(features, FeatureVector::BoundingBox(BoundingBox::new(40, 5, 15, 2)));
        assert_eq!(features.values(), vec![40, 5, 15, 2]);
    }
}
