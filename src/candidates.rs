// src/candidates.rs - Vertex candidates from the four extreme edges of the contour

use crate::bounding_box::BoundingBox;
use crate::contour::Pixel;
use crate::errors::ExtractionError;
use crate::tolerance::distance;

/// First pixel with the largest key; earlier pixels win ties
fn first_max_by_key<F>(pixels: &[Pixel], key: F) -> Option<Pixel>
where
    F: Fn(&Pixel) -> i32,
{
    pixels.iter().fold(None, |best: Option<Pixel>, p| match best {
        Some(b) if key(&b) >= key(p) => Some(b),
        _ => Some(*p),
    })
}

/// First pixel with the smallest key; earlier pixels win ties
fn first_min_by_key<F>(pixels: &[Pixel], key: F) -> Option<Pixel>
where
    F: Fn(&Pixel) -> i32,
{
    pixels.iter().fold(None, |best: Option<Pixel>, p| match best {
        Some(b) if key(&b) <= key(p) => Some(b),
        _ => Some(*p),
    })
}

fn edge_pixels<F>(pixels: &[Pixel], keep: F) -> Vec<Pixel>
where
    F: Fn(&Pixel) -> bool,
{
    pixels.iter().filter(|p| keep(*p)).copied().collect()
}

/// The two tie-break picks on one extreme edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeExtremes {
    /// Member with the largest secondary coordinate
    pub high: Pixel,
    /// Member with the smallest secondary coordinate
    pub low: Pixel,
}

impl EdgeExtremes {
    fn along_y(edge: &[Pixel]) -> Option<Self> {
        Some(Self {
            high: first_max_by_key(edge, |p| p.y)?,
            low: first_min_by_key(edge, |p| p.y)?,
        })
    }

    fn along_x(edge: &[Pixel]) -> Option<Self> {
        Some(Self {
            high: first_max_by_key(edge, |p| p.x)?,
            low: first_min_by_key(edge, |p| p.x)?,
        })
    }
}

/// Raw extremal picks for the four bounding-box edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtremalPicks {
    /// Pixels with `x >= max_x`, split on y
    pub max_x: EdgeExtremes,
    /// Pixels with `x <= min_x`, split on y
    pub min_x: EdgeExtremes,
    /// Pixels with `y >= max_y`, split on x
    pub max_y: EdgeExtremes,
    /// Pixels with `y <= min_y`, split on x
    pub min_y: EdgeExtremes,
}

impl ExtremalPicks {
    pub fn find(pixels: &[Pixel], bbox: &BoundingBox) -> Result<Self, ExtractionError> {
        let max_x_edge = edge_pixels(pixels, |p| p.x >= bbox.max_x);
        let min_x_edge = edge_pixels(pixels, |p| p.x <= bbox.min_x);
        let max_y_edge = edge_pixels(pixels, |p| p.y >= bbox.max_y);
        let min_y_edge = edge_pixels(pixels, |p| p.y <= bbox.min_y);

        // All four edges are non-empty whenever the bbox came from `pixels`
        let missing = ExtractionError::InsufficientCandidates { found: 0 };
        Ok(Self {
            max_x: EdgeExtremes::along_y(&max_x_edge).ok_or(missing.clone())?,
            min_x: EdgeExtremes::along_y(&min_x_edge).ok_or(missing.clone())?,
            max_y: EdgeExtremes::along_x(&max_y_edge).ok_or(missing.clone())?,
            min_y: EdgeExtremes::along_x(&min_y_edge).ok_or(missing)?,
        })
    }
}

/// Ordered set of accepted candidates without value duplicates
#[derive(Debug, Default)]
struct CandidateSet(Vec<Pixel>);

impl CandidateSet {
    fn insert(&mut self, pixel: Pixel) {
        if !self.0.contains(&pixel) {
            self.0.push(pixel);
        }
    }
}

/// Select up to eight vertex candidates from the contour.
///
/// The order of the acceptance checks below decides which of several close
/// candidates survives and must stay as is: max-X pair, min-X pair, max-Y
/// pair (against the max-X and min-X picks), min-Y pair. A pick that is
/// rejected is still used as the reference for later checks.
pub fn select_candidates(
    pixels: &[Pixel],
    bbox: &BoundingBox,
    tolerance: u32,
) -> Result<Vec<Pixel>, ExtractionError> {
    let picks = ExtremalPicks::find(pixels, bbox)?;
    let apart = |a: &Pixel, b: &Pixel| distance(a, b) > tolerance;

    let max_x_max_y = picks.max_x.high;
    let max_x_min_y = picks.max_x.low;
    let min_x_max_y = picks.min_x.high;
    let min_x_min_y = picks.min_x.low;
    let max_y_max_x = picks.max_y.high;
    let max_y_min_x = picks.max_y.low;
    let min_y_max_x = picks.min_y.high;
    let min_y_min_x = picks.min_y.low;

    let mut accepted = CandidateSet::default();

    accepted.insert(max_x_max_y);
    if apart(&max_x_max_y, &max_x_min_y) {
        accepted.insert(max_x_min_y);
    }

    accepted.insert(min_x_max_y);
    if apart(&min_x_max_y, &min_x_min_y) {
        accepted.insert(min_x_min_y);
    }

    if apart(&max_y_max_x, &max_x_max_y) {
        accepted.insert(max_y_max_x);
    }
    if apart(&max_y_max_x, &max_y_min_x) && apart(&min_x_max_y, &max_y_min_x) {
        accepted.insert(max_y_min_x);
    }

    if apart(&min_y_max_x, &max_x_min_y) {
        accepted.insert(min_y_max_x);
    }
    if apart(&min_y_max_x, &min_y_min_x) && apart(&min_y_min_x, &min_x_min_y) {
        accepted.insert(min_y_min_x);
    }

    Ok(accepted.0)
}
