// src/shape_analysis.rs - Euclidean side lengths of extracted triangles

use nalgebra::{distance, Point2};

use crate::feature_extraction::PrincipalPoints;

/// Side lengths of the triangle spanned by three principal points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleSides {
    /// Point one to point two
    pub one: f64,
    /// Point two to point three
    pub two: f64,
    /// Point one to point three
    pub three: f64,
}

impl TriangleSides {
    pub fn from_points(points: &PrincipalPoints) -> Self {
        let [a, b, c] = (*points.pixels()).map(|p| Point2::new(f64::from(p.x), f64::from(p.y)));

        Self {
            one: distance(&a, &b),
            two: distance(&b, &c),
            three: distance(&a, &c),
        }
    }

    pub fn lengths(&self) -> [f64; 3] {
        [self.one, self.two, self.three]
    }

    pub fn perimeter(&self) -> f64 {
        self.one + self.two + self.three
    }

    /// Longest side over shortest side; 1.0 for an equilateral triangle
    pub fn elongation(&self) -> f64 {
        let lengths = self.lengths();
        let longest = lengths.iter().cloned().fold(f64::MIN, f64::max);
        let shortest = lengths.iter().cloned().fold(f64::MAX, f64::min);
        if shortest > 0.0 {
            longest / shortest
        } else {
            f64::INFINITY
        }
    }
}
