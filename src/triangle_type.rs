use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::TriangleError;

/// Triangle classes a batch of sample images can be labelled with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriangleType {
    Equilateral,
    Isosceles,
    Scalene,
}

impl TriangleType {
    /// Every category, in the order batches are processed and written
    pub const ALL: [TriangleType; 3] = [
        TriangleType::Equilateral,
        TriangleType::Isosceles,
        TriangleType::Scalene,
    ];

    /// Single-character code used in the `type` column of the feature table
    pub fn code(self) -> char {
        match self {
            TriangleType::Equilateral => 'e',
            TriangleType::Isosceles => 'i',
            TriangleType::Scalene => 's',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Name of the sample sub-directory holding images of this category
    pub fn dir_name(self) -> &'static str {
        match self {
            TriangleType::Equilateral => "equilateral",
            TriangleType::Isosceles => "isosceles",
            TriangleType::Scalene => "scalene",
        }
    }

    /// Scalar training target for a single-output network
    pub fn ideal_value(self) -> f64 {
        match self {
            TriangleType::Equilateral => 0.0,
            TriangleType::Isosceles => 0.5,
            TriangleType::Scalene => 1.0,
        }
    }
}

impl fmt::Display for TriangleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for TriangleType {
    type Err = TriangleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(t) = Self::from_code(c) {
                return Ok(t);
            }
        }
        Self::ALL
            .into_iter()
            .find(|t| t.dir_name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TriangleError::UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for t in TriangleType::ALL {
            assert_eq!(TriangleType::from_code(t.code()), Some(t));
        }
        assert_eq!(TriangleType::from_code('x'), None);
    }

    #[test]
    fn parses_codes_and_names() {
        assert_eq!("s".parse::<TriangleType>().unwrap(), TriangleType::Scalene);
        assert_eq!("Isosceles".parse::<TriangleType>().unwrap(), TriangleType::Isosceles);
        assert!("triangle".parse::<TriangleType>().is_err());
    }
}
