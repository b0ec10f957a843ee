use std::fs;
use std::io;
use std::path::Path;
use csv::Writer;

use crate::errors::{TriangleError, Result};
use crate::feature_extraction::FeatureMode;
use crate::pipeline::{BatchReport, LabeledFeatures};

pub const BOUNDING_BOX_HEADER: [&str; 5] = ["maxx", "minx", "maxy", "miny", "type"];
pub const PRINCIPAL_POINTS_HEADER: [&str; 7] = ["p1x", "p1y", "p2x", "p2y", "p3x", "p3y", "type"];

/// Column names of the feature table for `mode`, label last
pub fn header_for(mode: FeatureMode) -> &'static [&'static str] {
    match mode {
        FeatureMode::BoundingBox => &BOUNDING_BOX_HEADER,
        FeatureMode::PrincipalPoints => &PRINCIPAL_POINTS_HEADER,
    }
}

/// Write the feature table to any writer. Every row must carry `mode` features.
pub fn write_feature_table<'a, W, I>(writer: W, mode: FeatureMode, rows: I) -> Result<usize>
where
    W: io::Write,
    I: IntoIterator<Item = &'a LabeledFeatures>,
{
    let mut writer = Writer::from_writer(writer);
    writer.write_record(header_for(mode))?;

    let mut written = 0;
    for row in rows {
        if row.features.mode() != mode {
            return Err(TriangleError::Config(format!(
                "image {} has {:?} features in a {:?} table",
                row.source,
                row.features.mode(),
                mode
            )));
        }

        let mut record: Vec<String> = row.features.values().iter().map(|v| v.to_string()).collect();
        record.push(row.category.code().to_string());
        writer.write_record(&record)?;
        written += 1;
    }

    // Writer::flush returns io::Error
    writer.flush().map_err(|e| TriangleError::CsvOutput(csv::Error::from(e)))?;

    Ok(written)
}

/// Write the feature table to `path`, creating parent directories
pub fn write_feature_csv<'a, P, I>(path: P, mode: FeatureMode, rows: I) -> Result<usize>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a LabeledFeatures>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(path)?;
    write_feature_table(io::BufWriter::new(file), mode, rows)
}

/// Write the batch report as pretty JSON
pub fn write_report_json<P: AsRef<Path>>(report: &BatchReport, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounding_box::BoundingBox;
    use crate::contour::Pixel;
    use crate::feature_extraction::{FeatureVector, PrincipalPoints};
    use crate::triangle_type::TriangleType;

    fn points_row(category: TriangleType, source: &str, coords: [(i32, i32); 3]) -> LabeledFeatures {
        let [a, b, c] = coords.map(|(x, y)| Pixel::new(x, y, 255));
        LabeledFeatures {
            category,
            source: source.to_string(),
            features: FeatureVector::PrincipalPoints(PrincipalPoints::new([a, b, c])),
        }
    }

    #[test]
    fn principal_point_table() {
        let rows = vec![
            points_row(TriangleType::Equilateral, "a", [(25, 4), (4, 46), (46, 46)]),
            points_row(TriangleType::Scalene, "b", [(1, 2), (3, 4), (5, 6)]),
        ];

        let mut buffer = Vec::new();
        let written = write_feature_table(&mut buffer, FeatureMode::PrincipalPoints, &rows).unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "p1x,p1y,p2x,p2y,p3x,p3y,type\n25,4,4,46,46,46,e\n1,2,3,4,5,6,s\n"
        );
    }

    #[test]
    fn bounding_box_table() {
        let rows = vec![LabeledFeatures {
            category: TriangleType::Isosceles,
            source: "c".to_string(),
            features: FeatureVector::BoundingBox(BoundingBox::new(40, 5, 15, 2)),
        }];

        let mut buffer = Vec::new();
        write_feature_table(&mut buffer, FeatureMode::BoundingBox, &rows).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "maxx,minx,maxy,miny,type\n40,5,15,2,i\n");
    }

    #[test]
    fn empty_table_has_header_only() {
        let mut buffer = Vec::new();
        let written = write_feature_table(&mut buffer, FeatureMode::BoundingBox, Vec::<LabeledFeatures>::new().iter()).unwrap();
        assert_eq!(written, 0);
        assert_eq!(String::from_utf8(buffer).unwrap(), "maxx,minx,maxy,miny,type\n");
    }

    #[test]
    fn mixed_modes_are_rejected() {
        let rows = vec![points_row(TriangleType::Scalene, "b", [(1, 2), (3, 4), (5, 6)])];
        let result = write_feature_table(Vec::new(), FeatureMode::BoundingBox, &rows);
        assert!(matches!(result, Err(TriangleError::Config(_))));
    }
}
