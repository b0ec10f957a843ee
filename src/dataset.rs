// src/dataset.rs - Feature table -> numeric training examples

use std::fs::File;
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;

use crate::errors::{Result, TriangleError};
use crate::feature_extraction::FeatureMode;
use crate::output::header_for;
use crate::triangle_type::TriangleType;

/// One row of the feature table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingExample {
    pub inputs: Vec<f64>,
    pub label: TriangleType,
}

/// All rows of a feature table plus the mode its header announced
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub mode: FeatureMode,
    pub examples: Vec<TrainingExample>,
}

impl FeatureTable {
    /// Number of examples per category, in category order
    pub fn label_counts(&self) -> [(TriangleType, usize); 3] {
        TriangleType::ALL.map(|t| (t, self.examples.iter().filter(|e| e.label == t).count()))
    }
}

fn malformed(line: u64, reason: impl Into<String>) -> TriangleError {
    TriangleError::MalformedFeatureTable {
        line,
        reason: reason.into(),
    }
}

fn mode_from_header(header: &StringRecord) -> Option<FeatureMode> {
    [FeatureMode::BoundingBox, FeatureMode::PrincipalPoints]
        .into_iter()
        .find(|&mode| header.iter().map(str::trim).eq(header_for(mode).iter().copied()))
}

fn parse_record(record: &StringRecord, columns: usize) -> Result<TrainingExample> {
    let line = record.position().map_or(0, |p| p.line());

    if record.len() != columns {
        return Err(malformed(
            line,
            format!("expected {} columns, found {}", columns, record.len()),
        ));
    }

    let inputs = record
        .iter()
        .take(columns - 1)
        .map(|field| {
            field
                .trim()
                .parse::<f64>()
                .map_err(|e| malformed(line, format!("'{}' is not a number: {}", field, e)))
        })
        .collect::<Result<Vec<f64>>>()?;

    let label_field = record.get(columns - 1).unwrap_or_default().trim();
    let mut chars = label_field.chars();
    let label = match (chars.next(), chars.next()) {
        (Some(c), None) => TriangleType::from_code(c),
        _ => None,
    }
    .ok_or_else(|| malformed(line, format!("unknown category '{}'", label_field)))?;

    Ok(TrainingExample { inputs, label })
}

/// Read a feature table from any reader. The header decides the mode.
pub fn read_feature_table_from<R: io::Read>(reader: R) -> Result<FeatureTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header = reader.headers()?.clone();
    let mode = mode_from_header(&header).ok_or_else(|| {
        malformed(1, format!("unrecognized header '{}'", header.iter().collect::<Vec<_>>().join(",")))
    })?;
    let columns = header_for(mode).len();

    let mut examples = Vec::new();
    for record in reader.records() {
        examples.push(parse_record(&record?, columns)?);
    }

    Ok(FeatureTable { mode, examples })
}

/// Read the feature table written by a batch run
pub fn read_feature_table<P: AsRef<Path>>(path: P) -> Result<FeatureTable> {
    let file = File::open(path.as_ref())?;
    read_feature_table_from(io::BufReader::new(file))
}
