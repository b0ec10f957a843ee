// src/lib.rs - Library interface for triangle feature extraction

pub mod bounding_box;
pub mod candidates;
pub mod config;
pub mod contour;
pub mod dataset;
pub mod errors;
pub mod feature_extraction;
pub mod image_io;
pub mod image_utils;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod shape_analysis;
pub mod tolerance;
pub mod triangle_type;

// Re-export commonly used types and functions
pub use errors::{ExtractionError, Result, TriangleError};
pub use config::Config;
pub use triangle_type::TriangleType;
pub use image_io::{InputImage, load_image, save_image};

// Extraction stages
pub use contour::{scan_contour, ContourMarkers, IntensityGrid, Pixel};
pub use bounding_box::{bounding_box, BoundingBox};
pub use candidates::select_candidates;
pub use tolerance::{merge_candidates, ToleranceSchedule, ToleranceSettings};
pub use normalize::Normalizer;
pub use feature_extraction::{
    extract_bounding_box,
    extract_features,
    extract_principal_points,
    ExtractionSettings,
    FeatureMode,
    FeatureVector,
    PrincipalPoints,
};

// Batch processing and tables
pub use pipeline::{build_training_set, process_category, process_image, ImageOutcome, TrainingSet};
pub use output::{write_feature_csv, write_report_json};
pub use dataset::{read_feature_table, FeatureTable, TrainingExample};
pub use shape_analysis::TriangleSides;
