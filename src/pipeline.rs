// src/pipeline.rs - Per-image processing and per-category batches

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::Config;
use crate::errors::{ExtractionError, Result};
use crate::feature_extraction::{
    extract_bounding_box, extract_principal_points, FeatureMode, FeatureVector, PointExtraction,
};
use crate::image_io::{get_image_files_in_dir, load_image, save_debug_image, save_image, InputImage};
use crate::image_utils::{create_debug_image, crop_to_contour, preprocess, render_contour_ascii};
use crate::normalize::Normalizer;
use crate::shape_analysis::TriangleSides;
use crate::triangle_type::TriangleType;

/// Features of one successfully processed image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledFeatures {
    pub category: TriangleType,
    /// File stem of the source image
    pub source: String,
    pub features: FeatureVector,
}

/// What happened to one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    Extracted(LabeledFeatures),
    Skipped {
        source: String,
        category: TriangleType,
        reason: ExtractionError,
    },
}

impl ImageOutcome {
    pub fn features(&self) -> Option<&LabeledFeatures> {
        match self {
            ImageOutcome::Extracted(features) => Some(features),
            ImageOutcome::Skipped { .. } => None,
        }
    }
}

/// Outcomes of every image of one category, in input order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBatch {
    pub category: TriangleType,
    pub outcomes: Vec<ImageOutcome>,
}

/// All categories of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainingSet {
    pub batches: Vec<CategoryBatch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
    pub source: String,
    pub candidates: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub category: TriangleType,
    pub extracted: usize,
    pub skipped: Vec<SkippedEntry>,
}

/// Per-category summary of a run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub feature_mode: FeatureMode,
    pub total_extracted: usize,
    pub total_skipped: usize,
    pub categories: Vec<CategoryReport>,
}

impl TrainingSet {
    /// Successful rows, grouped by category in processing order
    pub fn rows(&self) -> impl Iterator<Item = &LabeledFeatures> {
        self.batches
            .iter()
            .flat_map(|batch| batch.outcomes.iter().filter_map(ImageOutcome::features))
    }

    pub fn report(&self, feature_mode: FeatureMode) -> BatchReport {
        let categories: Vec<CategoryReport> = self
            .batches
            .iter()
            .map(|batch| {
                let skipped: Vec<SkippedEntry> = batch
                    .outcomes
                    .iter()
                    .filter_map(|outcome| match outcome {
                        ImageOutcome::Skipped { source, reason, .. } => Some(SkippedEntry {
                            source: source.clone(),
                            candidates: reason.candidate_count(),
                            reason: reason.to_string(),
                        }),
                        ImageOutcome::Extracted(_) => None,
                    })
                    .collect();
                CategoryReport {
                    category: batch.category,
                    extracted: batch.outcomes.len() - skipped.len(),
                    skipped,
                }
            })
            .collect();

        BatchReport {
            feature_mode,
            total_extracted: categories.iter().map(|c| c.extracted).sum(),
            total_skipped: categories.iter().map(|c| c.skipped.len()).sum(),
            categories,
        }
    }
}

fn log_point_extraction(filename: &str, extraction: &PointExtraction, width: u32, height: u32, baseline: u32) {
    debug!(
        "Image {}: {} contour pixels -> {} candidates -> 3 points (tolerance {}, {} escalations)",
        filename, extraction.contour_len, extraction.candidate_count, extraction.tolerance, extraction.escalations
    );

    let sides = TriangleSides::from_points(&extraction.native_points);
    debug!(
        "Image {}: sides {:.1} / {:.1} / {:.1}, elongation {:.2}",
        filename, sides.one, sides.two, sides.three, sides.elongation()
    );

    let (norm_width, norm_height) = Normalizer::new(width, height, baseline).normalized_dimensions();
    for row in render_contour_ascii(extraction.points.pixels(), norm_width, norm_height) {
        debug!("{}", row);
    }
}

/// Preprocess one image and extract its features.
///
/// Geometric failures come back as `ImageOutcome::Skipped`; only raster
/// dumps can fail the call.
pub fn process_image(
    input: &InputImage,
    category: TriangleType,
    config: &Config,
    debug: bool,
) -> Result<ImageOutcome> {
    let settings = config.extraction_settings();
    let filename = input.filename.as_str();

    // Step 1: resize, binarize, edge filter
    let mut edges = preprocess(&input.image, config.resize_target());

    // Step 2: optional crop to the contour
    if config.crop_to_contour {
        match crop_to_contour(&edges, settings.markers, config.crop_bottom_margin) {
            Some(cropped) => {
                debug!(
                    "Image {} cropped from {:?} to {:?}",
                    filename,
                    edges.dimensions(),
                    cropped.dimensions()
                );
                edges = cropped;
            }
            None => warn!("Could not extract a bounding box to crop image {}", filename),
        }
    }

    let (width, height) = edges.dimensions();
    debug!("Image {} preprocessed ({} columns, {} rows)", filename, width, height);

    // Step 3: dump the processed raster
    let dump_dir = config
        .processed_images_dir
        .as_ref()
        .map(|dir| PathBuf::from(dir).join(category.dir_name()));
    if let Some(dir) = &dump_dir {
        save_image(&edges, dir.join(format!("{}.png", filename)))?;
    }

    // Step 4: features
    let features = match config.feature_mode {
        FeatureMode::PrincipalPoints => match extract_principal_points(&edges, &settings) {
            Ok(extraction) => {
                if debug {
                    log_point_extraction(filename, &extraction, width, height, settings.baseline_width);
                    if let Some(dir) = &dump_dir {
                        let overlay = create_debug_image(&edges, &extraction.native_points, 1);
                        save_debug_image(&overlay, dir.join(format!("{}_points.png", filename)))?;
                    }
                }
                Ok(FeatureVector::PrincipalPoints(extraction.points))
            }
            Err(reason) => Err(reason),
        },
        FeatureMode::BoundingBox => extract_bounding_box(&edges, &settings).map(FeatureVector::BoundingBox),
    };

    match features {
        Ok(features) => {
            info!("Image {} ({}) processed: {:?}", filename, category, features.values());
            Ok(ImageOutcome::Extracted(LabeledFeatures {
                category,
                source: filename.to_string(),
                features,
            }))
        }
        Err(reason) => {
            warn!(
                "Could not extract features of image {}: {} (points found: {})",
                filename,
                reason,
                reason.candidate_count()
            );
            Ok(ImageOutcome::Skipped {
                source: filename.to_string(),
                category,
                reason,
            })
        }
    }
}

fn load_and_process(
    path: &Path,
    category: TriangleType,
    config: &Config,
    debug: bool,
) -> Result<Option<ImageOutcome>> {
    debug!("Loading image {}", path.display());
    let input = match load_image(path) {
        Ok(input) => input,
        Err(e) if config.skip_unreadable_images => {
            warn!("Skipping unreadable image {}: {}", path.display(), e);
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    process_image(&input, category, config, debug).map(Some)
}

/// Load and process every image of one category; output follows input order
pub fn process_category(
    paths: &[PathBuf],
    category: TriangleType,
    config: &Config,
    debug: bool,
) -> Result<CategoryBatch> {
    info!("Loading and processing {} {} examples", paths.len(), category);

    let outcomes: Vec<Option<ImageOutcome>> = if config.use_parallel {
        paths
            .par_iter()
            .map(|path| load_and_process(path, category, config, debug))
            .collect::<Result<Vec<_>>>()?
    } else {
        paths
            .iter()
            .map(|path| load_and_process(path, category, config, debug))
            .collect::<Result<Vec<_>>>()?
    };

    Ok(CategoryBatch {
        category,
        outcomes: outcomes.into_iter().flatten().collect(),
    })
}

/// Process `input_dir/<category>/` for every category
pub fn build_training_set(config: &Config, debug: bool) -> Result<TrainingSet> {
    let input_dir = PathBuf::from(&config.input_dir);
    let mut training_set = TrainingSet::default();

    for category in TriangleType::ALL {
        let paths = get_image_files_in_dir(input_dir.join(category.dir_name()))?;
        training_set
            .batches
            .push(process_category(&paths, category, config, debug)?);
    }

    info!("{} training examples loaded", training_set.rows().count());
    Ok(training_set)
}
