//! Ingestion of raw detection-pass output.

use crate::error::{LesionTrackError, Result};
use crate::types::{BoundingBox, Centroid, ClassLabel, DetectedObject};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

/// Region properties produced by one detection pass over one image.
///
/// Entries at the same position in `areas`, `centroids` and `bboxes` describe the
/// same region. `class_labels` may be shorter than the others when the model
/// returned a partial label list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDetectionPass {
    pub areas: Vec<f64>,
    /// Centroids as `[row, col]`.
    pub centroids: Vec<[f64; 2]>,
    /// Boxes as `[min_row, min_col, max_row, max_col]`.
    pub bboxes: Vec<[i64; 4]>,
    /// Model class index per region; negative values mean no label.
    #[serde(default)]
    pub class_labels: Vec<i64>,
}

impl RawDetectionPass {
    /// Number of detected regions.
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Check if the pass detected nothing.
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

/// Build validated detections from a raw pass.
///
/// Sequence ids are the 1-based positions in the pass. Regions past the end of
/// `class_labels` get [`ClassLabel::Unknown`].
///
/// # Errors
///
/// Returns [`LesionTrackError::InvalidDetection`] if the geometry arrays differ in
/// length and [`LesionTrackError::InvalidGeometry`] for non-finite centroids or
/// invalid areas.
///
/// # Example
///
/// ```
/// use lesion_track::detection::{build_detections, RawDetectionPass};
/// use lesion_track::types::ClassLabel;
///
/// let pass = RawDetectionPass {
///     areas: vec![100.0, 64.0],
///     centroids: vec![[15.0, 15.0], [40.0, 40.0]],
///     bboxes: vec![[10, 10, 20, 20], [36, 36, 44, 44]],
///     class_labels: vec![0],
/// };
/// let detections = build_detections(&pass).unwrap();
/// assert_eq!(detections[1].sequence_id, 2);
/// assert_eq!(detections[1].class_label, ClassLabel::Unknown);
/// ```
pub fn build_detections(pass: &RawDetectionPass) -> Result<Vec<DetectedObject>> {
    let count = pass.areas.len();
    if pass.centroids.len() != count || pass.bboxes.len() != count {
        return Err(LesionTrackError::InvalidDetection(format!(
            "Mismatched pass lengths: {} areas, {} centroids, {} bboxes",
            count,
            pass.centroids.len(),
            pass.bboxes.len()
        )));
    }

    if pass.class_labels.len() < count {
        warn!(
            detections = count,
            labels = pass.class_labels.len(),
            "Class label list shorter than detections; trailing regions are unlabeled"
        );
    }

    let mut detections = Vec::with_capacity(count);
    for (idx, ((&area, centroid), bbox)) in pass
        .areas
        .iter()
        .zip(&pass.centroids)
        .zip(&pass.bboxes)
        .enumerate()
    {
        let sequence_id = u32::try_from(idx + 1).map_err(|_| {
            LesionTrackError::InvalidDetection(format!("Too many detections in pass: {}", count))
        })?;

        let class_label = pass
            .class_labels
            .get(idx)
            .map_or(ClassLabel::Unknown, |&raw| ClassLabel::from(raw));

        let detection = DetectedObject::new(
            sequence_id,
            area,
            Centroid::new(centroid[0], centroid[1]),
            BoundingBox::from_array(*bbox),
            class_label,
        );
        detection.validate()?;

        if detection.bounding_box.is_degenerate() {
            debug!(sequence_id, "Degenerate bounding box in detection pass");
        }

        detections.push(detection);
    }

    Ok(detections)
}

/// Load a raw detection pass from a JSON file and build its detections.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_pass_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<DetectedObject>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let pass: RawDetectionPass = serde_json::from_reader(reader)?;
    build_detections(&pass)
}

/// Load a raw detection pass from a JSON string and build its detections.
///
/// # Example
///
/// ```
/// use lesion_track::detection::load_pass_from_string;
///
/// let json = r#"{
///     "areas": [100.0],
///     "centroids": [[15.0, 15.0]],
///     "bboxes": [[10, 10, 20, 20]],
///     "class_labels": [2]
/// }"#;
/// let detections = load_pass_from_string(json).unwrap();
/// assert_eq!(detections.len(), 1);
/// ```
pub fn load_pass_from_string(json_str: &str) -> Result<Vec<DetectedObject>> {
    let pass: RawDetectionPass = serde_json::from_str(json_str)?;
    build_detections(&pass)
}
