//! Per-visit orchestration of association and matching.

use crate::association::associate_with_config;
use crate::config::TrackerConfig;
use crate::detection::{build_detections, RawDetectionPass};
use crate::document::LesionDocument;
use crate::error::Result;
use crate::matching::match_lesions_with_config;
use crate::stats::AssociationStats;
use crate::types::{DetectedObject, Lesion, MatchCandidate, MatchOutcome};
use tracing::info;

/// Everything produced from one image's detection passes.
#[derive(Debug, Clone)]
pub struct ImageAnalysis {
    /// Lesions in lesion-pass order, tagged with a body part.
    pub lesions: Vec<Lesion>,
    /// Persistable lesion-info document for the image.
    pub document: LesionDocument,
    pub stats: AssociationStats,
}

/// Analyze one image from its raw lesion and body-segmentation passes.
///
/// # Arguments
///
/// * `lesion_pass` - Output of the lesion detector
/// * `body_pass` - Output of the body-segmentation model for the same image
/// * `config` - Tracker configuration
///
/// # Errors
///
/// Returns an error if the configuration or either pass is invalid.
///
/// # Example
///
/// ```
/// use lesion_track::config::TrackerConfig;
/// use lesion_track::detection::RawDetectionPass;
/// use lesion_track::tracker::analyze_image;
/// use lesion_track::types::BodyPart;
///
/// let lesion_pass = RawDetectionPass {
///     areas: vec![100.0],
///     centroids: vec![[15.0, 15.0]],
///     bboxes: vec![[10, 10, 20, 20]],
///     class_labels: vec![0],
/// };
/// let body_pass = RawDetectionPass {
///     areas: vec![900.0],
///     centroids: vec![[15.0, 15.0]],
///     bboxes: vec![[0, 0, 30, 30]],
///     class_labels: vec![0],
/// };
/// let analysis = analyze_image(&lesion_pass, &body_pass, &TrackerConfig::default()).unwrap();
/// assert_eq!(analysis.lesions[0].body_part, BodyPart::Torso);
/// assert_eq!(analysis.document.len(), 1);
/// ```
pub fn analyze_image(
    lesion_pass: &RawDetectionPass,
    body_pass: &RawDetectionPass,
    config: &TrackerConfig,
) -> Result<ImageAnalysis> {
    let lesions = build_detections(lesion_pass)?;
    let body_parts = build_detections(body_pass)?;
    analyze_detections(&lesions, &body_parts, config)
}

/// Analyze one image from already-built detections.
pub fn analyze_detections(
    lesions: &[DetectedObject],
    body_parts: &[DetectedObject],
    config: &TrackerConfig,
) -> Result<ImageAnalysis> {
    config.validate()?;
    for detection in lesions.iter().chain(body_parts) {
        detection.validate()?;
    }

    let associated = associate_with_config(lesions, body_parts, config);
    let stats = AssociationStats::collect(&associated, body_parts);
    let document = LesionDocument::from_lesions(&associated);

    info!(
        lesions = stats.total_lesions,
        unknown = stats.unknown,
        unlabeled_detections = stats.unlabeled_detections,
        "Analyzed image"
    );

    Ok(ImageAnalysis {
        lesions: associated,
        document,
        stats,
    })
}

/// Match the lesions of two analyzed images.
pub fn compare_analyses(
    earlier: &ImageAnalysis,
    later: &ImageAnalysis,
    config: &TrackerConfig,
) -> Result<MatchOutcome> {
    config.validate()?;
    let set_a: Vec<MatchCandidate> = earlier.lesions.iter().map(Lesion::to_candidate).collect();
    let set_b: Vec<MatchCandidate> = later.lesions.iter().map(Lesion::to_candidate).collect();
    match_lesions_with_config(&set_a, &set_b, config)
}

/// Match the lesions of two persisted lesion-info documents.
///
/// # Example
///
/// ```
/// use lesion_track::config::TrackerConfig;
/// use lesion_track::document::{LesionDocument, MappingsResponse};
/// use lesion_track::tracker::compare_documents;
///
/// let earlier = LesionDocument::from_json(
///     r#"{"1": {"x": 0.0, "y": 0.0, "radius": 3.0, "bodyPart": "torso", "id": 1}}"#,
/// ).unwrap();
/// let later = LesionDocument::from_json(
///     r#"{"5": {"x": 1.0, "y": 1.0, "radius": 3.0, "bodyPart": "torso", "id": 5}}"#,
/// ).unwrap();
/// let outcome = compare_documents(&earlier, &later, &TrackerConfig::default()).unwrap();
/// let response = MappingsResponse::from(outcome);
/// assert_eq!(response.mappings[0].b_id, 5);
/// ```
pub fn compare_documents(
    earlier: &LesionDocument,
    later: &LesionDocument,
    config: &TrackerConfig,
) -> Result<MatchOutcome> {
    config.validate()?;
    let set_a = earlier.to_candidates()?;
    let set_b = later.to_candidates()?;
    match_lesions_with_config(&set_a, &set_b, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LesionTrackError;
    use crate::types::BodyPart;

    fn pass(bboxes: Vec<[i64; 4]>, class_labels: Vec<i64>) -> RawDetectionPass {
        let centroids = bboxes
            .iter()
            .map(|b| [(b[0] + b[2]) as f64 / 2.0, (b[1] + b[3]) as f64 / 2.0])
            .collect();
        let areas = bboxes
            .iter()
            .map(|b| ((b[2] - b[0]) * (b[3] - b[1])) as f64)
            .collect();
        RawDetectionPass {
            areas,
            centroids,
            bboxes,
            class_labels,
        }
    }

    #[test]
    fn test_analyze_image_stats() {
        let lesions = pass(vec![[10, 10, 20, 20], [200, 200, 210, 210]], vec![0, 0]);
        let body = pass(vec![[0, 0, 100, 100]], vec![2]);

        let analysis = analyze_image(&lesions, &body, &TrackerConfig::default()).unwrap();
        assert_eq!(analysis.lesions[0].body_part, BodyPart::Arm);
        assert_eq!(analysis.lesions[1].body_part, BodyPart::Unknown);
        assert_eq!(analysis.stats.arm, 1);
        assert_eq!(analysis.stats.unknown, 1);
        assert_eq!(analysis.document.get(2).map(|e| e.body_part), Some(BodyPart::Unknown));
    }

    #[test]
    fn test_compare_analyses() {
        let body = pass(vec![[0, 0, 100, 100]], vec![0]);
        let config = TrackerConfig::default();
        let first = analyze_image(&pass(vec![[10, 10, 20, 20]], vec![0]), &body, &config).unwrap();
        let second = analyze_image(&pass(vec![[12, 11, 22, 21]], vec![0]), &body, &config).unwrap();

        let outcome = compare_analyses(&first, &second, &TrackerConfig::default()).unwrap();
        assert_eq!(outcome.pairs.len(), 1);
        assert!((outcome.pairs[0].distance - 5f64.sqrt()).abs() < 1e-10);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TrackerConfig::default().with_match_threshold(f64::NAN);
        let result = compare_documents(&LesionDocument::new(), &LesionDocument::new(), &config);
        assert!(matches!(result, Err(LesionTrackError::InvalidThreshold(_))));
    }

    #[test]
    fn test_compare_uses_configured_threshold() {
        let earlier = LesionDocument::from_json(
            r#"{"1": {"x": 0.0, "y": 0.0, "radius": 3.0, "bodyPart": "arm", "id": 1}}"#,
        )
        .unwrap();
        let later = LesionDocument::from_json(
            r#"{"2": {"x": 30.0, "y": 40.0, "radius": 3.0, "bodyPart": "arm", "id": 2}}"#,
        )
        .unwrap();

        let outcome = compare_documents(&earlier, &later, &TrackerConfig::default()).unwrap();
        assert!(outcome.pairs.is_empty());
        assert_eq!(outcome.unmatched_a, vec![1]);
        assert_eq!(outcome.unmatched_b, vec![2]);

        let loose = TrackerConfig::default().with_match_threshold(50.0);
        let outcome = compare_documents(&earlier, &later, &loose).unwrap();
        assert_eq!(outcome.partner_of_a(1), Some(2));
        assert_eq!(outcome.pairs[0].distance, 50.0);
    }
}
