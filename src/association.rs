//! Body-part association of lesion detections.
//!
//! A lesion is assigned to the first body region (in detection order) whose
//! bounding box contains both the lesion centroid and all four corners of the
//! lesion bounding box, with inclusive bounds. There is no fractional-overlap
//! rule: a lesion straddling two regions ends up [`BodyPart::Unknown`].

use crate::config::TrackerConfig;
use crate::types::{BodyPart, DetectedObject, Lesion};
use tracing::{debug, info};

/// Check whether `lesion` lies fully inside `region`.
///
/// # Example
///
/// ```
/// use lesion_track::association::is_contained;
/// use lesion_track::types::{BoundingBox, Centroid, ClassLabel, DetectedObject};
///
/// let lesion = DetectedObject::new(
///     1, 100.0, Centroid::new(15.0, 15.0), BoundingBox::new(10, 10, 20, 20), ClassLabel::Index(0),
/// );
/// let torso = DetectedObject::new(
///     1, 900.0, Centroid::new(15.0, 15.0), BoundingBox::new(0, 0, 30, 30), ClassLabel::Index(0),
/// );
/// let small = DetectedObject::new(
///     2, 144.0, Centroid::new(6.0, 6.0), BoundingBox::new(0, 0, 12, 12), ClassLabel::Index(1),
/// );
/// assert!(is_contained(&lesion, &torso));
/// assert!(!is_contained(&lesion, &small));
/// ```
pub fn is_contained(lesion: &DetectedObject, region: &DetectedObject) -> bool {
    region.bounding_box.contains_point(&lesion.centroid)
        && region.bounding_box.contains_box(&lesion.bounding_box)
}

/// The first region in `body_parts` that contains `lesion`.
pub fn find_containing_region<'a>(
    lesion: &DetectedObject,
    body_parts: &'a [DetectedObject],
) -> Option<&'a DetectedObject> {
    body_parts.iter().find(|region| is_contained(lesion, region))
}

/// Associate every lesion with a body part using the default class table.
///
/// Output order and ids follow `lesions`.
pub fn associate(lesions: &[DetectedObject], body_parts: &[DetectedObject]) -> Vec<Lesion> {
    associate_with_config(lesions, body_parts, &TrackerConfig::default())
}

/// Associate every lesion with a body part, resolving region class labels
/// through `config`.
///
/// The containing region's tag is used even when it resolves to
/// [`BodyPart::Unknown`]; later regions are not consulted.
pub fn associate_with_config(
    lesions: &[DetectedObject],
    body_parts: &[DetectedObject],
    config: &TrackerConfig,
) -> Vec<Lesion> {
    let associated: Vec<Lesion> = lesions
        .iter()
        .map(|lesion| {
            let body_part = match find_containing_region(lesion, body_parts) {
                Some(region) => config.body_part_for(region.class_label),
                None => {
                    debug!(lesion_id = lesion.sequence_id, "No body region contains lesion");
                    BodyPart::Unknown
                }
            };
            Lesion::from_detection(lesion, body_part)
        })
        .collect();

    let unknown = associated
        .iter()
        .filter(|l| l.body_part == BodyPart::Unknown)
        .count();
    info!(
        lesions = lesions.len(),
        regions = body_parts.len(),
        unknown,
        "Associated lesions with body parts"
    );

    associated
}
