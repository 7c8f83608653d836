//! Statistics tracking for body-part association
//!
//! Counts gathered while turning one image's detection passes into
//! body-part-tagged lesions.

use crate::types::{BodyPart, ClassLabel, DetectedObject, Lesion};
use serde::{Deserialize, Serialize};

/// Statistics collected during association of one image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssociationStats {
    /// Total number of lesions associated
    pub total_lesions: usize,

    /// Number of body regions considered
    pub body_regions: usize,

    /// Body-segmentation detections that came without a class label.
    /// Lesion-pass labels never affect association and are not counted.
    pub unlabeled_detections: usize,

    pub torso: usize,
    pub left_leg: usize,
    pub arm: usize,
    pub right_leg: usize,

    /// Lesions no body region fully contained
    pub unknown: usize,
}

impl AssociationStats {
    /// Create a new `AssociationStats` with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect counts from an association result
    pub fn collect(lesions: &[Lesion], body_parts: &[DetectedObject]) -> Self {
        let mut stats = Self::new();
        stats.body_regions = body_parts.len();
        stats.unlabeled_detections = body_parts
            .iter()
            .filter(|region| region.class_label == ClassLabel::Unknown)
            .count();
        for lesion in lesions {
            stats.record(lesion.body_part);
        }
        stats
    }

    /// Record one associated lesion
    pub fn record(&mut self, body_part: BodyPart) {
        self.total_lesions += 1;
        match body_part {
            BodyPart::Torso => self.torso += 1,
            BodyPart::LeftLeg => self.left_leg += 1,
            BodyPart::Arm => self.arm += 1,
            BodyPart::RightLeg => self.right_leg += 1,
            BodyPart::Unknown => self.unknown += 1,
        }
    }

    /// Count for one body part
    pub fn count(&self, body_part: BodyPart) -> usize {
        match body_part {
            BodyPart::Torso => self.torso,
            BodyPart::LeftLeg => self.left_leg,
            BodyPart::Arm => self.arm,
            BodyPart::RightLeg => self.right_leg,
            BodyPart::Unknown => self.unknown,
        }
    }

    /// Fraction of lesions that received a known body part
    pub fn association_rate(&self) -> f64 {
        if self.total_lesions == 0 {
            return 0.0;
        }
        (self.total_lesions - self.unknown) as f64 / self.total_lesions as f64
    }
}
