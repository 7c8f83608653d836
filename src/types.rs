//! Core data types for lesion detections, associations and matches.

use crate::error::{LesionTrackError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in image pixel space, in (row, col) order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub row: f64,
    pub col: f64,
}

impl Centroid {
    /// Create a new centroid.
    pub fn new(row: f64, col: f64) -> Self {
        Self { row, col }
    }

    /// Check that both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.row.is_finite() && self.col.is_finite()
    }
}

/// Axis-aligned bounding box in integer pixel coordinates.
///
/// Stored as `(min_row, min_col, max_row, max_col)`. Boxes with `min > max` on an
/// axis are degenerate but still representable; containment tests treat them
/// literally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_row: i64,
    pub min_col: i64,
    pub max_row: i64,
    pub max_col: i64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(min_row: i64, min_col: i64, max_row: i64, max_col: i64) -> Self {
        Self {
            min_row,
            min_col,
            max_row,
            max_col,
        }
    }

    /// Create a bounding box from `[min_row, min_col, max_row, max_col]`.
    pub fn from_array(bbox: [i64; 4]) -> Self {
        Self::new(bbox[0], bbox[1], bbox[2], bbox[3])
    }

    /// Extent along the column axis.
    pub fn width(&self) -> i64 {
        self.max_col - self.min_col
    }

    /// Extent along the row axis.
    pub fn height(&self) -> i64 {
        self.max_row - self.min_row
    }

    /// Check if the box is inverted or has zero extent on an axis.
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// The four corners as `(row, col)`: top-left, top-right, bottom-left, bottom-right.
    pub fn corners(&self) -> [(i64, i64); 4] {
        [
            (self.min_row, self.min_col),
            (self.min_row, self.max_col),
            (self.max_row, self.min_col),
            (self.max_row, self.max_col),
        ]
    }

    /// Inclusive test of an integer `(row, col)` point.
    pub fn contains_pixel(&self, row: i64, col: i64) -> bool {
        self.min_row <= row && row <= self.max_row && self.min_col <= col && col <= self.max_col
    }

    /// Inclusive test of a floating point centroid.
    pub fn contains_point(&self, point: &Centroid) -> bool {
        self.min_row as f64 <= point.row
            && point.row <= self.max_row as f64
            && self.min_col as f64 <= point.col
            && point.col <= self.max_col as f64
    }

    /// Check that every corner of `other` lies inside this box (inclusive).
    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        other
            .corners()
            .iter()
            .all(|&(row, col)| self.contains_pixel(row, col))
    }

    /// Half-diagonal of the box, used as a bounding-ellipse radius approximation.
    pub fn half_diagonal(&self) -> f64 {
        let half_width = self.width() as f64 / 2.0;
        let half_height = self.height() as f64 / 2.0;
        (half_width * half_width + half_height * half_height).sqrt()
    }
}

/// Class tag attached to a detection by the model.
///
/// Serialized as the raw model index, with `-1` standing for [`ClassLabel::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ClassLabel {
    /// Model class index.
    Index(u32),
    /// No label could be matched to the detection.
    #[default]
    Unknown,
}

impl ClassLabel {
    /// The class index, if known.
    pub fn index(&self) -> Option<u32> {
        match self {
            ClassLabel::Index(idx) => Some(*idx),
            ClassLabel::Unknown => None,
        }
    }
}

impl From<i64> for ClassLabel {
    fn from(raw: i64) -> Self {
        u32::try_from(raw).map_or(ClassLabel::Unknown, ClassLabel::Index)
    }
}

impl From<ClassLabel> for i64 {
    fn from(label: ClassLabel) -> Self {
        match label {
            ClassLabel::Index(idx) => i64::from(idx),
            ClassLabel::Unknown => -1,
        }
    }
}

/// Anatomical region a lesion is associated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BodyPart {
    Torso,
    LeftLeg,
    Arm,
    RightLeg,
    #[default]
    Unknown,
}

impl BodyPart {
    /// All known body parts, in body-segmentation class order.
    pub const KNOWN: [BodyPart; 4] = [
        BodyPart::Torso,
        BodyPart::LeftLeg,
        BodyPart::Arm,
        BodyPart::RightLeg,
    ];

    /// Name as used in persisted documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyPart::Torso => "torso",
            BodyPart::LeftLeg => "leftLeg",
            BodyPart::Arm => "arm",
            BodyPart::RightLeg => "rightLeg",
            BodyPart::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One region produced by a detection pass over a single image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    /// 1-based position within the pass that produced it.
    pub sequence_id: u32,
    /// Pixel count of the detected region.
    pub area: f64,
    pub centroid: Centroid,
    pub bounding_box: BoundingBox,
    pub class_label: ClassLabel,
}

impl DetectedObject {
    /// Create a new detection.
    pub fn new(
        sequence_id: u32,
        area: f64,
        centroid: Centroid,
        bounding_box: BoundingBox,
        class_label: ClassLabel,
    ) -> Self {
        Self {
            sequence_id,
            area,
            centroid,
            bounding_box,
            class_label,
        }
    }

    /// Reject non-finite centroids and negative or non-finite areas.
    ///
    /// Degenerate bounding boxes are accepted.
    pub fn validate(&self) -> Result<()> {
        if !self.centroid.is_finite() {
            return Err(LesionTrackError::InvalidGeometry(format!(
                "Detection {} has non-finite centroid ({}, {})",
                self.sequence_id, self.centroid.row, self.centroid.col
            )));
        }
        if !self.area.is_finite() || self.area < 0.0 {
            return Err(LesionTrackError::InvalidGeometry(format!(
                "Detection {} has invalid area {}",
                self.sequence_id, self.area
            )));
        }
        Ok(())
    }
}

/// A lesion after body-part association.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesion {
    /// Carried over from the source detection's `sequence_id`.
    pub id: u32,
    pub body_part: BodyPart,
    pub area: f64,
    pub centroid: Centroid,
    pub bounding_box: BoundingBox,
}

impl Lesion {
    /// Build a lesion from its source detection.
    pub fn from_detection(detection: &DetectedObject, body_part: BodyPart) -> Self {
        Self {
            id: detection.sequence_id,
            body_part,
            area: detection.area,
            centroid: detection.centroid,
            bounding_box: detection.bounding_box,
        }
    }

    /// Bounding-ellipse radius approximation from the bounding box.
    pub fn radius(&self) -> f64 {
        self.bounding_box.half_diagonal()
    }

    /// Project onto the lightweight form used for matching.
    ///
    /// Axis order flips here: `x` is the column, `y` the row.
    pub fn to_candidate(&self) -> MatchCandidate {
        MatchCandidate {
            id: self.id,
            x: self.centroid.col,
            y: self.centroid.row,
            radius: self.radius(),
        }
    }
}

/// Lightweight lesion projection consumed by the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl MatchCandidate {
    /// Create a new candidate.
    pub fn new(id: u32, x: f64, y: f64, radius: f64) -> Self {
        Self { id, x, y, radius }
    }

    /// Euclidean distance between the two centroids.
    pub fn distance_to(&self, other: &MatchCandidate) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Reject non-finite coordinates.
    pub fn validate(&self) -> Result<()> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(LesionTrackError::InvalidGeometry(format!(
                "Lesion {} has non-finite position ({}, {})",
                self.id, self.x, self.y
            )));
        }
        Ok(())
    }
}

/// A surviving correspondence between a lesion in set A and one in set B.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub a_id: u32,
    pub b_id: u32,
    /// Euclidean distance between the two centroids.
    pub distance: f64,
}

/// Result of matching two lesion sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Surviving pairs, ordered by position in set A.
    pub pairs: Vec<MatchedPair>,
    /// Ids from set A without a surviving pair, in input order.
    pub unmatched_a: Vec<u32>,
    /// Ids from set B without a surviving pair, in input order.
    pub unmatched_b: Vec<u32>,
}

impl MatchOutcome {
    /// Create an empty outcome.
    pub fn new() -> Self {
        Self::default()
    }

    /// The B-side id paired with `a_id`, if any.
    pub fn partner_of_a(&self, a_id: u32) -> Option<u32> {
        self.pairs.iter().find(|p| p.a_id == a_id).map(|p| p.b_id)
    }

    /// The A-side id paired with `b_id`, if any.
    pub fn partner_of_b(&self, b_id: u32) -> Option<u32> {
        self.pairs.iter().find(|p| p.b_id == b_id).map(|p| p.a_id)
    }

    /// Sum of distances over all surviving pairs.
    pub fn total_distance(&self) -> f64 {
        self.pairs.iter().map(|p| p.distance).sum()
    }
}
