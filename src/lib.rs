//! # lesion-track
//!
//! A Rust library for following skin lesions across photographs of a patient
//! taken at different visits.
//!
//! Given the output of external detection models, this library provides:
//! - **Body-part association**: tag each detected lesion with the body region
//!   (torso, left leg, arm, right leg) whose bounding box fully contains it
//! - **Lesion matching**: pair lesions from an earlier image with lesions from a
//!   later image by minimum total centroid displacement, dropping implausible pairs
//!
//! ## Features
//!
//! - Build validated detections from raw region-property arrays
//! - Inclusive centroid-and-corner containment test for body regions
//! - Rectangular Hungarian assignment over centroid distances
//! - Configurable distance threshold with symmetric unmatched reporting
//! - Lesion-info JSON documents and `{"mappings": [...]}` responses
//!
//! ## Quick Start
//!
//! ```rust
//! use lesion_track::association::associate;
//! use lesion_track::matching::match_lesion_lists;
//! use lesion_track::types::{BodyPart, BoundingBox, Centroid, ClassLabel, DetectedObject};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let torso = DetectedObject::new(
//!     1, 900.0, Centroid::new(15.0, 15.0), BoundingBox::new(0, 0, 30, 30), ClassLabel::Index(0),
//! );
//! let first_visit = vec![DetectedObject::new(
//!     1, 100.0, Centroid::new(15.0, 15.0), BoundingBox::new(10, 10, 20, 20), ClassLabel::Index(0),
//! )];
//! let second_visit = vec![DetectedObject::new(
//!     1, 110.0, Centroid::new(16.0, 17.0), BoundingBox::new(11, 12, 21, 22), ClassLabel::Index(0),
//! )];
//!
//! let earlier = associate(&first_visit, &[torso.clone()]);
//! let later = associate(&second_visit, &[torso]);
//! assert_eq!(earlier[0].body_part, BodyPart::Torso);
//!
//! let outcome = match_lesion_lists(&earlier, &later, 20.0)?;
//! assert_eq!(outcome.pairs.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Detection pass format
//!
//! Raw passes are parallel arrays, one entry per detected region:
//!
//! ```json
//! {
//!   "areas": [100.0, 64.0],
//!   "centroids": [[15.0, 15.0], [40.0, 40.0]],
//!   "bboxes": [[10, 10, 20, 20], [36, 36, 44, 44]],
//!   "class_labels": [0]
//! }
//! ```
//!
//! Regions past the end of `class_labels` are unlabeled.

pub mod error;
pub mod types;
pub mod config;
pub mod detection;
pub mod association;
pub mod assignment;
pub mod matching;
pub mod document;
pub mod stats;
pub mod tracker;

// Re-export commonly used types and functions
pub use error::{LesionTrackError, Result};
pub use types::{
    BodyPart, BoundingBox, Centroid, ClassLabel, DetectedObject, Lesion, MatchCandidate,
    MatchOutcome, MatchedPair,
};
pub use config::TrackerConfig;
pub use detection::{build_detections, RawDetectionPass};
pub use association::associate;
pub use matching::match_lesions;
pub use document::{LesionDocument, MappingsResponse};
pub use tracker::{analyze_image, compare_documents, ImageAnalysis};
