//! Tracker configuration.

use crate::error::{LesionTrackError, Result};
use crate::types::{BodyPart, ClassLabel};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default maximum centroid displacement, in pixels, for a match to survive.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 20.0;

/// Configuration for association and matching.
///
/// # Example
///
/// ```
/// use lesion_track::config::TrackerConfig;
/// use lesion_track::types::{BodyPart, ClassLabel};
///
/// let config = TrackerConfig::default();
/// assert_eq!(config.match_threshold, 20.0);
/// assert_eq!(config.body_part_for(ClassLabel::Index(2)), BodyPart::Arm);
/// assert_eq!(config.body_part_for(ClassLabel::Unknown), BodyPart::Unknown);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Pairs further apart than this are dropped from a match.
    pub match_threshold: f64,

    /// Body part for each body-segmentation class index.
    pub body_part_classes: Vec<BodyPart>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            body_part_classes: BodyPart::KNOWN.to_vec(),
        }
    }
}

impl TrackerConfig {
    /// Create a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the match threshold.
    #[must_use]
    pub fn with_match_threshold(mut self, threshold: f64) -> Self {
        self.match_threshold = threshold;
        self
    }

    /// Replace the class-index to body-part table.
    #[must_use]
    pub fn with_body_part_classes(mut self, classes: Vec<BodyPart>) -> Self {
        self.body_part_classes = classes;
        self
    }

    /// Resolve a body-segmentation class label.
    ///
    /// Out-of-range indices and the unknown sentinel map to [`BodyPart::Unknown`].
    pub fn body_part_for(&self, label: ClassLabel) -> BodyPart {
        label
            .index()
            .and_then(|idx| self.body_part_classes.get(idx as usize).copied())
            .unwrap_or(BodyPart::Unknown)
    }

    /// Check the threshold and class table.
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.match_threshold)?;

        if self.body_part_classes.is_empty() {
            return Err(LesionTrackError::InvalidConfig(
                "body_part_classes must contain at least one entry".to_string(),
            ));
        }

        Ok(())
    }

    /// Load a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or fails validation.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config: TrackerConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON string.
    ///
    /// # Example
    ///
    /// ```
    /// use lesion_track::config::TrackerConfig;
    ///
    /// let config = TrackerConfig::load_from_string(r#"{"match_threshold": 35.0}"#).unwrap();
    /// assert_eq!(config.match_threshold, 35.0);
    /// assert_eq!(config.body_part_classes.len(), 4);
    /// ```
    pub fn load_from_string(json_str: &str) -> Result<Self> {
        let config: TrackerConfig = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }
}

/// Validate a match distance threshold.
///
/// Any non-negative value is accepted, including positive infinity; NaN is not.
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if threshold.is_nan() || threshold < 0.0 {
        return Err(LesionTrackError::InvalidThreshold(format!(
            "Threshold must be a non-negative number, got {}",
            threshold
        )));
    }
    Ok(())
}
