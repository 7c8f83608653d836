//! Persisted lesion-info documents and match responses.
//!
//! A lesion-info document is a JSON object keyed by lesion id:
//!
//! ```json
//! {
//!   "1": { "x": 15.0, "y": 12.0, "radius": 7.07, "bodyPart": "torso", "id": 1 },
//!   "2": { "x": 40.0, "y": 52.0, "radius": 4.24, "bodyPart": "unknown", "id": 2 }
//! }
//! ```
//!
//! Match results are returned in a `{"mappings": [...]}` envelope.

use crate::error::{LesionTrackError, Result};
use crate::types::{BodyPart, Lesion, MatchCandidate, MatchOutcome, MatchedPair};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One lesion as stored in a lesion-info document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LesionEntry {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub body_part: BodyPart,
    pub id: u32,
}

impl LesionEntry {
    pub fn to_candidate(&self) -> MatchCandidate {
        MatchCandidate::new(self.id, self.x, self.y, self.radius)
    }
}

impl From<&Lesion> for LesionEntry {
    fn from(lesion: &Lesion) -> Self {
        let candidate = lesion.to_candidate();
        Self {
            x: candidate.x,
            y: candidate.y,
            radius: candidate.radius,
            body_part: lesion.body_part,
            id: lesion.id,
        }
    }
}

/// Lesion-info document for one image, keyed by lesion id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LesionDocument {
    entries: BTreeMap<String, LesionEntry>,
}

impl LesionDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from associated lesions.
    pub fn from_lesions(lesions: &[Lesion]) -> Self {
        let entries = lesions
            .iter()
            .map(|lesion| (lesion.id.to_string(), LesionEntry::from(lesion)))
            .collect();
        Self { entries }
    }

    /// Parse and validate a document from JSON.
    ///
    /// # Example
    ///
    /// ```
    /// use lesion_track::document::LesionDocument;
    ///
    /// let json = r#"{"1": {"x": 15.0, "y": 12.0, "radius": 7.0, "bodyPart": "arm", "id": 1}}"#;
    /// let document = LesionDocument::from_json(json).unwrap();
    /// assert_eq!(document.len(), 1);
    /// ```
    pub fn from_json(json_str: &str) -> Result<Self> {
        let document: LesionDocument = serde_json::from_str(json_str)?;
        document.validate()?;
        Ok(document)
    }

    /// Load and validate a document from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let document: LesionDocument = serde_json::from_reader(reader)?;
        document.validate()?;
        Ok(document)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a lesion by id.
    pub fn get(&self, id: u32) -> Option<&LesionEntry> {
        self.entries.get(&id.to_string())
    }

    /// Entries ordered by lesion id.
    pub fn entries(&self) -> Vec<&LesionEntry> {
        let mut entries: Vec<&LesionEntry> = self.entries.values().collect();
        entries.sort_by_key(|entry| entry.id);
        entries
    }

    /// Match candidates for every lesion, ordered by id.
    pub fn to_candidates(&self) -> Result<Vec<MatchCandidate>> {
        self.validate()?;
        Ok(self.entries().into_iter().map(LesionEntry::to_candidate).collect())
    }

    /// Check that keys agree with ids and that positions and radii are usable.
    pub fn validate(&self) -> Result<()> {
        for (key, entry) in &self.entries {
            if key.parse::<u32>().ok() != Some(entry.id) {
                return Err(LesionTrackError::InvalidDocument(format!(
                    "Key {:?} does not match lesion id {}",
                    key, entry.id
                )));
            }
            if !entry.x.is_finite() || !entry.y.is_finite() {
                return Err(LesionTrackError::InvalidDocument(format!(
                    "Lesion {} has non-finite position",
                    entry.id
                )));
            }
            if !entry.radius.is_finite() || entry.radius < 0.0 {
                return Err(LesionTrackError::InvalidDocument(format!(
                    "Lesion {} has invalid radius {}",
                    entry.id, entry.radius
                )));
            }
        }
        Ok(())
    }
}

/// Response envelope for a match between two images.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingsResponse {
    pub mappings: Vec<MatchedPair>,
    #[serde(default)]
    pub unmatched_a: Vec<u32>,
    #[serde(default)]
    pub unmatched_b: Vec<u32>,
}

impl MappingsResponse {
    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<MatchOutcome> for MappingsResponse {
    fn from(outcome: MatchOutcome) -> Self {
        Self {
            mappings: outcome.pairs,
            unmatched_a: outcome.unmatched_a,
            unmatched_b: outcome.unmatched_b,
        }
    }
}
