//! Cross-image lesion matching.
//!
//! Lesions from an earlier image (set A) are paired with lesions from a later
//! image (set B) by solving the minimum total displacement assignment over
//! centroid distances, then dropping pairs that moved further than the
//! configured threshold.

use crate::assignment::{solve_assignment, CostMatrix};
use crate::config::{validate_threshold, TrackerConfig};
use crate::error::{LesionTrackError, Result};
use crate::types::{Lesion, MatchCandidate, MatchOutcome, MatchedPair};
use std::collections::HashSet;
use tracing::{debug, info};

/// Pairwise centroid distances, rows from `set_a`, columns from `set_b`.
///
/// # Example
///
/// ```
/// use lesion_track::matching::distance_matrix;
/// use lesion_track::types::MatchCandidate;
///
/// let a = vec![MatchCandidate::new(1, 0.0, 0.0, 1.0)];
/// let b = vec![MatchCandidate::new(2, 3.0, 4.0, 1.0), MatchCandidate::new(3, 0.0, 1.0, 1.0)];
/// let matrix = distance_matrix(&a, &b);
/// assert_eq!(matrix.get(0, 0), 5.0);
/// assert_eq!(matrix.get(0, 1), 1.0);
/// ```
pub fn distance_matrix(set_a: &[MatchCandidate], set_b: &[MatchCandidate]) -> CostMatrix {
    CostMatrix::from_fn(set_a.len(), set_b.len(), |r, c| {
        set_a[r].distance_to(&set_b[c])
    })
}

/// Match two candidate sets.
///
/// Returns the surviving pairs (in set A order) together with the ids left
/// unmatched on each side. A pair is dropped when its distance is strictly
/// greater than `threshold`; both of its lesions are then reported unmatched.
///
/// # Errors
///
/// Fails on a negative or NaN threshold, non-finite coordinates, or a lesion id
/// repeated within one set.
///
/// # Example
///
/// ```
/// use lesion_track::matching::match_lesions;
/// use lesion_track::types::MatchCandidate;
///
/// let a = vec![MatchCandidate::new(1, 0.0, 0.0, 2.0)];
/// let b = vec![
///     MatchCandidate::new(2, 1.0, 1.0, 2.0),
///     MatchCandidate::new(3, 50.0, 50.0, 2.0),
/// ];
/// let outcome = match_lesions(&a, &b, 20.0).unwrap();
/// assert_eq!(outcome.pairs.len(), 1);
/// assert_eq!(outcome.pairs[0].b_id, 2);
/// assert_eq!(outcome.unmatched_b, vec![3]);
/// ```
pub fn match_lesions(
    set_a: &[MatchCandidate],
    set_b: &[MatchCandidate],
    threshold: f64,
) -> Result<MatchOutcome> {
    validate_threshold(threshold)?;
    validate_candidates(set_a)?;
    validate_candidates(set_b)?;

    let matrix = distance_matrix(set_a, set_b);
    check_distances(&matrix, set_a, set_b)?;
    let assignment = solve_assignment(&matrix)?;

    let mut a_matched = vec![false; set_a.len()];
    let mut b_matched = vec![false; set_b.len()];
    let mut pairs = Vec::with_capacity(assignment.len());
    let mut demoted = 0usize;

    for (row, col) in assignment.pairs() {
        let distance = matrix.get(row, col);
        let (a_id, b_id) = (set_a[row].id, set_b[col].id);

        if distance > threshold {
            debug!(a_id, b_id, distance, threshold, "Dropping pair beyond distance threshold");
            demoted += 1;
            continue;
        }

        a_matched[row] = true;
        b_matched[col] = true;
        pairs.push(MatchedPair {
            a_id,
            b_id,
            distance,
        });
    }

    let outcome = MatchOutcome {
        pairs,
        unmatched_a: unmatched_ids(set_a, &a_matched),
        unmatched_b: unmatched_ids(set_b, &b_matched),
    };

    info!(
        set_a = set_a.len(),
        set_b = set_b.len(),
        matched = outcome.pairs.len(),
        demoted,
        unmatched_a = outcome.unmatched_a.len(),
        unmatched_b = outcome.unmatched_b.len(),
        "Matched lesion sets"
    );

    Ok(outcome)
}

/// Match two candidate sets using the threshold from `config`.
pub fn match_lesions_with_config(
    set_a: &[MatchCandidate],
    set_b: &[MatchCandidate],
    config: &TrackerConfig,
) -> Result<MatchOutcome> {
    match_lesions(set_a, set_b, config.match_threshold)
}

/// Match two associated lesion lists by projecting them onto candidates.
pub fn match_lesion_lists(
    lesions_a: &[Lesion],
    lesions_b: &[Lesion],
    threshold: f64,
) -> Result<MatchOutcome> {
    let set_a: Vec<MatchCandidate> = lesions_a.iter().map(Lesion::to_candidate).collect();
    let set_b: Vec<MatchCandidate> = lesions_b.iter().map(Lesion::to_candidate).collect();
    match_lesions(&set_a, &set_b, threshold)
}

fn unmatched_ids(set: &[MatchCandidate], matched: &[bool]) -> Vec<u32> {
    set.iter()
        .zip(matched)
        .filter(|&(_, &is_matched)| !is_matched)
        .map(|(candidate, _)| candidate.id)
        .collect()
}

/// Finite coordinates far enough apart can still overflow the distance.
fn check_distances(
    matrix: &CostMatrix,
    set_a: &[MatchCandidate],
    set_b: &[MatchCandidate],
) -> Result<()> {
    for (row, a) in set_a.iter().enumerate() {
        for (col, b) in set_b.iter().enumerate() {
            if !matrix.get(row, col).is_finite() {
                return Err(LesionTrackError::InvalidGeometry(format!(
                    "Distance between lesion {} ({}, {}) and lesion {} ({}, {}) is not finite",
                    a.id, a.x, a.y, b.id, b.x, b.y
                )));
            }
        }
    }
    Ok(())
}

fn validate_candidates(set: &[MatchCandidate]) -> Result<()> {
    let mut seen = HashSet::with_capacity(set.len());
    for candidate in set {
        candidate.validate()?;
        if !seen.insert(candidate.id) {
            return Err(LesionTrackError::DuplicateLesionId(candidate.id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: u32, x: f64, y: f64) -> MatchCandidate {
        MatchCandidate::new(id, x, y, 5.0)
    }

    #[test]
    fn test_nearest_pair_survives() {
        let a = vec![candidate(1, 0.0, 0.0)];
        let b = vec![candidate(2, 1.0, 1.0), candidate(3, 50.0, 50.0)];

        let outcome = match_lesions(&a, &b, 20.0).unwrap();
        assert_eq!(outcome.pairs.len(), 1);
        assert_eq!(outcome.pairs[0].a_id, 1);
        assert_eq!(outcome.pairs[0].b_id, 2);
        assert!((outcome.pairs[0].distance - 2f64.sqrt()).abs() < 1e-10);
        assert!(outcome.unmatched_a.is_empty());
        assert_eq!(outcome.unmatched_b, vec![3]);
    }

    #[test]
    fn test_far_pair_demoted_on_both_sides() {
        let a = vec![candidate(1, 0.0, 0.0)];
        let b = vec![candidate(2, 100.0, 100.0)];

        let outcome = match_lesions(&a, &b, 20.0).unwrap();
        assert!(outcome.pairs.is_empty());
        assert_eq!(outcome.unmatched_a, vec![1]);
        assert_eq!(outcome.unmatched_b, vec![2]);
    }

    #[test]
    fn test_distance_equal_to_threshold_survives() {
        let a = vec![candidate(1, 0.0, 0.0)];
        let b = vec![candidate(2, 3.0, 4.0)];

        let outcome = match_lesions(&a, &b, 5.0).unwrap();
        assert_eq!(outcome.pairs.len(), 1);
    }

    #[test]
    fn test_larger_a_side() {
        let a = vec![candidate(10, 0.0, 0.0), candidate(11, 40.0, 0.0), candidate(12, 80.0, 0.0)];
        let b = vec![candidate(20, 41.0, 0.0)];

        let outcome = match_lesions(&a, &b, 20.0).unwrap();
        assert_eq!(outcome.partner_of_a(11), Some(20));
        assert_eq!(outcome.unmatched_a, vec![10, 12]);
        assert!(outcome.unmatched_b.is_empty());
    }

    #[test]
    fn test_ids_not_positions() {
        let a = vec![candidate(7, 0.0, 0.0), candidate(3, 10.0, 10.0)];
        let b = vec![candidate(9, 10.5, 10.0), candidate(4, 0.5, 0.0)];

        let outcome = match_lesions(&a, &b, 20.0).unwrap();
        assert_eq!(outcome.partner_of_a(7), Some(4));
        assert_eq!(outcome.partner_of_a(3), Some(9));
        assert_eq!(outcome.partner_of_b(9), Some(3));
    }

    #[test]
    fn test_empty_inputs() {
        let b = vec![candidate(1, 0.0, 0.0), candidate(2, 5.0, 5.0)];
        let outcome = match_lesions(&[], &b, 20.0).unwrap();
        assert!(outcome.pairs.is_empty());
        assert_eq!(outcome.unmatched_b, vec![1, 2]);

        let outcome = match_lesions(&b, &[], 20.0).unwrap();
        assert_eq!(outcome.unmatched_a, vec![1, 2]);
        assert!(outcome.unmatched_b.is_empty());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let a = vec![candidate(1, 0.0, 0.0), candidate(1, 5.0, 5.0)];
        let result = match_lesions(&a, &[], 20.0);
        assert!(matches!(result, Err(LesionTrackError::DuplicateLesionId(1))));
    }

    #[test]
    fn test_non_finite_rejected() {
        let a = vec![candidate(1, f64::INFINITY, 0.0)];
        let b = vec![candidate(2, 0.0, 0.0)];
        assert!(matches!(
            match_lesions(&a, &b, 20.0),
            Err(LesionTrackError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let a = vec![candidate(1, 0.0, 0.0)];
        assert!(matches!(
            match_lesions(&a, &a, -1.0),
            Err(LesionTrackError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_overflowing_distance_names_lesions() {
        let a = vec![candidate(4, f64::MAX, 0.0)];
        let b = vec![candidate(9, -f64::MAX, 0.0)];

        match match_lesions(&a, &b, 20.0) {
            Err(LesionTrackError::InvalidGeometry(msg)) => {
                assert!(msg.contains("lesion 4"), "unexpected message: {}", msg);
                assert!(msg.contains("lesion 9"), "unexpected message: {}", msg);
            }
            other => panic!("Expected InvalidGeometry error, got {:?}", other),
        }
    }

    #[test]
    fn test_with_config_uses_configured_threshold() {
        let a = vec![candidate(1, 0.0, 0.0)];
        let b = vec![candidate(2, 30.0, 40.0)];

        let strict = match_lesions_with_config(&a, &b, &TrackerConfig::default()).unwrap();
        assert!(strict.pairs.is_empty());

        let loose = TrackerConfig::default().with_match_threshold(50.0);
        let outcome = match_lesions_with_config(&a, &b, &loose).unwrap();
        assert_eq!(outcome.partner_of_a(1), Some(2));
    }
}
