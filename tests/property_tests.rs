//! Property-based tests using proptest
//!
//! These tests verify the invariants of association and matching for
//! arbitrary inputs.

use lesion_track::assignment::{solve_assignment, CostMatrix};
use lesion_track::association::associate;
use lesion_track::matching::{distance_matrix, match_lesions};
use lesion_track::types::{
    BodyPart, BoundingBox, Centroid, ClassLabel, DetectedObject, MatchCandidate,
};
use proptest::prelude::*;
use std::collections::HashSet;

fn candidates(points: &[(f64, f64)], first_id: u32) -> Vec<MatchCandidate> {
    points
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| MatchCandidate::new(first_id + i as u32, x, y, 1.0))
        .collect()
}

/// Exhaustive minimum over all injective pairings of the smaller side.
fn brute_force_min(matrix: &CostMatrix) -> f64 {
    fn search(matrix: &CostMatrix, row: usize, used: &mut Vec<bool>, transpose: bool) -> f64 {
        let (rows, cols) = if transpose {
            (matrix.cols(), matrix.rows())
        } else {
            (matrix.rows(), matrix.cols())
        };
        if row == rows {
            return 0.0;
        }
        let mut best = f64::INFINITY;
        for col in 0..cols {
            if used[col] {
                continue;
            }
            used[col] = true;
            let cost = if transpose { matrix.get(col, row) } else { matrix.get(row, col) };
            best = best.min(cost + search(matrix, row + 1, used, transpose));
            used[col] = false;
        }
        best
    }

    if matrix.is_empty() {
        return 0.0;
    }
    let transpose = matrix.rows() > matrix.cols();
    let width = if transpose { matrix.rows() } else { matrix.cols() };
    search(matrix, 0, &mut vec![false; width], transpose)
}

fn point_set() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((0.0f64..200.0, 0.0f64..200.0), 0..6)
}

// Property: the assignment is globally optimal
proptest! {
    #[test]
    fn prop_assignment_optimal(a in point_set(), b in point_set()) {
        let set_a = candidates(&a, 1);
        let set_b = candidates(&b, 100);
        let matrix = distance_matrix(&set_a, &set_b);

        let assignment = solve_assignment(&matrix).unwrap();
        let expected = brute_force_min(&matrix);

        prop_assert_eq!(assignment.len(), a.len().min(b.len()));
        prop_assert!((assignment.total_cost(&matrix) - expected).abs() < 1e-6,
                "Assignment cost {} exceeds optimum {}", assignment.total_cost(&matrix), expected);
    }
}

// Property: surviving pairs are injective on both sides and every id is
// reported exactly once
proptest! {
    #[test]
    fn prop_match_injective_and_complete(
        a in point_set(),
        b in point_set(),
        threshold in 0.0f64..150.0,
    ) {
        let set_a = candidates(&a, 1);
        let set_b = candidates(&b, 100);
        let outcome = match_lesions(&set_a, &set_b, threshold).unwrap();

        let a_ids: HashSet<u32> = outcome.pairs.iter().map(|p| p.a_id).collect();
        let b_ids: HashSet<u32> = outcome.pairs.iter().map(|p| p.b_id).collect();
        prop_assert_eq!(a_ids.len(), outcome.pairs.len());
        prop_assert_eq!(b_ids.len(), outcome.pairs.len());

        prop_assert_eq!(outcome.pairs.len() + outcome.unmatched_a.len(), set_a.len());
        prop_assert_eq!(outcome.pairs.len() + outcome.unmatched_b.len(), set_b.len());
        for id in &outcome.unmatched_a {
            prop_assert!(!a_ids.contains(id));
        }
        for id in &outcome.unmatched_b {
            prop_assert!(!b_ids.contains(id));
        }
        for pair in &outcome.pairs {
            prop_assert!(pair.distance <= threshold);
        }
    }
}

// Property: raising the threshold never removes a pair
proptest! {
    #[test]
    fn prop_threshold_monotone(
        a in point_set(),
        b in point_set(),
        low in 0.0f64..100.0,
        extra in 0.0f64..100.0,
    ) {
        let set_a = candidates(&a, 1);
        let set_b = candidates(&b, 100);

        let strict = match_lesions(&set_a, &set_b, low).unwrap();
        let loose = match_lesions(&set_a, &set_b, low + extra).unwrap();

        for pair in &strict.pairs {
            prop_assert!(loose.pairs.contains(pair),
                    "Pair {:?} lost when raising threshold", pair);
        }

        let unbounded = match_lesions(&set_a, &set_b, f64::INFINITY).unwrap();
        prop_assert_eq!(unbounded.pairs.len(), a.len().min(b.len()));
    }
}

// Property: matching is deterministic
proptest! {
    #[test]
    fn prop_match_idempotent(a in point_set(), b in point_set()) {
        let set_a = candidates(&a, 1);
        let set_b = candidates(&b, 100);

        let first = match_lesions(&set_a, &set_b, 20.0).unwrap();
        let second = match_lesions(&set_a, &set_b, 20.0).unwrap();
        prop_assert_eq!(first, second);
    }
}

// Property: a lesion strictly inside a region is tagged with it, and one outside
// every region is Unknown
proptest! {
    #[test]
    fn prop_containment(
        min_row in 0i64..100,
        min_col in 0i64..100,
        height in 1i64..50,
        width in 1i64..50,
        margin in 1i64..20,
        label in 0u32..4,
    ) {
        let lesion_box = BoundingBox::new(min_row, min_col, min_row + height, min_col + width);
        let centroid = Centroid::new(
            (lesion_box.min_row + lesion_box.max_row) as f64 / 2.0,
            (lesion_box.min_col + lesion_box.max_col) as f64 / 2.0,
        );
        let lesion = DetectedObject::new(
            1,
            (height * width) as f64,
            centroid,
            lesion_box,
            ClassLabel::Index(0),
        );

        let region_box = BoundingBox::new(
            min_row - margin,
            min_col - margin,
            min_row + height + margin,
            min_col + width + margin,
        );
        let region = DetectedObject::new(1, 0.0, centroid, region_box, ClassLabel::Index(label));

        let inside = associate(std::slice::from_ref(&lesion), std::slice::from_ref(&region));
        prop_assert_eq!(inside[0].body_part, BodyPart::KNOWN[label as usize]);

        let far_box = BoundingBox::new(
            region_box.max_row + 1,
            region_box.max_col + 1,
            region_box.max_row + 500,
            region_box.max_col + 500,
        );
        let far = DetectedObject::new(2, 0.0, centroid, far_box, ClassLabel::Index(label));
        let outside = associate(&[lesion], &[far]);
        prop_assert_eq!(outside[0].body_part, BodyPart::Unknown);
    }
}

// Property: radius is never negative
proptest! {
    #[test]
    fn prop_radius_non_negative(
        r0 in -500i64..500, c0 in -500i64..500, r1 in -500i64..500, c1 in -500i64..500,
    ) {
        let bbox = BoundingBox::new(r0, c0, r1, c1);
        prop_assert!(bbox.half_diagonal() >= 0.0);
    }
}
