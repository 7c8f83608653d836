//! Example showing how the distance threshold changes which pairs survive.

use lesion_track::matching::{distance_matrix, match_lesions};
use lesion_track::assignment::solve_assignment;
use lesion_track::types::MatchCandidate;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Distance Threshold Sweep ===\n");

    let earlier = vec![
        MatchCandidate::new(1, 100.0, 100.0, 6.0),
        MatchCandidate::new(2, 180.0, 120.0, 4.0),
        MatchCandidate::new(3, 300.0, 260.0, 8.0),
        MatchCandidate::new(4, 50.0, 400.0, 5.0),
    ];
    let later = vec![
        MatchCandidate::new(1, 104.0, 97.0, 6.5),
        MatchCandidate::new(2, 192.0, 129.0, 4.0),
        MatchCandidate::new(3, 330.0, 300.0, 9.0),
        MatchCandidate::new(4, 500.0, 20.0, 3.0),
        MatchCandidate::new(5, 60.0, 380.0, 3.0),
    ];

    // 1. Unconstrained assignment
    println!("1. Optimal assignment before thresholding");
    let matrix = distance_matrix(&earlier, &later);
    let assignment = solve_assignment(&matrix)?;
    for (row, col) in assignment.pairs() {
        println!(
            "   {} -> {}: {:.2} px",
            earlier[row].id,
            later[col].id,
            matrix.get(row, col)
        );
    }
    println!("   Total displacement: {:.2} px", assignment.total_cost(&matrix));
    println!();

    // 2. Sweep thresholds
    println!("2. Surviving pairs per threshold");
    println!("   Threshold | Pairs | Unmatched A | Unmatched B");
    println!("   ----------|-------|-------------|------------");
    for threshold in [5.0, 10.0, 20.0, 30.0, 50.0, f64::INFINITY] {
        let outcome = match_lesions(&earlier, &later, threshold)?;
        println!(
            "   {:>9} | {:>5} | {:>11} | {:>11}",
            threshold,
            outcome.pairs.len(),
            outcome.unmatched_a.len(),
            outcome.unmatched_b.len()
        );
    }

    Ok(())
}
