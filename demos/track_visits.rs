//! Two-visit tracking example: associate lesions with body parts, persist the
//! lesion-info documents, then match the visits.

use lesion_track::detection::load_pass_from_string;
use lesion_track::tracker::analyze_detections;
use lesion_track::{
    analyze_image, compare_documents, LesionDocument, MappingsResponse, TrackerConfig,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Lesion Tracking Example ===\n");

    let config = TrackerConfig::default();

    // Body segmentation is the same for both visits in this example.
    let body_json = r#"{
        "areas": [40000.0, 28500.0, 15000.0, 28500.0],
        "centroids": [[200.0, 200.0], [450.0, 147.5], [175.0, 350.0], [450.0, 252.5]],
        "bboxes": [
            [100, 100, 300, 300], [300, 100, 600, 195],
            [100, 300, 250, 400], [300, 205, 600, 300]
        ],
        "class_labels": [0, 1, 2, 3]
    }"#;

    // 1. First visit
    println!("1. Analyzing first visit");
    let first_lesions = load_pass_from_string(r#"{
        "areas": [100.0, 100.0, 36.0],
        "centroids": [[155.0, 155.0], [405.0, 125.0], [153.0, 353.0]],
        "bboxes": [[150, 150, 160, 160], [400, 120, 410, 130], [150, 350, 156, 356]],
        "class_labels": [0, 0, 0]
    }"#)?;
    let body_parts = load_pass_from_string(body_json)?;
    let first = analyze_detections(&first_lesions, &body_parts, &config)?;
    for lesion in &first.lesions {
        println!(
            "   Lesion {}: {} (radius {:.2})",
            lesion.id,
            lesion.body_part,
            lesion.radius()
        );
    }
    println!();

    // 2. Second visit, one lesion drifted and one new lesion appeared
    println!("2. Analyzing second visit");
    let second_pass = serde_json::from_str(r#"{
        "areas": [100.0, 100.0, 36.0, 36.0],
        "centroids": [[158.0, 153.0], [407.0, 128.0], [152.0, 355.0], [253.0, 253.0]],
        "bboxes": [
            [153, 148, 163, 158], [402, 123, 412, 133],
            [149, 352, 155, 358], [250, 250, 256, 256]
        ],
        "class_labels": [0, 0, 0]
    }"#)?;
    let body_pass = serde_json::from_str(body_json)?;
    let second = analyze_image(&second_pass, &body_pass, &config)?;
    println!(
        "   {} lesions, {:.0}% on a known body part",
        second.stats.total_lesions,
        second.stats.association_rate() * 100.0
    );
    println!();

    // 3. Persist and reload the lesion-info documents
    println!("3. Lesion-info documents");
    let first_json = first.document.to_json()?;
    println!("   First visit: {}", first_json);
    let earlier = LesionDocument::from_json(&first_json)?;
    let later = LesionDocument::from_json(&second.document.to_json()?)?;
    println!();

    // 4. Match the two visits
    println!("4. Matching visits (threshold {} px)", config.match_threshold);
    let outcome = compare_documents(&earlier, &later, &config)?;
    for pair in &outcome.pairs {
        println!(
            "   Lesion {} -> {} (moved {:.2} px)",
            pair.a_id, pair.b_id, pair.distance
        );
    }
    println!("   New lesions in second visit: {:?}", outcome.unmatched_b);
    println!("   Lesions no longer found: {:?}", outcome.unmatched_a);
    println!();

    let response = MappingsResponse::from(outcome);
    println!("   Response: {}", response.to_json()?);

    Ok(())
}
