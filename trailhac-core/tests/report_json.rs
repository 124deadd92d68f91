//! JSON rendering of hierarchy reports.
#![cfg(feature = "serde")]

mod common;

use common::bridged;
use trailhac_core::TrailhacBuilder;

#[test]
fn report_serialises_linkage_levels_and_scores() {
    let inputs = bridged();
    let report = TrailhacBuilder::new()
        .build()
        .expect("defaults valid")
        .run(&inputs.graph, &inputs.distances, &inputs.bases)
        .expect("run must succeed");

    let value = serde_json::to_value(&report).expect("report must serialise");
    assert_eq!(value["linkage"]["base_count"], 3);
    assert_eq!(value["linkage"]["records"][0]["left"], 0);
    assert_eq!(value["criterion"], "OverlapModularity");
    assert_eq!(value["best"], 0);
    let level = &value["levels"][0];
    assert_eq!(level["level"], 1);
    assert_eq!(level["communities"][1], serde_json::json!([5, 6, 7, 8, 9]));
    assert!(level["scores"]["fitness"]["conductance"]["mean"].is_number());
}
