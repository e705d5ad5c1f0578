//! End-to-end planning scenarios through the public `Planner` API.

use std::sync::Mutex;

use panel_planner::packer::{PackInput, RawPlan};
use panel_planner::types::{Borders, EngravedLine, GrainAxis};
use panel_planner::{CalculationRequest, PackError, Packer, Planner, Strategy};

fn request(json: serde_json::Value) -> CalculationRequest {
    serde_json::from_value(json).unwrap()
}

/// Records every submission and always reports infeasible.
#[derive(Default)]
struct NeverFits {
    offers: Mutex<Vec<(usize, Vec<(u32, u32)>)>>,
}

impl Packer for NeverFits {
    fn pack(&self, _: Strategy, input: &PackInput<'_>) -> Result<RawPlan, PackError> {
        let grain = input.panels[0].grain;
        let items = input
            .items
            .iter()
            .map(|i| i.cutting_rect(grain))
            .map(|r| (r.w, r.h))
            .collect();
        self.offers.lock().unwrap().push((input.panels.len(), items));
        Err(PackError::Infeasible)
    }
}

/// Places item units on panel units that do not exist.
struct Confused;

impl Packer for Confused {
    fn pack(&self, _: Strategy, input: &PackInput<'_>) -> Result<RawPlan, PackError> {
        Ok(RawPlan {
            used: vec![panel_planner::packer::PlacementRecord {
                panel: "ghost_1".to_string(),
                item: input.items[0].id.clone(),
                x: 0,
                y: 0,
                rotated: false,
            }],
            ..RawPlan::default()
        })
    }
}

#[test]
fn scenario_a_single_item_single_panel() {
    let req = request(serde_json::json!({
        "cut_width": 3,
        "panels": [{"name": "oak", "width": 2440, "height": 1220, "quantity": 1,
                    "grain": "vertical"}],
        "items": [{"name": "door", "width": 500, "height": 300, "isRotate": false,
                   "quantity": 1, "grain": "vertical"}]
    }));

    let resp = Planner::new().calculate(&req, "greedy").unwrap();
    assert!(resp.success);
    assert_eq!(resp.panels.len(), 1);
    let panel = &resp.panels[0];
    assert_eq!(panel.panel_id, "oak_1");
    assert_eq!(panel.used_items.len(), 1);
    let door = &panel.used_items[0];
    assert_eq!(door.item_id, "door_1");
    assert_eq!((door.width, door.height), (500, 300));
    assert!(!door.rotate);

    let summary = resp.summary.unwrap();
    assert_eq!(summary.total_panels_used, 1);
    assert_eq!(summary.total_items_placed, 1);
    assert_eq!(summary.total_unused_areas, panel.unused_areas.len());
}

#[test]
fn scenario_b_cross_grain_item_is_restored() {
    let req = request(serde_json::json!({
        "cut_width": 0,
        "panels": [{"name": "oak", "width": 2440, "height": 1220, "grain": "vertical"}],
        "items": [{"name": "door", "width": 500, "height": 300, "isRotate": false,
                   "grain": "horizontal", "engraved_line": "horizontal"}]
    }));

    let resp = Planner::new().calculate(&req, "greedy").unwrap();
    assert!(resp.success);
    let door = &resp.panels[0].used_items[0];
    assert_eq!((door.width, door.height), (500, 300));
    assert_eq!(door.engraved_line, EngravedLine::Vertical);
    assert_eq!(door.borders, Borders::default());
    assert_eq!(door.grain, GrainAxis::Horizontal);
}

#[test]
fn scenario_b_cutting_unit_is_swapped() {
    let req = request(serde_json::json!({
        "cut_width": 0,
        "panels": [{"name": "oak", "width": 2440, "height": 1220, "grain": "vertical"}],
        "items": [{"name": "door", "width": 500, "height": 300, "isRotate": false,
                   "grain": "horizontal"}]
    }));
    let recorder = NeverFits::default();
    let offers = {
        let planner = Planner::with_packer(&recorder);
        planner.calculate(&req, "greedy").unwrap();
        recorder.offers.lock().unwrap().clone()
    };
    assert_eq!(offers[0].1, vec![(300, 500)]);
}

#[test]
fn scenario_mixed_grain_item_fits_only_the_matching_panel() {
    // Same size, different grain: only `birch` leaves the door cuttable.
    let req = request(serde_json::json!({
        "cut_width": 0,
        "panels": [
            {"name": "oak", "width": 300, "height": 500, "grain": "vertical"},
            {"name": "birch", "width": 300, "height": 500, "grain": "horizontal"}
        ],
        "items": [{"name": "door", "width": 500, "height": 300, "isRotate": false,
                   "grain": "vertical", "engraved_line": "vertical",
                   "borders": {"top": true, "right": false, "bottom": false, "left": false}}]
    }));

    let resp = Planner::new().calculate(&req, "greedy").unwrap();
    assert!(resp.success, "{:?}", resp.error);
    assert_eq!(resp.panels.len(), 1);
    let panel = &resp.panels[0];
    assert_eq!(panel.panel_id, "birch_1");

    let door = &panel.used_items[0];
    assert_eq!((door.width, door.height), (500, 300));
    assert!(!door.rotate);
    assert_eq!(door.grain, GrainAxis::Vertical);
    assert_eq!(door.engraved_line, EngravedLine::Horizontal);
    assert_eq!(door.borders, Borders::new(false, true, false, false));
}

#[test]
fn scenario_c_retries_until_ceiling() {
    let req = request(serde_json::json!({
        "cut_width": 0,
        "panels": [{"name": "oak", "width": 100, "height": 100}],
        "items": [{"name": "slab", "width": 90, "height": 90, "isRotate": true, "quantity": 2}]
    }));
    let recorder = NeverFits::default();
    let resp = Planner::with_packer(&recorder)
        .calculate(&req, "forward_greedy")
        .unwrap();

    assert!(!resp.success);
    assert!(resp.error.as_deref().unwrap().contains("50"));
    assert!(resp.panels.is_empty());
    assert!(resp.calculation_time.is_some());

    let totals: Vec<usize> = recorder
        .offers
        .lock()
        .unwrap()
        .iter()
        .map(|(panels, _)| *panels)
        .collect();
    assert_eq!(totals, (1..=50).collect::<Vec<_>>());
}

#[test]
fn scenario_c_builtin_packer_recovers_with_second_panel() {
    let req = request(serde_json::json!({
        "cut_width": 0,
        "panels": [{"name": "oak", "width": 100, "height": 100}],
        "items": [{"name": "slab", "width": 90, "height": 90, "isRotate": true, "quantity": 2}]
    }));
    let resp = Planner::new().calculate(&req, "greedy").unwrap();
    assert!(resp.success);
    let ids: Vec<_> = resp.panels.iter().map(|p| p.panel_id.as_str()).collect();
    assert_eq!(ids, ["oak_1", "oak_2"]);
}

#[test]
fn unknown_unit_from_packer_is_reported_not_panicked() {
    let req = request(serde_json::json!({
        "cut_width": 0,
        "panels": [{"name": "oak", "width": 100, "height": 100}],
        "items": [{"name": "slab", "width": 10, "height": 10, "isRotate": true}]
    }));
    let resp = Planner::with_packer(Confused).calculate(&req, "greedy").unwrap();
    assert!(!resp.success);
    assert!(resp.error.unwrap().contains("ghost_1"));
}

#[test]
fn response_json_shape() {
    let req = request(serde_json::json!({
        "cut_width": 2.0,
        "min_initial_usage": true,
        "panels": [{"name": "oak", "width": 1000.0, "height": 500.0}],
        "items": [{"name": "door", "width": 400, "height": 200, "isRotate": true,
                   "borders": {"top": true, "left": true}}]
    }));
    let resp = Planner::new().calculate(&req, "forward_greedy_native").unwrap();
    let json = serde_json::to_value(&resp).unwrap();

    assert_eq!(json["success"], true);
    assert!(json["error"].is_null());
    assert!(json["cuts"].is_array());
    let item = &json["panels"][0]["used_items"][0];
    assert_eq!(item["item_id"], "door_1");
    assert_eq!(item["grain"], "vertical");
    assert_eq!(item["engraved_line"], "none");
    assert_eq!(item["borders"]["top"], true);
    assert_eq!(item["borders"]["right"], false);
    assert_eq!(json["summary"]["total_items_placed"], 1);
    assert_eq!(json["panels"][0]["panel_name"], "oak");
}
