//! Request-level pipeline: validate, expand and pack with retries, assemble.
//!
//! A [`Planner`] holds no per-request state, so one instance can serve any
//! number of concurrent requests.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::assemble::assemble;
use crate::error::{PlanError, Result};
use crate::geometry::GrainTransform;
use crate::packer::{Packer, Strategy};
use crate::retry::{RetryController, RetryPolicy};
use crate::solver::GuillotinePacker;
use crate::types::{CalculationRequest, CalculationResponse};

pub struct Planner<P: Packer = GuillotinePacker> {
    packer: P,
    policy: RetryPolicy,
    time_budget: Option<Duration>,
}

impl Default for Planner<GuillotinePacker> {
    fn default() -> Self {
        Self::new()
    }
}

impl Planner<GuillotinePacker> {
    pub fn new() -> Self {
        Self::with_packer(GuillotinePacker::new())
    }
}

impl<P: Packer> Planner<P> {
    pub fn with_packer(packer: P) -> Self {
        Self {
            packer,
            policy: RetryPolicy::default(),
            time_budget: None,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Gives up between attempts once a request has run this long.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Parses `method` and runs [`Planner::calculate_with`].
    pub fn calculate(
        &self,
        request: &CalculationRequest,
        method: &str,
    ) -> Result<CalculationResponse> {
        let strategy: Strategy = method.parse()?;
        self.calculate_with(request, strategy)
    }

    /// Only validation errors are returned as `Err`; every other failure is
    /// reported in the response.
    pub fn calculate_with(
        &self,
        request: &CalculationRequest,
        strategy: Strategy,
    ) -> Result<CalculationResponse> {
        validate(request)?;

        let start = Instant::now();
        let cross_grain = request
            .items
            .iter()
            .filter(|i| {
                request
                    .panels
                    .iter()
                    .any(|p| GrainTransform::between(i.grain, p.grain).is_cross())
            })
            .count();
        info!(
            method = %strategy,
            panel_types = request.panels.len(),
            item_types = request.items.len(),
            total_panels = request.total_panel_quantity(),
            cross_grain,
            "starting calculation"
        );

        let mut policy = self.policy.clone();
        if let Some(budget) = self.time_budget {
            policy.deadline = Some(start + budget);
        }

        let outcome = RetryController::new(&self.packer, strategy, request, &policy)
            .run()
            .and_then(|success| {
                let expansion = &success.expansion;
                assemble(&success.plan, &expansion.item_index, &expansion.panel_index)
            });
        let elapsed = start.elapsed().as_secs_f64();

        match outcome {
            Ok(assembled) => {
                info!(
                    elapsed,
                    panels = assembled.panels.len(),
                    cuts = assembled.cuts.len(),
                    "calculation complete"
                );
                Ok(CalculationResponse {
                    success: true,
                    panels: assembled.panels,
                    cuts: assembled.cuts,
                    summary: Some(assembled.summary),
                    error: None,
                    calculation_time: Some(elapsed),
                })
            }
            Err(e) => {
                error!(elapsed, error = %e, "calculation failed");
                Ok(CalculationResponse::failure(e.to_string(), elapsed))
            }
        }
    }
}

/// Upper bound on the units either list may expand to.
pub const MAX_UNITS: u64 = 10_000;

/// Rejects malformed requests before any expansion.
pub fn validate(request: &CalculationRequest) -> Result<()> {
    if request.panels.is_empty() {
        return Err(invalid("at least one panel is required"));
    }
    if request.items.is_empty() {
        return Err(invalid("at least one item is required"));
    }

    let mut seen = HashSet::new();
    for p in &request.panels {
        check_entry("panel", &p.name, p.width, p.height, p.quantity)?;
        if !seen.insert(p.name.as_str()) {
            return Err(invalid(&format!("duplicate panel name '{}'", p.name)));
        }
    }

    seen.clear();
    for i in &request.items {
        check_entry("item", &i.name, i.width, i.height, i.quantity)?;
        if !seen.insert(i.name.as_str()) {
            return Err(invalid(&format!("duplicate item name '{}'", i.name)));
        }
    }

    for (kind, total) in [
        ("panel", request.total_panel_quantity()),
        ("item", request.total_item_quantity()),
    ] {
        if total > MAX_UNITS {
            return Err(invalid(&format!(
                "total {kind} quantity {total} exceeds the limit of {MAX_UNITS}"
            )));
        }
    }
    Ok(())
}

fn check_entry(kind: &str, name: &str, width: u32, height: u32, quantity: u32) -> Result<()> {
    if name.trim().is_empty() {
        return Err(invalid(&format!("{kind} name must not be empty")));
    }
    if width == 0 || height == 0 {
        return Err(invalid(&format!("{kind} '{name}' dimensions must be non-zero")));
    }
    if quantity == 0 {
        return Err(invalid(&format!("{kind} '{name}' quantity must be non-zero")));
    }
    Ok(())
}

fn invalid(msg: &str) -> PlanError {
    PlanError::Validation(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GrainAxis, ItemSpec, PanelSpec};

    fn request() -> CalculationRequest {
        serde_json::from_str(
            r#"{
                "cut_width": 4,
                "panels": [{"name": "oak", "width": 2440, "height": 1220}],
                "items": [
                    {"name": "door", "width": 700, "height": 400, "isRotate": true, "quantity": 4},
                    {"name": "shelf", "width": 800, "height": 300, "isRotate": false, "quantity": 2,
                     "grain": "horizontal", "engraved_line": "vertical"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(validate(&request()).is_ok());
    }

    #[test]
    fn test_duplicate_item_name_rejected() {
        let mut req = request();
        req.items[1].name = "door".to_string();
        let err = validate(&req).unwrap_err();
        assert!(err.to_string().contains("duplicate item name 'door'"));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut req = request();
        req.panels[0].quantity = 0;
        assert!(validate(&req).unwrap_err().is_validation());
    }

    #[test]
    fn test_empty_lists_rejected() {
        let mut req = request();
        req.items.clear();
        assert!(validate(&req).is_err());
        let mut req = request();
        req.panels.clear();
        assert!(validate(&req).is_err());
    }

    #[test]
    fn test_unknown_method_rejected_before_packing() {
        let err = Planner::new().calculate(&request(), "simulated_annealing").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_calculate_places_everything() {
        let resp = Planner::new().calculate(&request(), "forward_greedy").unwrap();
        assert!(resp.success);
        assert!(resp.error.is_none());
        assert!(resp.calculation_time.is_some());
        let summary = resp.summary.unwrap();
        assert_eq!(summary.total_items_placed, 6);
        assert_eq!(summary.total_panels_used, resp.panels.len());

        let shelf = resp
            .panels
            .iter()
            .flat_map(|p| &p.used_items)
            .find(|u| u.item_id == "shelf_1")
            .unwrap();
        assert_eq!(shelf.grain, GrainAxis::Horizontal);
        let dims = if shelf.rotate { (300, 800) } else { (800, 300) };
        assert_eq!((shelf.width, shelf.height), dims);
    }

    #[test]
    fn test_retries_until_supply_suffices() {
        let req = CalculationRequest {
            cut_width: 0,
            min_initial_usage: false,
            panels: vec![PanelSpec {
                name: "sheet".to_string(),
                width: 100,
                height: 100,
                quantity: 1,
                grain: GrainAxis::Vertical,
            }],
            items: vec![ItemSpec {
                name: "block".to_string(),
                width: 100,
                height: 100,
                allow_rotate: false,
                quantity: 3,
                grain: GrainAxis::Vertical,
                engraved_line: Default::default(),
                borders: Default::default(),
            }],
        };
        let resp = Planner::new().calculate_with(&req, Strategy::Greedy).unwrap();
        assert!(resp.success);
        let ids: Vec<_> = resp.panels.iter().map(|p| p.panel_id.as_str()).collect();
        assert_eq!(ids, ["sheet_1", "sheet_2", "sheet_3"]);
    }

    #[test]
    fn test_lower_ceiling_fails_early() {
        let mut req = request();
        req.items[0].width = 5000;
        let planner = Planner::new().with_policy(RetryPolicy::default().with_ceiling(3));
        let resp = planner.calculate_with(&req, Strategy::Greedy).unwrap();
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("3 panels"));
        assert!(resp.summary.is_none());
    }

    #[test]
    fn test_oversized_quantity_rejected_before_expansion() {
        let mut req = request();
        req.panels[0].quantity = u32::MAX;
        req.panels.push(PanelSpec {
            name: "pine".to_string(),
            quantity: 2,
            ..req.panels[0].clone()
        });
        let err = Planner::new().calculate(&req, "greedy").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("total panel quantity 4294967297"));

        let mut req = request();
        req.items[0].quantity = 10_001;
        let err = validate(&req).unwrap_err();
        assert!(err.to_string().contains("total item quantity"));
    }

    #[test]
    fn test_quantity_at_limit_accepted() {
        let mut req = request();
        req.items[0].quantity = 9_998;
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn test_kerf_overflow_reported_as_failure() {
        let mut req = request();
        req.cut_width = u32::MAX;
        let resp = Planner::new().calculate(&req, "greedy").unwrap();
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("cut width"));
    }
}
