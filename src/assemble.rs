//! Turns the packer's flat placement list back into per-panel results in the
//! caller's orientation.

use std::collections::BTreeMap;

use crate::error::{PlanError, Result};
use crate::expand::{ItemIndex, PanelIndex};
use crate::geometry::from_cutting_orientation;
use crate::packer::{PlacementRecord, RawPlan};
use crate::types::{GrainAxis, PanelOutput, PlacedItem, Summary, UnusedArea};

#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    /// Sorted by panel id.
    pub panels: Vec<PanelOutput>,
    pub cuts: Vec<String>,
    pub summary: Summary,
}

pub fn assemble(plan: &RawPlan, items: &ItemIndex, panels: &PanelIndex) -> Result<Assembled> {
    let mut grouped: BTreeMap<&str, PanelOutput> = BTreeMap::new();

    for used in &plan.used {
        let grain = panels
            .get(&used.panel)
            .map(|meta| meta.grain)
            .ok_or_else(|| unknown_panel(&used.panel))?;
        let placed = placed_item(used, grain, items)?;
        panel_entry(&mut grouped, &used.panel, panels)?
            .used_items
            .push(placed);
    }

    for unused in &plan.unused {
        panel_entry(&mut grouped, &unused.panel, panels)?
            .unused_areas
            .push(UnusedArea {
                width: unused.width,
                height: unused.height,
                x: unused.x,
                y: unused.y,
            });
    }

    let panels: Vec<PanelOutput> = grouped.into_values().collect();
    let summary = Summary {
        total_panels_used: panels.len(),
        total_items_placed: plan.used.len(),
        total_unused_areas: plan.unused.len(),
    };

    Ok(Assembled {
        panels,
        cuts: plan.cuts.clone(),
        summary,
    })
}

fn panel_entry<'m, 'p>(
    grouped: &'m mut BTreeMap<&'p str, PanelOutput>,
    panel_id: &'p str,
    panels: &PanelIndex,
) -> Result<&'m mut PanelOutput> {
    if !grouped.contains_key(panel_id) {
        let meta = panels.get(panel_id).ok_or_else(|| unknown_panel(panel_id))?;
        grouped.insert(
            panel_id,
            PanelOutput {
                panel_id: panel_id.to_string(),
                panel_name: meta.name.clone(),
                width: meta.rect.w,
                height: meta.rect.h,
                used_items: Vec::new(),
                unused_areas: Vec::new(),
            },
        );
    }
    grouped.get_mut(panel_id).ok_or_else(|| {
        PlanError::ContractViolation(format!("panel unit '{panel_id}' vanished during assembly"))
    })
}

fn unknown_panel(panel_id: &str) -> PlanError {
    PlanError::ContractViolation(format!("packer returned unknown panel unit '{panel_id}'"))
}

/// Display geometry of one placement on a panel of `panel_grain`.
fn placed_item(
    used: &PlacementRecord,
    panel_grain: GrainAxis,
    items: &ItemIndex,
) -> Result<PlacedItem> {
    let meta = items.get(&used.item).ok_or_else(|| {
        PlanError::ContractViolation(format!(
            "packer returned unknown item unit '{}' on panel '{}'",
            used.item, used.panel
        ))
    })?;

    let cut = meta.cutting_rect(panel_grain);
    let footprint = if used.rotated { cut.rotated() } else { cut };
    let shown = from_cutting_orientation(footprint, meta.grain, meta.decoration, panel_grain);

    Ok(PlacedItem {
        item_id: used.item.clone(),
        name: meta.name.clone(),
        width: shown.width,
        height: shown.height,
        x: used.x,
        y: used.y,
        rotate: used.rotated,
        grain: meta.grain,
        engraved_line: shown.engraved_line,
        borders: shown.borders,
    })
}
