//! Quantity expansion: one identified unit per physical panel or item, plus a
//! side index from unit id back to the spec it came from.
//!
//! Units carry geometry and grain only. Names and decoration live in the
//! [`UnitMetadataIndex`] so the packer never sees them.

use std::collections::HashMap;

use crate::error::{PlanError, Result};
use crate::geometry::{Decoration, to_cutting_orientation};
use crate::types::{GrainAxis, ItemSpec, PanelSpec, Rect};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelUnit {
    pub id: String,
    pub rect: Rect,
    pub grain: GrainAxis,
}

/// An item instance in the caller's orientation. The packer turns it into
/// cutting orientation against whichever panel it tries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemUnit {
    pub id: String,
    pub rect: Rect,
    pub grain: GrainAxis,
    pub allow_rotate: bool,
}

impl ItemUnit {
    /// Dimensions to cut this unit from a panel of `panel` grain.
    pub fn cutting_rect(&self, panel: GrainAxis) -> Rect {
        to_cutting_orientation(self.rect, self.grain, panel)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelMeta {
    pub name: String,
    pub rect: Rect,
    pub grain: GrainAxis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemMeta {
    pub name: String,
    /// Dimensions as the caller declared them.
    pub declared: Rect,
    pub grain: GrainAxis,
    pub decoration: Decoration,
}

impl ItemMeta {
    /// Dimensions the packer cut this item at on a panel of `panel` grain.
    pub fn cutting_rect(&self, panel: GrainAxis) -> Rect {
        to_cutting_orientation(self.declared, self.grain, panel)
    }
}

/// Read-only lookup from unit id to the metadata of its originating spec.
#[derive(Debug, Clone)]
pub struct UnitMetadataIndex<M> {
    entries: HashMap<String, M>,
}

impl<M> UnitMetadataIndex<M> {
    pub fn get(&self, id: &str) -> Option<&M> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<M> FromIterator<(String, M)> for UnitMetadataIndex<M> {
    fn from_iter<I: IntoIterator<Item = (String, M)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

pub type PanelIndex = UnitMetadataIndex<PanelMeta>;
pub type ItemIndex = UnitMetadataIndex<ItemMeta>;

/// `{name}_{ordinal}`, ordinal counting from 1.
pub fn unit_id(name: &str, ordinal: u32) -> String {
    format!("{name}_{ordinal}")
}

fn unit_ids(name: &str, quantity: u32) -> impl Iterator<Item = String> + '_ {
    (1..=quantity).map(move |ordinal| unit_id(name, ordinal))
}

pub fn expand_panels(panels: &[PanelSpec]) -> Vec<PanelUnit> {
    panels
        .iter()
        .flat_map(|p| {
            unit_ids(&p.name, p.quantity).map(move |id| PanelUnit {
                id,
                rect: p.rect(),
                grain: p.grain,
            })
        })
        .collect()
}

pub fn expand_items(items: &[ItemSpec]) -> Vec<ItemUnit> {
    items
        .iter()
        .flat_map(|item| {
            unit_ids(&item.name, item.quantity).map(move |id| ItemUnit {
                id,
                rect: item.rect(),
                grain: item.grain,
                allow_rotate: item.allow_rotate,
            })
        })
        .collect()
}

pub fn panel_index(panels: &[PanelSpec]) -> PanelIndex {
    panels
        .iter()
        .flat_map(|p| {
            unit_ids(&p.name, p.quantity).map(move |id| {
                let meta = PanelMeta {
                    name: p.name.clone(),
                    rect: p.rect(),
                    grain: p.grain,
                };
                (id, meta)
            })
        })
        .collect()
}

pub fn item_index(items: &[ItemSpec]) -> ItemIndex {
    items
        .iter()
        .flat_map(|item| {
            unit_ids(&item.name, item.quantity).map(move |id| {
                let meta = ItemMeta {
                    name: item.name.clone(),
                    declared: item.rect(),
                    grain: item.grain,
                    decoration: Decoration {
                        engraved_line: item.engraved_line,
                        borders: item.borders,
                    },
                };
                (id, meta)
            })
        })
        .collect()
}

/// Everything one attempt hands to the packer and later needs to read back.
#[derive(Debug, Clone)]
pub struct Expansion {
    pub panels: Vec<PanelUnit>,
    pub items: Vec<ItemUnit>,
    pub panel_index: PanelIndex,
    pub item_index: ItemIndex,
}

impl Expansion {
    pub fn new(panels: &[PanelSpec], items: &[ItemSpec]) -> Result<Self> {
        if panels.is_empty() {
            return Err(PlanError::Validation(
                "at least one panel is required".to_string(),
            ));
        }
        Ok(Self {
            panels: expand_panels(panels),
            items: expand_items(items),
            panel_index: panel_index(panels),
            item_index: item_index(items),
        })
    }
}
