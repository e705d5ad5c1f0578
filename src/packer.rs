//! Typed boundary to the packing capability.
//!
//! The planner hands over flat unit lists and gets back flat placements. What
//! happens in between is the packer's business; the only thing the planner
//! relies on is the split between [`PackError::Infeasible`] and everything else.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PackError, PlanError};
use crate::expand::{ItemUnit, PanelUnit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Greedy,
    ForwardGreedy,
    GreedyNative,
    ForwardGreedyNative,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Greedy,
        Strategy::ForwardGreedy,
        Strategy::GreedyNative,
        Strategy::ForwardGreedyNative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Greedy => "greedy",
            Strategy::ForwardGreedy => "forward_greedy",
            Strategy::GreedyNative => "greedy_native",
            Strategy::ForwardGreedyNative => "forward_greedy_native",
        }
    }

    /// Native variants run the same search on a faster engine, so the search
    /// itself only distinguishes plain and forward greedy.
    pub fn is_forward(self) -> bool {
        matches!(self, Strategy::ForwardGreedy | Strategy::ForwardGreedyNative)
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                PlanError::Validation(format!(
                    "unknown method '{s}', expected one of: greedy, forward_greedy, \
                     greedy_native, forward_greedy_native"
                ))
            })
    }
}

/// Flat geometric input of one packing attempt.
#[derive(Debug, Clone, Copy)]
pub struct PackInput<'a> {
    pub cut_width: u32,
    pub min_initial_usage: bool,
    pub panels: &'a [PanelUnit],
    pub items: &'a [ItemUnit],
}

/// One item unit placed on one panel unit. `rotated` is relative to the
/// item's cutting orientation on that panel, see [`ItemUnit::cutting_rect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementRecord {
    pub panel: String,
    pub item: String,
    pub x: u32,
    pub y: u32,
    pub rotated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusedRegion {
    pub panel: String,
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPlan {
    pub used: Vec<PlacementRecord>,
    pub unused: Vec<UnusedRegion>,
    /// Opaque cut descriptors; empty when the packer does not report cuts.
    pub cuts: Vec<String>,
}

pub trait Packer: Send + Sync {
    fn pack(&self, strategy: Strategy, input: &PackInput<'_>) -> Result<RawPlan, PackError>;
}

impl<P: Packer + ?Sized> Packer for &P {
    fn pack(&self, strategy: Strategy, input: &PackInput<'_>) -> Result<RawPlan, PackError> {
        (**self).pack(strategy, input)
    }
}

/// Submits one attempt to `packer`.
pub fn invoke<P: Packer + ?Sized>(
    packer: &P,
    strategy: Strategy,
    cut_width: u32,
    min_initial_usage: bool,
    panels: &[PanelUnit],
    items: &[ItemUnit],
) -> Result<RawPlan, PackError> {
    let input = PackInput {
        cut_width,
        min_initial_usage,
        panels,
        items,
    };
    packer.pack(strategy, &input)
}
