use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    pub fn rotated(&self) -> Self {
        Self {
            w: self.h,
            h: self.w,
        }
    }

    pub fn fits_in(&self, other: &Rect) -> bool {
        self.w <= other.w && self.h <= other.h
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// Direction of the material fibre of a panel or item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GrainAxis {
    Horizontal,
    #[default]
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngravedLine {
    Horizontal,
    Vertical,
    #[default]
    None,
}

impl EngravedLine {
    /// Quarter turn: horizontal and vertical swap, `None` is unaffected.
    pub fn flipped(self) -> Self {
        match self {
            EngravedLine::Horizontal => EngravedLine::Vertical,
            EngravedLine::Vertical => EngravedLine::Horizontal,
            EngravedLine::None => EngravedLine::None,
        }
    }
}

/// Edge banding flags, one per edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Borders {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Borders {
    pub fn new(top: bool, right: bool, bottom: bool, left: bool) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Rotates the edge assignment 90 degrees clockwise: left moves to top,
    /// top to right, right to bottom and bottom to left.
    pub fn rotated_clockwise(self) -> Self {
        Self {
            top: self.left,
            right: self.top,
            bottom: self.right,
            left: self.bottom,
        }
    }

    pub fn rotated_counter_clockwise(self) -> Self {
        Self {
            top: self.right,
            right: self.bottom,
            bottom: self.left,
            left: self.top,
        }
    }
}

/// A stock sheet type as declared by the caller.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PanelSpec {
    pub name: String,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub width: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub height: u32,
    #[serde(
        default = "default_quantity",
        deserialize_with = "deserialize_quantity"
    )]
    pub quantity: u32,
    #[serde(default)]
    pub grain: GrainAxis,
}

impl PanelSpec {
    pub fn rect(&self) -> Rect {
        Rect::new(self.width, self.height)
    }
}

/// A part type as declared by the caller.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ItemSpec {
    pub name: String,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub width: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub height: u32,
    #[serde(rename = "isRotate")]
    pub allow_rotate: bool,
    #[serde(
        default = "default_quantity",
        deserialize_with = "deserialize_quantity"
    )]
    pub quantity: u32,
    #[serde(default)]
    pub grain: GrainAxis,
    #[serde(default)]
    pub engraved_line: EngravedLine,
    #[serde(default)]
    pub borders: Borders,
}

impl ItemSpec {
    pub fn rect(&self) -> Rect {
        Rect::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CalculationRequest {
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub cut_width: u32,
    #[serde(default)]
    pub min_initial_usage: bool,
    pub panels: Vec<PanelSpec>,
    pub items: Vec<ItemSpec>,
}

impl CalculationRequest {
    pub fn total_panel_quantity(&self) -> u64 {
        self.panels.iter().map(|p| u64::from(p.quantity)).sum()
    }

    pub fn total_item_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

fn default_quantity() -> u32 {
    1
}

/// Accepts any non-negative JSON number and rounds it to whole units.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 || value.round() > u32::MAX as f64 {
        return Err(D::Error::custom(format!(
            "expected a non-negative dimension, got {value}"
        )));
    }
    Ok(value.round() as u32)
}

/// Accepts a whole JSON number, so `2` and `2.0` both count two sheets.
pub fn deserialize_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(D::Error::custom(format!(
            "expected a whole non-negative quantity, got {value}"
        )));
    }
    Ok(value as u32)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedItem {
    pub item_id: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
    pub rotate: bool,
    pub grain: GrainAxis,
    pub engraved_line: EngravedLine,
    pub borders: Borders,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnusedArea {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelOutput {
    pub panel_id: String,
    pub panel_name: String,
    pub width: u32,
    pub height: u32,
    pub used_items: Vec<PlacedItem>,
    pub unused_areas: Vec<UnusedArea>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub total_panels_used: usize,
    pub total_items_placed: usize,
    pub total_unused_areas: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResponse {
    pub success: bool,
    pub panels: Vec<PanelOutput>,
    pub cuts: Vec<String>,
    #[serde(serialize_with = "serialize_summary")]
    pub summary: Option<Summary>,
    pub error: Option<String>,
    pub calculation_time: Option<f64>,
}

impl CalculationResponse {
    pub fn failure(error: String, calculation_time: f64) -> Self {
        Self {
            success: false,
            panels: Vec::new(),
            cuts: Vec::new(),
            summary: None,
            error: Some(error),
            calculation_time: Some(calculation_time),
        }
    }
}

// A failed calculation reports `{}` rather than `null`.
fn serialize_summary<S>(summary: &Option<Summary>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match summary {
        Some(summary) => summary.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}
