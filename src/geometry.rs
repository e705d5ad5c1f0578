//! Grain alignment between the caller's orientation and the cutting frame.
//!
//! The packer only ever sees rectangles whose grain agrees with the panel they
//! are cut from. Items declared across the panel grain are quarter-turned on
//! the way in and turned back, together with their decoration, on the way out.

use crate::types::{Borders, EngravedLine, GrainAxis, Rect};

/// Orientation-dependent decoration carried by an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decoration {
    pub engraved_line: EngravedLine,
    pub borders: Borders,
}

/// Display-ready geometry of a placed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayGeometry {
    pub width: u32,
    pub height: u32,
    pub engraved_line: EngravedLine,
    pub borders: Borders,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrainTransform {
    Aligned,
    Cross,
}

impl GrainTransform {
    pub fn between(item: GrainAxis, panel: GrainAxis) -> Self {
        if item == panel {
            GrainTransform::Aligned
        } else {
            GrainTransform::Cross
        }
    }

    pub fn is_cross(self) -> bool {
        self == GrainTransform::Cross
    }

    /// User orientation to cutting orientation.
    pub fn apply(self, rect: Rect) -> Rect {
        match self {
            GrainTransform::Aligned => rect,
            GrainTransform::Cross => rect.rotated(),
        }
    }

    /// Cutting orientation back to user orientation. A quarter turn is its own
    /// inverse for dimensions.
    pub fn invert(self, rect: Rect) -> Rect {
        self.apply(rect)
    }

    /// Decoration as it appears once the item is turned back for display.
    pub fn display_decoration(self, decoration: Decoration) -> Decoration {
        match self {
            GrainTransform::Aligned => decoration,
            GrainTransform::Cross => Decoration {
                engraved_line: decoration.engraved_line.flipped(),
                borders: decoration.borders.rotated_clockwise(),
            },
        }
    }

    /// Undoes [`GrainTransform::display_decoration`].
    pub fn declared_decoration(self, decoration: Decoration) -> Decoration {
        match self {
            GrainTransform::Aligned => decoration,
            GrainTransform::Cross => Decoration {
                engraved_line: decoration.engraved_line.flipped(),
                borders: decoration.borders.rotated_counter_clockwise(),
            },
        }
    }
}

/// Dimensions handed to the packer for an item cut from a panel of `panel` grain.
pub fn to_cutting_orientation(declared: Rect, item: GrainAxis, panel: GrainAxis) -> Rect {
    GrainTransform::between(item, panel).apply(declared)
}

/// Turns a placed footprint and the item's declared decoration back into the
/// caller's orientation.
pub fn from_cutting_orientation(
    placed: Rect,
    item: GrainAxis,
    decoration: Decoration,
    panel: GrainAxis,
) -> DisplayGeometry {
    let transform = GrainTransform::between(item, panel);
    let display = transform.invert(placed);
    let decoration = transform.display_decoration(decoration);
    DisplayGeometry {
        width: display.w,
        height: display.h,
        engraved_line: decoration.engraved_line,
        borders: decoration.borders,
    }
}
