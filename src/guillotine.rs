//! A single panel being cut with guillotine cuts.
//!
//! Every placement goes into the top-left corner of a free rectangle and
//! splits what remains of it into at most two new free rectangles, separated
//! from the piece by the kerf.

use crate::types::Rect;

/// Uncut stock at a position on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeRect {
    pub x: u32,
    pub y: u32,
    pub rect: Rect,
}

impl FreeRect {
    fn at(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            x,
            y,
            rect: Rect::new(w, h),
        }
    }

    fn right(&self) -> u32 {
        self.x + self.rect.w
    }

    fn bottom(&self) -> u32 {
        self.y + self.rect.h
    }

    /// Union of two free rects sharing a full edge.
    fn union(self, other: FreeRect) -> Option<FreeRect> {
        let (a, b) = (self, other);
        if a.y == b.y && a.rect.h == b.rect.h {
            let (l, r) = if a.x <= b.x { (a, b) } else { (b, a) };
            if l.right() == r.x {
                return Some(FreeRect::at(l.x, l.y, l.rect.w + r.rect.w, l.rect.h));
            }
        }
        if a.x == b.x && a.rect.w == b.rect.w {
            let (t, u) = if a.y <= b.y { (a, b) } else { (b, a) };
            if t.bottom() == u.y {
                return Some(FreeRect::at(t.x, t.y, t.rect.w, t.rect.h + u.rect.h));
            }
        }
        None
    }
}

/// A piece placed in a bin. `item` indexes the caller's item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinPlacement {
    pub item: usize,
    pub rect: Rect,
    pub x: u32,
    pub y: u32,
    pub rotated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutAxis {
    /// Blade runs along y at a fixed x.
    Vertical,
    /// Blade runs along x at a fixed y.
    Horizontal,
}

/// One straight cut, `pos` on the fixed axis spanning `from..to` on the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cut {
    pub axis: CutAxis,
    pub pos: u32,
    pub from: u32,
    pub to: u32,
}

impl std::fmt::Display for Cut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (axis, coord) = match self.axis {
            CutAxis::Vertical => ("vertical", "x"),
            CutAxis::Horizontal => ("horizontal", "y"),
        };
        write!(
            f,
            "{axis} cut at {coord}={} [{}..{}]",
            self.pos, self.from, self.to
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::enum_variant_names)]
pub enum ScoreStrategy {
    BestAreaFit,
    BestShortSideFit,
    BestLongSideFit,
}

impl ScoreStrategy {
    /// Lower is better.
    fn score(self, piece: Rect, free: Rect) -> (u64, u64) {
        let dw = (free.w - piece.w) as u64;
        let dh = (free.h - piece.h) as u64;
        let (short, long) = (dw.min(dh), dw.max(dh));
        match self {
            ScoreStrategy::BestAreaFit => (free.area() - piece.area(), short),
            ScoreStrategy::BestShortSideFit => (short, long),
            ScoreStrategy::BestLongSideFit => (long, short),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScoredPlacement {
    pub free_idx: usize,
    pub rotated: bool,
    pub score: (u64, u64),
}

#[derive(Debug, Clone)]
pub struct GuillotineBin {
    /// Index of the panel unit this bin was opened on.
    pub panel: usize,
    kerf: u32,
    pub free_rects: Vec<FreeRect>,
    pub placements: Vec<BinPlacement>,
    pub cuts: Vec<Cut>,
}

impl GuillotineBin {
    pub fn new(panel: usize, stock: Rect, kerf: u32) -> Self {
        Self {
            panel,
            kerf,
            free_rects: vec![FreeRect::at(0, 0, stock.w, stock.h)],
            placements: Vec::new(),
            cuts: Vec::new(),
        }
    }

    #[cfg(test)]
    fn used_area(&self) -> u64 {
        self.placements.iter().map(|p| p.rect.area()).sum()
    }

    pub fn free_area(&self) -> u64 {
        self.free_rects.iter().map(|f| f.rect.area()).sum()
    }

    pub fn find_best(
        &self,
        piece: Rect,
        allow_rotate: bool,
        strategy: ScoreStrategy,
    ) -> Option<ScoredPlacement> {
        // Square pieces gain nothing from a turn.
        let turns: &[bool] = if allow_rotate && piece.w != piece.h {
            &[false, true]
        } else {
            &[false]
        };

        let mut best: Option<ScoredPlacement> = None;
        for (free_idx, free) in self.free_rects.iter().enumerate() {
            for &rotated in turns {
                let oriented = if rotated { piece.rotated() } else { piece };
                if !oriented.fits_in(&free.rect) {
                    continue;
                }
                let score = strategy.score(oriented, free.rect);
                if best.is_none_or(|b| score < b.score) {
                    best = Some(ScoredPlacement {
                        free_idx,
                        rotated,
                        score,
                    });
                }
            }
        }
        best
    }

    pub fn place(&mut self, scored: ScoredPlacement, item: usize, piece: Rect) -> BinPlacement {
        let free = self.free_rects.swap_remove(scored.free_idx);
        let rect = if scored.rotated { piece.rotated() } else { piece };
        let placement = BinPlacement {
            item,
            rect,
            x: free.x,
            y: free.y,
            rotated: scored.rotated,
        };

        self.split(free, rect);
        self.placements.push(placement);
        self.merge_free_rects();
        placement
    }

    /// Splits along the shorter leftover axis first, so the longer leftover
    /// strip stays whole.
    fn split(&mut self, free: FreeRect, placed: Rect) {
        let spare_w = free.rect.w - placed.w;
        let spare_h = free.rect.h - placed.h;
        let right_w = spare_w.saturating_sub(self.kerf);
        let bottom_h = spare_h.saturating_sub(self.kerf);
        let right_x = free.x + placed.w + self.kerf;
        let bottom_y = free.y + placed.h + self.kerf;

        let horizontal_first = match (right_w > 0, bottom_h > 0) {
            (true, true) => spare_w < spare_h,
            (false, true) => true,
            _ => false,
        };

        let (right, bottom) = if horizontal_first {
            (
                FreeRect::at(right_x, free.y, right_w, placed.h),
                FreeRect::at(free.x, bottom_y, free.rect.w, bottom_h),
            )
        } else {
            (
                FreeRect::at(right_x, free.y, right_w, free.rect.h),
                FreeRect::at(free.x, bottom_y, placed.w, bottom_h),
            )
        };
        self.free_rects
            .extend([right, bottom].into_iter().filter(|f| !f.rect.is_empty()));

        self.record_cuts(free, placed, horizontal_first);
    }

    fn record_cuts(&mut self, free: FreeRect, placed: Rect, horizontal_first: bool) {
        let x = free.x + placed.w;
        let y = free.y + placed.h;
        let across = (placed.h < free.rect.h).then_some(CutAxis::Horizontal);
        let down = (placed.w < free.rect.w).then_some(CutAxis::Vertical);

        // The first cut spans the whole free rect, the second only the strip
        // the piece sits in.
        let order = if horizontal_first {
            [across, down]
        } else {
            [down, across]
        };
        for (i, axis) in order.into_iter().flatten().enumerate() {
            let full = i == 0;
            let cut = match axis {
                CutAxis::Horizontal => Cut {
                    axis,
                    pos: y,
                    from: free.x,
                    to: if full { free.right() } else { x },
                },
                CutAxis::Vertical => Cut {
                    axis,
                    pos: x,
                    from: free.y,
                    to: if full { free.bottom() } else { y },
                },
            };
            self.cuts.push(cut);
        }
    }

    fn merge_free_rects(&mut self) {
        'scan: loop {
            for i in 0..self.free_rects.len() {
                for j in (i + 1)..self.free_rects.len() {
                    if let Some(merged) = self.free_rects[i].union(self.free_rects[j]) {
                        self.free_rects[i] = merged;
                        self.free_rects.swap_remove(j);
                        continue 'scan;
                    }
                }
            }
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(bin: &mut GuillotineBin, piece: Rect, allow_rotate: bool) -> BinPlacement {
        let scored = bin
            .find_best(piece, allow_rotate, ScoreStrategy::BestAreaFit)
            .unwrap();
        bin.place(scored, bin.placements.len(), piece)
    }

    #[test]
    fn test_first_piece_goes_top_left() {
        let mut bin = GuillotineBin::new(0, Rect::new(100, 100), 0);
        let p = place(&mut bin, Rect::new(50, 30), false);
        assert_eq!((p.x, p.y, p.rect), (0, 0, Rect::new(50, 30)));
        assert_eq!(bin.used_area() + bin.free_area(), 100 * 100);
    }

    #[test]
    fn test_oversized_piece_has_no_slot() {
        let bin = GuillotineBin::new(0, Rect::new(100, 100), 0);
        assert!(
            bin.find_best(Rect::new(200, 50), true, ScoreStrategy::BestShortSideFit)
                .is_none()
        );
    }

    #[test]
    fn test_turn_only_when_allowed() {
        let bin = GuillotineBin::new(0, Rect::new(100, 50), 0);
        let piece = Rect::new(50, 100);
        assert!(bin.find_best(piece, false, ScoreStrategy::BestAreaFit).is_none());
        let scored = bin.find_best(piece, true, ScoreStrategy::BestAreaFit).unwrap();
        assert!(scored.rotated);
    }

    #[test]
    fn test_kerf_is_removed_from_leftover() {
        let mut bin = GuillotineBin::new(0, Rect::new(100, 100), 5);
        place(&mut bin, Rect::new(50, 100), false);
        assert_eq!(bin.free_rects, [FreeRect::at(55, 0, 45, 100)]);
        assert_eq!(bin.free_area(), 45 * 100);
    }

    #[test]
    fn test_exact_fill_needs_no_cuts() {
        let mut bin = GuillotineBin::new(0, Rect::new(100, 100), 0);
        place(&mut bin, Rect::new(100, 100), false);
        assert!(bin.free_rects.is_empty());
        assert!(bin.cuts.is_empty());
    }

    #[test]
    fn test_free_rects_union_along_shared_edge() {
        let a = FreeRect::at(0, 0, 50, 20);
        assert_eq!(
            a.union(FreeRect::at(50, 0, 30, 20)),
            Some(FreeRect::at(0, 0, 80, 20))
        );
        assert_eq!(
            FreeRect::at(0, 20, 50, 10).union(a),
            Some(FreeRect::at(0, 0, 50, 30))
        );
        assert_eq!(a.union(FreeRect::at(55, 0, 30, 20)), None);
        assert_eq!(a.union(FreeRect::at(50, 0, 30, 25)), None);
    }

    #[test]
    fn test_cuts_follow_split_order() {
        // 60x20 in 100x100 leaves 40 to the right and 80 below, so the
        // horizontal cut runs the full width first.
        let mut bin = GuillotineBin::new(0, Rect::new(100, 100), 0);
        place(&mut bin, Rect::new(60, 20), false);
        assert_eq!(
            bin.cuts,
            [
                Cut {
                    axis: CutAxis::Horizontal,
                    pos: 20,
                    from: 0,
                    to: 100
                },
                Cut {
                    axis: CutAxis::Vertical,
                    pos: 60,
                    from: 0,
                    to: 20
                },
            ]
        );
        assert_eq!(bin.cuts[0].to_string(), "horizontal cut at y=20 [0..100]");
    }

    #[test]
    fn test_single_cut_spans_free_rect() {
        let mut bin = GuillotineBin::new(0, Rect::new(100, 100), 0);
        place(&mut bin, Rect::new(100, 40), false);
        assert_eq!(bin.cuts.len(), 1);
        assert_eq!(bin.cuts[0].to_string(), "horizontal cut at y=40 [0..100]");
    }
}
