use crate::error::PackError;
use crate::guillotine::{GuillotineBin, ScoreStrategy, ScoredPlacement};
use crate::packer::{PackInput, Packer, PlacementRecord, RawPlan, Strategy, UnusedRegion};

/// Guillotine packer over a finite supply of panel units.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuillotinePacker;

impl GuillotinePacker {
    pub fn new() -> Self {
        Self
    }
}

impl Packer for GuillotinePacker {
    fn pack(&self, strategy: Strategy, input: &PackInput<'_>) -> Result<RawPlan, PackError> {
        check_input(input)?;
        if input.items.is_empty() {
            return Ok(RawPlan::default());
        }

        let order = packing_order(input);
        let strategies: &[ScoreStrategy] = if strategy.is_forward() {
            &[
                ScoreStrategy::BestAreaFit,
                ScoreStrategy::BestShortSideFit,
                ScoreStrategy::BestLongSideFit,
            ]
        } else {
            &[ScoreStrategy::BestAreaFit]
        };

        // Keep the pass using the fewest panels, then the least leftover stock.
        let mut best: Option<(Vec<GuillotineBin>, (usize, u64))> = None;
        for &score in strategies {
            let Some(bins) = greedy_pass(input, &order, score) else {
                continue;
            };
            let rank = (bins.len(), bins.iter().map(|b| b.free_area()).sum::<u64>());
            if best.as_ref().is_none_or(|(_, best_rank)| rank < *best_rank) {
                best = Some((bins, rank));
            }
        }

        match best {
            Some((bins, _)) => Ok(bins_to_plan(input, bins)),
            None => Err(PackError::Infeasible),
        }
    }
}

fn check_input(input: &PackInput<'_>) -> Result<(), PackError> {
    if let Some(p) = input.panels.iter().find(|p| p.rect.is_empty()) {
        return Err(PackError::Fatal {
            reason: format!("panel unit {} has zero area", p.id),
        });
    }
    // Split offsets reach at most panel edge + kerf.
    if let Some(p) = input.panels.iter().find(|p| {
        let longest = p.rect.w.max(p.rect.h);
        longest.checked_add(input.cut_width).is_none()
    }) {
        return Err(PackError::Fatal {
            reason: format!(
                "cut width {} overflows the coordinates of panel unit {}",
                input.cut_width, p.id
            ),
        });
    }
    if let Some(i) = input.items.iter().find(|i| i.rect.is_empty()) {
        return Err(PackError::Fatal {
            reason: format!("item unit {} has zero area", i.id),
        });
    }
    Ok(())
}

/// Largest pieces first; ties keep submission order.
fn packing_order(input: &PackInput<'_>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..input.items.len()).collect();
    order.sort_by(|&a, &b| {
        input.items[b]
            .rect
            .area()
            .cmp(&input.items[a].rect.area())
    });
    order
}

/// Places every item or returns `None` once one cannot go anywhere.
fn greedy_pass(
    input: &PackInput<'_>,
    order: &[usize],
    strategy: ScoreStrategy,
) -> Option<Vec<GuillotineBin>> {
    let mut bins: Vec<GuillotineBin> = Vec::new();
    let mut unopened: Vec<usize> = (0..input.panels.len()).collect();

    for &idx in order {
        let item = &input.items[idx];
        let on = |panel: usize| item.cutting_rect(input.panels[panel].grain);

        let mut best: Option<(usize, ScoredPlacement)> = None;
        for (bi, bin) in bins.iter().enumerate() {
            if let Some(scored) = bin.find_best(on(bin.panel), item.allow_rotate, strategy)
                && best.is_none_or(|(_, b)| scored.score < b.score)
            {
                best = Some((bi, scored));
            }
        }

        if let Some((bi, scored)) = best {
            let piece = on(bins[bi].panel);
            bins[bi].place(scored, idx, piece);
            continue;
        }

        let fits = |&&p: &&usize| {
            let piece = on(p);
            let stock = input.panels[p].rect;
            piece.fits_in(&stock) || (item.allow_rotate && piece.rotated().fits_in(&stock))
        };
        let next = if input.min_initial_usage {
            unopened
                .iter()
                .filter(fits)
                .min_by_key(|&&p| input.panels[p].rect.area())
        } else {
            unopened.iter().find(fits)
        };
        let panel = *next?;
        unopened.retain(|&p| p != panel);

        let piece = on(panel);
        let mut bin = GuillotineBin::new(panel, input.panels[panel].rect, input.cut_width);
        let scored = bin.find_best(piece, item.allow_rotate, strategy)?;
        bin.place(scored, idx, piece);
        bins.push(bin);
    }

    Some(bins)
}

fn bins_to_plan(input: &PackInput<'_>, bins: Vec<GuillotineBin>) -> RawPlan {
    let mut plan = RawPlan::default();
    for bin in bins {
        let panel_id = &input.panels[bin.panel].id;
        plan.used.extend(bin.placements.iter().map(|p| PlacementRecord {
            panel: panel_id.clone(),
            item: input.items[p.item].id.clone(),
            x: p.x,
            y: p.y,
            rotated: p.rotated,
        }));
        plan.unused.extend(bin.free_rects.iter().map(|f| UnusedRegion {
            panel: panel_id.clone(),
            width: f.rect.w,
            height: f.rect.h,
            x: f.x,
            y: f.y,
        }));
        plan.cuts
            .extend(bin.cuts.iter().map(|c| format!("{panel_id}: {c}")));
    }
    plan
}
