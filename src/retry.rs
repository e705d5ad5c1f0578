//! Supply-inflation retry loop.
//!
//! Infeasibility is usually a shortage of sheets, so each retry offers one more
//! sheet of every panel type until the total supply reaches a ceiling. Each
//! retry is a fresh [`Attempt`]; nothing is mutated in place.

use std::time::Instant;

use tracing::{error, info, warn};

use crate::error::{PackError, PlanError};
use crate::expand::Expansion;
use crate::packer::{self, Packer, RawPlan, Strategy};
use crate::types::{CalculationRequest, PanelSpec};

/// Total panel supply at which the controller stops inflating.
pub const MAX_TOTAL_PANELS: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub ceiling: u32,
    /// Added to every panel spec's quantity per retry.
    pub increment: u32,
    /// Checked between attempts, never during one.
    pub deadline: Option<Instant>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            ceiling: MAX_TOTAL_PANELS,
            increment: 1,
            deadline: None,
        }
    }
}

impl RetryPolicy {
    pub fn with_ceiling(mut self, ceiling: u32) -> Self {
        self.ceiling = ceiling;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Panel supply for one packing attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    /// 1-based.
    pub number: u32,
    pub panels: Vec<PanelSpec>,
}

impl Attempt {
    pub fn first(panels: &[PanelSpec]) -> Self {
        Self {
            number: 1,
            panels: panels.to_vec(),
        }
    }

    pub fn total_panels(&self) -> u64 {
        self.panels.iter().map(|p| u64::from(p.quantity)).sum()
    }

    /// The next attempt, with `increment` more sheets of every panel type.
    pub fn grown(&self, increment: u32) -> Self {
        Self {
            number: self.number + 1,
            panels: self
                .panels
                .iter()
                .map(|p| PanelSpec {
                    quantity: p.quantity.saturating_add(increment),
                    ..p.clone()
                })
                .collect(),
        }
    }
}

/// A feasible attempt together with what is needed to read its plan back.
#[derive(Debug, Clone)]
pub struct Success {
    pub attempt: Attempt,
    pub expansion: Expansion,
    pub plan: RawPlan,
}

#[derive(Debug)]
pub enum AttemptState {
    Attempting(Attempt),
    Terminal(Result<Success, PlanError>),
}

pub struct RetryController<'a, P: Packer + ?Sized> {
    packer: &'a P,
    strategy: Strategy,
    request: &'a CalculationRequest,
    policy: &'a RetryPolicy,
}

impl<'a, P: Packer + ?Sized> RetryController<'a, P> {
    pub fn new(
        packer: &'a P,
        strategy: Strategy,
        request: &'a CalculationRequest,
        policy: &'a RetryPolicy,
    ) -> Self {
        Self {
            packer,
            strategy,
            request,
            policy,
        }
    }

    /// Drives attempts until a terminal state is reached.
    pub fn run(&self) -> Result<Success, PlanError> {
        let mut state = AttemptState::Attempting(Attempt::first(&self.request.panels));
        loop {
            state = match state {
                AttemptState::Attempting(attempt) => self.step(attempt),
                AttemptState::Terminal(outcome) => return outcome,
            };
        }
    }

    pub fn step(&self, attempt: Attempt) -> AttemptState {
        if attempt.number > 1
            && let Some(deadline) = self.policy.deadline
            && Instant::now() >= deadline
        {
            warn!(attempts = attempt.number - 1, "deadline passed, abandoning retries");
            return AttemptState::Terminal(Err(PlanError::DeadlineExceeded {
                attempts: attempt.number - 1,
            }));
        }

        let expansion = match Expansion::new(&attempt.panels, &self.request.items) {
            Ok(expansion) => expansion,
            Err(e) => return AttemptState::Terminal(Err(e)),
        };
        info!(
            attempt = attempt.number,
            panels = expansion.panels.len(),
            items = expansion.items.len(),
            "packing attempt"
        );

        let result = packer::invoke(
            self.packer,
            self.strategy,
            self.request.cut_width,
            self.request.min_initial_usage,
            &expansion.panels,
            &expansion.items,
        );

        match result {
            Ok(plan) => AttemptState::Terminal(Ok(Success {
                attempt,
                expansion,
                plan,
            })),
            Err(PackError::Infeasible) => {
                let total = attempt.total_panels();
                warn!(attempt = attempt.number, total, "packer reported infeasible");
                if total < u64::from(self.policy.ceiling) && self.policy.increment > 0 {
                    let next = attempt.grown(self.policy.increment);
                    info!(total = next.total_panels(), "retrying with more panels");
                    AttemptState::Attempting(next)
                } else {
                    error!(total, ceiling = self.policy.ceiling, "panel ceiling reached");
                    AttemptState::Terminal(Err(PlanError::CeilingExhausted { total }))
                }
            }
            Err(PackError::Fatal { reason }) => {
                error!(attempt = attempt.number, %reason, "packer failed");
                AttemptState::Terminal(Err(PlanError::Packer(reason)))
            }
        }
    }
}
