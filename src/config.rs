use std::time::Duration;

use clap::Args;

use crate::packer::Packer;
use crate::planner::Planner;
use crate::retry::{MAX_TOTAL_PANELS, RetryPolicy};

/// Planner settings shared by the CLI and the server.
#[derive(Args, Debug, Clone)]
pub struct PlannerConfig {
    /// Stop adding panels once the total supply reaches this many sheets
    #[arg(
        long,
        env = "MAX_PANELS",
        default_value_t = MAX_TOTAL_PANELS,
        value_parser = clap::value_parser!(u32).range(1..=10_000)
    )]
    pub max_panels: u32,

    /// Abandon retries after this many seconds (checked between attempts)
    #[arg(long, env = "DEADLINE_SECS")]
    pub deadline_secs: Option<f64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_panels: MAX_TOTAL_PANELS,
            deadline_secs: None,
        }
    }
}

impl PlannerConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default().with_ceiling(self.max_panels)
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.deadline_secs
            .filter(|s| s.is_finite() && *s >= 0.0)
            .map(Duration::from_secs_f64)
    }

    pub fn build<P: Packer>(&self, packer: P) -> Planner<P> {
        let planner = Planner::with_packer(packer).with_policy(self.retry_policy());
        match self.time_budget() {
            Some(budget) => planner.with_time_budget(budget),
            None => planner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        planner: PlannerConfig,
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["test"]).unwrap();
        assert_eq!(cli.planner.max_panels, 50);
        assert_eq!(cli.planner.time_budget(), None);
        assert_eq!(cli.planner.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_flags() {
        let cli =
            Cli::try_parse_from(["test", "--max-panels", "10", "--deadline-secs", "2.5"]).unwrap();
        assert_eq!(cli.planner.retry_policy().ceiling, 10);
        assert_eq!(cli.planner.time_budget(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_max_panels_out_of_range() {
        assert!(Cli::try_parse_from(["test", "--max-panels", "0"]).is_err());
        assert!(Cli::try_parse_from(["test", "--max-panels", "20000"]).is_err());
    }

    #[test]
    fn test_negative_deadline_ignored() {
        let config = PlannerConfig {
            deadline_secs: Some(-1.0),
            ..PlannerConfig::default()
        };
        assert_eq!(config.time_budget(), None);
    }
}
