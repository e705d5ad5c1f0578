pub mod assemble;
pub mod config;
pub mod error;
pub mod expand;
pub mod geometry;
pub mod guillotine;
pub mod packer;
pub mod planner;
pub mod render;
pub mod retry;
pub mod solver;
pub mod types;

pub use error::{PackError, PlanError};
pub use packer::{Packer, Strategy};
pub use planner::Planner;
pub use types::{CalculationRequest, CalculationResponse};
