//! Settlement: pure instruction plans and their transactional execution.

/// Transactional plan execution
pub mod executor;
/// Settlement instructions and their builder
pub mod plan;

pub use executor::Executor;
pub use plan::{Instruction, Plan, PlanBuilder, RefundAsset};
