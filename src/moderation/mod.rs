pub mod validate;
pub mod workflow;

pub use workflow::{DecisionAction, EventStats, TypeCount, Workflow};
