//! STRIPS planning: a PDDL reader for the `and`/`not` fragment and a depth-first forward
//! planner with a visited-state set.

pub mod error;
pub mod pddl;
pub mod planner;

pub use error::PlanningError;
pub use planner::{Plan, Planner, SearchLimits, SearchOutcome, SearchReport, SearchStats, State, Step};
