//! Display formatting for terminal output
//!
//! Tables and detail views for goals, plans and simulations.

pub mod goal;
pub mod plan;

pub use goal::{format_goal_details, format_goal_list};
pub use plan::{format_history, format_plan, format_simulation};
