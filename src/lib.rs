//! goalplan - monthly surplus allocation across savings goals
//!
//! This library provides the core functionality for the goalplan
//! application. Given a user's income, fixed costs and prioritized savings
//! goals, it decides how much of the monthly surplus each goal receives,
//! projects when each goal will be reached, rates how tight the plan is, and
//! answers what-if questions without touching stored data.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (goals, profiles, plans, scenarios)
//! - `engine`: The pure allocation pipeline and the simulator
//! - `storage`: JSON file storage layer
//! - `audit`: Audit logging and allocation history
//! - `services`: Business logic layer and the planner
//! - `flows`: Conversation state machines
//! - `display`, `export`, `cli`: Presentation
//!
//! # Example
//!
//! ```rust,ignore
//! use goalplan::config::{GoalPlanPaths, Settings};
//! use goalplan::services::PlannerService;
//! use goalplan::storage::Storage;
//!
//! let paths = GoalPlanPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let mut storage = Storage::new(paths)?;
//! storage.load_all()?;
//!
//! let plan = PlannerService::new(&storage, &settings).compute_allocation(&"me".into())?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod export;
pub mod flows;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{GoalPlanError, GoalPlanResult};
