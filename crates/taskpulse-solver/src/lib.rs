//! Priority curves and the daily planner built on top of `taskpulse-core`'s
//! domain model. This crate never mutates a task — it reads through
//! `taskpulse_core::TaskStore` and scores or schedules what it finds.

pub mod curves;
pub mod evaluator;
pub mod factory;
pub mod planner;

pub use curves::{CurveError, CurveMetadata, PriorityCurve};
pub use evaluator::{evaluate_priority, get_by_priority};
pub use factory::{build_curve, FactoryError};
pub use planner::{
    plan_day, PlanOptions, PlanResult, PlannerConfig, ScheduledTask, TimeSlot, UnscheduledTask,
};
