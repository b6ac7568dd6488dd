//! Tasks: model, query/filter engine, goal planner, and REST routes.

pub mod filter;
pub mod model;
pub mod planner;
pub mod routes;

pub use filter::{TaskFilter, TaskStats};
pub use model::{Priority, Task, TaskStatus};
