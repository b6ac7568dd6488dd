//! Agents: a fixed registry of canned responders and the router in front of it.

pub mod registry;
pub mod router;
pub mod routes;

pub use registry::{Agent, AgentResult, AgentStatus};
pub use router::{AgentRouter, AutoRouteResult, DecisionSource};
