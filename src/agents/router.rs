//! Agent router: typed dispatch and free-text auto routing.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::registry::{Agent, AgentResult};
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

/// How an auto-routed query picked its agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    Llm,
    Heuristic,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoRouteResult {
    #[serde(flatten)]
    pub result: AgentResult,
    pub decision_source: DecisionSource,
}

pub struct AgentRouter {
    llm: Arc<dyn LlmProvider>,
}

impl AgentRouter {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Dispatch on an exact (case-insensitive) handle match, first agent wins.
    pub fn route_by_type(&self, task_type: &str, payload: &Map<String, Value>) -> AgentResult {
        let task_type = task_type.to_lowercase();
        match Agent::ALL.into_iter().find(|a| a.handles().contains(&task_type.as_str())) {
            Some(agent) => agent.run(payload),
            None => AgentResult::no_match(format!("No agent found for task_type='{task_type}'")),
        }
    }

    /// Pick an agent for free text: model first (when preferred), then a
    /// keyword scan. Model failures never surface to the caller.
    pub async fn auto_route(
        &self,
        query: &str,
        payload: &Map<String, Value>,
        prefer_llm: bool,
    ) -> AutoRouteResult {
        let mut picked = None;
        if prefer_llm {
            picked = self.llm_pick(query).await.map(|a| (a, DecisionSource::Llm));
        }
        if picked.is_none() {
            picked = heuristic_pick(query).map(|a| (a, DecisionSource::Heuristic));
        }

        match picked {
            Some((agent, decision_source)) => {
                debug!(agent = agent.name(), source = ?decision_source, "Query routed");
                AutoRouteResult {
                    result: agent.run(payload),
                    decision_source,
                }
            }
            None => AutoRouteResult {
                result: AgentResult::no_match("No agent found for query"),
                decision_source: DecisionSource::None,
            },
        }
    }

    async fn llm_pick(&self, query: &str) -> Option<Agent> {
        let names = Agent::ALL.iter().map(Agent::name).collect::<Vec<_>>().join(", ");
        let system = format!(
            "You route user tasks to the correct agent. \
             Only reply with one agent name from: {names}."
        );
        let request =
            CompletionRequest::new(vec![ChatMessage::system(system), ChatMessage::user(query)]);
        match self.llm.complete(request).await {
            Ok(resp) => {
                let reply = resp.content.trim().to_lowercase();
                let agent = Agent::from_name(&reply);
                if agent.is_none() {
                    debug!(reply = %reply, "Model reply is not an agent name");
                }
                agent
            }
            Err(e) => {
                warn!(error = %e, "Routing model call failed, using keyword routing");
                None
            }
        }
    }
}

/// First agent, in registry order, with a handle occurring in the query.
pub fn heuristic_pick(query: &str) -> Option<Agent> {
    let lowered = query.to_lowercase();
    Agent::ALL
        .into_iter()
        .find(|a| a.handles().iter().any(|h| lowered.contains(h)))
}
