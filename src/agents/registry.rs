//! The agent registry. Order matters: routing takes the first match.

use serde::Serialize;
use serde_json::{Map, Value, json};

/// A canned responder for one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Agent {
    Schedule,
    Email,
    Health,
    Finance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Ok,
    NoMatch,
}

/// What an agent (or the router, on no match) returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentResult {
    pub agent: String,
    pub status: AgentStatus,
    pub summary: String,
    pub data: Value,
}

impl AgentResult {
    pub fn no_match(summary: impl Into<String>) -> Self {
        Self {
            agent: "router".to_string(),
            status: AgentStatus::NoMatch,
            summary: summary.into(),
            data: json!({}),
        }
    }
}

/// Serializable registry entry for listings.
#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub handles: &'static [&'static str],
}

impl Agent {
    /// Every agent, in routing order.
    pub const ALL: [Agent; 4] = [Agent::Schedule, Agent::Email, Agent::Health, Agent::Finance];

    pub fn name(&self) -> &'static str {
        match self {
            Agent::Schedule => "schedule",
            Agent::Email => "email",
            Agent::Health => "health",
            Agent::Finance => "finance",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Agent::Schedule => "Handles calendar scheduling tasks.",
            Agent::Email => "Drafts and sends email messages.",
            Agent::Health => "Tracks health logs and reminders.",
            Agent::Finance => "Tracks expenses and budgets.",
        }
    }

    /// Lowercase keywords this agent claims.
    pub fn handles(&self) -> &'static [&'static str] {
        match self {
            Agent::Schedule => &["schedule", "calendar", "meeting"],
            Agent::Email => &["email", "mail", "inbox"],
            Agent::Health => &["health", "fitness", "sleep"],
            Agent::Finance => &["finance", "expense", "budget"],
        }
    }

    pub fn info(&self) -> AgentInfo {
        AgentInfo {
            name: self.name(),
            description: self.description(),
            handles: self.handles(),
        }
    }

    pub fn from_name(name: &str) -> Option<Agent> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    /// Produce this agent's canned response. Pure.
    pub fn run(&self, payload: &Map<String, Value>) -> AgentResult {
        let (key, default, label) = match self {
            Agent::Schedule => ("title", json!("Untitled"), "Scheduled"),
            Agent::Email => ("subject", json!("(no subject)"), "Email drafted"),
            Agent::Health => ("metric", json!("steps"), "Health log noted"),
            Agent::Finance => ("amount", json!(0), "Expense captured"),
        };
        let value = payload.get(key).cloned().unwrap_or(default);
        let data_key = match self {
            Agent::Schedule => "event",
            _ => key,
        };
        let summary = format!("{label}: {}", display_value(&value));
        let mut data = Map::new();
        data.insert(data_key.to_string(), value);
        AgentResult {
            agent: self.name().to_string(),
            status: AgentStatus::Ok,
            summary,
            data: Value::Object(data),
        }
    }
}

/// Strings render bare, anything else as JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn registry_order_and_names() {
        let names: Vec<_> = Agent::ALL.iter().map(Agent::name).collect();
        assert_eq!(names, vec!["schedule", "email", "health", "finance"]);
        assert_eq!(Agent::from_name("health"), Some(Agent::Health));
        assert_eq!(Agent::from_name("weather"), None);
    }

    #[test]
    fn schedule_agent_uses_title() {
        let result = Agent::Schedule.run(&payload(json!({"title": "Standup"})));
        assert_eq!(result.agent, "schedule");
        assert_eq!(result.status, AgentStatus::Ok);
        assert_eq!(result.summary, "Scheduled: Standup");
        assert_eq!(result.data, json!({"event": "Standup"}));
    }

    #[test]
    fn agents_fall_back_to_defaults() {
        let empty = Map::new();
        assert_eq!(Agent::Schedule.run(&empty).summary, "Scheduled: Untitled");
        assert_eq!(Agent::Email.run(&empty).summary, "Email drafted: (no subject)");
        assert_eq!(Agent::Health.run(&empty).summary, "Health log noted: steps");
        let finance = Agent::Finance.run(&empty);
        assert_eq!(finance.summary, "Expense captured: 0");
        assert_eq!(finance.data, json!({"amount": 0}));
    }

    #[test]
    fn non_string_payload_values_are_kept() {
        let result = Agent::Finance.run(&payload(json!({"amount": 12.5})));
        assert_eq!(result.summary, "Expense captured: 12.5");
        assert_eq!(result.data["amount"], 12.5);
    }

    #[test]
    fn no_match_shape() {
        let result = AgentResult::no_match("nothing");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["agent"], "router");
        assert_eq!(json["status"], "no_match");
        assert_eq!(json["data"], json!({}));
    }
}
