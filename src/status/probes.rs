//! Connectivity probes. Every probe reports; none of them fail.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::AppConfig;
use crate::store::DocumentBackend;

const GRAPH_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of a single probe.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeStatus {
    pub connected: bool,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeStatus {
    fn up(backend: &str, info: Option<Value>) -> Self {
        Self {
            connected: true,
            backend: backend.to_string(),
            info,
            error: None,
        }
    }

    fn down(backend: &str, error: impl ToString) -> Self {
        Self {
            connected: false,
            backend: backend.to_string(),
            info: None,
            error: Some(error.to_string()),
        }
    }
}

/// Ping the primary document backend within `timeout`.
pub async fn ping_primary(
    primary: Option<&Arc<dyn DocumentBackend>>,
    timeout: Duration,
) -> ProbeStatus {
    let Some(backend) = primary else {
        return ProbeStatus::down("none", "No primary database configured");
    };
    match tokio::time::timeout(timeout, backend.ping()).await {
        Ok(Ok(())) => ProbeStatus::up(backend.name(), None),
        Ok(Err(e)) => ProbeStatus::down(backend.name(), e),
        Err(_) => ProbeStatus::down(backend.name(), format!("ping timed out after {timeout:?}")),
    }
}

/// Graph store probe over the Neo4j HTTP transactional endpoint.
pub struct GraphProbe {
    url: String,
    user: String,
    password: SecretString,
    client: reqwest::Client,
}

impl GraphProbe {
    pub fn new(base_url: &str, user: &str, password: SecretString) -> Self {
        Self {
            url: format!("{}/db/neo4j/tx/commit", base_url.trim_end_matches('/')),
            user: user.to_string(),
            password,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.neo4j_http_url, &config.neo4j_user, config.neo4j_password.clone())
    }

    /// Run `RETURN 1 AS ok` and report the returned row.
    pub async fn ping(&self) -> ProbeStatus {
        let body = json!({ "statements": [{ "statement": "RETURN 1 AS ok" }] });
        let resp = match self
            .client
            .post(&self.url)
            .basic_auth(&self.user, Some(self.password.expose_secret()))
            .timeout(GRAPH_TIMEOUT)
            .json(&body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                debug!(error = %e, "Graph probe unreachable");
                return ProbeStatus::down("neo4j", e);
            }
        };

        if !resp.status().is_success() {
            return ProbeStatus::down("neo4j", format!("HTTP {}", resp.status().as_u16()));
        }
        match resp.json::<Value>().await {
            Ok(payload) => parse_graph_reply(&payload),
            Err(e) => ProbeStatus::down("neo4j", e),
        }
    }
}

fn parse_graph_reply(payload: &Value) -> ProbeStatus {
    if let Some(first) = payload["errors"].as_array().and_then(|errs| errs.first()) {
        let message = first["message"].as_str().unwrap_or("query failed");
        return ProbeStatus::down("neo4j", message);
    }
    let ok = payload["results"][0]["data"][0]["row"][0].clone();
    ProbeStatus::up("neo4j", Some(json!({ "ok": ok })))
}

/// Credential check for a third-party integration.
#[derive(Debug, Clone, Serialize)]
pub struct IntegrationStatus {
    pub ok: bool,
    pub configured: bool,
    pub message: String,
}

impl IntegrationStatus {
    pub fn check(name: &str, configured: bool) -> Self {
        let message = if configured {
            format!("{name} configured")
        } else {
            format!("{name} credentials not set")
        };
        Self {
            ok: configured,
            configured,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::UnavailableBackend;
    use crate::store::resilient::test_support::{HangingBackend, SwitchableBackend};

    #[tokio::test]
    async fn primary_probe_states() {
        let timeout = Duration::from_millis(50);
        let none = ping_primary(None, timeout).await;
        assert!(!none.connected);
        assert_eq!(none.backend, "none");

        let up: Arc<dyn DocumentBackend> = SwitchableBackend::new().await;
        assert!(ping_primary(Some(&up), timeout).await.connected);

        let down: Arc<dyn DocumentBackend> = Arc::new(UnavailableBackend::new("refused"));
        let status = ping_primary(Some(&down), timeout).await;
        assert!(!status.connected);
        assert!(status.error.unwrap().contains("refused"));

        let hanging: Arc<dyn DocumentBackend> = Arc::new(HangingBackend);
        let status = ping_primary(Some(&hanging), timeout).await;
        assert!(status.error.unwrap().contains("timed out"));
    }

    #[test]
    fn graph_reply_parsing() {
        let ok = parse_graph_reply(&json!({
            "results": [{"columns": ["ok"], "data": [{"row": [1], "meta": [null]}]}],
            "errors": []
        }));
        assert!(ok.connected);
        assert_eq!(ok.info.unwrap(), json!({"ok": 1}));

        let err = parse_graph_reply(&json!({
            "results": [],
            "errors": [{"code": "Neo.ClientError.Security.Unauthorized", "message": "bad credentials"}]
        }));
        assert!(!err.connected);
        assert_eq!(err.error.unwrap(), "bad credentials");
    }

    #[tokio::test]
    async fn unreachable_graph_store_reports_down() {
        let probe = GraphProbe::new("http://127.0.0.1:9", "neo4j", SecretString::from("x"));
        assert!(!probe.ping().await.connected);
    }

    #[test]
    fn integration_messages() {
        let status = IntegrationStatus::check("Nylas", false);
        assert!(!status.ok);
        assert_eq!(status.message, "Nylas credentials not set");
        assert_eq!(IntegrationStatus::check("Plaid", true).message, "Plaid configured");
    }
}
