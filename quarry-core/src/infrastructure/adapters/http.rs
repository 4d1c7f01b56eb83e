// quarry-core/src/infrastructure/adapters/http.rs

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::domain::capabilities::Capabilities;
use crate::domain::target::TargetEntry;
use crate::domain::wizard::NormalizationOutcome;
use crate::error::QuarryError;
use crate::infrastructure::config::WorkspaceConfig;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::backend::{Endpoint, QueryBackend};

/// Workspace API reached over HTTP (`<base_url>/api/db/<database>/<endpoint>`).
///
/// No retries: a failed call is reported once.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    database: String,
}

impl HttpBackend {
    pub fn new(config: &WorkspaceConfig) -> Result<Self, InfrastructureError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            database: config.database.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/db/{}/{}", self.base_url, self.database, path)
    }

    async fn get(&self, path: &str) -> Result<Map<String, Value>, InfrastructureError> {
        let resp = self.client.get(self.url(path)).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        read_envelope(status, &text)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Map<String, Value>, InfrastructureError> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        read_envelope(status, &text)
    }
}

/// Unwraps the `{success, result?, error?}` envelope every endpoint answers with.
pub(crate) fn read_envelope(
    status: StatusCode,
    text: &str,
) -> Result<Map<String, Value>, InfrastructureError> {
    let parsed: Result<Value, _> = serde_json::from_str(text);

    let body = match parsed {
        Ok(Value::Object(obj)) => obj,
        Ok(_) | Err(_) if !status.is_success() => {
            return Err(InfrastructureError::Remote {
                detail: format!("HTTP {}", status),
            });
        }
        Ok(other) => {
            return Err(InfrastructureError::Remote {
                detail: format!("unexpected response: {}", other),
            });
        }
        Err(e) => return Err(InfrastructureError::Json(e)),
    };

    let success = body.get("success").and_then(Value::as_bool).unwrap_or(false);
    if status.is_success() && success {
        return Ok(body);
    }

    let detail = body
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status));
    Err(InfrastructureError::Remote { detail })
}

#[async_trait]
impl QueryBackend for HttpBackend {
    #[instrument(skip(self, body), fields(database = %self.database))]
    async fn send(&self, endpoint: Endpoint, body: &Value) -> Result<Value, QuarryError> {
        let mut envelope = self.post(endpoint.path(), body).await?;
        debug!(%endpoint, "Response received");
        Ok(envelope.remove("result").unwrap_or(Value::Null))
    }

    #[instrument(skip(self), fields(database = %self.database))]
    async fn fetch_capabilities(&self) -> Result<Capabilities, QuarryError> {
        let mut envelope = self.get("capabilities").await?;
        let caps = envelope.remove("capabilities").unwrap_or_else(|| json!({}));
        Ok(serde_json::from_value(caps).map_err(InfrastructureError::from)?)
    }

    #[instrument(skip(self), fields(database = %self.database))]
    async fn list_targets(&self) -> Result<Vec<TargetEntry>, QuarryError> {
        let mut envelope = self.get("tables").await?;
        let entries = envelope
            .remove("tables")
            .or_else(|| envelope.remove("collections"))
            .unwrap_or_else(|| json!([]));
        Ok(serde_json::from_value(entries).map_err(InfrastructureError::from)?)
    }

    #[instrument(skip(self), fields(database = %self.database))]
    async fn analyze_for_normalization(&self) -> Result<Value, QuarryError> {
        let mut envelope = self.get("analyze_for_normalization").await?;
        Ok(envelope.remove("analysis").unwrap_or(Value::Null))
    }

    #[instrument(skip(self, body), fields(database = %self.database))]
    async fn normalize(&self, body: &Value) -> Result<NormalizationOutcome, QuarryError> {
        let envelope = self.post("normalize", body).await?;
        Ok(serde_json::from_value(Value::Object(envelope)).map_err(InfrastructureError::from)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capabilities::DataSourceKind;
    use anyhow::{Result, bail};

    #[test]
    fn test_successful_envelope() -> Result<()> {
        let body = read_envelope(StatusCode::OK, r#"{"success": true, "result": [1]}"#)?;
        assert_eq!(body.get("result"), Some(&json!([1])));
        Ok(())
    }

    #[test]
    fn test_server_error_detail_is_kept() -> Result<()> {
        match read_envelope(
            StatusCode::BAD_REQUEST,
            r#"{"success": false, "error": "syntax error near FROM"}"#,
        ) {
            Err(InfrastructureError::Remote { detail }) => {
                assert_eq!(detail, "syntax error near FROM");
                Ok(())
            }
            other => bail!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unsuccessful_envelope_with_ok_status() {
        let err = read_envelope(StatusCode::OK, r#"{"success": false, "error": "no such table"}"#);
        assert!(matches!(err, Err(InfrastructureError::Remote { detail }) if detail == "no such table"));
    }

    #[test]
    fn test_non_json_failure_falls_back_to_status() {
        let err = read_envelope(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(
            err,
            Err(InfrastructureError::Remote { detail }) if detail == "HTTP 502 Bad Gateway"
        ));
    }

    #[test]
    fn test_non_json_success_is_malformed() {
        let err = read_envelope(StatusCode::OK, "plain text");
        assert!(matches!(err, Err(InfrastructureError::Json(_))));
    }

    #[test]
    fn test_url_layout() -> Result<()> {
        let backend = HttpBackend::new(&WorkspaceConfig {
            base_url: "http://localhost:5000/".into(),
            database: "shop".into(),
            kind: DataSourceKind::Relational,
            timeout_secs: Some(30),
            history_file: "query_history.json".into(),
        })?;
        assert_eq!(
            backend.url(Endpoint::DocumentQuery.path()),
            "http://localhost:5000/api/db/shop/nosql_query"
        );
        Ok(())
    }
}
