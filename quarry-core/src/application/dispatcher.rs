// quarry-core/src/application/dispatcher.rs

use serde_json::{Value, json};
use std::time::Instant;
use tracing::{debug, error, instrument};

use crate::domain::capabilities::{Capabilities, DataSourceKind};
use crate::domain::request::ExecutionRequest;
use crate::error::QuarryError;
use crate::ports::backend::{Endpoint, QueryBackend};

/// Where a composed request goes and what it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchPlan {
    pub endpoint: Endpoint,
    pub body: Value,
}

pub struct Dispatcher;

impl Dispatcher {
    /// Picks the endpoint from (request, data-source kind, declared capabilities) only.
    pub fn plan(
        request: &ExecutionRequest,
        kind: DataSourceKind,
        caps: &Capabilities,
    ) -> DispatchPlan {
        match request {
            ExecutionRequest::Direct { raw_query } => DispatchPlan {
                endpoint: query_endpoint(kind),
                body: json!({ "query": raw_query }),
            },
            ExecutionRequest::Visual(q) if caps.supports_aggregation && q.join.is_none() => {
                DispatchPlan {
                    endpoint: Endpoint::Aggregation,
                    body: q.aggregation_body(),
                }
            }
            ExecutionRequest::Visual(q) => {
                let text = match kind {
                    DataSourceKind::Relational => q.to_sql(),
                    DataSourceKind::Document => q.to_document_command(),
                };
                DispatchPlan {
                    endpoint: query_endpoint(kind),
                    body: json!({ "query": text }),
                }
            }
            ExecutionRequest::Pipeline(cmd) => DispatchPlan {
                endpoint: Endpoint::DocumentQuery,
                body: json!({ "query": cmd.command_text() }),
            },
        }
    }

    /// Sends the plan in one round trip, with timing. No retry.
    #[instrument(skip(backend, plan), fields(endpoint = %plan.endpoint))]
    pub async fn dispatch(
        backend: &dyn QueryBackend,
        plan: &DispatchPlan,
    ) -> Result<Value, QuarryError> {
        let start = Instant::now();
        debug!(body = %plan.body, "⚡ Dispatching request");

        let result = backend.send(plan.endpoint, &plan.body).await;
        let duration = start.elapsed();

        match &result {
            Ok(_) => debug!("✅ Request finished in {:.2?}", duration),
            Err(e) => error!("❌ Request failed after {:.2?}: {}", duration, e),
        }
        result
    }
}

fn query_endpoint(kind: DataSourceKind) -> Endpoint {
    match kind {
        DataSourceKind::Relational => Endpoint::RelationalQuery,
        DataSourceKind::Document => Endpoint::DocumentQuery,
    }
}
