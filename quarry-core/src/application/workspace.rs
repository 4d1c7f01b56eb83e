// quarry-core/src/application/workspace.rs

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::application::dispatcher::{DispatchPlan, Dispatcher};
use crate::domain::capabilities::{AggregationMode, Capabilities, DataSourceKind};
use crate::domain::composer::CommandComposer;
use crate::domain::error::DomainError;
use crate::domain::history::QueryHistory;
use crate::domain::pipeline::{ExecutionScope, PipelineList};
use crate::domain::request::ExecutionRequest;
use crate::domain::result::{QueryResult, ResultClassifier};
use crate::domain::visual::VisualBuilder;
use crate::error::QuarryError;
use crate::ports::backend::QueryBackend;

/// Token handed to every execution. Only the most recently issued one may
/// publish its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// A newer execution was issued (or the workspace was reset) meanwhile; the
    /// response was dropped.
    Superseded,
}

/// Composed and routed, not yet sent. Owns everything it needs, so several can
/// be in flight while the workspace stays mutable.
#[derive(Debug)]
pub struct PendingExecution {
    generation: Generation,
    request: ExecutionRequest,
    plan: DispatchPlan,
    kind: DataSourceKind,
}

impl PendingExecution {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn request(&self) -> &ExecutionRequest {
        &self.request
    }

    pub fn plan(&self) -> &DispatchPlan {
        &self.plan
    }

    pub async fn run(self, backend: &dyn QueryBackend) -> CompletedExecution {
        let response = Dispatcher::dispatch(backend, &self.plan).await;
        CompletedExecution {
            generation: self.generation,
            request: self.request,
            kind: self.kind,
            response,
        }
    }
}

#[derive(Debug)]
pub struct CompletedExecution {
    generation: Generation,
    request: ExecutionRequest,
    kind: DataSourceKind,
    response: Result<Value, QuarryError>,
}

/// One aggregation workspace: stage list, visual form, injected capabilities and
/// the result of the latest execution.
pub struct Workspace {
    kind: DataSourceKind,
    capabilities: Capabilities,
    mode: AggregationMode,
    pub stages: PipelineList,
    pub visual: VisualBuilder,
    pipeline_collection: String,
    history: QueryHistory,
    last_request: Option<ExecutionRequest>,
    result: Option<QueryResult>,
    message: Option<String>,
    error: Option<String>,
    issued: u64,
}

impl Workspace {
    pub fn new(kind: DataSourceKind, capabilities: Capabilities) -> Self {
        Self {
            kind,
            capabilities,
            mode: AggregationMode::resolve(AggregationMode::default(), &capabilities),
            stages: PipelineList::new(),
            visual: VisualBuilder::new(),
            pipeline_collection: String::new(),
            history: QueryHistory::new(),
            last_request: None,
            result: None,
            message: None,
            error: None,
            issued: 0,
        }
    }

    pub fn kind(&self) -> DataSourceKind {
        self.kind
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn mode(&self) -> AggregationMode {
        self.mode
    }

    /// Switches sub-mode; an unavailable mode falls back per capabilities.
    pub fn set_mode(&mut self, requested: AggregationMode) -> AggregationMode {
        self.mode = if requested.is_available(&self.capabilities) {
            requested
        } else {
            AggregationMode::resolve(requested, &self.capabilities)
        };
        self.mode
    }

    pub fn set_pipeline_collection(&mut self, collection: impl Into<String>) {
        self.pipeline_collection = collection.into();
    }

    pub fn pipeline_collection(&self) -> &str {
        &self.pipeline_collection
    }

    pub fn history(&self) -> &QueryHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut QueryHistory {
        &mut self.history
    }

    pub fn result(&self) -> Option<&QueryResult> {
        self.result.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_request(&self) -> Option<&ExecutionRequest> {
        self.last_request.as_ref()
    }

    // --- COMPOSITION (local, nothing leaves the process) ---

    pub fn prepare_direct(&mut self, raw_query: &str) -> Result<PendingExecution, QuarryError> {
        let request = CommandComposer::direct(raw_query)?;
        Ok(self.issue(request))
    }

    pub fn prepare_visual(&mut self) -> Result<PendingExecution, QuarryError> {
        let request = CommandComposer::visual(&self.visual, self.kind)?;
        Ok(self.issue(request))
    }

    pub fn prepare_pipeline(
        &mut self,
        scope: ExecutionScope,
    ) -> Result<PendingExecution, QuarryError> {
        if !self.capabilities.supports_aggregation_pipeline {
            return Err(DomainError::UnsupportedMode.into());
        }
        let request = CommandComposer::pipeline(&self.stages, scope, &self.pipeline_collection)?;
        Ok(self.issue(request))
    }

    fn issue(&mut self, request: ExecutionRequest) -> PendingExecution {
        self.issued += 1;
        let plan = Dispatcher::plan(&request, self.kind, &self.capabilities);
        debug!(
            generation = self.issued,
            kind = request.kind_name(),
            endpoint = %plan.endpoint,
            "Execution issued"
        );
        PendingExecution {
            generation: Generation(self.issued),
            request,
            plan,
            kind: self.kind,
        }
    }

    // --- COMPLETION ---

    /// Publishes a finished execution, unless a newer one was issued since.
    ///
    /// Transport and remote failures clear the result and leave a single
    /// user-facing message.
    pub fn complete(&mut self, done: CompletedExecution) -> Result<Outcome, QuarryError> {
        if done.generation != Generation(self.issued) {
            warn!(
                generation = done.generation.0,
                latest = self.issued,
                "Dropping response of a superseded execution"
            );
            return Ok(Outcome::Superseded);
        }

        match done.response {
            Ok(payload) => {
                let classified = ResultClassifier::classify(payload, done.kind);
                let (result, message) = match &done.request {
                    ExecutionRequest::Pipeline(cmd) => (
                        QueryResult::pipeline(cmd.label(), classified),
                        cmd.success_message(),
                    ),
                    ExecutionRequest::Direct { raw_query } => {
                        self.history.record(raw_query);
                        (classified, "Query executed successfully".to_string())
                    }
                    ExecutionRequest::Visual(_) => {
                        (classified, "Aggregation executed successfully".to_string())
                    }
                };
                info!(shape = result.shape_name(), "{}", message);

                self.result = Some(result);
                self.message = Some(message);
                self.error = None;
                self.last_request = Some(done.request);
                Ok(Outcome::Applied)
            }
            Err(e) => {
                self.result = None;
                self.message = None;
                self.error = Some(e.user_message(failure_fallback(&done.request)));
                Err(e)
            }
        }
    }

    // --- ONE-SHOT HELPERS (prepare + single round trip + complete) ---

    pub async fn execute_direct(
        &mut self,
        backend: &dyn QueryBackend,
        raw_query: &str,
    ) -> Result<Outcome, QuarryError> {
        let pending = self.prepare_direct(raw_query)?;
        let done = pending.run(backend).await;
        self.complete(done)
    }

    pub async fn execute_visual(
        &mut self,
        backend: &dyn QueryBackend,
    ) -> Result<Outcome, QuarryError> {
        let pending = self.prepare_visual()?;
        let done = pending.run(backend).await;
        self.complete(done)
    }

    pub async fn execute_pipeline(
        &mut self,
        backend: &dyn QueryBackend,
        scope: ExecutionScope,
    ) -> Result<Outcome, QuarryError> {
        let pending = self.prepare_pipeline(scope)?;
        let done = pending.run(backend).await;
        self.complete(done)
    }

    /// Drops the current result and invalidates every execution still in flight.
    pub fn reset(&mut self) {
        self.issued += 1;
        self.result = None;
        self.message = None;
        self.error = None;
    }
}

fn failure_fallback(request: &ExecutionRequest) -> &'static str {
    match request {
        ExecutionRequest::Direct { .. } => "Failed to execute query",
        ExecutionRequest::Visual(_) => "Failed to execute aggregation",
        ExecutionRequest::Pipeline(_) => "Pipeline execution failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::RecordingBackend;
    use crate::domain::pipeline::StageField;
    use crate::domain::result::StageOutcome;
    use crate::ports::backend::Endpoint;
    use anyhow::{Result, bail};
    use serde_json::json;

    fn pipeline_caps() -> Capabilities {
        Capabilities {
            supports_aggregation_pipeline: true,
            ..Default::default()
        }
    }

    fn document_workspace() -> Workspace {
        Workspace::new(DataSourceKind::Document, pipeline_caps())
    }

    fn set_queries(ws: &mut Workspace, queries: &[&str]) {
        let first = ws.stages.ids()[0];
        ws.stages.update_stage(first, StageField::Query(queries[0].to_string()));
        for q in &queries[1..] {
            let id = ws.stages.add_stage();
            ws.stages.update_stage(id, StageField::Query(q.to_string()));
        }
    }

    #[tokio::test]
    async fn test_selected_scope_with_nothing_selected_sends_nothing() {
        let backend = RecordingBackend::new();
        let mut ws = document_workspace();
        set_queries(&mut ws, &[r#"{"$match": {}}"#]);
        let first = ws.stages.ids()[0];
        ws.stages.update_stage(first, StageField::Selected(false));
        ws.set_pipeline_collection("products");

        let err = ws.execute_pipeline(&backend, ExecutionScope::Selected).await;
        assert!(matches!(err, Err(QuarryError::Domain(DomainError::EmptyScope))));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_blank_third_stage_blocks_dispatch() {
        let backend = RecordingBackend::new();
        let mut ws = document_workspace();
        set_queries(
            &mut ws,
            &[
                r#"{"$match":{"status":"active"}}"#,
                r#"{"$group":{"_id":"$category","count":{"$sum":1}}}"#,
                "",
            ],
        );
        ws.set_pipeline_collection("products");

        match ws.execute_pipeline(&backend, ExecutionScope::All).await {
            Err(e) => assert_eq!(e.to_string(), "Empty stages found: Stage 3"),
            Ok(o) => panic!("expected failure, got {:?}", o),
        }
        assert!(backend.calls().is_empty());
        assert!(ws.result().is_none());
    }

    #[tokio::test]
    async fn test_pipeline_is_one_round_trip() -> Result<()> {
        let backend = RecordingBackend::new().reply(json!([{"_id": "books", "count": 4}]));
        let mut ws = document_workspace();
        set_queries(
            &mut ws,
            &[
                r#"{"$match":{"status":"active"}}"#,
                r#"{"$group":{"_id":"$category","count":{"$sum":1}}}"#,
                r#"{"$sort":{"count":-1}}"#,
            ],
        );
        ws.set_pipeline_collection("products");

        assert_eq!(ws.execute_pipeline(&backend, ExecutionScope::All).await?, Outcome::Applied);

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Endpoint::DocumentQuery);
        let text = calls[0].1["query"].as_str().unwrap_or_default();
        assert!(text.starts_with("db.products.aggregate([{\"$match\""));

        let Some(QueryResult::StageResultSet(outcomes)) = ws.result() else {
            bail!("expected stage results, got {:?}", ws.result());
        };
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].stage_name(), "Pipeline (3 stages on products)");
        assert!(matches!(
            &outcomes[0],
            StageOutcome::Completed { result, .. } if result.shape_name() == "document_set"
        ));
        assert_eq!(ws.message(), Some("Executed 3 pipeline stage(s) on products"));
        Ok(())
    }

    #[tokio::test]
    async fn test_pipeline_requires_declared_support() {
        let backend = RecordingBackend::new();
        let mut ws = Workspace::new(DataSourceKind::Document, Capabilities::default());
        set_queries(&mut ws, &[r#"{"$limit": 1}"#]);
        ws.set_pipeline_collection("products");

        let err = ws.execute_pipeline(&backend, ExecutionScope::All).await;
        assert!(matches!(err, Err(QuarryError::Domain(DomainError::UnsupportedMode))));
        assert!(backend.calls().is_empty());
        assert_eq!(ws.mode(), AggregationMode::Visual);
    }

    #[tokio::test]
    async fn test_direct_query_classifies_and_records_history() -> Result<()> {
        let backend = RecordingBackend::new().reply(json!([{"id": 1, "name": "a"}]));
        let mut ws = Workspace::new(DataSourceKind::Relational, Capabilities::default());

        ws.execute_direct(&backend, "SELECT id, name FROM users").await?;
        assert_eq!(backend.calls()[0].0, Endpoint::RelationalQuery);
        assert_eq!(ws.result().map(QueryResult::shape_name), Some("tabular_rows"));
        assert_eq!(ws.message(), Some("Query executed successfully"));
        assert_eq!(ws.history().entries().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_visual_orders_request_on_aggregation_endpoint() -> Result<()> {
        let backend = RecordingBackend::new().reply(json!({"result_type": "table", "result": []}));
        let caps = Capabilities {
            supports_aggregation: true,
            ..Default::default()
        };
        let mut ws = Workspace::new(DataSourceKind::Relational, caps);
        ws.visual.table = "orders".into();
        ws.visual
            .set_select_fields(vec!["customer_id".into(), "SUM(total)".into()]);
        ws.visual.group_by = "customer_id".into();

        ws.execute_visual(&backend).await?;
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Endpoint::Aggregation);
        assert_eq!(
            calls[0].1,
            json!({
                "table": "orders",
                "select_fields": ["customer_id", "SUM(total)"],
                "group_by": "customer_id",
                "order_direction": "ASC"
            })
        );
        assert_eq!(ws.result(), Some(&QueryResult::Empty));
        Ok(())
    }

    #[tokio::test]
    async fn test_remote_failure_is_surfaced_once() {
        let backend = RecordingBackend::new().fail("no such table: userz");
        let mut ws = Workspace::new(DataSourceKind::Relational, Capabilities::default());

        let err = ws.execute_direct(&backend, "SELECT * FROM userz").await;
        assert!(err.is_err());
        assert_eq!(backend.calls().len(), 1);
        assert_eq!(ws.error(), Some("Failed to execute query: no such table: userz"));
        assert!(ws.result().is_none());
    }

    #[tokio::test]
    async fn test_composition_failure_keeps_previous_result() -> Result<()> {
        let backend = RecordingBackend::new().reply(json!({"rows_affected": 2}));
        let mut ws = Workspace::new(DataSourceKind::Relational, Capabilities::default());
        ws.execute_direct(&backend, "DELETE FROM t WHERE x = 1").await?;
        let before = ws.result().cloned();

        assert!(ws.execute_direct(&backend, "   ").await.is_err());
        assert_eq!(ws.result().cloned(), before);
        assert!(ws.last_request().is_some());
        assert_eq!(backend.calls().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_latest_issued_execution_wins() -> Result<()> {
        let backend = RecordingBackend::new()
            .reply(json!([{"first": true}]))
            .reply(json!([{"second": true}]));
        let mut ws = Workspace::new(DataSourceKind::Relational, Capabilities::default());

        let older = ws.prepare_direct("SELECT 1")?;
        let newer = ws.prepare_direct("SELECT 2")?;
        assert!(older.generation() < newer.generation());

        let older_done = older.run(&backend).await;
        let newer_done = newer.run(&backend).await;

        // Arrival order does not matter: the older response is dropped either way.
        assert_eq!(ws.complete(newer_done)?, Outcome::Applied);
        assert_eq!(ws.complete(older_done)?, Outcome::Superseded);

        let Some(QueryResult::TabularRows(rows)) = ws.result() else {
            bail!("expected rows");
        };
        assert_eq!(rows.columns(), vec!["second"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_discards_pending_execution() -> Result<()> {
        let backend = RecordingBackend::new().reply(json!([{"id": 1}]));
        let mut ws = Workspace::new(DataSourceKind::Relational, Capabilities::default());

        let pending = ws.prepare_direct("SELECT 1")?;
        ws.reset();
        let done = pending.run(&backend).await;
        assert_eq!(ws.complete(done)?, Outcome::Superseded);
        assert!(ws.result().is_none());
        Ok(())
    }

    #[test]
    fn test_mode_switching_respects_capabilities() {
        let mut ws = Workspace::new(DataSourceKind::Document, Capabilities::default());
        assert_eq!(ws.set_mode(AggregationMode::Pipeline), AggregationMode::Visual);
        assert_eq!(ws.set_mode(AggregationMode::Direct), AggregationMode::Direct);

        let mut ws = document_workspace();
        assert_eq!(ws.mode(), AggregationMode::Pipeline);
        assert_eq!(ws.set_mode(AggregationMode::Visual), AggregationMode::Visual);
    }
}
