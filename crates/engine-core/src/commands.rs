use crate::{
    error::ControllerError,
    perf::PerfStatus,
    render::{ResultView, status_line},
    sink::ResultSink,
};
use connectors::{
    error::FeedError,
    feed::{
        client::ResourceClient,
        response::{ResourceResponse, ResponseHeaders},
    },
};
use model::{
    options::request::RequestOptions,
    pagination::context::QueryCommandContext,
    resource::{kind::ResourceType, link::ResourceLink},
};
use serde::Serialize;
use serde_json::Value;
use std::{fmt, future::Future, sync::Arc};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CrudOperation {
    Create,
    Read,
    Replace,
    Delete,
    Execute,
}

impl CrudOperation {
    /// Command context for running this operation on a resource of `kind`.
    pub fn context_for(self, kind: ResourceType) -> QueryCommandContext {
        match (self, kind) {
            (CrudOperation::Delete, _) => QueryCommandContext::delete(),
            (CrudOperation::Create, ResourceType::Trigger) => QueryCommandContext::create_trigger(),
            _ => QueryCommandContext::command(),
        }
    }
}

impl fmt::Display for CrudOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            CrudOperation::Create => "Create",
            CrudOperation::Read => "Read",
            CrudOperation::Replace => "Replace",
            CrudOperation::Delete => "Delete",
            CrudOperation::Execute => "Execute",
        };
        f.write_str(verb)
    }
}

/// Result of a single-resource command.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub context: QueryCommandContext,
    pub response: ResourceResponse,
}

/// Per-item outcome of [`ResourceCommands::create_many`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    pub succeeded: usize,
    pub failed: usize,
    pub text: String,
}

/// Create / read / replace / delete of single resources, plus stored
/// procedure execution, rendered to a sink.
pub struct ResourceCommands {
    client: Arc<dyn ResourceClient>,
    sink: Arc<dyn ResultSink>,
    defaults: RequestOptions,
}

impl ResourceCommands {
    pub fn new(client: Arc<dyn ResourceClient>, sink: Arc<dyn ResultSink>) -> Self {
        ResourceCommands {
            client,
            sink,
            defaults: RequestOptions::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: RequestOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub async fn create(
        &self,
        feed_link: &ResourceLink,
        body: Value,
    ) -> Result<CommandOutcome, ControllerError> {
        let kind = feed_kind(feed_link)?;
        let options = self.options_for(kind);
        self.perform(
            CrudOperation::Create,
            kind,
            self.client.create(feed_link, body, &options),
        )
        .await
    }

    /// Parses `text` as JSON and creates it. Parse failures are reported like
    /// any other failure.
    pub async fn create_from_text(
        &self,
        feed_link: &ResourceLink,
        text: &str,
    ) -> Result<CommandOutcome, ControllerError> {
        let body = match serde_json::from_str::<Value>(text) {
            Ok(body) => body,
            Err(err) => {
                let err = ControllerError::from(err);
                self.report_failure(CrudOperation::Create, &err);
                return Err(err);
            }
        };
        self.create(feed_link, body).await
    }

    pub async fn read(&self, link: &ResourceLink) -> Result<CommandOutcome, ControllerError> {
        let kind = resource_kind(link)?;
        let options = self.options_for(kind);
        self.perform(CrudOperation::Read, kind, self.client.read(link, &options))
            .await
    }

    /// Replaces the resource at `link`. For collections, a configured offer
    /// type is applied to the collection's offer first.
    pub async fn replace(
        &self,
        link: &ResourceLink,
        body: Value,
    ) -> Result<CommandOutcome, ControllerError> {
        let kind = resource_kind(link)?;
        let options = self.options_for(kind);
        if kind == ResourceType::DocumentCollection
            && let Some(offer_type) = options.offer_type.as_deref()
        {
            self.replace_offer(link, offer_type).await?;
        }
        self.perform(
            CrudOperation::Replace,
            kind,
            self.client.replace(link, body, &options),
        )
        .await
    }

    pub async fn delete(&self, link: &ResourceLink) -> Result<CommandOutcome, ControllerError> {
        let kind = resource_kind(link)?;
        let options = self.options_for(kind);
        self.perform(CrudOperation::Delete, kind, self.client.delete(link, &options))
            .await
    }

    /// Moves the offer of `collection` to `offer_type`. Returns the replaced
    /// offer, or `None` when there was nothing to change.
    pub async fn replace_offer(
        &self,
        collection: &ResourceLink,
        offer_type: &str,
    ) -> Result<Option<ResourceResponse>, ControllerError> {
        let perf = PerfStatus::start("ReplaceOffer");
        let outcome = self.sync_offer(collection, offer_type).await;
        let report = perf.finish();

        match outcome {
            Ok(replaced) => {
                if replaced.is_some() {
                    info!(%collection, offer_type, took_ms = report.elapsed_ms(), "Offer replaced");
                }
                Ok(replaced)
            }
            Err(err) => {
                self.sink.set_status(&report.status_line());
                let err = ControllerError::from(err);
                self.report_failure(CrudOperation::Replace, &err);
                Err(err)
            }
        }
    }

    async fn sync_offer(
        &self,
        collection: &ResourceLink,
        offer_type: &str,
    ) -> Result<Option<ResourceResponse>, FeedError> {
        let Some(current) = self.client.read_offer_for(collection).await? else {
            warn!(%collection, "Collection has no offer, leaving it as is");
            return Ok(None);
        };
        if current.resource.get("offerType").and_then(Value::as_str) == Some(offer_type) {
            debug!(%collection, offer_type, "Offer type unchanged");
            return Ok(None);
        }

        let id = current
            .resource
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| FeedError::bad_request(format!("Offer of '{collection}' has no id")))?;
        let link = ResourceLink::offers().child(id);
        let mut body = current.resource.clone();
        body["offerType"] = Value::String(offer_type.to_string());

        let replaced = self
            .client
            .replace(&link, body, &RequestOptions::default())
            .await?;
        Ok(Some(replaced))
    }

    /// Runs the stored procedure at `link` and renders what it returned.
    pub async fn execute_stored_procedure(
        &self,
        link: &ResourceLink,
        params: Vec<Value>,
    ) -> Result<CommandOutcome, ControllerError> {
        let kind = resource_kind(link)?;
        if kind != ResourceType::StoredProcedure {
            return Err(ControllerError::NotAStoredProcedure(link.to_string()));
        }
        let options = self.options_for(kind);
        self.perform(
            CrudOperation::Execute,
            kind,
            self.client.execute_stored_procedure(link, params, &options),
        )
        .await
    }

    /// Like [`Self::execute_stored_procedure`], with one JSON parameter per
    /// non-empty line of `text`.
    pub async fn execute_stored_procedure_from_text(
        &self,
        link: &ResourceLink,
        text: &str,
    ) -> Result<CommandOutcome, ControllerError> {
        let params = match parse_procedure_params(text) {
            Ok(params) => params,
            Err(err) => {
                let err = ControllerError::from(err);
                self.report_failure(CrudOperation::Execute, &err);
                return Err(err);
            }
        };
        self.execute_stored_procedure(link, params).await
    }

    /// Creates every `(name, body)` pair in turn and renders a status report.
    /// Individual failures do not stop the batch.
    pub async fn create_many(
        &self,
        feed_link: &ResourceLink,
        items: Vec<(String, Value)>,
    ) -> Result<BulkReport, ControllerError> {
        let kind = feed_kind(feed_link)?;
        let options = self.options_for(kind);
        let perf = PerfStatus::start(format!("CreateMultiple{kind}"));

        let mut report = BulkReport {
            text: format!(
                "Create {} {} in collection\r\n",
                items.len(),
                kind.noun(true)
            ),
            ..BulkReport::default()
        };

        for (name, body) in items {
            match self.client.create(feed_link, body, &options).await {
                Ok(_) => {
                    report.succeeded += 1;
                    report.text.push_str(&format!("Succeed adding {name} \r\n"));
                }
                Err(err) => {
                    report.failed += 1;
                    debug!(item = %name, error = %err, "Bulk create item failed");
                    let line = match err.status_code() {
                        Some(code) => format!("Failed adding {name}, statusCode={code} \r\n"),
                        None => format!("Failed adding {name}, unknown exception \r\n"),
                    };
                    report.text.push_str(&line);
                }
            }
        }

        info!(
            feed = %feed_link,
            succeeded = report.succeeded,
            failed = report.failed,
            "Bulk create finished"
        );
        self.sink.set_status(&perf.finish().status_line());
        self.sink
            .render(&ResultView::text(report.text.clone(), &ResponseHeaders::new()));
        Ok(report)
    }

    fn options_for(&self, kind: ResourceType) -> RequestOptions {
        let mut options = self.defaults.clone();
        if kind != ResourceType::DocumentCollection {
            options.offer_type = None;
        }
        options
    }

    async fn perform(
        &self,
        operation: CrudOperation,
        kind: ResourceType,
        request: impl Future<Output = Result<ResourceResponse, FeedError>>,
    ) -> Result<CommandOutcome, ControllerError> {
        let context = operation.context_for(kind);
        let perf = PerfStatus::start(format!("{operation}{kind}"));
        let outcome = request.await;
        let report = perf.finish();

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                self.sink.set_status(&report.status_line());
                let err = ControllerError::from(err);
                self.report_failure(operation, &err);
                return Err(err);
            }
        };

        let view = match operation {
            CrudOperation::Delete => {
                ResultView::text(format!("Delete {kind} succeed!"), &response.headers)
            }
            CrudOperation::Execute => {
                ResultView::text(response.resource.to_string(), &response.headers)
            }
            _ => match ResultView::resource(&response.resource, &response.headers) {
                Ok(view) => view,
                Err(err) => {
                    let err = ControllerError::from(err);
                    self.report_failure(operation, &err);
                    return Err(err);
                }
            },
        };

        info!(%operation, %kind, took_ms = report.elapsed_ms(), "Command completed");
        self.sink
            .set_status(&status_line(&report.status_line(), &response.headers));
        self.sink.render(&view);

        Ok(CommandOutcome { context, response })
    }

    fn report_failure(&self, operation: CrudOperation, err: &ControllerError) {
        error!(%operation, error = %err, "Command failed");
        self.sink.render_error(&err.to_string());
    }
}

/// Stored procedure parameters, one JSON value per non-empty line.
pub fn parse_procedure_params(text: &str) -> Result<Vec<Value>, serde_json::Error> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(serde_json::from_str)
        .collect()
}

fn feed_kind(link: &ResourceLink) -> Result<ResourceType, ControllerError> {
    match link.kind() {
        Some(kind) if link.is_feed() => Ok(kind),
        _ => Err(ControllerError::NotAFeed(link.to_string())),
    }
}

fn resource_kind(link: &ResourceLink) -> Result<ResourceType, ControllerError> {
    match link.kind() {
        Some(kind) if !link.is_feed() => Ok(kind),
        _ => Err(ControllerError::NotAResource(link.to_string())),
    }
}
