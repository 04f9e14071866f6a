use crate::{
    error::ControllerError,
    perf::PerfStatus,
    render::{ResultFormat, ResultView, status_line},
    sink::ResultSink,
};
use connectors::feed::client::FeedClient;
use model::{
    options::feed::FeedOptions,
    pagination::{
        context::QueryCommandContext, continuation::ContinuationToken, page::PageResult,
    },
    resource::{kind::ResourceType, link::ResourceLink},
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Drives "fetch next page" for one feed.
///
/// The controller holds no per-query state of its own: every query lives in
/// the [`QueryCommandContext`] handed out by [`start_query`], and fetching
/// borrows that context mutably, so a context never has two fetches in
/// flight.
///
/// [`start_query`]: PaginationController::start_query
pub struct PaginationController {
    client: Arc<dyn FeedClient>,
    sink: Arc<dyn ResultSink>,
    feed_link: ResourceLink,
    item_kind: ResourceType,
    defaults: FeedOptions,
    format: ResultFormat,
}

impl PaginationController {
    pub fn new(
        client: Arc<dyn FeedClient>,
        sink: Arc<dyn ResultSink>,
        feed_link: ResourceLink,
    ) -> Result<Self, ControllerError> {
        let item_kind = match feed_link.kind() {
            Some(kind) if feed_link.is_feed() => kind,
            _ => return Err(ControllerError::NotAFeed(feed_link.to_string())),
        };

        Ok(PaginationController {
            client,
            sink,
            feed_link,
            item_kind,
            defaults: FeedOptions::default(),
            format: ResultFormat::default(),
        })
    }

    /// Options merged into every request. Any continuation set here is ignored.
    pub fn with_defaults(mut self, defaults: FeedOptions) -> Self {
        self.defaults = FeedOptions {
            request_continuation: None,
            ..defaults
        };
        self
    }

    pub fn with_format(mut self, format: ResultFormat) -> Self {
        self.format = format;
        self
    }

    pub fn feed_link(&self) -> &ResourceLink {
        &self.feed_link
    }

    pub fn item_kind(&self) -> ResourceType {
        self.item_kind
    }

    /// Starts a new query. The returned context carries no continuation token,
    /// so the next fetch reads the feed from the beginning.
    pub fn start_query(&self, query_text: &str) -> QueryCommandContext {
        info!(feed = %self.feed_link, query = query_text, "Starting query");
        self.sink.set_next_page_enabled(true);
        QueryCommandContext::feed(query_text)
    }

    pub fn can_fetch_next(&self, ctx: &QueryCommandContext) -> bool {
        ctx.can_fetch_next()
    }

    /// Fetches the next page of `query_text` and advances `ctx`.
    ///
    /// `page_size` overrides the configured max item count for this request.
    /// On failure the context is left untouched and the error is reported to
    /// the sink as well as returned.
    pub async fn fetch_next_page(
        &self,
        query_text: &str,
        ctx: &mut QueryCommandContext,
        page_size: Option<i32>,
    ) -> Result<PageResult, ControllerError> {
        self.fetch(query_text, ctx, page_size, None).await
    }

    /// Same as [`fetch_next_page`](Self::fetch_next_page), abandoning the
    /// request with [`ControllerError::Cancelled`] once `cancel` fires.
    pub async fn fetch_next_page_with_cancel(
        &self,
        query_text: &str,
        ctx: &mut QueryCommandContext,
        page_size: Option<i32>,
        cancel: &CancellationToken,
    ) -> Result<PageResult, ControllerError> {
        self.fetch(query_text, ctx, page_size, Some(cancel)).await
    }

    async fn fetch(
        &self,
        query_text: &str,
        ctx: &mut QueryCommandContext,
        page_size: Option<i32>,
        cancel: Option<&CancellationToken>,
    ) -> Result<PageResult, ControllerError> {
        if !ctx.can_fetch_next() {
            let err = ControllerError::FeedExhausted;
            self.report_failure(&err, ctx);
            return Err(err);
        }

        if let Some(started_with) = ctx.query_text()
            && started_with != query_text
        {
            warn!(
                started_with,
                query = query_text,
                "Query text changed mid-feed, resuming with the stored continuation"
            );
        }

        let options = self.request_options(ctx, page_size);
        debug!(
            feed = %self.feed_link,
            max_item_count = ?options.max_item_count,
            continuation = ?options.request_continuation,
            "Requesting next page"
        );

        self.sink.set_next_page_enabled(false);
        let perf = PerfStatus::start(format!("Query{}", self.item_kind));
        let request = self
            .client
            .execute_query(&self.feed_link, query_text, &options);

        let outcome = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(ControllerError::Cancelled),
                response = request => response.map_err(ControllerError::from),
            },
            None => request.await.map_err(ControllerError::from),
        };
        let report = perf.finish();

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                self.sink.set_status(&report.status_line());
                self.report_failure(&err, ctx);
                return Err(err);
            }
        };

        let next = ContinuationToken::from_response(response.continuation);
        let page = PageResult::new(
            response.items,
            next.clone(),
            response.headers,
            report.elapsed_ms(),
        );

        let view = match ResultView::page(&page, self.item_kind, self.format) {
            Ok(view) => view,
            Err(err) => {
                let err = ControllerError::from(err);
                self.report_failure(&err, ctx);
                return Err(err);
            }
        };

        ctx.advance(next);

        info!(
            feed = %self.feed_link,
            items = page.item_count,
            took_ms = page.took_ms,
            state = %ctx.state(),
            "Fetched page"
        );

        self.sink
            .set_status(&status_line(&report.status_line(), &page.response_metadata));
        self.sink.render(&view);
        self.sink.set_next_page_enabled(ctx.can_fetch_next());

        Ok(page)
    }

    fn request_options(&self, ctx: &QueryCommandContext, page_size: Option<i32>) -> FeedOptions {
        let mut options = self.defaults.clone();
        if page_size.is_some() {
            options.max_item_count = page_size;
        }
        options.request_continuation = ctx.continuation().cloned();
        options
    }

    fn report_failure(&self, err: &ControllerError, ctx: &QueryCommandContext) {
        error!(feed = %self.feed_link, error = %err, "Fetching page failed");
        self.sink.render_error(&err.to_string());
        self.sink.set_next_page_enabled(ctx.can_fetch_next());
    }
}
