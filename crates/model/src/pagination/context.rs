use crate::pagination::continuation::ContinuationToken;
use serde::Serialize;
use std::fmt;

/// Where a feed query stands, derived from the two context flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeedState {
    /// No page has been fetched yet.
    NotStarted,

    /// The last page carried a continuation token.
    HasMore,

    /// The backend returned no continuation token. Terminal for the context.
    Exhausted,
}

impl fmt::Display for FeedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedState::NotStarted => write!(f, "not started"),
            FeedState::HasMore => write!(f, "has more"),
            FeedState::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// State of one CRUD or query operation.
///
/// A context is created fresh for every operation and owns the continuation
/// token of its query exclusively. Only [`QueryCommandContext::advance`] moves
/// it forward, which keeps `has_continuation` in lockstep with the token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryCommandContext {
    is_feed: bool,
    is_delete: bool,
    is_create_trigger: bool,
    has_continuation: bool,
    query_started: bool,
    continuation: Option<ContinuationToken>,
    query_text: Option<String>,
}

impl QueryCommandContext {
    /// Context for a plain (non-feed) command.
    pub fn command() -> Self {
        Self::default()
    }

    /// Context for a feed query started with `query_text`.
    pub fn feed(query_text: impl Into<String>) -> Self {
        QueryCommandContext {
            is_feed: true,
            query_text: Some(query_text.into()),
            ..Self::default()
        }
    }

    pub fn delete() -> Self {
        QueryCommandContext {
            is_delete: true,
            ..Self::default()
        }
    }

    pub fn create_trigger() -> Self {
        QueryCommandContext {
            is_create_trigger: true,
            ..Self::default()
        }
    }

    pub fn is_feed(&self) -> bool {
        self.is_feed
    }

    pub fn is_delete(&self) -> bool {
        self.is_delete
    }

    pub fn is_create_trigger(&self) -> bool {
        self.is_create_trigger
    }

    pub fn has_continuation(&self) -> bool {
        self.has_continuation
    }

    pub fn query_started(&self) -> bool {
        self.query_started
    }

    pub fn continuation(&self) -> Option<&ContinuationToken> {
        self.continuation.as_ref()
    }

    /// Query text the context was started with, if it is a feed context.
    pub fn query_text(&self) -> Option<&str> {
        self.query_text.as_deref()
    }

    /// The first fetch is always allowed; after that only while the backend
    /// keeps handing out continuation tokens.
    pub fn can_fetch_next(&self) -> bool {
        self.has_continuation || !self.query_started
    }

    pub fn state(&self) -> FeedState {
        match (self.query_started, self.has_continuation) {
            (false, _) => FeedState::NotStarted,
            (true, true) => FeedState::HasMore,
            (true, false) => FeedState::Exhausted,
        }
    }

    /// Records the outcome of a successful page fetch.
    ///
    /// `next` is the token returned with the page; `None` marks the feed as
    /// exhausted no matter how many items the page held.
    pub fn advance(&mut self, next: Option<ContinuationToken>) {
        self.has_continuation = next.is_some();
        self.continuation = next;
        self.query_started = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(raw: &str) -> Option<ContinuationToken> {
        ContinuationToken::new(raw)
    }

    #[test]
    fn fresh_feed_context_allows_first_fetch() {
        let ctx = QueryCommandContext::feed("select * from c");
        assert!(ctx.is_feed());
        assert!(!ctx.query_started());
        assert!(!ctx.has_continuation());
        assert!(ctx.can_fetch_next());
        assert_eq!(ctx.state(), FeedState::NotStarted);
        assert_eq!(ctx.query_text(), Some("select * from c"));
    }

    #[test]
    fn token_drives_has_continuation() {
        let mut ctx = QueryCommandContext::feed("q");

        ctx.advance(token("tok1"));
        assert!(ctx.has_continuation());
        assert_eq!(ctx.continuation().map(|t| t.as_str()), Some("tok1"));
        assert_eq!(ctx.state(), FeedState::HasMore);

        ctx.advance(token(""));
        assert!(!ctx.has_continuation());
        assert!(ctx.continuation().is_none());
        assert!(!ctx.can_fetch_next());
        assert_eq!(ctx.state(), FeedState::Exhausted);
    }

    #[test]
    fn query_started_never_reverts() {
        let mut ctx = QueryCommandContext::feed("q");
        ctx.advance(None);
        assert!(ctx.query_started());
        ctx.advance(token("again"));
        assert!(ctx.query_started());
    }

    #[test]
    fn command_flags() {
        assert!(QueryCommandContext::delete().is_delete());
        assert!(QueryCommandContext::create_trigger().is_create_trigger());
        assert!(!QueryCommandContext::command().is_feed());
    }
}
