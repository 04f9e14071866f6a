use crate::render::ResultView;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{error, info};

/// Display surface the engine reports results to.
///
/// Injected into controllers and commands instead of reaching for a global
/// UI handle, so the same engine drives a terminal, a GUI or a test harness.
pub trait ResultSink: Send + Sync {
    fn render(&self, view: &ResultView);

    fn render_error(&self, message: &str);

    fn set_status(&self, status: &str);

    /// Enables or disables the "fetch next page" affordance.
    fn set_next_page_enabled(&self, enabled: bool);
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Rendered(ResultView),
    Error(String),
    Status(String),
    NextPageEnabled(bool),
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.lock().clone()
    }

    pub fn views(&self) -> Vec<ResultView> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Rendered(view) => Some(view.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Error(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<String> {
        self.lock().iter().rev().find_map(|event| match event {
            SinkEvent::Status(status) => Some(status.clone()),
            _ => None,
        })
    }

    /// Latest state of the "fetch next page" affordance.
    pub fn next_page_enabled(&self) -> Option<bool> {
        self.lock().iter().rev().find_map(|event| match event {
            SinkEvent::NextPageEnabled(enabled) => Some(*enabled),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn push(&self, event: SinkEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SinkEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResultSink for RecordingSink {
    fn render(&self, view: &ResultView) {
        self.push(SinkEvent::Rendered(view.clone()));
    }

    fn render_error(&self, message: &str) {
        self.push(SinkEvent::Error(message.to_string()));
    }

    fn set_status(&self, status: &str) {
        self.push(SinkEvent::Status(status.to_string()));
    }

    fn set_next_page_enabled(&self, enabled: bool) {
        self.push(SinkEvent::NextPageEnabled(enabled));
    }
}

/// Forwards results to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ResultSink for TracingSink {
    fn render(&self, view: &ResultView) {
        info!(
            text = view.text.as_deref().unwrap_or_default(),
            json = view.json_or_placeholder(),
            "Result"
        );
    }

    fn render_error(&self, message: &str) {
        error!(error = message, "Operation failed");
    }

    fn set_status(&self, status: &str) {
        info!(status, "Status");
    }

    fn set_next_page_enabled(&self, _enabled: bool) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectors::feed::response::ResponseHeaders;

    #[test]
    fn recording_sink_keeps_order_and_latest_state() {
        let sink = RecordingSink::new();
        sink.set_next_page_enabled(false);
        sink.set_status("QueryDocument: 1ms");
        sink.render(&ResultView::text("hello", &ResponseHeaders::new()));
        sink.render_error("boom");
        sink.set_next_page_enabled(true);

        assert_eq!(sink.events().len(), 5);
        assert_eq!(sink.views()[0].text.as_deref(), Some("hello"));
        assert_eq!(sink.errors(), vec!["boom".to_string()]);
        assert_eq!(sink.last_status().as_deref(), Some("QueryDocument: 1ms"));
        assert_eq!(sink.next_page_enabled(), Some(true));

        sink.clear();
        assert!(sink.events().is_empty());
        assert_eq!(sink.next_page_enabled(), None);
    }
}
