use engine_core::{render::ResultView, sink::ResultSink};
use std::sync::atomic::{AtomicBool, Ordering};

/// Writes results to stdout and errors and status lines to stderr.
pub struct ConsoleSink {
    show_headers: bool,
    next_page: AtomicBool,
}

impl ConsoleSink {
    pub fn new(show_headers: bool) -> Self {
        Self {
            show_headers,
            next_page: AtomicBool::new(false),
        }
    }

    pub fn next_page_enabled(&self) -> bool {
        self.next_page.load(Ordering::SeqCst)
    }
}

impl ResultSink for ConsoleSink {
    fn render(&self, view: &ResultView) {
        if let Some(text) = &view.text {
            println!("{text}");
        }
        if view.json.is_some() {
            println!("{}", view.json_or_placeholder());
        }
        if self.show_headers && !view.headers.is_empty() {
            print!("{}", view.headers.replace("\r\n", "\n"));
        }
    }

    fn render_error(&self, message: &str) {
        eprintln!("Error: {message}");
    }

    fn set_status(&self, status: &str) {
        eprintln!("[{status}]");
    }

    fn set_next_page_enabled(&self, enabled: bool) {
        self.next_page.store(enabled, Ordering::SeqCst);
    }
}
