// Host content boundary: the engine reads plain text from the host and the
// highlight view owns the host's rendering surface for the life of a session.

use crate::highlight::escape_markup;

/// Provider of the text being read and its replaceable rendering surface
pub trait ContentHost {
    /// Current plain text of the hosted content
    fn plain_text(&self) -> &str;

    /// Current rendering of the hosted content
    fn markup(&self) -> &str;

    /// Replace the rendering wholesale
    fn replace_markup(&mut self, markup: String);

    /// Request that the span with `span_id` be scrolled into comfortable view
    fn scroll_into_view(&mut self, span_id: &str);
}

/// In-memory content host used by the CLI driver and tests
///
/// The initial rendering is the escaped plain text; scroll requests are
/// recorded so callers can observe them.
#[derive(Debug, Clone, Default)]
pub struct StaticContent {
    text: String,
    markup: String,
    scroll_requests: Vec<String>,
}

impl StaticContent {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let markup = escape_markup(&text);
        Self {
            text,
            markup,
            scroll_requests: Vec::new(),
        }
    }

    /// Swap in new content, as when a different page is loaded.
    ///
    /// Callers must signal `handle_content_replaced` to the engine before
    /// swapping; an active session owns the rendering surface until then.
    pub fn replace_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.markup = escape_markup(&text);
        self.text = text;
    }

    /// Scroll requests observed so far, oldest first
    pub fn scroll_requests(&self) -> &[String] {
        &self.scroll_requests
    }
}

impl ContentHost for StaticContent {
    fn plain_text(&self) -> &str {
        &self.text
    }

    fn markup(&self) -> &str {
        &self.markup
    }

    fn replace_markup(&mut self, markup: String) {
        self.markup = markup;
    }

    fn scroll_into_view(&mut self, span_id: &str) {
        self.scroll_requests.push(span_id.to_string());
    }
}
