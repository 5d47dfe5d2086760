// Reversible highlight rendering for the host content.
// The view is an ordered list of gap and sentence segments whose concatenated
// text reproduces the utterance exactly; markup tagging is derived, never
// destructive.

use tracing::debug;

use crate::content::ContentHost;
use crate::segmenter::Sentence;

/// Opaque handle to one rendered sentence span
///
/// Valid only for the `HighlightView` that produced it; a new `prepare` or a
/// `restore` invalidates all previously issued handles.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SpanRef(usize);

impl SpanRef {
    /// Sentence index this span wraps
    pub fn sentence_index(&self) -> usize {
        self.0
    }
}

/// Host markup captured before `apply` replaced it
#[derive(Debug, Clone)]
pub struct RenderSnapshot {
    markup: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SegmentRole {
    /// Inter-sentence text reproduced verbatim
    Gap,
    Sentence { index: usize, highlighted: bool },
}

#[derive(Debug, Clone)]
struct ViewSegment {
    text: String,
    role: SegmentRole,
}

/// View model of the host content during one playback session
pub struct HighlightView {
    segments: Vec<ViewSegment>,
    span_count: usize,
}

impl HighlightView {
    /// Build the gap/sentence segment sequence for `text`.
    ///
    /// Concatenating every segment's text reproduces `text` exactly; the
    /// returned span handles are ordered by sentence index.
    pub fn prepare(text: &str, sentences: &[Sentence]) -> (Self, Vec<SpanRef>) {
        let mut segments = Vec::with_capacity(sentences.len() * 2 + 1);
        let mut spans = Vec::with_capacity(sentences.len());
        let mut cursor = 0;

        for sentence in sentences {
            if cursor < sentence.start.0 {
                segments.push(ViewSegment {
                    text: text[cursor..sentence.start.0].to_string(),
                    role: SegmentRole::Gap,
                });
            }
            spans.push(SpanRef(sentence.index));
            segments.push(ViewSegment {
                text: text[sentence.start.0..sentence.end.0].to_string(),
                role: SegmentRole::Sentence {
                    index: sentence.index,
                    highlighted: false,
                },
            });
            cursor = sentence.end.0;
        }

        if cursor < text.len() {
            segments.push(ViewSegment {
                text: text[cursor..].to_string(),
                role: SegmentRole::Gap,
            });
        }

        debug!(
            "Prepared highlight view: {} segments, {} spans",
            segments.len(),
            spans.len()
        );

        let view = Self {
            segments,
            span_count: sentences.len(),
        };
        (view, spans)
    }

    /// Reassemble the original text from the segment sequence
    pub fn reconstruct(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// Render the view as markup: gaps escaped verbatim, sentences wrapped in
    /// uniquely tagged spans, the highlighted one carrying the active class
    pub fn render_markup(&self) -> String {
        let mut markup = String::new();
        for segment in &self.segments {
            match segment.role {
                SegmentRole::Gap => markup.push_str(&escape_markup(&segment.text)),
                SegmentRole::Sentence { index, highlighted } => {
                    let class = if highlighted {
                        "ra-sentence ra-active"
                    } else {
                        "ra-sentence"
                    };
                    markup.push_str(&format!(
                        "<span id=\"{}\" class=\"{}\">{}</span>",
                        span_id(index),
                        class,
                        escape_markup(&segment.text)
                    ));
                }
            }
        }
        markup
    }

    /// Emphasize exactly one span, clearing any previous emphasis.
    /// Returns true when the view changed.
    pub fn highlight(&mut self, span: SpanRef) -> bool {
        if span.0 >= self.span_count {
            return false;
        }
        let mut changed = false;
        for segment in &mut self.segments {
            if let SegmentRole::Sentence { index, highlighted } = &mut segment.role {
                let want = *index == span.0;
                if *highlighted != want {
                    *highlighted = want;
                    changed = true;
                }
            }
        }
        changed
    }

    /// Drop emphasis from one span if it currently carries it
    pub fn unhighlight(&mut self, span: SpanRef) -> bool {
        let mut changed = false;
        for segment in &mut self.segments {
            if let SegmentRole::Sentence { index, highlighted } = &mut segment.role {
                if *index == span.0 && *highlighted {
                    *highlighted = false;
                    changed = true;
                }
            }
        }
        changed
    }

    /// Remove emphasis everywhere without altering segment text
    pub fn clear_all(&mut self) {
        for segment in &mut self.segments {
            if let SegmentRole::Sentence { highlighted, .. } = &mut segment.role {
                *highlighted = false;
            }
        }
    }

    /// Sentence index of the emphasized span, if any
    pub fn highlighted_index(&self) -> Option<usize> {
        self.segments.iter().find_map(|segment| match segment.role {
            SegmentRole::Sentence {
                index,
                highlighted: true,
            } => Some(index),
            _ => None,
        })
    }

    /// Replace the host markup with this view's rendering, returning the
    /// snapshot needed to undo the replacement
    pub fn apply<H: ContentHost>(&self, host: &mut H) -> RenderSnapshot {
        let snapshot = RenderSnapshot {
            markup: host.markup().to_string(),
        };
        host.replace_markup(self.render_markup());
        snapshot
    }

    /// Re-render after a highlight change and scroll the emphasized span into
    /// comfortable visibility
    pub fn sync<H: ContentHost>(&self, host: &mut H) {
        host.replace_markup(self.render_markup());
        if let Some(index) = self.highlighted_index() {
            host.scroll_into_view(&span_id(index));
        }
    }

    /// Put the pre-`apply` rendering back, undoing all structural changes
    pub fn restore<H: ContentHost>(host: &mut H, snapshot: RenderSnapshot) {
        host.replace_markup(snapshot.markup);
    }
}

fn span_id(index: usize) -> String {
    format!("ra-sent-{index}")
}

/// Escape text so it is never misinterpreted as markup
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
