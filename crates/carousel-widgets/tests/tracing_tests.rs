#![forbid(unsafe_code)]

//! Tracing span instrumentation tests.
//!
//! Spans enabled:
//!   cargo test -p carousel-widgets --features tracing --test tracing_tests
//!
//! Zero-overhead verification (no feature):
//!   cargo test -p carousel-widgets --test tracing_tests -- zero_overhead

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use carousel_core::geometry::Size;
use carousel_widgets::options::PagingOptions;
use carousel_widgets::pager::PageDataSource;
use carousel_widgets::paging_view::PagingView;
use carousel_widgets::sticky::PageScrollable;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Test Infrastructure
// ============================================================================

/// A captured span with its fields and parent.
#[derive(Debug, Clone)]
#[allow(dead_code)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
    parent_name: Option<String>,
}

/// A tracing Layer that records every new span.
struct SpanCapture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
}

impl SpanCapture {
    fn new() -> (Self, CaptureHandle) {
        let spans = Arc::new(Mutex::new(Vec::new()));
        let handle = CaptureHandle {
            spans: spans.clone(),
        };
        (Self { spans }, handle)
    }
}

struct CaptureHandle {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
}

impl CaptureHandle {
    fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().unwrap().clone()
    }

    fn named(&self, name: &str) -> Vec<CapturedSpan> {
        self.spans()
            .into_iter()
            .filter(|s| s.name == name)
            .collect()
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for SpanCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);

        let parent_name = ctx
            .current_span()
            .id()
            .and_then(|id| ctx.span(id))
            .map(|span_ref| span_ref.name().to_string());

        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
            parent_name,
        });
    }
}

fn with_captured_spans<F>(f: F) -> CaptureHandle
where
    F: FnOnce(),
{
    let (layer, handle) = SpanCapture::new();
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    handle
}

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Card(usize);

impl PageScrollable for Card {}

struct Cards(usize);

impl PageDataSource for Cards {
    type Page = Card;

    fn page_count(&self) -> usize {
        self.0
    }

    fn page_at(&mut self, index: usize) -> Card {
        Card(index)
    }
}

fn laid_out_view(count: usize) -> PagingView<Cards> {
    let options = PagingOptions::default()
        .header_height(120.0)
        .sticky_height(44.0);
    let mut view = PagingView::new(Cards(count)).options(&options);
    view.set_viewport(Size::new(320.0, 640.0));
    view.layout();
    view
}

// ============================================================================
// Tests
// ============================================================================

#[test]
#[cfg(feature = "tracing")]
fn spans_created_for_each_layout_stage() {
    let handle = with_captured_spans(|| {
        laid_out_view(3);
    });

    for name in [
        "paging_view_layout",
        "pager_reload",
        "sticky_layout",
        "queuing_layout",
    ] {
        assert!(
            !handle.named(name).is_empty(),
            "missing {name} span, got: {:?}",
            handle.spans().iter().map(|s| &s.name).collect::<Vec<_>>()
        );
    }
}

#[test]
#[cfg(feature = "tracing")]
fn stage_spans_nest_under_paging_view_layout() {
    let handle = with_captured_spans(|| {
        laid_out_view(2);
    });

    for name in ["pager_reload", "sticky_layout", "queuing_layout"] {
        let spans = handle.named(name);
        assert!(
            spans
                .iter()
                .any(|s| s.parent_name.as_deref() == Some("paging_view_layout")),
            "{name} should nest under paging_view_layout, got: {spans:?}"
        );
    }

    let top = handle.named("paging_view_layout");
    assert!(top.iter().all(|s| s.parent_name.is_none()));
}

#[test]
#[cfg(feature = "tracing")]
fn span_fields_describe_the_pass() {
    let handle = with_captured_spans(|| {
        laid_out_view(4);
    });

    let sticky = handle.named("sticky_layout");
    let first = sticky.first().expect("sticky_layout span");
    assert_eq!(first.fields.get("header").map(String::as_str), Some("120"));
    assert_eq!(first.fields.get("sticky").map(String::as_str), Some("44"));

    let queuing = handle.named("queuing_layout");
    assert!(
        queuing.iter().all(|s| s.fields.contains_key("offset")
            && s.fields.contains_key("panes")
            && s.fields.contains_key("staged")),
        "queuing_layout fields: {queuing:?}"
    );
}

#[test]
#[cfg(feature = "tracing")]
fn settled_view_skips_reload() {
    let mut view = laid_out_view(3);
    let handle = with_captured_spans(|| {
        view.layout();
    });

    assert!(handle.named("pager_reload").is_empty());
    assert_eq!(handle.named("paging_view_layout").len(), 1);
}

#[test]
#[cfg(feature = "tracing")]
fn reload_span_per_requested_reload() {
    let mut view = laid_out_view(3);
    let handle = with_captured_spans(|| {
        view.set_needs_reload();
        view.layout();
        view.layout();
    });

    assert_eq!(handle.named("pager_reload").len(), 1);
}

/// With the feature off the instrumentation compiles away.
#[test]
fn zero_overhead_when_disabled() {
    let handle = with_captured_spans(|| {
        laid_out_view(3);
    });

    let spans = handle.named("paging_view_layout");

    #[cfg(feature = "tracing")]
    assert!(
        !spans.is_empty(),
        "With tracing feature, paging_view_layout spans should be present"
    );

    #[cfg(not(feature = "tracing"))]
    assert!(
        spans.is_empty(),
        "Without tracing feature, no paging_view_layout spans should exist (got {})",
        spans.len()
    );
}
