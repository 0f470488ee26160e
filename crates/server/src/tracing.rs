//! Ambient request tracing: one root `fastrace` span per request, a child
//! of the caller's W3C `traceparent` when one is propagated. No exporter is
//! wired here — SPEC_FULL treats the span API itself as ambient and leaves
//! exporter pipelines out of scope, unlike the teacher's full OTLP setup.

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use fastrace::Span;
use fastrace::collector::SpanContext;
use fastrace::prelude::*;

pub async fn trace_requests(request: Request, next: Next) -> Response {
    let path = request.extensions().get::<MatchedPath>().map(|matched| matched.as_str().to_owned()).unwrap_or_else(|| request.uri().path().to_owned());
    let method = request.method().to_string();
    let span_name = format!("{method} {path}");

    let parent = extract_traceparent(request.headers()).unwrap_or_else(SpanContext::random);
    let root = Span::root(span_name, parent);

    root.add_property(|| ("http.request.method", method));
    root.add_property(|| ("http.route", path));

    async move {
        let response = next.run(request).await;
        LocalSpan::add_property(|| ("http.response.status_code", response.status().as_u16().to_string()));
        response
    }
    .in_span(root)
    .await
}

fn extract_traceparent(headers: &http::HeaderMap) -> Option<SpanContext> {
    let traceparent = headers.get("traceparent")?.to_str().ok()?;
    SpanContext::decode_w3c_traceparent(traceparent)
}
