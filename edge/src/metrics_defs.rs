//! Metrics definitions for the edge.

use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "edge.request.duration",
    metric_type: MetricType::Histogram,
    description: "Request duration in seconds. Tagged with status.",
};

pub const ROUTE_DECISIONS: MetricDef = MetricDef {
    name: "edge.route.decisions",
    metric_type: MetricType::Counter,
    description: "Routing decisions. Tagged with decision: rewrite, redirect, passthrough, excluded.",
};

pub const UPSTREAM_ERRORS: MetricDef = MetricDef {
    name: "edge.upstream.errors",
    metric_type: MetricType::Counter,
    description: "Failed requests to the renderer. Tagged with kind: timeout, error.",
};

pub const ALL_METRICS: &[MetricDef] = &[REQUEST_DURATION, ROUTE_DECISIONS, UPSTREAM_ERRORS];
