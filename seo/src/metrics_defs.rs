//! Metrics definitions for SEO metadata.

use shared::metrics_defs::{MetricDef, MetricType};

pub const FETCH_DURATION: MetricDef = MetricDef {
    name: "seo.fetch.duration",
    metric_type: MetricType::Histogram,
    description: "Duration of SEO override requests in seconds. Tagged with result.",
};

pub const FETCH_RESULTS: MetricDef = MetricDef {
    name: "seo.fetch.results",
    metric_type: MetricType::Counter,
    description: "SEO override lookups. Tagged with result: found, none, error.",
};

pub const SYNC_APPLIED: MetricDef = MetricDef {
    name: "seo.sync.applied",
    metric_type: MetricType::Counter,
    description: "Metadata writes to the document, including re-applications. Tagged with phase.",
};

pub const SYNC_DISCARDED: MetricDef = MetricDef {
    name: "seo.sync.discarded",
    metric_type: MetricType::Counter,
    description: "Writes dropped because a newer navigation superseded them. Tagged with phase.",
};

pub const ALL_METRICS: &[MetricDef] = &[FETCH_DURATION, FETCH_RESULTS, SYNC_APPLIED, SYNC_DISCARDED];
