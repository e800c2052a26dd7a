//! Preview-aware routing.
//!
//! Decides, per request, whether to serve a preview route from the vendor's
//! regular pages, to send the client back into the preview it came from, or to
//! let the request through untouched.
//!
//! Rules are tried in table order and the first rule that produces a decision
//! wins:
//!
//! ```text
//! /template/{vendor_id}/preview/{template_key}/*  -> rewrite to /template/{vendor_id}/*
//! /template/{vendor_id}/*                         -> redirect into the referer's preview,
//!                                                    if the referer previews the same vendor
//! anything else                                   -> passthrough
//! ```
//!
//! A rewritten path has no `preview` segment, so routing it again can only
//! redirect, and only when a referer still claims a preview session. Neither
//! rule produces its own input, so requests cannot loop.

use hyper::Request;
use hyper::header::{HOST, REFERER};
use routing::{PatternMatch, RouteTable};
use tenant::{PREVIEW_SEGMENT, PreviewContext, TEMPLATE_SEGMENT};

/// The parts of a request routing looks at.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestView<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub host: Option<&'a str>,
    pub referer: Option<&'a str>,
}

impl<'a> RequestView<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        // Host may come from the authority of an absolute-form request
        let host = req
            .uri()
            .host()
            .or_else(|| req.headers().get(HOST).and_then(|h| h.to_str().ok()));

        RequestView {
            path: req.uri().path(),
            query: req.uri().query(),
            host,
            referer: req.headers().get(REFERER).and_then(|h| h.to_str().ok()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteDecision {
    /// Serve `path` instead; the client keeps seeing its own URL.
    Rewrite { path: String },
    /// Send the client to `location`.
    Redirect { location: String },
    /// Serve the request as is.
    Passthrough { path: String },
}

impl RouteDecision {
    pub fn name(&self) -> &'static str {
        match self {
            RouteDecision::Rewrite { .. } => "rewrite",
            RouteDecision::Redirect { .. } => "redirect",
            RouteDecision::Passthrough { .. } => "passthrough",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rule {
    EnterPreview,
    RetainPreview,
}

impl Rule {
    fn apply(&self, route_match: &PatternMatch<'_>, request: &RequestView<'_>) -> Option<RouteDecision> {
        match self {
            Rule::EnterPreview => {
                let preview = PreviewContext::from_path(request.path)?;
                Some(RouteDecision::Rewrite {
                    path: preview.served_path(),
                })
            }
            Rule::RetainPreview => {
                if route_match.rest.first() == Some(&PREVIEW_SEGMENT) {
                    return None;
                }

                let vendor_id = route_match.param("vendor_id")?;
                let preview = PreviewContext::from_referer(request.referer?, request.host)?;
                if preview.vendor_id().as_str() != vendor_id {
                    return None;
                }

                let mut location = preview.preview_path(&route_match.rest);
                if let Some(query) = request.query {
                    location.push('?');
                    location.push_str(query);
                }
                Some(RouteDecision::Redirect { location })
            }
        }
    }
}

pub struct PreviewRouter {
    rules: RouteTable<Rule>,
}

impl Default for PreviewRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewRouter {
    pub fn new() -> Self {
        let rules = RouteTable::new(vec![
            (
                format!("/{TEMPLATE_SEGMENT}/{{vendor_id}}/{PREVIEW_SEGMENT}/{{template_key}}/*"),
                Rule::EnterPreview,
            ),
            (
                format!("/{TEMPLATE_SEGMENT}/{{vendor_id}}/*"),
                Rule::RetainPreview,
            ),
        ]);
        Self { rules }
    }

    pub fn decide(&self, request: &RequestView<'_>) -> RouteDecision {
        self.rules
            .matches(request.path)
            .find_map(|(rule, route_match)| rule.apply(&route_match, request))
            .unwrap_or_else(|| RouteDecision::Passthrough {
                path: request.path.to_string(),
            })
    }
}
