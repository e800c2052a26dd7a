use crate::config::Config;
use crate::errors::EdgeError;
use crate::matcher::Exclusions;
use crate::metrics_defs::{REQUEST_DURATION, ROUTE_DECISIONS, UPSTREAM_ERRORS};
use crate::preview_router::{PreviewRouter, RequestView, RouteDecision};
use crate::upstream::send_to_upstream;
use http::HeaderName;
use http::header::{HeaderValue, LOCATION};
use http::uri::{PathAndQuery, Uri};
use http_body_util::combinators::BoxBody;
use hyper::body::{Body, Bytes};
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use shared::http::{boxed_body, make_boxed_error_response};
use shared::{counter, histogram};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Routes storefront requests and forwards them to the page renderer.
pub struct EdgeService<B> {
    inner: Arc<Inner<B>>,
}

struct Inner<B> {
    router: PreviewRouter,
    exclusions: Exclusions,
    client: Client<HttpConnector, B>,
    upstream_url: Url,
    timeout: Duration,
    pathname_header: HeaderName,
}

impl<B> EdgeService<B>
where
    B: Body + Send + Unpin + 'static,
    B::Data: Send,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    pub fn new(config: &Config) -> Result<Self, EdgeError> {
        config.validate()?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            inner: Arc::new(Inner {
                router: PreviewRouter::new(),
                exclusions: Exclusions::new(config.excluded_paths.as_slice()),
                client,
                upstream_url: config.upstream.url.clone(),
                timeout: config.upstream.timeout(),
                pathname_header: config.pathname_header()?,
            }),
        })
    }
}

impl<B> Inner<B>
where
    B: Body + Send + Unpin + 'static,
    B::Data: Send,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    async fn handle(&self, mut req: Request<B>) -> Response<BoxBody<Bytes, EdgeError>> {
        // Only the edge decides what the served path is
        req.headers_mut().remove(&self.pathname_header);

        if self.exclusions.is_excluded(req.uri().path()) {
            counter!(ROUTE_DECISIONS, "decision" => "excluded").increment(1);
            return self.forward(req).await;
        }

        let decision = self.router.decide(&RequestView::from_request(&req));
        counter!(ROUTE_DECISIONS, "decision" => decision.name()).increment(1);
        tracing::debug!(
            path = req.uri().path(),
            decision = decision.name(),
            "Routed request"
        );

        match decision {
            RouteDecision::Redirect { location } => redirect(&location),
            RouteDecision::Rewrite { path } => {
                if let Err(e) = rewrite_path(&mut req, &path) {
                    tracing::error!(error = %e, path = %path, "Failed to rewrite request");
                    return make_boxed_error_response(StatusCode::INTERNAL_SERVER_ERROR);
                }
                self.set_pathname(&mut req, &path);
                self.forward(req).await
            }
            RouteDecision::Passthrough { path } => {
                self.set_pathname(&mut req, &path);
                self.forward(req).await
            }
        }
    }

    fn set_pathname(&self, req: &mut Request<B>, path: &str) {
        match HeaderValue::from_str(path) {
            Ok(value) => {
                req.headers_mut().insert(self.pathname_header.clone(), value);
            }
            Err(e) => tracing::warn!(error = %e, path, "Path is not a valid header value"),
        }
    }

    async fn forward(&self, req: Request<B>) -> Response<BoxBody<Bytes, EdgeError>> {
        match send_to_upstream(&self.client, &self.upstream_url, req, self.timeout).await {
            Ok(response) => {
                let (parts, body) = response.into_parts();
                Response::from_parts(parts, boxed_body(body))
            }
            Err(e) => {
                let (kind, status) = match e {
                    EdgeError::UpstreamTimeout(_) => ("timeout", StatusCode::GATEWAY_TIMEOUT),
                    _ => ("error", StatusCode::BAD_GATEWAY),
                };
                counter!(UPSTREAM_ERRORS, "kind" => kind).increment(1);
                tracing::warn!(error = %e, "Upstream request failed");
                make_boxed_error_response(status)
            }
        }
    }
}

/// Replaces the request's path, keeping its query.
fn rewrite_path<B>(req: &mut Request<B>, path: &str) -> Result<(), EdgeError> {
    let path_and_query = match req.uri().query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };

    let mut parts = req.uri().clone().into_parts();
    parts.path_and_query = Some(
        PathAndQuery::try_from(path_and_query)
            .map_err(|e| EdgeError::InternalError(format!("invalid rewritten path: {e}")))?,
    );
    *req.uri_mut() = Uri::from_parts(parts)
        .map_err(|e| EdgeError::InternalError(format!("invalid rewritten uri: {e}")))?;
    Ok(())
}

fn redirect(location: &str) -> Response<BoxBody<Bytes, EdgeError>> {
    let Ok(value) = HeaderValue::from_str(location) else {
        tracing::error!(location, "Redirect location is not a valid header value");
        return make_boxed_error_response(StatusCode::INTERNAL_SERVER_ERROR);
    };

    let mut response = Response::new(boxed_body(Bytes::new()));
    *response.status_mut() = StatusCode::TEMPORARY_REDIRECT;
    response.headers_mut().insert(LOCATION, value);
    response
}

impl<B> Service<Request<B>> for EdgeService<B>
where
    B: Body + Send + Unpin + 'static,
    B::Data: Send,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    type Response = Response<BoxBody<Bytes, EdgeError>>;
    type Error = EdgeError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        let inner = self.inner.clone();

        Box::pin(async move {
            let started = Instant::now();
            let response = inner.handle(req).await;
            histogram!(REQUEST_DURATION, "status" => response.status().as_str().to_string())
                .record(started.elapsed().as_secs_f64());
            Ok(response)
        })
    }
}
