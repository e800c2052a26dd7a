use crate::errors::EdgeError;
use http_body_util::BodyExt;
use hyper::body::Bytes;
use hyper::{Request, Response};
use hyper_util::client::legacy::Client;
use shared::http::{add_via_header, filter_hop_by_hop};
use std::time::Duration;
use tokio::time::timeout;

/// Sends a request to the renderer and collects the whole response.
///
/// `timeout` covers connecting, sending and reading the complete response body,
/// which rules out streaming responses.
pub async fn send_to_upstream<C, B>(
    client: &Client<C, B>,
    upstream_url: &url::Url,
    request: Request<B>,
    timeout_duration: Duration,
) -> Result<Response<Bytes>, EdgeError>
where
    C: hyper_util::client::legacy::connect::Connect + Clone + Send + Sync + 'static,
    B: hyper::body::Body + Send + Unpin + 'static,
    B::Data: Send,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let upstream_identifier = upstream_url.host_str().unwrap_or(upstream_url.as_str());

    let path_and_query = match request.uri().path_and_query() {
        Some(pq) => pq.as_str(),
        None => {
            return Err(EdgeError::InternalError(
                "Request URI missing path and query".to_string(),
            ));
        }
    };

    let mut url = upstream_url.clone();
    match path_and_query.split_once('?') {
        Some((path, query)) => {
            url.set_path(path);
            url.set_query(Some(query));
        }
        None => {
            url.set_path(path_and_query);
            url.set_query(None);
        }
    }
    let upstream_uri = url.to_string();

    let (mut parts, body) = request.into_parts();
    let request_version = parts.version;
    filter_hop_by_hop(&mut parts.headers, request_version);
    add_via_header(&mut parts.headers, request_version);

    let mut req_builder = Request::builder()
        .method(parts.method)
        .uri(upstream_uri)
        .version(parts.version);

    for (name, value) in parts.headers.iter() {
        req_builder = req_builder.header(name, value);
    }

    let upstream_request = req_builder
        .body(body)
        .map_err(|e| EdgeError::InternalError(format!("Failed to build request: {e}")))?;

    let (mut parts, body) = timeout(timeout_duration, async {
        let response = client.request(upstream_request).await.map_err(|e| {
            EdgeError::UpstreamRequestFailed(upstream_identifier.to_string(), e.to_string())
        })?;

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map(|collected| collected.to_bytes())
            .map_err(|e| EdgeError::ResponseBodyError(e.to_string()))?;

        Ok::<_, EdgeError>((parts, body))
    })
    .await
    .map_err(|_| EdgeError::UpstreamTimeout(upstream_identifier.to_string()))??;

    let response_version = parts.version;
    filter_hop_by_hop(&mut parts.headers, response_version);
    add_via_header(&mut parts.headers, response_version);

    Ok(Response::from_parts(parts, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::start_echo_server;
    use http_body_util::Full;
    use hyper_util::client::legacy::connect::HttpConnector;
    use hyper_util::rt::TokioExecutor;

    fn client() -> Client<HttpConnector, Full<Bytes>> {
        Client::builder(TokioExecutor::new()).build(HttpConnector::new())
    }

    #[tokio::test]
    async fn test_send_to_upstream_success() {
        let upstream = start_echo_server().await;

        let request = Request::builder()
            .uri("http://shop.example.com/category/shoes?color=red")
            .header("connection", "keep-alive")
            .header("x-custom", "test-value")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let response = send_to_upstream(&client(), &upstream, request, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(response.body().as_ref(), b"/category/shoes?color=red");
        assert_eq!(
            response.headers().get("x-echo-x-custom").unwrap(),
            "test-value"
        );
        assert!(response.headers().contains_key("via"));
        assert!(!response.headers().contains_key("connection"));
    }

    #[tokio::test]
    async fn test_send_to_upstream_connection_refused() {
        let upstream = url::Url::parse("http://127.0.0.1:9").unwrap();
        let request = Request::builder()
            .uri("/")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let result = send_to_upstream(&client(), &upstream, request, Duration::from_secs(5)).await;
        assert!(matches!(
            result.unwrap_err(),
            EdgeError::UpstreamRequestFailed(_, _)
        ));
    }

    #[tokio::test]
    async fn test_send_to_upstream_timeout() {
        let upstream = start_echo_server().await;
        let request = Request::builder()
            .uri("/slow")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let result =
            send_to_upstream(&client(), &upstream, request, Duration::from_millis(200)).await;
        assert!(matches!(result.unwrap_err(), EdgeError::UpstreamTimeout(_)));
    }
}
