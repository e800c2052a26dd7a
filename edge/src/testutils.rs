use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use std::convert::Infallible;
use std::time::Duration;
use tokio::net::TcpListener;
use url::Url;

/// Responds with the request's path and query as the body. Request headers are
/// returned prefixed with `x-echo-`. `/slow` answers after two seconds.
async fn echo_handler(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let _ = body.collect().await;

    if parts.uri.path() == "/slow" {
        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();

    let mut builder = Response::builder().header("x-echo-method", parts.method.as_str());
    for (name, value) in parts.headers.iter() {
        builder = builder.header(format!("x-echo-{}", name.as_str()), value);
    }
    Ok(builder
        .body(Full::new(Bytes::from(path_and_query)))
        .unwrap())
}

pub async fn start_echo_server() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            let io = TokioIo::new(stream);

            tokio::spawn(async move {
                let _ = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new())
                    .serve_connection(io, service_fn(echo_handler))
                    .await;
            });
        }
    });

    Url::parse(&format!("http://127.0.0.1:{port}")).unwrap()
}
