use http_body_util::Full;
use hyper::body::Bytes;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use url::Url;

/// In-process SEO backend serving canned overrides.
///
/// - `appSource=template&path=/template/v1/category/shoes`: override for vendor v1
/// - `path=/category/shoes`: marketplace override
/// - `/missing` 404, `/null` null body, `/empty` empty body
/// - `/broken` invalid JSON, `/error` 500, `/slow` responds after 2s
pub struct TestSeoServer {
    port: u16,
    requests: Arc<Mutex<HashMap<String, usize>>>,
}

impl TestSeoServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(HashMap::new()));

        let counts = requests.clone();
        tokio::spawn(async move {
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                let io = TokioIo::new(stream);
                let counts = counts.clone();

                tokio::spawn(async move {
                    let service = service_fn(move |req| handle(req, counts.clone()));
                    let _ = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new())
                        .serve_connection(io, service)
                        .await;
                });
            }
        });

        TestSeoServer { port, requests }
    }

    pub fn url(&self) -> Url {
        Url::parse(&format!("http://127.0.0.1:{}/api/seo", self.port)).unwrap()
    }

    pub fn requests_for(&self, path: &str) -> usize {
        self.requests.lock().get(path).copied().unwrap_or(0)
    }
}

async fn handle<B>(
    req: Request<B>,
    counts: Arc<Mutex<HashMap<String, usize>>>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let params: HashMap<String, String> = url::form_urlencoded::parse(
        req.uri().query().unwrap_or("").as_bytes(),
    )
    .into_owned()
    .collect();

    let path = params.get("path").cloned().unwrap_or_default();
    let app_source = params.get("appSource").cloned().unwrap_or_default();
    *counts.lock().entry(path.clone()).or_default() += 1;

    let ok = |body: &'static str| (StatusCode::OK, body);
    let (status, body) = match (app_source.as_str(), path.as_str()) {
        ("template", "/template/v1/category/shoes") => ok(
            r#"{"title": "Shoes by v1", "ogImage": "https://cdn.example.com/v1/shoes.png"}"#,
        ),
        ("marketplace", "/category/shoes") => ok(
            r#"{"title": "Shoes", "description": "All the shoes", "canonicalUrl": "https://shop.example.com/category/shoes"}"#,
        ),
        (_, "/null") => ok("null"),
        (_, "/empty") => ok(""),
        (_, "/broken") => ok("{not json"),
        (_, "/error") => (StatusCode::INTERNAL_SERVER_ERROR, "boom"),
        (_, "/slow") => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            ok("null")
        }
        _ => (StatusCode::NOT_FOUND, ""),
    };

    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    Ok(response)
}
