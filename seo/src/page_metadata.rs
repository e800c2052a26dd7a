use crate::client::SeoFetch;
use crate::metadata::{Metadata, merge};
use crate::query::SeoQuery;
use http::{HeaderMap, HeaderName};
use tenant::VendorContext;

/// Resolves metadata while a page is generated on the server.
///
/// The edge forwards the served path in a header; page generation reads it back
/// instead of reconstructing the path from the rewritten request.
pub struct PageMetadata<F> {
    fetcher: F,
    defaults: Metadata,
    pathname_header: HeaderName,
}

impl<F: SeoFetch> PageMetadata<F> {
    pub fn new(fetcher: F, defaults: Metadata, pathname_header: HeaderName) -> Self {
        Self {
            fetcher,
            defaults,
            pathname_header,
        }
    }

    /// Metadata for the request carrying these headers. Requests without the
    /// path header are treated as the marketplace root.
    pub async fn resolve(&self, headers: &HeaderMap) -> Metadata {
        let path = headers
            .get(&self.pathname_header)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("/");
        self.resolve_path(path).await
    }

    pub async fn resolve_path(&self, path: &str) -> Metadata {
        let context = VendorContext::resolve(path);
        let query = SeoQuery::for_context(&context);
        let seo_override = self.fetcher.fetch(&query).await;

        tracing::debug!(
            tenant = %context.tenant(),
            path = %query.path,
            has_override = seo_override.is_some(),
            "Resolved page metadata"
        );

        merge(&self.defaults, seo_override.as_ref())
    }
}
