use routing::{join_segments, segments};
use serde::Serialize;
use tenant::vendor::path_only;
use tenant::{PreviewContext, VendorContext};

/// Which tenant's override table a query targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppSource {
    Marketplace,
    Template,
}

/// Query parameters sent to the SEO backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoQuery {
    pub app_source: AppSource,
    pub path: String,
    /// Asks the backend to bypass its own caches.
    pub force: bool,
}

impl SeoQuery {
    pub fn for_context(context: &VendorContext) -> Self {
        let app_source = match context.tenant().is_default() {
            true => AppSource::Marketplace,
            false => AppSource::Template,
        };

        SeoQuery {
            app_source,
            path: normalize_path(context.path()),
            force: true,
        }
    }
}

/// Canonical form of a path for override lookups.
///
/// Preview paths are looked up under the vendor page they render, so a preview
/// shows the same overrides as the published page.
pub fn normalize_path(path: &str) -> String {
    let path = path_only(path);
    match PreviewContext::from_path(path) {
        Some(preview) => preview.served_path(),
        None => join_segments(&segments(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marketplace_query() {
        let query = SeoQuery::for_context(&VendorContext::resolve("/category/shoes/"));
        assert_eq!(query.app_source, AppSource::Marketplace);
        assert_eq!(query.path, "/category/shoes");
        assert!(query.force);
    }

    #[test]
    fn test_template_query() {
        let query = SeoQuery::for_context(&VendorContext::resolve("/template/v1/category/shoes"));
        assert_eq!(query.app_source, AppSource::Template);
        assert_eq!(query.path, "/template/v1/category/shoes");
    }

    #[test]
    fn test_preview_paths_use_served_path() {
        let query = SeoQuery::for_context(&VendorContext::resolve(
            "/template/v1/preview/promo/category/shoes",
        ));
        assert_eq!(query.app_source, AppSource::Template);
        assert_eq!(query.path, "/template/v1/category/shoes");
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("//cart//"), "/cart");
        assert_eq!(normalize_path("/cart?step=2#top"), "/cart");
        assert_eq!(normalize_path("/template/v1/preview/promo"), "/template/v1");
    }

    #[test]
    fn test_query_serialization() {
        let query = SeoQuery::for_context(&VendorContext::resolve("/template/v1"));
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["appSource"], "template");
        assert_eq!(value["path"], "/template/v1");
        assert_eq!(value["force"], true);
    }
}
