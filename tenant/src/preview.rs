use crate::vendor::{VendorId, path_only};
use crate::{PREVIEW_SEGMENT, TEMPLATE_SEGMENT};
use routing::{Pattern, join_segments};
use std::sync::LazyLock;
use url::Url;

static PREVIEW_PATTERN: LazyLock<Pattern> = LazyLock::new(|| {
    Pattern::parse(&format!(
        "/{TEMPLATE_SEGMENT}/{{vendor_id}}/{PREVIEW_SEGMENT}/{{template_key}}/*"
    ))
});

/// Preview session recovered from a preview path:
/// `/template/{vendor_id}/preview/{template_key}/{rest..}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewContext {
    vendor_id: VendorId,
    template_key: String,
    rest: Vec<String>,
}

impl PreviewContext {
    /// Parses a preview path. Returns `None` for any other shape.
    pub fn from_path(path: &str) -> Option<Self> {
        let m = PREVIEW_PATTERN.matches(path_only(path))?;
        let vendor_id = m.param("vendor_id").and_then(VendorId::new)?;
        let template_key = m.param("template_key")?.to_string();

        Some(PreviewContext {
            vendor_id,
            template_key,
            rest: m.rest.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Recovers the preview session the client navigated from.
    ///
    /// The referer must be an absolute URL. When the request host is known, the
    /// referer must point at the same host; anything else yields `None`.
    pub fn from_referer(referer: &str, request_host: Option<&str>) -> Option<Self> {
        let url = match Url::parse(referer) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(referer, error = %e, "Ignoring malformed referer");
                return None;
            }
        };

        if let Some(host) = request_host
            && !same_host(&url, host)
        {
            tracing::debug!(referer, host, "Ignoring cross-origin referer");
            return None;
        }

        Self::from_path(url.path())
    }

    pub fn vendor_id(&self) -> &VendorId {
        &self.vendor_id
    }

    pub fn template_key(&self) -> &str {
        &self.template_key
    }

    /// Segments after the template key.
    pub fn rest(&self) -> &[String] {
        &self.rest
    }

    /// The vendor page that renders this preview: `/template/{vendor_id}/{rest..}`.
    pub fn served_path(&self) -> String {
        let mut segments = vec![TEMPLATE_SEGMENT, self.vendor_id.as_str()];
        segments.extend(self.rest.iter().map(String::as_str));
        join_segments(&segments)
    }

    /// The preview path of another page of the same vendor.
    pub fn preview_path<S: AsRef<str>>(&self, rest: &[S]) -> String {
        let mut segments = vec![
            TEMPLATE_SEGMENT,
            self.vendor_id.as_str(),
            PREVIEW_SEGMENT,
            self.template_key.as_str(),
        ];
        segments.extend(rest.iter().map(AsRef::as_ref));
        join_segments(&segments)
    }
}

/// Compares the referer host with a `Host` header value, ignoring ports.
fn same_host(referer: &Url, host_header: &str) -> bool {
    let Some(referer_host) = referer.host_str() else {
        return false;
    };

    // Strip port if present for comparison
    let host = match host_header.strip_prefix('[') {
        Some(ipv6) => ipv6.split(']').next().map(|h| format!("[{h}]")),
        None => host_header.split(':').next().map(str::to_string),
    };

    host.is_some_and(|h| h.eq_ignore_ascii_case(referer_host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        let ctx = PreviewContext::from_path("/template/v1/preview/promo/category/shoes").unwrap();
        assert_eq!(ctx.vendor_id().as_str(), "v1");
        assert_eq!(ctx.template_key(), "promo");
        assert_eq!(ctx.rest(), ["category", "shoes"]);
        assert_eq!(ctx.served_path(), "/template/v1/category/shoes");
        assert_eq!(
            ctx.preview_path(&["cart"]),
            "/template/v1/preview/promo/cart"
        );
    }

    #[test]
    fn test_from_path_without_rest() {
        let ctx = PreviewContext::from_path("/template/v1/preview/promo/").unwrap();
        assert!(ctx.rest().is_empty());
        assert_eq!(ctx.served_path(), "/template/v1");
        assert_eq!(
            ctx.preview_path::<&str>(&[]),
            "/template/v1/preview/promo"
        );
    }

    #[test]
    fn test_from_path_rejects_other_shapes() {
        assert!(PreviewContext::from_path("/template/v1/preview").is_none());
        assert!(PreviewContext::from_path("/template/v1/category/shoes").is_none());
        assert!(PreviewContext::from_path("/preview/promo").is_none());
        assert!(PreviewContext::from_path("/").is_none());
    }

    #[test]
    fn test_from_referer() {
        let referer = "https://shop.example.com/template/v1/preview/promo/category/tshirts";

        let ctx = PreviewContext::from_referer(referer, Some("shop.example.com")).unwrap();
        assert_eq!(ctx.vendor_id().as_str(), "v1");
        assert_eq!(ctx.template_key(), "promo");

        // Port in the Host header is ignored
        assert!(PreviewContext::from_referer(referer, Some("shop.example.com:443")).is_some());

        // Unknown request host accepts any referer host
        assert!(PreviewContext::from_referer(referer, None).is_some());
    }

    #[test]
    fn test_from_referer_ignores_bad_input() {
        // Malformed
        assert!(PreviewContext::from_referer("not a url", None).is_none());
        assert!(PreviewContext::from_referer("/template/v1/preview/promo", None).is_none());

        // Cross-origin
        assert!(
            PreviewContext::from_referer(
                "https://evil.example.org/template/v1/preview/promo/x",
                Some("shop.example.com"),
            )
            .is_none()
        );

        // Not a preview page
        assert!(
            PreviewContext::from_referer(
                "https://shop.example.com/template/v1/category",
                Some("shop.example.com"),
            )
            .is_none()
        );
    }

    #[test]
    fn test_same_host_ipv6() {
        let url = Url::parse("http://[::1]:3000/template/v1/preview/promo").unwrap();
        assert!(same_host(&url, "[::1]:3000"));
        assert!(!same_host(&url, "127.0.0.1:3000"));
    }
}
