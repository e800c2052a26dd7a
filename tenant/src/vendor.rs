use crate::TEMPLATE_SEGMENT;
use routing::Pattern;
use std::fmt;
use std::sync::LazyLock;

static VENDOR_PATTERN: LazyLock<Pattern> =
    LazyLock::new(|| Pattern::parse(&format!("/{TEMPLATE_SEGMENT}/{{vendor_id}}/*")));

/// Strips the query string and fragment from a request target.
pub fn path_only(target: &str) -> &str {
    let end = target.find(['?', '#']).unwrap_or(target.len());
    &target[..end]
}

/// Identifier of a vendor's template site.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VendorId(String);

impl VendorId {
    /// Returns `None` for empty or whitespace-only identifiers.
    pub fn new<S: Into<String>>(id: S) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return None;
        }
        Some(VendorId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The storefront instance a path belongs to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tenant {
    /// The shared marketplace.
    #[default]
    Default,
    /// A vendor's template site.
    Vendor(VendorId),
}

impl Tenant {
    /// Resolves the tenant from a request path. Anything that is not shaped like
    /// `/template/{vendor_id}/...` belongs to the default tenant.
    pub fn from_path(path: &str) -> Self {
        VENDOR_PATTERN
            .matches(path_only(path))
            .and_then(|m| m.param("vendor_id").and_then(VendorId::new))
            .map_or(Tenant::Default, Tenant::Vendor)
    }

    pub fn vendor_id(&self) -> Option<&VendorId> {
        match self {
            Tenant::Default => None,
            Tenant::Vendor(id) => Some(id),
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Tenant::Default)
    }
}

impl fmt::Display for Tenant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tenant::Default => f.write_str("default"),
            Tenant::Vendor(id) => id.fmt(f),
        }
    }
}

/// Tenant information for a single navigation.
///
/// The context is resolved once per path and handed to whatever needs to know
/// which storefront is being rendered (SEO queries, preview message handling).
/// A new navigation resolves a new context; contexts are never updated in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VendorContext {
    tenant: Tenant,
    path: String,
}

impl VendorContext {
    pub fn resolve(path: &str) -> Self {
        let path = path_only(path);
        VendorContext {
            tenant: Tenant::from_path(path),
            path: path.to_string(),
        }
    }

    pub fn tenant(&self) -> &Tenant {
        &self.tenant
    }

    pub fn vendor_id(&self) -> Option<&VendorId> {
        self.tenant.vendor_id()
    }

    /// The path this context was resolved from, without query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the context belongs to the given vendor.
    pub fn is_vendor(&self, vendor_id: &str) -> bool {
        self.vendor_id().is_some_and(|id| id.as_str() == vendor_id)
    }
}
