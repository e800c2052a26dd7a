//! Tenant resolution for the storefront.
//!
//! A request path either belongs to the default marketplace or to a vendor's
//! template site, addressed as `/template/{vendor_id}/...`. Vendor template sites
//! can additionally be viewed in preview mode under
//! `/template/{vendor_id}/preview/{template_key}/...`.

pub mod preview;
pub mod preview_message;
pub mod vendor;

pub use preview::PreviewContext;
pub use preview_message::PreviewUpdate;
pub use vendor::{Tenant, VendorContext, VendorId};

/// First path segment of every vendor-scoped path.
pub const TEMPLATE_SEGMENT: &str = "template";
/// Third path segment of a preview path.
pub const PREVIEW_SEGMENT: &str = "preview";
