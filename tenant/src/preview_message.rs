use crate::vendor::{VendorContext, VendorId};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Message type posted by the template preview editor.
pub const PREVIEW_UPDATE_TYPE: &str = "template-preview-update";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPreviewMessage {
    #[serde(rename = "type")]
    kind: String,
    vendor_id: String,
    payload: Map<String, Value>,
    #[serde(default)]
    section_order: Option<Value>,
}

/// A validated live update from the preview editor window.
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewUpdate {
    pub vendor_id: VendorId,
    pub payload: Map<String, Value>,
    pub section_order: Option<Vec<String>>,
}

impl PreviewUpdate {
    /// Accepts a message only if it is a preview update for the vendor being
    /// rendered. Malformed or mismatched messages are dropped.
    pub fn accept(message: &Value, context: &VendorContext) -> Option<Self> {
        let raw = match RawPreviewMessage::deserialize(message) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(error = %e, "Dropping malformed preview message");
                return None;
            }
        };

        if raw.kind != PREVIEW_UPDATE_TYPE {
            return None;
        }

        let vendor_id = VendorId::new(raw.vendor_id)?;
        if !context.is_vendor(vendor_id.as_str()) {
            tracing::debug!(
                vendor_id = %vendor_id,
                tenant = %context.tenant(),
                "Dropping preview message for another tenant"
            );
            return None;
        }

        // A malformed section order does not invalidate the payload
        let section_order = raw
            .section_order
            .and_then(|order| Vec::<String>::deserialize(order).ok());

        Some(PreviewUpdate {
            vendor_id,
            payload: raw.payload,
            section_order,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vendor_context() -> VendorContext {
        VendorContext::resolve("/template/v1/preview/promo")
    }

    #[test]
    fn test_accepts_valid_message() {
        let message = json!({
            "type": "template-preview-update",
            "vendorId": "v1",
            "payload": {"hero": {"title": "Summer sale"}},
            "sectionOrder": ["hero", "products"],
        });

        let update = PreviewUpdate::accept(&message, &vendor_context()).unwrap();
        assert_eq!(update.vendor_id.as_str(), "v1");
        assert_eq!(update.payload["hero"]["title"], "Summer sale");
        assert_eq!(
            update.section_order,
            Some(vec!["hero".to_string(), "products".to_string()])
        );
    }

    #[test]
    fn test_section_order_is_optional() {
        let message = json!({
            "type": "template-preview-update",
            "vendorId": "v1",
            "payload": {},
        });
        let update = PreviewUpdate::accept(&message, &vendor_context()).unwrap();
        assert_eq!(update.section_order, None);

        let message = json!({
            "type": "template-preview-update",
            "vendorId": "v1",
            "payload": {},
            "sectionOrder": "hero",
        });
        let update = PreviewUpdate::accept(&message, &vendor_context()).unwrap();
        assert_eq!(update.section_order, None);
    }

    #[test]
    fn test_rejects_invalid_messages() {
        let ctx = vendor_context();
        let rejected = [
            json!("template-preview-update"),
            json!({"type": "other", "vendorId": "v1", "payload": {}}),
            json!({"vendorId": "v1", "payload": {}}),
            json!({"type": "template-preview-update", "vendorId": "", "payload": {}}),
            json!({"type": "template-preview-update", "vendorId": 1, "payload": {}}),
            json!({"type": "template-preview-update", "vendorId": "v2", "payload": {}}),
            json!({"type": "template-preview-update", "vendorId": "v1", "payload": []}),
            json!({"type": "template-preview-update", "vendorId": "v1", "payload": null}),
            json!({"type": "template-preview-update", "vendorId": "v1"}),
        ];

        for message in rejected {
            assert!(
                PreviewUpdate::accept(&message, &ctx).is_none(),
                "{message} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_on_default_tenant() {
        let message = json!({
            "type": "template-preview-update",
            "vendorId": "v1",
            "payload": {},
        });
        assert!(PreviewUpdate::accept(&message, &VendorContext::resolve("/")).is_none());
    }
}
