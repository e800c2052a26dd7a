use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Document metadata for a page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub og_image: Option<String>,
    pub canonical_url: Option<String>,
    /// Additional metadata not covered by the fields above, in insertion order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub extra: IndexMap<String, Value>,
}

/// Admin-supplied metadata for a single tenant and path, as returned by the SEO backend.
///
/// A known field with an unexpected type is treated as absent instead of
/// rejecting the whole override.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoOverride {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    /// Either a string or a list of strings, joined with ", ".
    #[serde(default, deserialize_with = "lenient_keywords")]
    pub keywords: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub og_image: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub canonical_url: Option<String>,
    /// Any other keys sent by the backend.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn lenient_keywords<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        Value::Array(items) => {
            let keywords: Vec<&str> = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .collect();
            Ok((!keywords.is_empty()).then(|| keywords.join(", ")))
        }
        _ => Ok(None),
    }
}

/// Merges an override over the defaults.
///
/// Override fields replace defaults only when they are present and not blank.
/// Unknown override keys are carried into `extra` unchanged, except for null
/// and blank strings.
pub fn merge(defaults: &Metadata, seo_override: Option<&SeoOverride>) -> Metadata {
    let mut merged = defaults.clone();

    let Some(seo_override) = seo_override else {
        return merged;
    };

    replace_if_set(&mut merged.title, &seo_override.title);
    replace_if_set(&mut merged.description, &seo_override.description);
    replace_if_set(&mut merged.keywords, &seo_override.keywords);
    replace_if_set(&mut merged.og_image, &seo_override.og_image);
    replace_if_set(&mut merged.canonical_url, &seo_override.canonical_url);

    for (key, value) in &seo_override.extra {
        if is_set(value) {
            merged.extra.insert(key.clone(), value.clone());
        }
    }

    merged
}

fn replace_if_set(target: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = value
        && !value.trim().is_empty()
    {
        *target = Some(value.clone());
    }
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defaults() -> Metadata {
        Metadata {
            title: Some("A".into()),
            description: Some("Default description".into()),
            ..Default::default()
        }
    }

    fn seo_override(value: Value) -> SeoOverride {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_no_override_returns_defaults() {
        assert_eq!(merge(&defaults(), None), defaults());
        assert_eq!(merge(&defaults(), Some(&SeoOverride::default())), defaults());
    }

    #[test]
    fn test_override_replaces_fields() {
        let merged = merge(&defaults(), Some(&seo_override(json!({"title": "B"}))));
        assert_eq!(merged.title.as_deref(), Some("B"));
        assert_eq!(merged.description.as_deref(), Some("Default description"));
    }

    #[test]
    fn test_empty_fields_fall_through() {
        let merged = merge(
            &defaults(),
            Some(&seo_override(json!({"title": "", "description": "   ", "ogImage": null}))),
        );
        assert_eq!(merged, defaults());
    }

    #[test]
    fn test_camel_case_fields() {
        let merged = merge(
            &defaults(),
            Some(&seo_override(json!({
                "ogImage": "https://cdn.example.com/og.png",
                "canonicalUrl": "https://shop.example.com/category/shoes",
                "keywords": "shoes, sneakers",
            }))),
        );
        assert_eq!(
            merged.og_image.as_deref(),
            Some("https://cdn.example.com/og.png")
        );
        assert_eq!(
            merged.canonical_url.as_deref(),
            Some("https://shop.example.com/category/shoes")
        );
        assert_eq!(merged.keywords.as_deref(), Some("shoes, sneakers"));
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let mut defaults = defaults();
        defaults.extra.insert("robots".into(), json!("index"));

        let merged = merge(
            &defaults,
            Some(&seo_override(json!({
                "title": "B",
                "robots": {"index": false, "follow": true},
                "alternates": [{"hreflang": "de", "href": "https://shop.example.de/"}],
                "priority": 0.5,
                "featured": true,
                "author": "Vendor One",
                "empty": " ",
                "missing": null,
            }))),
        );

        assert_eq!(merged.title.as_deref(), Some("B"));
        assert_eq!(merged.extra["robots"], json!({"index": false, "follow": true}));
        assert_eq!(
            merged.extra["alternates"],
            json!([{"hreflang": "de", "href": "https://shop.example.de/"}])
        );
        assert_eq!(merged.extra["priority"], json!(0.5));
        assert_eq!(merged.extra["featured"], json!(true));
        assert_eq!(merged.extra["author"], json!("Vendor One"));
        assert!(!merged.extra.contains_key("empty"));
        assert!(!merged.extra.contains_key("missing"));

        let keys: Vec<&str> = merged.extra.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["robots", "alternates", "priority", "featured", "author"]
        );
    }

    #[test]
    fn test_blank_extra_keeps_default() {
        let mut defaults = defaults();
        defaults.extra.insert("robots".into(), json!("index"));

        let merged = merge(
            &defaults,
            Some(&seo_override(json!({"robots": "", "author": null}))),
        );
        assert_eq!(merged.extra["robots"], json!("index"));
        assert!(!merged.extra.contains_key("author"));
    }

    #[test]
    fn test_mistyped_fields_do_not_reject_override() {
        let parsed = seo_override(json!({
            "title": "Shoes",
            "keywords": ["shoes", " sneakers ", 3, ""],
            "description": 42,
            "ogImage": {"url": "https://cdn.example.com/og.png"},
        }));

        assert_eq!(parsed.title.as_deref(), Some("Shoes"));
        assert_eq!(parsed.keywords.as_deref(), Some("shoes, sneakers"));
        assert_eq!(parsed.description, None);
        assert_eq!(parsed.og_image, None);

        let merged = merge(&defaults(), Some(&parsed));
        assert_eq!(merged.title.as_deref(), Some("Shoes"));
        assert_eq!(merged.description.as_deref(), Some("Default description"));

        let parsed = seo_override(json!({"keywords": []}));
        assert_eq!(parsed.keywords, None);
    }

    #[test]
    fn test_metadata_serialization_skips_empty_extra() {
        let value = serde_json::to_value(defaults()).unwrap();
        assert_eq!(value["title"], "A");
        assert!(value.get("extra").is_none());
    }
}
