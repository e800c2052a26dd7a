use crate::metadata::Metadata;
use indexmap::IndexMap;

/// Identifies a `<meta>` tag by its `name` or `property` attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetaKey {
    Name(&'static str),
    Property(&'static str),
}

pub const DESCRIPTION: MetaKey = MetaKey::Name("description");
pub const KEYWORDS: MetaKey = MetaKey::Name("keywords");
pub const OG_TITLE: MetaKey = MetaKey::Property("og:title");
pub const OG_DESCRIPTION: MetaKey = MetaKey::Property("og:description");
pub const OG_IMAGE: MetaKey = MetaKey::Property("og:image");
pub const OG_URL: MetaKey = MetaKey::Property("og:url");
pub const TWITTER_TITLE: MetaKey = MetaKey::Name("twitter:title");
pub const TWITTER_DESCRIPTION: MetaKey = MetaKey::Name("twitter:description");
pub const TWITTER_IMAGE: MetaKey = MetaKey::Name("twitter:image");

/// The writable part of a rendered document's head.
///
/// Every operation replaces the previous value, so repeating a write is not
/// observable.
pub trait DocumentHead {
    fn set_title(&mut self, title: &str);
    fn set_meta(&mut self, key: MetaKey, content: &str);
    fn remove_meta(&mut self, key: MetaKey);
    fn set_canonical(&mut self, href: &str);
    fn remove_canonical(&mut self);
}

/// Writes metadata to the document head.
///
/// Tags for fields without a value are removed so that a previous page's values
/// do not linger. The title is only ever replaced.
pub fn apply_metadata<D: DocumentHead + ?Sized>(document: &mut D, metadata: &Metadata) {
    if let Some(title) = &metadata.title {
        document.set_title(title);
    }

    write_meta(document, &[OG_TITLE, TWITTER_TITLE], metadata.title.as_deref());
    write_meta(
        document,
        &[DESCRIPTION, OG_DESCRIPTION, TWITTER_DESCRIPTION],
        metadata.description.as_deref(),
    );
    write_meta(document, &[KEYWORDS], metadata.keywords.as_deref());
    write_meta(document, &[OG_IMAGE, TWITTER_IMAGE], metadata.og_image.as_deref());
    write_meta(document, &[OG_URL], metadata.canonical_url.as_deref());

    match &metadata.canonical_url {
        Some(href) => document.set_canonical(href),
        None => document.remove_canonical(),
    }
}

fn write_meta<D: DocumentHead + ?Sized>(document: &mut D, keys: &[MetaKey], content: Option<&str>) {
    for key in keys {
        match content {
            Some(content) => document.set_meta(*key, content),
            None => document.remove_meta(*key),
        }
    }
}

/// In-memory document head, for headless rendering and tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeadDocument {
    title: Option<String>,
    meta: IndexMap<MetaKey, String>,
    canonical: Option<String>,
}

impl HeadDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn meta(&self, key: MetaKey) -> Option<&str> {
        self.meta.get(&key).map(String::as_str)
    }

    pub fn canonical(&self) -> Option<&str> {
        self.canonical.as_deref()
    }
}

impl DocumentHead for HeadDocument {
    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    fn set_meta(&mut self, key: MetaKey, content: &str) {
        self.meta.insert(key, content.to_string());
    }

    fn remove_meta(&mut self, key: MetaKey) {
        self.meta.shift_remove(&key);
    }

    fn set_canonical(&mut self, href: &str) {
        self.canonical = Some(href.to_string());
    }

    fn remove_canonical(&mut self) {
        self.canonical = None;
    }
}
