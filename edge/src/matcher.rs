use routing::Pattern;

/// Paths the edge forwards without routing: API calls, build assets and
/// well-known files.
#[derive(Debug)]
pub struct Exclusions {
    patterns: Vec<Pattern>,
}

impl Exclusions {
    pub fn new<P: AsRef<str>>(patterns: &[P]) -> Self {
        Self {
            patterns: patterns
                .iter()
                .map(|p| Pattern::parse(p.as_ref()))
                .collect(),
        }
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path).is_some())
    }
}
