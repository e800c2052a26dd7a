use std::collections::HashMap;

/// Splits a request path into its non-empty `/`-separated segments.
///
/// Repeated and trailing slashes are ignored, so `//template/v1/` yields
/// `["template", "v1"]`.
pub fn segments(path: &str) -> Vec<&str> {
    path.trim()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Joins segments back into an absolute path. No segments is the root path.
pub fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }

    let mut path = String::new();
    for segment in segments {
        path.push('/');
        path.push_str(segment.as_ref());
    }
    path
}

#[derive(Debug, Clone, PartialEq)]
enum PathSegment {
    Static(String),
    Param(String),
}

/// A parsed path pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    segments: Vec<PathSegment>,
    has_trailing_splat: bool,
}

impl Pattern {
    /// Parses a path pattern string.
    /// Supports:
    /// - Static segments: "/template"
    /// - Dynamic parameters: "/template/{vendor_id}"
    /// - Trailing splat: "/template/{vendor_id}/*", which captures the remaining segments
    pub fn parse(pattern: &str) -> Self {
        let mut normalized = pattern.trim().trim_matches('/');

        let mut has_trailing_splat = false;
        if normalized == "*" {
            has_trailing_splat = true;
            normalized = "";
        } else if let Some(stripped) = normalized.strip_suffix("/*") {
            has_trailing_splat = true;
            normalized = stripped;
        }

        let segments = segments(normalized)
            .into_iter()
            .map(|s| {
                if let Some(stripped) = s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    PathSegment::Param(stripped.to_string())
                } else {
                    PathSegment::Static(s.to_string())
                }
            })
            .collect();

        Pattern {
            segments,
            has_trailing_splat,
        }
    }

    /// Matches a request path against this pattern.
    /// Returns `None` if the path does not have the pattern's shape.
    pub fn matches<'a>(&self, request_path: &'a str) -> Option<PatternMatch<'a>> {
        let request_segments = segments(request_path);

        if request_segments.len() < self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();

        for (seg, req_segment) in self.segments.iter().zip(request_segments.iter()) {
            match seg {
                PathSegment::Static(s) => {
                    if *req_segment != s.as_str() {
                        return None;
                    }
                }
                PathSegment::Param(name) => {
                    params.insert(name.clone(), *req_segment);
                }
            }
        }

        let rest = request_segments[self.segments.len()..].to_vec();
        if !self.has_trailing_splat && !rest.is_empty() {
            return None;
        }

        Some(PatternMatch { params, rest })
    }
}

/// The result of a successful pattern match.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch<'a> {
    pub params: HashMap<String, &'a str>,
    /// Segments captured by a trailing splat. Always empty for patterns without one.
    pub rest: Vec<&'a str>,
}

impl<'a> PatternMatch<'a> {
    pub fn param(&self, name: &str) -> Option<&'a str> {
        self.params.get(name).copied()
    }
}

/// An ordered table of patterns and the actions attached to them.
#[derive(Debug)]
pub struct RouteTable<A> {
    routes: Vec<(Pattern, A)>,
}

impl<A> RouteTable<A> {
    pub fn new<P: AsRef<str>>(routes: Vec<(P, A)>) -> Self {
        let routes = routes
            .into_iter()
            .map(|(pattern, action)| (Pattern::parse(pattern.as_ref()), action))
            .collect();
        Self { routes }
    }

    /// Yields every route matching the path, in table order.
    pub fn matches<'t, 'p>(
        &'t self,
        path: &'p str,
    ) -> impl Iterator<Item = (&'t A, PatternMatch<'p>)> {
        self.routes
            .iter()
            .filter_map(move |(pattern, action)| pattern.matches(path).map(|m| (action, m)))
    }

    /// Returns the first matching route, if any.
    pub fn resolve<'t, 'p>(&'t self, path: &'p str) -> Option<(&'t A, PatternMatch<'p>)> {
        self.matches(path).next()
    }
}
