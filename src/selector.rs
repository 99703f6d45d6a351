//! Glob selector parsing.
//!
//! A selector such as `/cmf/*/routes` is split into one [`Segment`] per
//! non-empty path component. Components containing `*`, `?` or `[` are
//! patterns matched against a single child name; every other component is
//! static. Patterns never cross a `/`: deep matching with `**` is not
//! supported and is rejected at parse time.

use globset::{GlobBuilder, GlobMatcher};

use crate::RepoError;

/// Whether a segment names a child exactly or matches child names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Exact child name.
    Static,
    /// Single-level wildcard pattern.
    Pattern,
}

/// One component of a parsed selector.
#[derive(Debug, Clone)]
pub struct Segment {
    element: String,
    name: String,
    kind: SegmentKind,
    last: bool,
    matcher: Option<GlobMatcher>,
}

impl Segment {
    /// The raw component text, escapes included.
    #[inline]
    pub fn element(&self) -> &str {
        &self.element
    }

    /// The child name a static segment stands for, with backslash escapes
    /// removed. Same as [`element`](Self::element) for patterns.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Static or pattern.
    #[inline]
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// `true` for the final segment of the selector.
    #[inline]
    pub fn is_last(&self) -> bool {
        self.last
    }

    /// `true` if this segment is a wildcard pattern.
    #[inline]
    pub fn is_pattern(&self) -> bool {
        self.kind == SegmentKind::Pattern
    }

    /// Test a single child name against this segment.
    pub fn matches(&self, name: &str) -> bool {
        match &self.matcher {
            Some(matcher) => matcher.is_match(name),
            None => self.name == name,
        }
    }
}

/// A parsed glob selector.
#[derive(Debug, Clone)]
pub enum Selector {
    /// The selector `/`, which matches only the root node.
    Root,
    /// A non-empty list of segments; only the final one is flagged last.
    Segments(Vec<Segment>),
}

impl Selector {
    /// The segments, empty for [`Selector::Root`].
    pub fn segments(&self) -> &[Segment] {
        match self {
            Selector::Root => &[],
            Selector::Segments(segments) => segments,
        }
    }

    /// `true` if any segment is a pattern.
    pub fn is_globbed(&self) -> bool {
        self.segments().iter().any(Segment::is_pattern)
    }
}

/// Parse a glob selector.
///
/// # Errors
///
/// - [`RepoError::InvalidQuery`] if the selector is not absolute, contains
///   `**`, or holds a malformed pattern
///
/// # Example
///
/// ```rust
/// use cmf_resource::selector::{parse, Selector, SegmentKind};
///
/// let Selector::Segments(segments) = parse("/a/*/c")? else { unreachable!() };
/// let kinds: Vec<_> = segments.iter().map(|s| s.kind()).collect();
/// assert_eq!(kinds, [SegmentKind::Static, SegmentKind::Pattern, SegmentKind::Static]);
/// assert!(segments[2].is_last());
/// # Ok::<(), cmf_resource::RepoError>(())
/// ```
pub fn parse(query: &str) -> Result<Selector, RepoError> {
    if !query.starts_with('/') {
        return Err(RepoError::InvalidQuery {
            query: query.to_string(),
            reason: "the query is not absolute".into(),
        });
    }

    let elements: Vec<&str> = query.split('/').filter(|e| !e.is_empty()).collect();
    if elements.is_empty() {
        return Ok(Selector::Root);
    }

    let count = elements.len();
    let mut segments = Vec::with_capacity(count);
    for (idx, element) in elements.into_iter().enumerate() {
        segments.push(parse_segment(query, element, idx + 1 == count)?);
    }

    Ok(Selector::Segments(segments))
}

/// `true` if the query contains at least one wildcard component.
pub fn is_globbed(query: &str) -> bool {
    query.split('/').any(has_wildcard)
}

fn parse_segment(query: &str, element: &str, last: bool) -> Result<Segment, RepoError> {
    if !has_wildcard(element) {
        return Ok(Segment {
            element: element.to_string(),
            name: unescape(element),
            kind: SegmentKind::Static,
            last,
            matcher: None,
        });
    }

    if element.contains("**") {
        return Err(RepoError::InvalidQuery {
            query: query.to_string(),
            reason: "recursive \"**\" matching is not supported".into(),
        });
    }

    let glob = GlobBuilder::new(element)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .map_err(|e| RepoError::InvalidQuery {
            query: query.to_string(),
            reason: e.to_string(),
        })?;

    Ok(Segment {
        element: element.to_string(),
        name: element.to_string(),
        kind: SegmentKind::Pattern,
        last,
        matcher: Some(glob.compile_matcher()),
    })
}

/// Drop the backslash in front of each escaped character.
fn unescape(element: &str) -> String {
    let mut out = String::with_capacity(element.len());
    let mut escaped = false;
    for c in element.chars() {
        if c == '\\' && !escaped {
            escaped = true;
            continue;
        }
        out.push(c);
        escaped = false;
    }
    if escaped {
        out.push('\\');
    }
    out
}

/// Unescaped `*`, `?` or `[`.
fn has_wildcard(element: &str) -> bool {
    let mut escaped = false;
    for c in element.chars() {
        match c {
            '\\' if !escaped => escaped = true,
            '*' | '?' | '[' if !escaped => return true,
            _ => escaped = false,
        }
    }
    false
}
