//! Post reference validation and shortcode extraction.
//!
//! Three reference shapes are supported, one per content kind:
//!
//! | Kind  | Shape                                         |
//! |-------|-----------------------------------------------|
//! | reel  | `http(s)://[www.]instagram.com/reel/<code>[/]` |
//! | post  | `http(s)://[www.]instagram.com/p/<code>[/]`    |
//! | video | `http(s)://[www.]instagram.com/tv/<code>[/]`   |
//!
//! Matching is purely structural (no network lookup) and anchored at the start
//! of the string only, so trailing query strings are tolerated. Path segments
//! are case-sensitive. Surrounding whitespace is ignored.

use std::sync::LazyLock;

use regex::Regex;

/// The content kinds a reference can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Reel,
    Post,
    Video,
}

impl ContentKind {
    /// The URL path segment that identifies this kind.
    #[must_use]
    pub fn path_segment(self) -> &'static str {
        match self {
            ContentKind::Reel => "reel",
            ContentKind::Post => "p",
            ContentKind::Video => "tv",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::Reel => write!(f, "reel"),
            ContentKind::Post => write!(f, "post"),
            ContentKind::Video => write!(f, "video"),
        }
    }
}

/// A validated reference resolved to its kind and canonical shortcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReference {
    pub kind: ContentKind,
    pub shortcode: String,
}

static REFERENCE_SHAPES: LazyLock<[(ContentKind, Regex); 3]> = LazyLock::new(|| {
    [ContentKind::Reel, ContentKind::Post, ContentKind::Video].map(|kind| {
        let pattern = format!(
            r"^https?://(?:www\.)?instagram\.com/{}/([A-Za-z0-9_-]+)/?",
            kind.path_segment()
        );
        (kind, Regex::new(&pattern).expect("valid reference regex"))
    })
});

/// Resolve `url` against the supported shapes, returning the first match.
#[must_use]
pub fn resolve_reference(url: &str) -> Option<PostReference> {
    let url = url.trim();
    REFERENCE_SHAPES.iter().find_map(|(kind, re)| {
        re.captures(url)
            .and_then(|cap| cap.get(1))
            .map(|m| PostReference {
                kind: *kind,
                shortcode: m.as_str().to_string(),
            })
    })
}

/// Returns `true` if `url` matches one of the supported reference shapes.
#[must_use]
pub fn is_valid_reference(url: &str) -> bool {
    let url = url.trim();
    REFERENCE_SHAPES.iter().any(|(_, re)| re.is_match(url))
}

/// Extract the shortcode from `url`, or `None` if no shape matches.
///
/// Total and deterministic: safe to call on arbitrary input.
#[must_use]
pub fn extract_shortcode(url: &str) -> Option<String> {
    resolve_reference(url).map(|r| r.shortcode)
}
