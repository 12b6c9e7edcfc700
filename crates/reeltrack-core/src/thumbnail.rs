//! Placeholder thumbnails for tracked posts.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unescaped, matching `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const PALETTE: [&str; 6] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD",
];

/// Build an SVG data URI for `shortcode`.
///
/// Pure: the same shortcode always yields the same image reference.
#[must_use]
pub fn generate_thumbnail(shortcode: &str) -> String {
    let color = PALETTE[shortcode.chars().count() % PALETTE.len()];
    let label: String = shortcode.chars().take(3).collect::<String>().to_uppercase();
    let svg = format!(
        r#"<svg width="300" height="300" xmlns="http://www.w3.org/2000/svg"><rect width="300" height="300" fill="{color}"/><text x="150" y="150" text-anchor="middle" dy=".35em" fill="white" font-size="24" font-family="Arial">{label}</text></svg>"#
    );
    format!(
        "data:image/svg+xml,{}",
        utf8_percent_encode(&svg, URI_COMPONENT)
    )
}
