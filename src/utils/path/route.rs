//! Reference string utilities.
//!
//! Analyzers see raw strings in templates and stylesheets; these helpers
//! decide which of them point at files the packer owns.

/// Check if a link is external (has a URL scheme like http:, mailto:, data:)
///
/// A valid scheme must:
/// - Have at least 1 character before the colon
/// - Only contain ASCII alphanumeric or `+`, `-`, `.`
#[inline]
pub fn is_external_link(link: &str) -> bool {
    link.find(':').is_some_and(|pos| {
        pos > 0
            && link[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Check if a raw reference names a local file.
///
/// Rejects external URLs, protocol-relative URLs (`//cdn/...`), values with
/// no path before `?` or `#`, and values that still contain template
/// expressions.
pub fn is_local_reference(raw: &str) -> bool {
    let raw = raw.trim();
    !strip_query_fragment(raw).is_empty()
        && !raw.starts_with('#')
        && !raw.starts_with("//")
        && !is_external_link(raw)
        && !["<?", "{{", "${", "{%"].iter().any(|m| raw.contains(m))
}

/// Strip `?query` and `#fragment` suffixes from a reference.
///
/// # Examples
/// ```ignore
/// assert_eq!(strip_query_fragment("/font.woff?v=3#iefix"), "/font.woff");
/// ```
#[inline]
pub fn strip_query_fragment(raw: &str) -> &str {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    &raw[..end]
}
