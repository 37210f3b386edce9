//! Input sanitization for user-supplied text.
//!
//! Every free-text field that reaches a backend or an agent's inbox goes
//! through one of these functions first.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use ammonia::Builder;
use regex::Regex;
use url::Url;

use crate::error::DomainError;

/// Tags kept by [`sanitize_html`].
const ALLOWED_TAGS: &[&str] = &["b", "i", "em", "strong", "a", "p", "br"];

/// Attributes kept on allowed tags.
const ALLOWED_ATTRS: &[&str] = &["href", "target", "rel"];

/// Schemes allowed in absolute `href` values. Relative links pass.
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Characters dropped from search queries.
const SEARCH_STRIP: &[char] = &['<', '>', '"', '\'', '%', ';', '(', ')', '&', '+'];

const MAX_SEARCH_QUERY_CHARS: usize = 100;

// `rel` is caller-controlled, so ammonia must not inject its own.
static HTML_CLEANER: LazyLock<Builder<'static>> = LazyLock::new(|| {
    let mut builder = Builder::default();
    builder
        .tags(ALLOWED_TAGS.iter().copied().collect())
        .tag_attributes(HashMap::new())
        .generic_attributes(ALLOWED_ATTRS.iter().copied().collect())
        .url_schemes(ALLOWED_SCHEMES.iter().copied().collect())
        .link_rel(None);
    builder
});

static TEXT_CLEANER: LazyLock<Builder<'static>> = LazyLock::new(|| {
    let mut builder = Builder::default();
    builder
        .tags(HashSet::new())
        .tag_attributes(HashMap::new())
        .generic_attributes(HashSet::new())
        .link_rel(None);
    builder
});

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Keep a small set of formatting tags and drop everything else.
///
/// `<script>` and `<style>` are removed together with their content.
/// Output is serialized HTML, so stray `<` and `&` come back escaped.
pub fn sanitize_html(dirty: &str) -> String {
    HTML_CLEANER.clean(dirty).to_string()
}

/// Strip all markup, leaving escaped plain text.
pub fn sanitize_text(dirty: &str) -> String {
    TEXT_CLEANER.clean(dirty).to_string()
}

/// Normalize an email address and reject malformed ones.
pub fn sanitize_email(email: &str) -> Result<String, DomainError> {
    let sanitized = sanitize_text(email).trim().to_lowercase();

    if !EMAIL_RE.is_match(&sanitized) {
        return Err(DomainError::validation("Invalid email format"));
    }

    Ok(sanitized)
}

/// Keep digits, `+`, `-`, parentheses and whitespace.
pub fn sanitize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '+' | '-' | '(' | ')'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Accept only absolute http(s) URLs.
pub fn sanitize_url(raw: &str) -> Result<String, DomainError> {
    let url =
        Url::parse(raw.trim()).map_err(|_| DomainError::validation("Invalid URL format"))?;

    match url.scheme() {
        "http" | "https" => Ok(url.to_string()),
        _ => Err(DomainError::validation("Invalid URL protocol")),
    }
}

/// Plain text, no query metacharacters, at most 100 characters.
pub fn sanitize_search_query(query: &str) -> String {
    sanitize_text(query)
        .replace(SEARCH_STRIP, "")
        .trim()
        .chars()
        .take(MAX_SEARCH_QUERY_CHARS)
        .collect()
}
