//! Makes legacy report pages safe to embed.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static SCRIPT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<script\b[^>]*/?>").expect("valid script regex")
});

static EVENT_HANDLER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)[\s/]+on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).expect("valid handler regex")
});

static RESOURCE_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)\s+(src|href|action)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("valid resource regex")
});

/// Whether a URL still resolves once the page is embedded elsewhere.
fn is_portable_url(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("data:image/")
        || lower.starts_with("mailto:")
        || lower.starts_with('#')
}

/// Removes every match of `re`, again and again, until nothing matches.
///
/// One pass is not enough: removing `<script></script>` from
/// `<scr<script></script>ipt>` leaves a new `<script>` behind.
fn strip_until_stable(re: &Regex, html: &str) -> String {
    let mut current = html.to_string();
    loop {
        let next = match re.replace_all(&current, "") {
            Cow::Borrowed(_) => None,
            Cow::Owned(next) => Some(next),
        };
        match next {
            Some(next) => current = next,
            None => return current,
        }
    }
}

/// Strips `<script>` elements, inline `on*` handlers and relative resource references.
///
/// Relative `src`/`href`/`action` values point at the legacy host and would either
/// break or call back into SGE from the embedding page, so they are removed along
/// with `javascript:` URLs.
pub fn sanitize_report(html: &str) -> String {
    let without_scripts = strip_until_stable(&SCRIPT_RE, html);
    let without_handlers = strip_until_stable(&EVENT_HANDLER_RE, &without_scripts);

    RESOURCE_ATTR_RE
        .replace_all(&without_handlers, |caps: &Captures| {
            let url = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str())
                .unwrap_or_default();

            if is_portable_url(url) {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}
