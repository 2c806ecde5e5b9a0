//! Regex helpers for SGE's server-rendered markup.
//!
//! These are tuned to the legacy pages, not to HTML in general: no nesting of
//! the element being searched for, attributes quoted or bare.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").expect("valid entity regex")
});

static ROW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<tr\b([^>]*)>(.*?)</tr\s*>").expect("valid row regex"));

static CELL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<td\b([^>]*)>(.*?)</td\s*>").expect("valid cell regex"));

static INPUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<input\b([^>]*)>").expect("valid input regex"));

static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid attribute regex")
});

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// A `<tr>` with its attributes and cells.
#[derive(Debug, Clone)]
pub struct Row<'a> {
    /// Raw attribute text of the `<tr>` tag.
    pub attrs: &'a str,
    /// Raw inner HTML of the row.
    pub inner: &'a str,
    /// The row's `<td>` cells.
    pub cells: Vec<Cell<'a>>,
}

/// A `<td>` with its attributes and inner HTML.
#[derive(Debug, Clone)]
pub struct Cell<'a> {
    /// Raw attribute text of the `<td>` tag.
    pub attrs: &'a str,
    /// Raw inner HTML of the cell.
    pub inner: &'a str,
}

impl Cell<'_> {
    /// The cell's visible text.
    pub fn text(&self) -> String {
        text_content(self.inner)
    }
}

/// Decodes the entities SGE emits (`&amp;`, `&nbsp;`, accented letters, numeric).
pub fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(entity)
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ordm" => 'º',
        "ordf" => 'ª',
        "aacute" => 'á',
        "Aacute" => 'Á',
        "agrave" => 'à',
        "acirc" => 'â',
        "Acirc" => 'Â',
        "atilde" => 'ã',
        "Atilde" => 'Ã',
        "eacute" => 'é',
        "Eacute" => 'É',
        "ecirc" => 'ê',
        "Ecirc" => 'Ê',
        "iacute" => 'í',
        "Iacute" => 'Í',
        "oacute" => 'ó',
        "Oacute" => 'Ó',
        "ocirc" => 'ô',
        "Ocirc" => 'Ô',
        "otilde" => 'õ',
        "Otilde" => 'Õ',
        "uacute" => 'ú',
        "Uacute" => 'Ú',
        "ccedil" => 'ç',
        "Ccedil" => 'Ç',
        _ => return None,
    })
}

/// Visible text of an HTML fragment: tags dropped, entities decoded, whitespace collapsed.
pub fn text_content(fragment: &str) -> String {
    let without_tags = TAG_RE.replace_all(fragment, " ");
    let decoded = decode_entities(&without_tags);
    WHITESPACE_RE.replace_all(decoded.trim(), " ").into_owned()
}

/// Inner HTML of the first `<tag id="id">…</tag>`.
pub fn element_by_id<'a>(html: &'a str, tag: &str, id: &str) -> Option<&'a str> {
    let pattern = format!(
        r#"(?is)<{tag}\b[^>]*?\sid\s*=\s*["']?{id}(?:["'\s/][^>]*)?>(.*?)</{tag}\s*>"#,
        tag = regex::escape(tag),
        id = regex::escape(id)
    );
    let re = Regex::new(&pattern).ok()?;
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Every `<tr>` of a table fragment.
pub fn rows(table: &str) -> Vec<Row<'_>> {
    ROW_RE
        .captures_iter(table)
        .filter_map(|caps| {
            let attrs = caps.get(1)?.as_str();
            let inner = caps.get(2)?.as_str();
            let cells = CELL_RE
                .captures_iter(inner)
                .filter_map(|cell| {
                    Some(Cell {
                        attrs: cell.get(1)?.as_str(),
                        inner: cell.get(2)?.as_str(),
                    })
                })
                .collect();
            Some(Row { attrs, inner, cells })
        })
        .collect()
}

/// Attribute text of the first `<input>` in a fragment.
pub fn first_input(fragment: &str) -> Option<&str> {
    INPUT_RE
        .captures(fragment)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Value of a named attribute in raw attribute text, entities decoded.
pub fn attr(attrs: &str, name: &str) -> Option<String> {
    ATTR_RE.captures_iter(attrs).find_map(|caps| {
        if !caps[1].eq_ignore_ascii_case(name) {
            return None;
        }
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str())
            .unwrap_or_default();
        Some(decode_entities(value))
    })
}

/// Whether a boolean attribute (`checked`, `selected`) is present.
pub fn has_flag(attrs: &str, flag: &str) -> bool {
    let without_values = ATTR_RE.replace_all(attrs, |caps: &Captures| {
        if caps[1].eq_ignore_ascii_case(flag) {
            flag.to_string()
        } else {
            String::new()
        }
    });
    without_values
        .split(|c: char| c.is_whitespace() || c == '/')
        .any(|word| word.eq_ignore_ascii_case(flag))
}

/// Whether a page shows SGE's "no records" notice.
pub fn has_no_records_notice(html: &str) -> bool {
    text_content(html)
        .to_lowercase()
        .contains(crate::sge::endpoints::NO_RECORDS_MARKER)
}
