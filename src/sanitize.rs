//! Text cleanup applied to titles and descriptions before they are stored.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

static BLOCK_EXPR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").unwrap());
static COMMENT_EXPR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?(-->|$)").unwrap());
static ANY_TAG_EXPR: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[A-Za-z/!?][^>]*(>|$)").unwrap());
static TAG_EXPR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<(/?)([A-Za-z][A-Za-z0-9]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#).unwrap()
});
static ATTR_EXPR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*("[^"]*"|'[^']*'|[^\s"'>]+))?"#).unwrap()
});
static ENTITY_EXPR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^&(?:[A-Za-z][A-Za-z0-9]*|#[0-9]+|#[xX][0-9A-Fa-f]+);").unwrap());

const URL_ATTRIBUTES: [&str; 3] = ["href", "cite", "src"];
const ALLOWED_SCHEMES: [&str; 4] = ["http", "https", "mailto", "ftp"];

/// Removes every tag and comment; script and style blocks go with their content
pub fn strip_tags(s: &str) -> String {
    let s = BLOCK_EXPR.replace_all(s, "");
    let s = COMMENT_EXPR.replace_all(&s, "");
    ANY_TAG_EXPR.replace_all(&s, "").into_owned()
}

/// Escapes for an HTML attribute value without double-encoding existing entities
pub fn escape_attr(s: &str) -> String {
    escape(s, true)
}

fn escape_text(s: &str) -> String {
    escape(s, false)
}

fn escape(s: &str, quotes: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        match c {
            '&' if ENTITY_EXPR.is_match(&s[i..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            '\'' if quotes => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Title cleanup: plain text, safe to drop into an attribute
pub fn sanitize_title(title: &str) -> String {
    escape_attr(&strip_tags(title))
}

/// Allow-list HTML filter for descriptions.
///
/// `allowed` maps lowercase tag names to the attributes they may keep.
pub fn filter_description(html: &str, allowed: &BTreeMap<String, Vec<String>>) -> String {
    let html = COMMENT_EXPR.replace_all(html, "");
    let mut out = String::with_capacity(html.len());
    let mut last = 0;

    for caps in TAG_EXPR.captures_iter(&html) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&escape_text(&html[last..whole.start()]));
        last = whole.end();

        let closing = !caps[1].is_empty();
        let name = caps[2].to_lowercase();
        let Some(allowed_attrs) = allowed.get(&name) else {
            continue;
        };

        if closing {
            out.push_str(&format!("</{}>", name));
            continue;
        }

        let raw_attrs = caps.get(3).map_or("", |m| m.as_str());
        out.push('<');
        out.push_str(&name);
        for attr in ATTR_EXPR.captures_iter(raw_attrs) {
            let attr_name = attr[1].to_lowercase();
            if attr_name.starts_with("on") || !allowed_attrs.iter().any(|a| *a == attr_name) {
                continue;
            }
            match attr.get(2) {
                Some(value) => {
                    let value = unquote(value.as_str());
                    if URL_ATTRIBUTES.contains(&attr_name.as_str()) && !is_safe_url(value) {
                        log::debug!("Dropping {}=\"{}\" from <{}>", attr_name, value, name);
                        continue;
                    }
                    out.push_str(&format!(" {}=\"{}\"", attr_name, escape_attr(value)));
                }
                None => {
                    out.push(' ');
                    out.push_str(&attr_name);
                }
            }
        }
        if raw_attrs.trim_end().ends_with('/') {
            out.push_str(" /");
        }
        out.push('>');
    }

    out.push_str(&escape_text(&html[last..]));
    out
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Relative URLs and the allowed schemes pass; everything else is rejected
fn is_safe_url(value: &str) -> bool {
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_lowercase();
    let scheme_end = normalized.find(|c| matches!(c, '/' | '?' | '#'));
    let head = match scheme_end {
        Some(end) => &normalized[..end],
        None => normalized.as_str(),
    };
    // Character references before the first separator could hide a scheme
    if head.contains('&') || (head.contains('%') && head.contains(':')) {
        return false;
    }
    match head.find(':') {
        Some(colon) => ALLOWED_SCHEMES.contains(&&head[..colon]),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlbumConfig;

    fn allowed() -> BTreeMap<String, Vec<String>> {
        AlbumConfig::default().allowed_description_tags
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<b>Sunset</b> at <i>sea</i>"), "Sunset at sea");
        assert_eq!(strip_tags("a<script>alert(1)</script>b"), "ab");
        assert_eq!(strip_tags("x<!-- note -->y"), "xy");
        assert_eq!(strip_tags("broken <img src=x"), "broken ");
        assert_eq!(strip_tags("1 < 2 and 3 <= 4"), "1 < 2 and 3 <= 4");
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr("Tom & \"Jerry\""), "Tom &amp; &quot;Jerry&quot;");
        assert_eq!(escape_attr("it's"), "it&#039;s");
        assert_eq!(escape_attr("already &amp; &#38; &#x26;"), "already &amp; &#38; &#x26;");
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("<em>Beach</em> & \"sun\""), "Beach &amp; &quot;sun&quot;");
        assert_eq!(sanitize_title("Price < 5 dollars"), "Price &lt; 5 dollars");
    }

    #[test]
    fn test_description_keeps_allowed_tags() {
        let html = r#"<strong>Hi</strong> <a href="http://example.com" title='t' class="x">link</a>"#;
        assert_eq!(
            filter_description(html, &allowed()),
            r#"<strong>Hi</strong> <a href="http://example.com" title="t">link</a>"#
        );
    }

    #[test]
    fn test_description_drops_disallowed_tags_but_keeps_text() {
        let html = "<div><p>Hello</p><script>x()</script></div>";
        assert_eq!(filter_description(html, &allowed()), "Hellox()");
    }

    #[test]
    fn test_description_drops_event_handlers_and_scripts_urls() {
        let mut tags = allowed();
        tags.get_mut("a").unwrap().push("onclick".to_string());
        let html = r#"<a href="javascript:alert(1)" onclick="evil()">x</a><a href=" JaVa script:y">z</a>"#;
        assert_eq!(filter_description(html, &tags), "<a>x</a><a>z</a>");
    }

    #[test]
    fn test_description_escapes_stray_brackets() {
        assert_eq!(filter_description("1 < 2 > 0", &allowed()), "1 &lt; 2 &gt; 0");
        assert_eq!(filter_description("<!-- hidden -->shown", &allowed()), "shown");
    }

    #[test]
    fn test_relative_urls_are_safe() {
        assert!(is_safe_url("/members/bob/album"));
        assert!(is_safe_url("picture/12"));
        assert!(is_safe_url("https://example.com/a:b"));
        assert!(!is_safe_url("data:text/html,hi"));
        assert!(!is_safe_url("javascript&#58;alert(1)"));
    }

    #[test]
    fn test_encoded_scheme_is_rejected() {
        assert!(!is_safe_url("javascript&colon;alert(1)"));
        assert!(!is_safe_url("java&Tab;script:alert(1)"));
        assert!(!is_safe_url("javascript&#x3a;alert(1)"));
        assert!(!is_safe_url("javascript&#58alert(1)"));
        assert!(is_safe_url("/search?a=1&b=2"));

        let html = r#"<a href="javascript&colon;alert(1)">x</a>"#;
        let out = filter_description(html, &allowed());
        assert_eq!(out, "<a>x</a>");
        assert!(!out.contains("javascript"));
    }
}
