// ABOUTME: Text normalizers used across extraction, dedup, and feed assembly.
// ABOUTME: Tag stripping, entity decoding, whitespace collapsing, key normalization, and HTML escaping.

/// Named entities decoded by [`decode_entities`].
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&#39;", "'"),
    ("&nbsp;", " "),
    ("&ndash;", "–"),
    ("&mdash;", "—"),
    ("&lsquo;", "'"),
    ("&rsquo;", "'"),
    ("&ldquo;", "\u{201C}"),
    ("&rdquo;", "\u{201D}"),
    ("&hellip;", "…"),
    ("&bull;", "•"),
    ("&middot;", "·"),
];

/// Trims a value and collapses internal whitespace runs to single spaces.
///
/// This is the "stringify" normalizer: every scraped text value passes through it
/// before it reaches a record.
pub fn clean_text(s: &str) -> String {
    collapse_whitespace(s)
}

/// Lowercases and collapses whitespace. Used for guid and dedup keys.
pub fn normalize_key(s: &str) -> String {
    collapse_whitespace(&s.to_lowercase())
}

/// Strips HTML tags, decodes entities, and collapses whitespace.
///
/// As in HTML, `<` opens a tag only when followed by a letter, `/`, `!`, or `?`;
/// a bare `<` such as in `Ages 3 < 12` is text.
pub fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '<' if !in_tag && chars.peek().is_some_and(|n| opens_tag(*n)) => in_tag = true,
            '>' if in_tag => {
                // keep words on either side of a tag apart
                result.push(' ');
                in_tag = false;
            }
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    collapse_whitespace(&decode_entities(&result))
}

fn opens_tag(next: char) -> bool {
    next.is_ascii_alphabetic() || matches!(next, '/' | '!' | '?')
}

/// Decodes common named entities and numeric (`&#38;`, `&#x26;`) references in one
/// left-to-right pass, so `&amp;lt;` becomes `&lt;` and not `<`.
pub fn decode_entities(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find('&') {
        result.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match decode_reference(tail) {
            Some((decoded, consumed)) => {
                result.push_str(&decoded);
                rest = &tail[consumed..];
            }
            None => {
                result.push('&');
                rest = &tail[1..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// Decodes the reference at the start of `tail`, returning the text and bytes consumed.
fn decode_reference(tail: &str) -> Option<(String, usize)> {
    if let Some((entity, replacement)) = NAMED_ENTITIES.iter().find(|(e, _)| tail.starts_with(e)) {
        return Some((replacement.to_string(), entity.len()));
    }

    let body = tail.strip_prefix("&#")?;
    let (radix, digits) = match body.strip_prefix(['x', 'X']) {
        Some(hex) => (16, hex),
        None => (10, body),
    };
    let len = digits
        .chars()
        .take_while(|c| c.is_digit(radix))
        .count();
    if len == 0 {
        return None;
    }
    let ch = u32::from_str_radix(&digits[..len], radix)
        .ok()
        .and_then(char::from_u32)?;
    let semicolon = usize::from(digits[len..].starts_with(';'));
    Some((ch.to_string(), tail.len() - digits.len() + len + semicolon))
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Escapes the five XML/HTML special characters.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Joins non-empty segments with an em-dash separator.
pub fn join_segments<'a, I>(segments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    segments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" — ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_basic() {
        assert_eq!(strip_html("<p>Hello</p>"), "Hello");
        assert_eq!(strip_html("<b>Bold</b> and <i>italic</i>"), "Bold and italic");
        assert_eq!(strip_html("<p>One</p><p>Two</p>"), "One Two");
    }

    #[test]
    fn test_strip_html_with_entities() {
        assert_eq!(strip_html("<p>Tom &amp; Jerry</p>"), "Tom & Jerry");
        assert_eq!(strip_html("&lt;script&gt;"), "<script>");
    }

    #[test]
    fn test_decode_entities_numeric() {
        assert_eq!(decode_entities("&#38;"), "&");
        assert_eq!(decode_entities("&#x26;"), "&");
        assert_eq!(decode_entities("caf&#233;"), "café");
        assert_eq!(decode_entities("&#;"), "&#;");
    }

    #[test]
    fn test_decode_entities_single_pass() {
        assert_eq!(decode_entities("&amp;lt;b&amp;gt;"), "&lt;b&gt;");
        assert_eq!(decode_entities("&amp;#38;"), "&#38;");
        assert_eq!(decode_entities("AT&T &amp co"), "AT&T &amp co");
    }

    #[test]
    fn test_strip_html_keeps_bare_angle_brackets() {
        assert_eq!(strip_html("Ages 3 < 12 welcome, <b>bring</b> snacks"), "Ages 3 < 12 welcome, bring snacks");
        assert_eq!(strip_html("Kids <12 & up"), "Kids <12 & up");
        assert_eq!(strip_html("<!-- note -->Show"), "Show");
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  Jazz   NIGHT\n"), "jazz night");
        assert_eq!(normalize_key(""), "");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_join_segments_drops_empty() {
        assert_eq!(join_segments(["The Hall", "2024-05-01"]), "The Hall — 2024-05-01");
        assert_eq!(join_segments(["", "2024-05-01"]), "2024-05-01");
        assert_eq!(join_segments(["  ", ""]), "");
    }
}
